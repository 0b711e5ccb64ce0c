//! One-shot search command.

use anyhow::{bail, Result};
use colored::Colorize;
use imgseek_core::{Dashboard, FetchOutcome, ImageRecord};
use serde_json::json;
use tracing::{debug, warn};

use crate::utils::{print_results, Context};

pub async fn execute(ctx: &Context, term: &str, pages: u32, as_json: bool) -> Result<()> {
    if term.trim().is_empty() {
        bail!("Search term must not be blank");
    }

    let mut dashboard = ctx.open(None).await?;
    if !dashboard.session().mode.is_authenticated() {
        warn!(term, "Guest search, term not sent");
        if !ctx.quiet {
            eprintln!(
                "{}",
                format!("Guests browse the discovery feed; \"{term}\" is ignored.").yellow()
            );
        }
    }

    let outcome = dashboard.search(term).await;
    ensure_applied(ctx, &mut dashboard, outcome)?;

    for _ in 1..pages.max(1) {
        if !dashboard.controller().has_more() {
            debug!(page = dashboard.controller().page(), "No more pages");
            break;
        }
        let outcome = dashboard.next_page().await;
        ensure_applied(ctx, &mut dashboard, outcome)?;
    }

    if as_json {
        print_json(&dashboard)?;
    } else {
        let controller = dashboard.controller();
        println!(
            "{} {} ({} images, page {})",
            "Results for".bold(),
            controller.committed_term().unwrap_or(term),
            dashboard.results().len(),
            controller.page()
        );
        print_results(dashboard.results().records(), dashboard.selection());
    }
    Ok(())
}

fn ensure_applied(
    ctx: &Context,
    dashboard: &mut Dashboard,
    outcome: Option<FetchOutcome>,
) -> Result<()> {
    ctx.flush_notifications(dashboard);
    match outcome {
        Some(FetchOutcome::Applied { .. }) => Ok(()),
        Some(FetchOutcome::Failed) => bail!("Search failed"),
        Some(FetchOutcome::Stale) | None => Ok(()),
    }
}

fn record_json(record: &ImageRecord) -> serde_json::Value {
    json!({
        "id": record.id,
        "thumbnail_url": record.thumbnail_url,
        "full_url": record.full_url,
        "attribution": record.attribution,
        "owner_name": record.owner_name,
    })
}

fn print_json(dashboard: &Dashboard) -> Result<()> {
    let controller = dashboard.controller();
    let body = json!({
        "mode": dashboard.session().mode.to_string(),
        "term": controller.committed_term(),
        "page": controller.page(),
        "has_more": controller.has_more(),
        "results": dashboard
            .results()
            .records()
            .iter()
            .map(record_json)
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

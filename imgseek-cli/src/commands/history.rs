//! Search history and top searches.

use anyhow::{Context as _, Result};
use colored::Colorize;
use imgseek_core::{Dashboard, HISTORY_VIEW_LEN};

use crate::utils::{print_history, print_top_searches, Context};

pub const GUEST_HISTORY_NOTE: &str = "Search history is kept for signed-in users only.";

async fn open_authenticated(ctx: &Context) -> Result<Option<Dashboard>> {
    let mut dashboard = ctx.open(None).await?;
    ctx.flush_notifications(&mut dashboard);
    if dashboard.session().mode.is_authenticated() {
        Ok(Some(dashboard))
    } else {
        println!("{}", GUEST_HISTORY_NOTE.dimmed());
        Ok(None)
    }
}

pub async fn show(ctx: &Context) -> Result<()> {
    let Some(dashboard) = open_authenticated(ctx).await? else {
        return Ok(());
    };

    let recent = dashboard.history().recent(HISTORY_VIEW_LEN);
    if recent.is_empty() {
        println!("No searches yet.");
    } else {
        println!("{}", "Recent searches".bold());
        print_history(recent);
    }
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<()> {
    let Some(mut dashboard) = open_authenticated(ctx).await? else {
        return Ok(());
    };

    // The local list is already empty; wait so the request is not cut off at exit.
    if let Some(handle) = dashboard.clear_history() {
        handle.await.context("History clear task failed")?;
    }
    println!("{} History cleared", "✓".green().bold());
    Ok(())
}

pub async fn top(ctx: &Context) -> Result<()> {
    let mut dashboard = ctx.open(None).await?;
    ctx.flush_notifications(&mut dashboard);

    let terms = dashboard.top_searches();
    if terms.is_empty() {
        println!("No top searches available.");
    } else {
        println!("{}", "Top searches".bold());
        print_top_searches(terms);
    }
    Ok(())
}

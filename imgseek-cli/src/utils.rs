//! Common utility functions shared across CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use imgseek_core::{
    ClientConfig, Dashboard, FileSessionStore, HistoryEntry, HttpSearchApi, IdentityHandoff,
    ImageRecord, MockSearchApi, Notification, SearchApi, SearchError, SelectionSet, Severity,
};
use tracing::debug;

/// Everything a command needs: configuration, the persisted store and an API client.
pub struct Context {
    pub config: ClientConfig,
    pub store: Arc<FileSessionStore>,
    pub api: Arc<dyn SearchApi>,
    pub quiet: bool,
}

impl Context {
    /// Build the context from the environment plus command-line overrides.
    pub fn build(
        api_url: Option<String>,
        store_path: Option<PathBuf>,
        mock: bool,
        quiet: bool,
    ) -> Result<Self> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = api_url {
            config = config.with_api_url(&url)?;
        }
        if let Some(path) = store_path {
            config.store_path = path;
        }
        debug!(config = ?config, mock, "CLI context");

        let api: Arc<dyn SearchApi> = if mock {
            if !quiet {
                eprintln!("{}", "Using MOCK search API (synthetic results)".yellow());
            }
            Arc::new(MockSearchApi::default())
        } else {
            Arc::new(HttpSearchApi::new(config.clone())?)
        };

        let store = Arc::new(FileSessionStore::new(config.store_path.clone()));
        Ok(Self {
            config,
            store,
            api,
            quiet,
        })
    }

    /// Open the dashboard, failing with `SearchError::NoSession` when there is no session.
    pub async fn open(&self, handoff: Option<IdentityHandoff>) -> Result<Dashboard> {
        Dashboard::open(self.store.clone(), self.api.clone(), handoff)
            .await
            .context("Failed to open session")?
            .ok_or_else(|| SearchError::NoSession.into())
    }

    /// Print queued notifications to stderr, unless quiet.
    pub fn flush_notifications(&self, dashboard: &mut Dashboard) {
        let notifications = dashboard.take_notifications();
        if !self.quiet {
            for notification in &notifications {
                eprintln!("{}", render_notification(notification));
            }
        }
    }
}

pub fn render_notification(notification: &Notification) -> String {
    let text = notification.to_string();
    match notification.severity() {
        Severity::Success => text.green().to_string(),
        Severity::Info => text.cyan().to_string(),
        Severity::Error => text.red().to_string(),
    }
}

/// One line per record: selection mark, id, attribution, owner, thumbnail.
pub fn print_results(records: &[ImageRecord], selection: &SelectionSet) {
    for (index, record) in records.iter().enumerate() {
        let mark = if selection.contains(&record.id) {
            "[x]".green().bold()
        } else {
            "[ ]".normal()
        };
        println!(
            "{mark} {:>3}. {}  {} {} {}",
            index + 1,
            record.id.bold(),
            record.attribution,
            "by".dimmed(),
            record.owner_name
        );
        println!("         {}", record.thumbnail_url.dimmed());
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    for entry in entries {
        println!(
            "   {}  {}",
            format_time(entry.timestamp).dimmed(),
            entry.term
        );
    }
}

pub fn print_top_searches(terms: &[String]) {
    for (rank, term) in terms.iter().enumerate() {
        println!("   {}. {}", rank + 1, term);
    }
}

/// Format a timestamp as local wall-clock time.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

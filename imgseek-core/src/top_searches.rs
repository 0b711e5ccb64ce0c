//! Global popular terms, fetched once per session.

use tracing::{debug, warn};

use crate::api::SearchApi;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum LoadState {
    #[default]
    NotLoaded,
    Loaded(Vec<String>),
    Failed,
}

/// Read-only ranked term list. A failed load leaves it empty for the rest
/// of the session.
#[derive(Debug, Clone, Default)]
pub struct TopSearchesCache {
    state: LoadState,
}

impl TopSearchesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the list unless a load was already attempted.
    pub async fn load_once(&mut self, api: &dyn SearchApi) {
        if self.state != LoadState::NotLoaded {
            debug!("Top searches already attempted, skipping");
            return;
        }
        self.state = match api.top_searches().await {
            Ok(terms) => {
                debug!(terms = terms.len(), "Top searches loaded");
                LoadState::Loaded(terms)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch top searches");
                LoadState::Failed
            }
        };
    }

    /// Ranked terms; empty when not loaded or failed.
    pub fn terms(&self) -> &[String] {
        match &self.state {
            LoadState::Loaded(terms) => terms,
            LoadState::NotLoaded | LoadState::Failed => &[],
        }
    }
}

//! Mock search API for testing and offline demos.
//!
//! Behaves like the real service closely enough to drive the controller:
//! deterministic pages per `(term, page)`, a per-user history that records
//! every non-`random` term (duplicates included, oldest first), and a top
//! list computed from that history. WARNING: results are synthetic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{ImageRecord, RemoteHistory, ResultPage, SearchApi, SEARCH_GUEST_PATH, SEARCH_PATH};
use crate::controller::INITIAL_TERM;
use crate::error::{Result, SearchError};

/// Records per page when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Length of the top-searches list, matching the service.
const TOP_SEARCHES_LIMIT: usize = 5;

/// Term the service substitutes for guest requests.
const GUEST_FEED_TERM: &str = "random";

/// A call received by the mock, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Search { term: String, page: u32 },
    SearchGuest { page: u32 },
    History,
    ClearHistory,
    TopSearches,
    Logout,
}

#[derive(Default)]
struct MockState {
    calls: Vec<ApiCall>,
    history: RemoteHistory,
}

/// In-process [`SearchApi`] with deterministic results.
pub struct MockSearchApi {
    page_size: usize,
    total_pages: Option<u32>,
    offline: AtomicBool,
    malformed: AtomicBool,
    state: Mutex<MockState>,
}

impl MockSearchApi {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            total_pages: None,
            offline: AtomicBool::new(false),
            malformed: AtomicBool::new(false),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Report `total_pages` on every result page.
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    /// Seed the server-held history.
    pub fn with_history(self, history: RemoteHistory) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.history = history;
        }
        self
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// While set, search endpoints answer with a body of the wrong shape.
    pub fn set_malformed(&self, malformed: bool) {
        self.malformed.store(malformed, Ordering::SeqCst);
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    /// Terms the server has recorded, oldest first.
    pub fn recorded_terms(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.history.terms.clone())
            .unwrap_or_default()
    }

    /// The deterministic page served for `(term, page)`.
    pub fn page_for(&self, term: &str, page: u32) -> ResultPage {
        let slug: String = term
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        let results = (0..self.page_size)
            .map(|i| {
                let id = format!("{slug}-p{page}-{i}");
                ImageRecord {
                    thumbnail_url: format!("https://images.example.com/{id}/small.jpg"),
                    full_url: format!("https://images.example.com/{id}/regular.jpg"),
                    attribution: format!(
                        "{} #{}",
                        term.trim(),
                        (page as usize).saturating_sub(1) * self.page_size + i + 1
                    ),
                    owner_name: format!("Photographer {}", i % 3 + 1),
                    id,
                }
            })
            .collect();
        ResultPage {
            results,
            total_pages: self.total_pages,
        }
    }

    fn enter(&self, call: ApiCall) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SearchError::TransportError("mock state poisoned".into()))?;
        state.calls.push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(SearchError::TransportError("network unreachable".into()));
        }
        Ok(())
    }

    fn check_shape(&self, endpoint: &str) -> Result<()> {
        if self.malformed.load(Ordering::SeqCst) {
            return Err(SearchError::malformed(endpoint, "missing field `results`"));
        }
        Ok(())
    }
}

impl Default for MockSearchApi {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[async_trait]
impl SearchApi for MockSearchApi {
    async fn search(&self, term: &str, page: u32) -> Result<ResultPage> {
        self.enter(ApiCall::Search {
            term: term.to_string(),
            page,
        })?;
        self.check_shape(SEARCH_PATH)?;

        if term != INITIAL_TERM {
            if let Ok(mut state) = self.state.lock() {
                state.history.terms.push(term.to_string());
                state.history.timestamps.push(Utc::now());
            }
        }
        let normalized = term.trim().to_lowercase();
        Ok(self.page_for(&normalized, page.max(1)))
    }

    async fn search_guest(&self, page: u32) -> Result<ResultPage> {
        self.enter(ApiCall::SearchGuest { page })?;
        self.check_shape(SEARCH_GUEST_PATH)?;
        Ok(self.page_for(GUEST_FEED_TERM, page.max(1)))
    }

    async fn history(&self) -> Result<RemoteHistory> {
        self.enter(ApiCall::History)?;
        self.state
            .lock()
            .map(|s| s.history.clone())
            .map_err(|_| SearchError::TransportError("mock state poisoned".into()))
    }

    async fn clear_history(&self) -> Result<()> {
        self.enter(ApiCall::ClearHistory)?;
        if let Ok(mut state) = self.state.lock() {
            state.history = RemoteHistory::default();
        }
        Ok(())
    }

    async fn top_searches(&self) -> Result<Vec<String>> {
        self.enter(ApiCall::TopSearches)?;
        let terms = self.recorded_terms();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for term in &terms {
            *counts.entry(term.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        // Ties broken alphabetically so the order is stable.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        Ok(ranked
            .into_iter()
            .take(TOP_SEARCHES_LIMIT)
            .map(|(term, _)| term.to_string())
            .collect())
    }

    async fn logout(&self) -> Result<()> {
        self.enter(ApiCall::Logout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_deterministic() {
        let api = MockSearchApi::new(3);
        let a = api.page_for("cats", 2);
        let b = api.page_for("cats", 2);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.results[0].id, "cats-p2-0");
        assert_eq!(a.results[0].attribution, "cats #4");
    }

    #[tokio::test]
    async fn test_search_records_history_except_random() {
        let api = MockSearchApi::default();
        api.search("random", 1).await.unwrap();
        api.search("cats", 1).await.unwrap();
        api.search("cats", 2).await.unwrap();

        assert_eq!(api.recorded_terms(), vec!["cats", "cats"]);
        let history = api.history().await.unwrap();
        assert_eq!(history.timestamps.len(), 2);
    }

    #[tokio::test]
    async fn test_top_searches_ranked_by_count() {
        let api = MockSearchApi::default();
        for term in ["dogs", "cats", "cats", "owls", "dogs", "cats"] {
            api.search(term, 1).await.unwrap();
        }
        let top = api.top_searches().await.unwrap();
        assert_eq!(top, vec!["cats", "dogs", "owls"]);
    }

    #[tokio::test]
    async fn test_offline_fails_and_still_logs_call() {
        let api = MockSearchApi::default();
        api.set_offline(true);
        let err = api.search_guest(1).await.unwrap_err();
        assert!(err.is_transport_equivalent());
        assert_eq!(api.calls(), vec![ApiCall::SearchGuest { page: 1 }]);
    }

    #[tokio::test]
    async fn test_clear_history_empties_server_side() {
        let api = MockSearchApi::default();
        api.search("cats", 1).await.unwrap();
        api.clear_history().await.unwrap();
        assert!(api.recorded_terms().is_empty());
    }
}

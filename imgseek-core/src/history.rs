//! Local, deduplicated search history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::SearchApi;

/// Maximum number of entries kept.
pub const MAX_HISTORY: usize = 20;

/// Entries shown in the history view.
pub const HISTORY_VIEW_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub term: String,
    pub timestamp: DateTime<Utc>,
}

/// Most-recent-first list with at most one entry per term.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `term` now.
    pub fn record(&mut self, term: &str) {
        self.record_at(term, Utc::now());
    }

    /// Record `term` at `timestamp`: drop any prior occurrence (exact,
    /// case-sensitive match), insert at the front, truncate.
    pub fn record_at(&mut self, term: &str, timestamp: DateTime<Utc>) {
        self.entries.retain(|e| e.term != term);
        self.entries.insert(
            0,
            HistoryEntry {
                term: term.to_string(),
                timestamp,
            },
        );
        self.entries.truncate(MAX_HISTORY);
    }

    /// Replace the list wholesale with server-held history.
    ///
    /// The server appends every search, so its lists are oldest first and
    /// may repeat a term. Pairs are zipped positionally and replayed in
    /// that order, which leaves the newest occurrence of each term at its
    /// most recent position and the oldest entries cut by the cap.
    pub fn load_from_remote(&mut self, terms: Vec<String>, timestamps: Vec<DateTime<Utc>>) {
        self.entries.clear();
        for (term, timestamp) in terms.into_iter().zip(timestamps) {
            self.record_at(&term, timestamp);
        }
        debug!(entries = self.entries.len(), "History loaded from server");
    }

    /// Empty the local list. Never fails.
    pub fn clear_local(&mut self) {
        self.entries.clear();
    }

    /// Empty the local list immediately and ask the server to do the same.
    ///
    /// The remote request runs in the background; its failure is logged
    /// and never restores the local list. The handle may be dropped.
    pub fn clear(&mut self, api: Arc<dyn SearchApi>) -> JoinHandle<()> {
        self.clear_local();
        tokio::spawn(async move {
            match api.clear_history().await {
                Ok(()) => debug!("Server history cleared"),
                Err(e) => warn!(error = %e, "Failed to clear server history"),
            }
        })
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The first `n` entries, most recent first.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.iter().any(|e| e.term == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSearchApi;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn terms(store: &HistoryStore) -> Vec<&str> {
        store.entries().iter().map(|e| e.term.as_str()).collect()
    }

    #[test]
    fn test_record_inserts_at_front() {
        let mut store = HistoryStore::new();
        store.record_at("cats", at(1));
        store.record_at("dogs", at(2));
        assert_eq!(terms(&store), vec!["dogs", "cats"]);
    }

    #[test]
    fn test_repeat_term_moves_to_front_with_new_timestamp() {
        let mut store = HistoryStore::new();
        store.record_at("dogs", at(1));
        store.record_at("cats", at(2));
        store.record_at("dogs", at(3));

        assert_eq!(terms(&store), vec!["dogs", "cats"]);
        assert_eq!(store.entries()[0].timestamp, at(3));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut store = HistoryStore::new();
        store.record_at("Cats", at(1));
        store.record_at("cats", at(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_capped_at_twenty_and_unique() {
        let mut store = HistoryStore::new();
        for i in 0..45 {
            store.record_at(&format!("term-{}", i % 30), at(i));
        }
        assert_eq!(store.len(), MAX_HISTORY);
        let mut seen = std::collections::HashSet::new();
        assert!(store.entries().iter().all(|e| seen.insert(e.term.clone())));
        assert_eq!(store.entries()[0].term, "term-14");
        assert!(store
            .entries()
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_recent_view() {
        let mut store = HistoryStore::new();
        for i in 0..15 {
            store.record_at(&format!("t{i}"), at(i));
        }
        assert_eq!(store.recent(HISTORY_VIEW_LEN).len(), 10);
        assert_eq!(store.recent(HISTORY_VIEW_LEN)[0].term, "t14");
        assert_eq!(HistoryStore::new().recent(HISTORY_VIEW_LEN).len(), 0);
    }

    #[test]
    fn test_load_from_remote_zips_positionally() {
        let mut store = HistoryStore::new();
        store.record_at("local", at(0));

        store.load_from_remote(
            vec!["cats".into(), "dogs".into(), "cats".into()],
            vec![at(1), at(2), at(3)],
        );

        assert_eq!(terms(&store), vec!["cats", "dogs"]);
        assert_eq!(store.entries()[0].timestamp, at(3));
        assert_eq!(store.entries()[1].timestamp, at(2));
        assert!(!store.contains("local"));
    }

    #[test]
    fn test_load_from_remote_keeps_newest_when_over_cap() {
        // Oldest first, as the server stores it, with repeats.
        let mut remote_terms = Vec::new();
        let mut remote_times = Vec::new();
        for i in 0..25 {
            remote_terms.push(format!("t{i}"));
            remote_times.push(at(i));
        }
        remote_terms.push("t3".into());
        remote_times.push(at(25));

        let mut store = HistoryStore::new();
        store.load_from_remote(remote_terms, remote_times);

        assert_eq!(store.len(), MAX_HISTORY);
        assert_eq!(store.entries()[0].term, "t3");
        assert_eq!(store.entries()[0].timestamp, at(25));
        assert_eq!(store.entries()[1].term, "t24");
        assert!(store.contains("t24"));
        assert!(!store.contains("t5"));
        assert_eq!(store.entries().iter().filter(|e| e.term == "t3").count(), 1);
        assert!(store
            .entries()
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_clear_is_optimistic_when_offline() {
        let api = Arc::new(MockSearchApi::default());
        api.set_offline(true);

        let mut store = HistoryStore::new();
        store.record_at("cats", at(1));

        let handle = store.clear(api.clone());
        assert!(store.is_empty(), "Local list must be empty immediately");

        handle.await.unwrap();
        assert!(store.is_empty(), "Remote failure must not restore entries");
    }
}

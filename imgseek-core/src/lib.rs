//! imgseek Core - search session controller for the imgseek image search service
//!
//! This crate holds the client-side state of an image search session: who
//! the user is, what is being searched, which page has been reached, the
//! images on screen, the user's selection and their search history.
//!
//! # Features
//!
//! - Guest vs. authenticated routing, derived once from the persisted identity
//! - Generation-stamped fetches: stale responses are discarded, never applied
//! - Failed fetches leave query state and results untouched
//! - Deduplicated, bounded history with optimistic clearing
//! - Pluggable session store and REST client (HTTP or deterministic mock)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use imgseek_core::{Dashboard, MemorySessionStore, MockSearchApi, SessionModeResolver};
//!
//! # async fn example() -> imgseek_core::Result<()> {
//! let store = Arc::new(MemorySessionStore::new());
//! SessionModeResolver::new(store.clone()).sign_in_guest()?;
//!
//! let api = Arc::new(MockSearchApi::default());
//! let mut dashboard = Dashboard::open(store, api, None)
//!     .await?
//!     .expect("guest session");
//!
//! dashboard.next_page().await;
//! assert_eq!(dashboard.results().len(), 20);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod notification;
pub mod results;
pub mod selection;
pub mod session;
pub mod top_searches;

// Re-export main types for convenience
pub use api::{
    ApiCall, AuthProvider, ImageRecord, MockSearchApi, RemoteHistory, ResultPage, SearchApi,
};
pub use config::ClientConfig;
pub use controller::{
    FetchKind, FetchOutcome, FetchRequest, FetchTicket, SearchQueryController, SearchState,
    INITIAL_TERM,
};
pub use dashboard::Dashboard;
pub use error::{Result, SearchError};
pub use history::{HistoryEntry, HistoryStore, HISTORY_VIEW_LEN, MAX_HISTORY};
pub use notification::{Notification, Severity};
pub use results::ResultAccumulator;
pub use selection::SelectionSet;
pub use session::{
    is_guest_unlock, FileSessionStore, Identity, IdentityHandoff, MemorySessionStore, Session,
    SessionMode, SessionModeResolver, SessionStore, GUEST_EMAIL, GUEST_UNLOCK_MESSAGE,
};
pub use top_searches::TopSearchesCache;

// Network-dependent exports
#[cfg(feature = "network")]
pub use api::HttpSearchApi;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Full session: handoff, searches, pagination, history, sign-out.
    #[tokio::test]
    async fn test_full_session_workflow() {
        let store = Arc::new(MemorySessionStore::new());
        let api = Arc::new(MockSearchApi::default());

        let address = url::Url::parse(
            "http://localhost:5173/?email=ada%40example.com&name=Ada&profilePic=",
        )
        .unwrap();
        let (handoff, cleaned) = IdentityHandoff::from_url(&address).unwrap();
        assert_eq!(cleaned.as_str(), "http://localhost:5173/");

        let mut dashboard = Dashboard::open(store.clone(), api.clone(), Some(handoff))
            .await
            .unwrap()
            .expect("handoff establishes a session");
        assert_eq!(dashboard.session().mode, SessionMode::Authenticated);

        dashboard.search("cats").await;
        dashboard.next_page().await;
        dashboard.search("dogs").await;
        dashboard.search("cats").await;

        let terms: Vec<&str> = dashboard
            .history()
            .entries()
            .iter()
            .map(|e| e.term.as_str())
            .collect();
        assert_eq!(terms, vec!["cats", "dogs"]);
        assert_eq!(dashboard.controller().page(), 1);
        assert_eq!(dashboard.results().len(), 10);

        assert!(dashboard.sign_out().await.unwrap());

        // The persisted identity is gone, so the next visit has no session.
        let reopened = Dashboard::open(store, api, None).await.unwrap();
        assert!(reopened.is_none());
    }
}

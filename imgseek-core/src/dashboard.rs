//! Session bootstrap and the async façade over the search controller.
//!
//! `Dashboard::open` mirrors what happens when the search page loads:
//! resolve the session, load the initial feed, fetch the top searches and,
//! for authenticated users, the server-held history. After that every user
//! action is one method call.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::SearchApi;
use crate::controller::{FetchOutcome, SearchQueryController};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::notification::Notification;
use crate::results::ResultAccumulator;
use crate::selection::SelectionSet;
use crate::session::{IdentityHandoff, Session, SessionModeResolver, SessionStore};
use crate::top_searches::TopSearchesCache;

pub struct Dashboard {
    api: Arc<dyn SearchApi>,
    resolver: SessionModeResolver,
    session: Session,
    controller: SearchQueryController,
    selection: SelectionSet,
    top_searches: TopSearchesCache,
}

impl Dashboard {
    /// Resolve the session and run the start-up loads.
    ///
    /// Returns `Ok(None)` when there is no session; the caller should send
    /// the user to sign in. Background load failures are logged only.
    pub async fn open(
        store: Arc<dyn SessionStore>,
        api: Arc<dyn SearchApi>,
        handoff: Option<IdentityHandoff>,
    ) -> Result<Option<Self>> {
        let resolver = SessionModeResolver::new(store);
        let Some(session) = resolver.resolve(handoff)? else {
            return Ok(None);
        };
        info!(mode = %session.mode, "Opening dashboard");

        let mut dashboard = Self {
            controller: SearchQueryController::new(session.mode),
            api,
            resolver,
            session,
            selection: SelectionSet::new(),
            top_searches: TopSearchesCache::new(),
        };

        let initial = dashboard.controller.start();
        dashboard.controller.run(initial, dashboard.api.as_ref()).await;
        dashboard.top_searches.load_once(dashboard.api.as_ref()).await;
        if dashboard.session.mode.is_authenticated() {
            dashboard.load_remote_history().await;
        }

        Ok(Some(dashboard))
    }

    async fn load_remote_history(&mut self) {
        match self.api.history().await {
            Ok(remote) => self.controller.load_history(remote),
            Err(e) => warn!(error = %e, "Failed to fetch search history"),
        }
    }

    /// New search for `term`; `None` when the term is blank.
    pub async fn search(&mut self, term: &str) -> Option<FetchOutcome> {
        let ticket = self.controller.submit_new_search(term)?;
        Some(self.controller.run(ticket, self.api.as_ref()).await)
    }

    /// New search for the edited query text.
    pub async fn submit_query(&mut self) -> Option<FetchOutcome> {
        let ticket = self.controller.submit_query()?;
        Some(self.controller.run(ticket, self.api.as_ref()).await)
    }

    /// Next page of the committed term; `None` before anything committed.
    pub async fn next_page(&mut self) -> Option<FetchOutcome> {
        let ticket = self.controller.continue_pagination()?;
        Some(self.controller.run(ticket, self.api.as_ref()).await)
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Optimistically clear history; the server request runs detached.
    /// Guests keep no history, so nothing is sent for them.
    pub fn clear_history(&mut self) -> Option<JoinHandle<()>> {
        if !self.session.mode.is_authenticated() {
            debug!("Guest session, no history to clear");
            return None;
        }
        let api = Arc::clone(&self.api);
        Some(self.controller.history_mut().clear(api))
    }

    /// End the server session, then forget the local identity.
    ///
    /// Returns `Ok(false)` when the server refused; the session is kept and
    /// a failure notification is queued.
    pub async fn sign_out(&mut self) -> Result<bool> {
        match self.api.logout().await {
            Ok(()) => {
                self.resolver.sign_out()?;
                self.controller.notify(Notification::SignedOut);
                info!("Signed out");
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.controller.notify(Notification::LogoutFailed);
                Ok(false)
            }
        }
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.controller.take_notifications()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn controller(&self) -> &SearchQueryController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SearchQueryController {
        &mut self.controller
    }

    pub fn results(&self) -> &ResultAccumulator {
        self.controller.results()
    }

    pub fn history(&self) -> &HistoryStore {
        self.controller.history()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn top_searches(&self) -> &[String] {
        self.top_searches.terms()
    }
}

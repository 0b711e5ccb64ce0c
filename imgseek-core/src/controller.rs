//! Search session controller.
//!
//! The controller owns the editable query text, the committed term, the
//! page cursor, the displayed results and the local history. It has two
//! triggers, `submit_new_search` and `continue_pagination`, plus the
//! one-off `start` that loads the initial feed.
//!
//! ## Issue / complete
//!
//! A trigger does not fetch. It returns a [`FetchTicket`] describing the
//! request and stamped with a generation number; the caller performs the
//! request (see [`FetchTicket::fetch`]) and hands the result back to
//! [`SearchQueryController::complete`]. Every trigger bumps the generation,
//! so a completion whose ticket is older than the latest trigger is
//! discarded. This is what keeps a slow page-2 response from landing on
//! top of a newer search.
//!
//! The target term, page and replace/append choice travel inside the
//! ticket and are applied together on success only, so a failed fetch
//! leaves `committed_term`, `page` and the results exactly as they were.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::api::{RemoteHistory, ResultPage, SearchApi};
use crate::error::{Result, SearchError};
use crate::history::HistoryStore;
use crate::notification::Notification;
use crate::results::ResultAccumulator;
use crate::session::SessionMode;

/// Term of the feed loaded before the user has typed anything.
pub const INITIAL_TERM: &str = "random";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// The feed loaded at session start.
    Initial,
    NewSearch,
    Continuation,
}

impl FetchKind {
    /// Whether a successful completion replaces rather than appends.
    pub fn replaces(self) -> bool {
        !matches!(self, Self::Continuation)
    }
}

/// The request a ticket stands for. Guests never carry a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Search { term: String, page: u32 },
    Discovery { page: u32 },
}

/// A pending transition. Consumed by [`SearchQueryController::complete`].
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
    term: String,
    page: u32,
    request: FetchRequest,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Perform the request this ticket describes.
    pub async fn fetch(&self, api: &dyn SearchApi) -> Result<ResultPage> {
        match &self.request {
            FetchRequest::Search { term, page } => api.search(term, *page).await,
            FetchRequest::Discovery { page } => api.search_guest(*page).await,
        }
    }
}

/// What `complete` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The transition was applied; `received` records arrived.
    Applied { kind: FetchKind, received: usize },
    /// The fetch failed; nothing changed.
    Failed,
    /// A newer trigger superseded this ticket; the response was dropped.
    Stale,
}

/// Snapshot of the query state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub query_text: String,
    pub committed_term: Option<String>,
    pub page: u32,
    pub is_new_search: bool,
}

pub struct SearchQueryController {
    mode: SessionMode,
    query_text: String,
    committed_term: Option<String>,
    page: u32,
    is_new_search: bool,
    total_pages: Option<u32>,
    generation: u64,
    in_flight: Option<u64>,
    results: ResultAccumulator,
    history: HistoryStore,
    notifications: VecDeque<Notification>,
}

impl SearchQueryController {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            query_text: String::new(),
            committed_term: None,
            page: 1,
            is_new_search: true,
            total_pages: None,
            generation: 0,
            in_flight: None,
            results: ResultAccumulator::new(),
            history: HistoryStore::new(),
            notifications: VecDeque::new(),
        }
    }

    /// Issue the initial feed load. Not recorded in history, not announced.
    pub fn start(&mut self) -> FetchTicket {
        self.is_new_search = true;
        self.issue(FetchKind::Initial, INITIAL_TERM.to_string(), 1)
    }

    /// Edit the query text without searching.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
    }

    /// Start a new search for `term` at page 1.
    ///
    /// Blank terms are ignored. In authenticated mode the term is recorded
    /// in the local history right away, whatever the fetch outcome.
    pub fn submit_new_search(&mut self, term: &str) -> Option<FetchTicket> {
        if term.trim().is_empty() {
            debug!("Ignoring blank search");
            return None;
        }
        self.query_text = term.to_string();
        self.is_new_search = true;

        if self.mode.is_authenticated() {
            self.history.record(term);
        }
        self.announce(term);
        Some(self.issue(FetchKind::NewSearch, term.to_string(), 1))
    }

    /// Submit the current query text as a new search.
    pub fn submit_query(&mut self) -> Option<FetchTicket> {
        let term = self.query_text.clone();
        self.submit_new_search(&term)
    }

    /// Fetch the page after the current one for the committed term.
    /// Ignored until a search has committed.
    pub fn continue_pagination(&mut self) -> Option<FetchTicket> {
        let Some(term) = self.committed_term.clone() else {
            debug!("Nothing to paginate");
            return None;
        };
        self.is_new_search = false;
        self.announce(&term);
        let next = self.page + 1;
        Some(self.issue(FetchKind::Continuation, term, next))
    }

    /// Apply or discard the outcome of a ticket's fetch.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<ResultPage>) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "Discarding stale response"
            );
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.fail(&ticket, &e);
                return FetchOutcome::Failed;
            }
        };

        let received = page.len();
        self.total_pages = page.total_pages;
        if ticket.kind.replaces() {
            self.results.replace(page);
        } else {
            self.results.append(page);
        }
        self.committed_term = Some(ticket.term);
        self.page = ticket.page;

        info!(
            kind = ?ticket.kind,
            page = self.page,
            received,
            total = self.results.len(),
            "Search results applied"
        );
        FetchOutcome::Applied {
            kind: ticket.kind,
            received,
        }
    }

    /// Issue, fetch and complete in one step.
    pub async fn run(&mut self, ticket: FetchTicket, api: &dyn SearchApi) -> FetchOutcome {
        let result = ticket.fetch(api).await;
        self.complete(ticket, result)
    }

    /// Replace the local history with the server's copy.
    pub fn load_history(&mut self, remote: RemoteHistory) {
        self.history.load_from_remote(remote.terms, remote.timestamps);
    }

    /// Queue a notification raised outside the search flow.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Drain pending notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub fn state(&self) -> SearchState {
        SearchState {
            query_text: self.query_text.clone(),
            committed_term: self.committed_term.clone(),
            page: self.page,
            is_new_search: self.is_new_search,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn committed_term(&self) -> Option<&str> {
        self.committed_term.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the latest ticket is still awaiting completion.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether another page is worth requesting.
    pub fn has_more(&self) -> bool {
        match self.total_pages {
            Some(total) => self.page < total,
            None => !self.results.is_empty(),
        }
    }

    pub fn results(&self) -> &ResultAccumulator {
        &self.results
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    fn issue(&mut self, kind: FetchKind, term: String, page: u32) -> FetchTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);

        let request = match self.mode {
            SessionMode::Authenticated => FetchRequest::Search {
                term: term.clone(),
                page,
            },
            SessionMode::Guest => FetchRequest::Discovery { page },
        };
        debug!(generation = self.generation, ?kind, ?request, "Fetch issued");

        FetchTicket {
            generation: self.generation,
            kind,
            term,
            page,
            request,
        }
    }

    /// Guests fetch the discovery feed whatever they typed, so only
    /// authenticated searches are announced by term.
    fn announce(&mut self, term: &str) {
        if self.mode.is_authenticated() && term != INITIAL_TERM {
            self.notifications.push_back(Notification::Searching {
                term: term.to_string(),
            });
        }
    }

    fn fail(&mut self, ticket: &FetchTicket, err: &SearchError) {
        warn!(
            kind = ?ticket.kind,
            page = ticket.page,
            error = %err,
            transport = err.is_transport_equivalent(),
            "Search failed"
        );
        let notification = match ticket.kind {
            FetchKind::Initial => Notification::InitialLoadFailed,
            FetchKind::NewSearch | FetchKind::Continuation => Notification::SearchFailed,
        };
        self.notifications.push_back(notification);
    }
}

//! Session identity and mode resolution.
//!
//! A session is either **Authenticated** (an external identity provider
//! vouched for the user) or **Guest** (the reserved placeholder identity).
//! The mode is derived once, here, and passed explicitly to the search
//! controller; nothing else re-reads the persisted flags.
//!
//! ## Sources of identity
//!
//! 1. An [`IdentityHandoff`] carried as address parameters exactly once after
//!    an external login redirect. It is persisted and stripped from the
//!    visible address so it cannot be replayed.
//! 2. A previously persisted identity record in the [`SessionStore`].
//!
//! With neither, [`SessionModeResolver::resolve`] returns `None` and the
//! caller sends the user to the sign-in surface.

mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore, LOGGED_IN_KEY, USER_KEY};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Result;

/// Reserved email of the guest placeholder identity.
pub const GUEST_EMAIL: &str = "guest@example.com";

/// Display name stored with the guest placeholder identity.
pub const GUEST_NAME: &str = "Guest User";

/// Avatar shown when an identity carries none.
pub const DEFAULT_AVATAR_URL: &str = "https://github.com/shadcn.png";

/// Message the embedded guest frame posts when the guest gate is passed.
pub const GUEST_UNLOCK_MESSAGE: &str = "Guest Unlocked";

/// Address parameters that make up an identity handoff.
const HANDOFF_PARAMS: [&str; 3] = ["email", "name", "profilePic"];

/// Persisted identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
    /// Avatar reference, if the identity provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Identity {
    /// The guest placeholder identity.
    pub fn guest() -> Self {
        Self {
            email: GUEST_EMAIL.to_string(),
            name: GUEST_NAME.to_string(),
            image: None,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.email == GUEST_EMAIL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Guest,
    Authenticated,
}

impl SessionMode {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// A resolved session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: SessionMode,
    pub identity: Identity,
}

impl Session {
    /// Name shown to the user; guests are always shown as "Guest".
    pub fn display_name(&self) -> &str {
        match self.mode {
            SessionMode::Guest => "Guest",
            SessionMode::Authenticated => &self.identity.name,
        }
    }

    pub fn avatar_url(&self) -> &str {
        self.identity
            .image
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_AVATAR_URL)
    }
}

/// One-time identity delivery through address parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityHandoff {
    pub email: String,
    pub name: String,
    pub profile_pic: Option<String>,
}

impl IdentityHandoff {
    /// Extract a handoff from an address.
    ///
    /// Returns the handoff together with the address stripped of the
    /// `email`, `name` and `profilePic` parameters. Both `email` and `name`
    /// must be present and non-empty, otherwise there is no handoff.
    pub fn from_url(address: &Url) -> Option<(Self, Url)> {
        let mut email = None;
        let mut name = None;
        let mut profile_pic = None;
        for (key, value) in address.query_pairs() {
            match key.as_ref() {
                "email" => email = Some(value.into_owned()),
                "name" => name = Some(value.into_owned()),
                "profilePic" => profile_pic = Some(value.into_owned()),
                _ => {}
            }
        }

        let email = email.filter(|e| !e.is_empty())?;
        let name = name.filter(|n| !n.is_empty())?;
        let handoff = Self {
            email,
            name,
            profile_pic: profile_pic.filter(|p| !p.is_empty()),
        };

        Some((handoff, strip_handoff(address)))
    }

    pub fn into_identity(self) -> Identity {
        Identity {
            email: self.email,
            name: self.name,
            image: self.profile_pic,
        }
    }
}

fn strip_handoff(address: &Url) -> Url {
    let kept: Vec<(String, String)> = address
        .query_pairs()
        .filter(|(k, _)| !HANDOFF_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut cleaned = address.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}

/// Whether a message from the embedded guest frame unlocks guest access.
pub fn is_guest_unlock(message: &str) -> bool {
    message == GUEST_UNLOCK_MESSAGE
}

/// Derives the session mode from the persisted store and any handoff.
pub struct SessionModeResolver {
    store: Arc<dyn SessionStore>,
}

impl SessionModeResolver {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Resolve the current session, writing back the identity record and
    /// the login flag. `Ok(None)` means "no session", a normal state.
    pub fn resolve(&self, handoff: Option<IdentityHandoff>) -> Result<Option<Session>> {
        let identity = match handoff {
            Some(handoff) => {
                let identity = handoff.into_identity();
                self.store
                    .set(USER_KEY, &serde_json::to_string(&identity)?)?;
                info!(email = %identity.email, "Identity handoff consumed");
                identity
            }
            None => match self.stored_identity()? {
                Some(identity) => identity,
                None => {
                    debug!("No persisted identity");
                    return Ok(None);
                }
            },
        };

        let mode = if identity.is_guest() {
            SessionMode::Guest
        } else {
            SessionMode::Authenticated
        };
        self.store
            .set(LOGGED_IN_KEY, if mode.is_authenticated() { "true" } else { "false" })?;

        debug!(mode = %mode, "Session resolved");
        Ok(Some(Session { mode, identity }))
    }

    /// Persist the guest placeholder identity. The login flag is left for
    /// the next `resolve` to derive.
    pub fn sign_in_guest(&self) -> Result<Identity> {
        let identity = Identity::guest();
        self.store
            .set(USER_KEY, &serde_json::to_string(&identity)?)?;
        info!("Signed in as guest");
        Ok(identity)
    }

    /// Sign in as a guest only when the embedded guest frame sent the
    /// unlock message. Any other message leaves the store untouched.
    pub fn unlock_guest(&self, message: &str) -> Result<Option<Identity>> {
        if !is_guest_unlock(message) {
            debug!("Guest unlock message rejected");
            return Ok(None);
        }
        self.sign_in_guest().map(Some)
    }

    /// Forget the local identity after the server session has ended.
    pub fn sign_out(&self) -> Result<()> {
        self.store.remove(USER_KEY)?;
        self.store.set(LOGGED_IN_KEY, "false")?;
        Ok(())
    }

    fn stored_identity(&self) -> Result<Option<Identity>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                warn!(error = %e, "Persisted identity is unreadable, treating as signed out");
                Ok(None)
            }
        }
    }
}

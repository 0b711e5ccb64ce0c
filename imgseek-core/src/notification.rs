//! One-shot user-visible notifications.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A transient message for the user. Each is emitted at most once per
/// user-initiated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Searching { term: String },
    SearchFailed,
    InitialLoadFailed,
    SignedOut,
    LogoutFailed,
    GuestWelcome,
}

impl Notification {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Searching { .. } => Severity::Info,
            Self::SignedOut | Self::GuestWelcome => Severity::Success,
            Self::SearchFailed | Self::InitialLoadFailed | Self::LogoutFailed => Severity::Error,
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searching { term } => write!(f, "Searching for \"{term}\"..."),
            Self::SearchFailed => write!(f, "Search failed. Please try again."),
            Self::InitialLoadFailed => write!(f, "Failed to load initial images."),
            Self::SignedOut => write!(f, "You have been signed out."),
            Self::LogoutFailed => write!(f, "Logout failed. Please try again."),
            Self::GuestWelcome => write!(f, "Welcome! You're now signed in as a Guest."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let n = Notification::Searching {
            term: "cats".into(),
        };
        assert_eq!(n.to_string(), "Searching for \"cats\"...");
        assert_eq!(n.severity(), Severity::Info);
        assert_eq!(Notification::GuestWelcome.severity(), Severity::Success);
        assert_eq!(Notification::SearchFailed.severity(), Severity::Error);
        assert_eq!(
            Notification::InitialLoadFailed.to_string(),
            "Failed to load initial images."
        );
    }
}

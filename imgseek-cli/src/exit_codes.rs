//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts to tell "sign in first" apart from "server down".

use imgseek_core::SearchError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments, bad URL).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Service unavailable (network failure, non-success response).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// I/O error (cannot read or write the session store).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// No session: sign in first.
/// Maps to EX_NOPERM from sysexits.h.
pub const NOT_AUTHENTICATED: i32 = 77;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<SearchError>())
            .map(code_for_search_error)
            .unwrap_or_else(|| classify_message(&message));

        Self {
            code,
            message: Some(message),
        }
    }
}

fn code_for_search_error(err: &SearchError) -> i32 {
    match err {
        SearchError::NoSession => NOT_AUTHENTICATED,
        SearchError::StoreError(_) => IO_ERROR,
        SearchError::InvalidConfig(_) => USAGE_ERROR,
        SearchError::SerializationError(_) => GENERAL_ERROR,
        e if e.is_transport_equivalent() => NETWORK_ERROR,
        _ => GENERAL_ERROR,
    }
}

/// Classify errors raised by the CLI itself from their message.
fn classify_message(message: &str) -> i32 {
    if message.contains("Not signed in") {
        NOT_AUTHENTICATED
    } else if message.contains("Invalid configuration")
        || message.contains("No identity handoff")
        || message.contains("must not be blank")
        || message.contains("Guest gate")
    {
        USAGE_ERROR
    } else if message.contains("failed") {
        NETWORK_ERROR
    } else {
        GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context as _};

    #[test]
    fn test_classification() {
        assert_eq!(
            ExitCode::from_anyhow(&anyhow!("Not signed in: run `imgseek guest`")).code,
            NOT_AUTHENTICATED
        );
        assert_eq!(
            ExitCode::from_anyhow(&anyhow!("Search failed. Please try again.")).code,
            NETWORK_ERROR
        );
        assert_eq!(
            ExitCode::from_anyhow(&anyhow!("No identity handoff in address")).code,
            USAGE_ERROR
        );
        assert_eq!(ExitCode::from_anyhow(&anyhow!("boom")).code, GENERAL_ERROR);
        assert_eq!(ExitCode::success().code, SUCCESS);
    }

    #[test]
    fn test_search_errors_classified_by_variant() {
        let no_session = anyhow::Error::new(SearchError::NoSession);
        assert_eq!(ExitCode::from_anyhow(&no_session).code, NOT_AUTHENTICATED);

        let store = Err::<(), _>(SearchError::StoreError("Failed to write".into()))
            .context("Failed to open session")
            .unwrap_err();
        assert_eq!(ExitCode::from_anyhow(&store).code, IO_ERROR);

        let status = anyhow::Error::new(SearchError::StatusError {
            endpoint: "/api/logout".into(),
            status: 401,
        });
        assert_eq!(ExitCode::from_anyhow(&status).code, NETWORK_ERROR);

        let config = anyhow::Error::new(SearchError::InvalidConfig("bad URL".into()));
        assert_eq!(ExitCode::from_anyhow(&config).code, USAGE_ERROR);
    }
}

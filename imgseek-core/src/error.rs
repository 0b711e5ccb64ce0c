use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request error: {0}")]
    #[cfg(feature = "network")]
    HttpError(#[from] reqwest::Error),

    #[error("{endpoint} returned status: {status}")]
    StatusError { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Session store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not signed in: sign in or continue as a guest")]
    NoSession,

    /// Transport failure raised outside of reqwest, e.g. by an offline mock.
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl SearchError {
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Whether the controller treats this error like a failed fetch.
    ///
    /// Shape mismatches count as transport failures so that a bad body never
    /// leaks half-applied state.
    pub fn is_transport_equivalent(&self) -> bool {
        match self {
            #[cfg(feature = "network")]
            Self::HttpError(_) => true,
            Self::StatusError { .. } | Self::MalformedResponse { .. } | Self::TransportError(_) => {
                true
            }
            Self::StoreError(_)
            | Self::SerializationError(_)
            | Self::InvalidConfig(_)
            | Self::NoSession => false,
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(SearchError::StatusError {
            endpoint: "/api/search".into(),
            status: 500
        }
        .is_transport_equivalent());
        assert!(SearchError::malformed("/api/history", "unequal arrays").is_transport_equivalent());
        assert!(!SearchError::NoSession.is_transport_equivalent());
        assert!(!SearchError::StoreError("disk full".into()).is_transport_equivalent());
    }

    #[test]
    fn test_status_error_message() {
        let err = SearchError::StatusError {
            endpoint: "/api/top-searches".into(),
            status: 401,
        };
        assert_eq!(err.to_string(), "/api/top-searches returned status: 401");
    }
}

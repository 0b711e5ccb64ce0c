//! Client configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::api::AuthProvider;
use crate::error::{Result, SearchError};

/// Default REST base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default front-end address the identity handoff returns to.
pub const DEFAULT_APP_URL: &str = "http://localhost:5173";

/// Client configuration loaded from environment variables
#[derive(Clone)]
pub struct ClientConfig {
    /// REST base URL (default: http://localhost:8080)
    pub api_url: Url,
    /// Front-end address (default: http://localhost:5173)
    pub app_url: Url,
    /// Per-request timeout (default: 30s)
    pub timeout: Duration,
    /// Session cookie sent with every request, if the session was established elsewhere
    pub session_cookie: Option<String>,
    /// Path of the persisted key-value store
    pub store_path: PathBuf,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("app_url", &self.app_url.as_str())
            .field("timeout", &self.timeout)
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[REDACTED]"),
            )
            .field("store_path", &self.store_path)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            app_url: Url::parse(DEFAULT_APP_URL).expect("default app URL is valid"),
            timeout: Duration::from_secs(30),
            session_cookie: None,
            store_path: default_store_path(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_url = match std::env::var("IMGSEEK_API_URL") {
            Ok(raw) => parse_url(&raw)?,
            Err(_) => defaults.api_url,
        };

        let app_url = match std::env::var("IMGSEEK_APP_URL") {
            Ok(raw) => parse_url(&raw)?,
            Err(_) => defaults.app_url,
        };

        let timeout = std::env::var("IMGSEEK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let session_cookie = std::env::var("IMGSEEK_SESSION_COOKIE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let store_path = std::env::var("IMGSEEK_STORE")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        Ok(Self {
            api_url,
            app_url,
            timeout,
            session_cookie,
            store_path,
        })
    }

    /// Override the REST base URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self> {
        self.api_url = parse_url(raw)?;
        Ok(self)
    }

    /// Append an API path (e.g. `/api/search`) to the base URL, keeping any
    /// path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::InvalidConfig(format!("Cannot append {path} to {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Address that starts sign-in with `provider`.
    pub fn auth_url(&self, provider: AuthProvider) -> Result<Url> {
        self.endpoint(&provider.auth_path())
    }
}

/// Parse and validate an http(s) base URL.
pub fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| SearchError::InvalidConfig(format!("Invalid URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SearchError::InvalidConfig(format!(
            "Unsupported URL scheme: {other}"
        ))),
    }
}

fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("imgseek")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.app_url.as_str(), "http://localhost:5173/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.session_cookie.is_none());
        assert!(config.store_path.ends_with("imgseek/session.json"));
    }

    #[test]
    fn test_endpoint_join() {
        let config = ClientConfig::default();
        let url = config.endpoint("/api/history/clear").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/history/clear");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        for base in ["https://example.com/imgseek", "https://example.com/imgseek/"] {
            let config = ClientConfig::default().with_api_url(base).unwrap();
            assert_eq!(
                config.endpoint("/api/search").unwrap().as_str(),
                "https://example.com/imgseek/api/search"
            );
        }
    }

    #[test]
    fn test_auth_url() {
        let config = ClientConfig::default()
            .with_api_url("https://images.example.com")
            .unwrap();
        let url = config.auth_url(AuthProvider::Facebook).unwrap();
        assert_eq!(url.as_str(), "https://images.example.com/api/auth/facebook");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            parse_url("ftp://example.com"),
            Err(SearchError::InvalidConfig(_))
        ));
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_with_api_url_override() {
        let config = ClientConfig::default()
            .with_api_url("https://images.example.com")
            .unwrap();
        assert_eq!(config.api_url.host_str(), Some("images.example.com"));
    }

    #[test]
    fn test_debug_redacts_cookie() {
        let config = ClientConfig {
            session_cookie: Some("session_id=secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

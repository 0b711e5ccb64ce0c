//! REST interface to the image search service.
//!
//! Every call carries the session credentials; the server decides what a
//! guest may see. Implementations:
//!
//! - [`HttpSearchApi`] - reqwest client against the real service
//! - [`MockSearchApi`] - deterministic in-process stand-in for tests and demos
//!
//! ## Endpoints
//!
//! | Call | Purpose |
//! |---|---|
//! | `GET /api/search?term=&page=` | authenticated paginated search |
//! | `GET /api/search-guest?page=` | guest discovery feed |
//! | `GET /api/history` | the user's search history |
//! | `POST /api/history/clear` | clear the user's history |
//! | `GET /api/top-searches` | global popular terms |
//! | `GET /api/logout` | end the server session |
//! | `GET /api/auth/{provider}` | begin an external identity flow |

#[cfg(feature = "network")]
mod http_client;
mod mock;

#[cfg(feature = "network")]
pub use http_client::HttpSearchApi;
pub use mock::{ApiCall, MockSearchApi};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

pub const SEARCH_PATH: &str = "/api/search";
pub const SEARCH_GUEST_PATH: &str = "/api/search-guest";
pub const HISTORY_PATH: &str = "/api/history";
pub const HISTORY_CLEAR_PATH: &str = "/api/history/clear";
pub const TOP_SEARCHES_PATH: &str = "/api/top-searches";
pub const LOGOUT_PATH: &str = "/api/logout";

/// Client side of the image search service.
///
/// Implementations must be thread-safe (`Send + Sync`) so a single client
/// can serve the controller and fire-and-forget background requests.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Personalised search for `term`, 1-based `page`.
    async fn search(&self, term: &str, page: u32) -> Result<ResultPage>;

    /// Server-chosen discovery feed for guests. Takes no term.
    async fn search_guest(&self, page: u32) -> Result<ResultPage>;

    async fn history(&self) -> Result<RemoteHistory>;

    async fn clear_history(&self) -> Result<()>;

    async fn top_searches(&self) -> Result<Vec<String>>;

    async fn logout(&self) -> Result<()>;
}

/// One image as displayed in the result grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawImage", into = "RawImage")]
pub struct ImageRecord {
    /// Unique within a page, not across pages.
    pub id: String,
    pub thumbnail_url: String,
    pub full_url: String,
    /// Alt/attribution text, "Image" when the upstream has none.
    pub attribution: String,
    pub owner_name: String,
}

/// Wire shape of an image, as relayed from the upstream photo provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawImage {
    id: String,
    urls: RawUrls,
    #[serde(default)]
    alt_description: Option<String>,
    user: RawUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawUrls {
    small: String,
    regular: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawUser {
    name: String,
}

impl From<RawImage> for ImageRecord {
    fn from(raw: RawImage) -> Self {
        Self {
            id: raw.id,
            thumbnail_url: raw.urls.small,
            full_url: raw.urls.regular,
            attribution: raw
                .alt_description
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Image".to_string()),
            owner_name: raw.user.name,
        }
    }
}

impl From<ImageRecord> for RawImage {
    fn from(record: ImageRecord) -> Self {
        Self {
            id: record.id,
            urls: RawUrls {
                small: record.thumbnail_url,
                regular: record.full_url,
            },
            alt_description: Some(record.attribution),
            user: RawUser {
                name: record.owner_name,
            },
        }
    }
}

/// One page of search results in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub results: Vec<ImageRecord>,
    /// Total pages reported by the server, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl ResultPage {
    pub fn new(results: Vec<ImageRecord>) -> Self {
        Self {
            results,
            total_pages: None,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Server-held history as two parallel sequences of equal length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteHistory {
    pub terms: Vec<String>,
    pub timestamps: Vec<DateTime<Utc>>,
}

/// Wire shape of `GET /api/history`. Absent lists arrive as `null`.
#[derive(Debug, Deserialize)]
struct HistoryPayload {
    #[serde(default)]
    terms: Option<Vec<String>>,
    #[serde(default)]
    time_stamp: Option<Vec<DateTime<Utc>>>,
}

impl RemoteHistory {
    pub fn new(terms: Vec<String>, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if terms.len() != timestamps.len() {
            return Err(SearchError::malformed(
                HISTORY_PATH,
                format!(
                    "{} terms but {} timestamps",
                    terms.len(),
                    timestamps.len()
                ),
            ));
        }
        Ok(Self { terms, timestamps })
    }

    /// Decode and validate a `GET /api/history` body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let payload: HistoryPayload = serde_json::from_slice(body)
            .map_err(|e| SearchError::malformed(HISTORY_PATH, e.to_string()))?;
        Self::new(
            payload.terms.unwrap_or_default(),
            payload.time_stamp.unwrap_or_default(),
        )
    }
}

/// Decode and validate a search response body.
pub fn parse_result_page(endpoint: &str, body: &[u8]) -> Result<ResultPage> {
    serde_json::from_slice(body).map_err(|e| SearchError::malformed(endpoint, e.to_string()))
}

/// Decode a `GET /api/top-searches` body; `null` is an empty list.
pub fn parse_top_searches(body: &[u8]) -> Result<Vec<String>> {
    let terms: Option<Vec<String>> = serde_json::from_slice(body)
        .map_err(|e| SearchError::malformed(TOP_SEARCHES_PATH, e.to_string()))?;
    Ok(terms.unwrap_or_default())
}

/// External identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProvider {
    Google,
    Github,
    Facebook,
}

impl AuthProvider {
    pub const ALL: [AuthProvider; 3] = [Self::Google, Self::Github, Self::Facebook];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
            Self::Facebook => "facebook",
        }
    }

    /// Path that starts the external identity flow.
    pub fn auth_path(self) -> String {
        format!("/api/auth/{}", self.as_str())
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthProvider {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::InvalidConfig(format!("Unknown auth provider: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSPLASH_LIKE: &str = r#"{
        "total": 2,
        "total_pages": 7,
        "results": [
            {"id": "a1", "urls": {"small": "s1", "regular": "r1", "thumb": "t1"},
             "alt_description": "a cat on a sofa", "user": {"name": "Jo", "username": "jo"}},
            {"id": "b2", "urls": {"small": "s2", "regular": "r2"},
             "alt_description": null, "user": {"name": "Sam"}}
        ]
    }"#;

    #[test]
    fn test_parse_result_page_maps_upstream_shape() {
        let page = parse_result_page(SEARCH_PATH, UNSPLASH_LIKE.as_bytes()).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total_pages, Some(7));

        let first = &page.results[0];
        assert_eq!(first.id, "a1");
        assert_eq!(first.thumbnail_url, "s1");
        assert_eq!(first.full_url, "r1");
        assert_eq!(first.attribution, "a cat on a sofa");
        assert_eq!(first.owner_name, "Jo");

        assert_eq!(page.results[1].attribution, "Image");
    }

    #[test]
    fn test_parse_result_page_rejects_missing_results() {
        let err = parse_result_page(SEARCH_PATH, br#"{"errors": ["rate limited"]}"#).unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse { .. }));
        assert!(err.is_transport_equivalent());
    }

    #[test]
    fn test_parse_result_page_rejects_non_json() {
        assert!(parse_result_page(SEARCH_GUEST_PATH, b"Failed to parse Unsplash response").is_err());
    }

    #[test]
    fn test_history_from_json() {
        let body = br#"{"terms": ["cats", "dogs"],
            "time_stamp": ["2024-05-01T10:00:00Z", "2024-05-01T10:05:00.123+02:00"]}"#;
        let history = RemoteHistory::from_json(body).unwrap();
        assert_eq!(history.terms, vec!["cats", "dogs"]);
        assert_eq!(history.timestamps.len(), 2);
    }

    #[test]
    fn test_history_null_lists_are_empty() {
        let history = RemoteHistory::from_json(br#"{"terms": null, "time_stamp": null}"#).unwrap();
        assert!(history.terms.is_empty());
        assert!(history.timestamps.is_empty());
    }

    #[test]
    fn test_history_unequal_lengths_is_malformed() {
        let body = br#"{"terms": ["cats", "dogs"], "time_stamp": ["2024-05-01T10:00:00Z"]}"#;
        assert!(matches!(
            RemoteHistory::from_json(body),
            Err(SearchError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_top_searches_null_is_empty() {
        assert!(parse_top_searches(b"null").unwrap().is_empty());
        assert_eq!(
            parse_top_searches(br#"["nature", "cats"]"#).unwrap(),
            vec!["nature", "cats"]
        );
        assert!(parse_top_searches(br#"{"terms": []}"#).is_err());
    }

    #[test]
    fn test_auth_provider_paths() {
        assert_eq!(AuthProvider::Google.auth_path(), "/api/auth/google");
        assert_eq!(AuthProvider::Github.auth_path(), "/api/auth/github");
        assert_eq!(AuthProvider::Facebook.auth_path(), "/api/auth/facebook");
        assert_eq!("GitHub".parse::<AuthProvider>().unwrap(), AuthProvider::Github);
        assert!("myspace".parse::<AuthProvider>().is_err());
    }
}

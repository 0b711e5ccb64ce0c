//! HTTP client for the image search REST API.
//!
//! Credentials ride on every request: a cookie jar keeps whatever session
//! cookie the server sets, and a preconfigured cookie (see
//! `ClientConfig::session_cookie`) is sent as a default header. There is no
//! retry; a failed call is reported once and the caller decides.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Method};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{
    parse_result_page, parse_top_searches, RemoteHistory, ResultPage, SearchApi,
    HISTORY_CLEAR_PATH, HISTORY_PATH, LOGOUT_PATH, SEARCH_GUEST_PATH, SEARCH_PATH,
    TOP_SEARCHES_PATH,
};
use crate::config::ClientConfig;
use crate::error::{Result, SearchError};

/// reqwest-backed [`SearchApi`].
pub struct HttpSearchApi {
    client: Client,
    config: ClientConfig,
}

impl HttpSearchApi {
    /// Create a new client with the given configuration.
    #[instrument(level = "debug", skip_all, fields(api_url = %config.api_url))]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| {
                SearchError::InvalidConfig(format!("Session cookie is not a valid header: {e}"))
            })?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                SearchError::InvalidConfig(format!("Failed to create HTTP client: {e}"))
            })?;

        info!("Search API client created");
        Ok(Self { client, config })
    }

    /// Send one request and return the body of a successful response.
    async fn send(&self, method: Method, url: Url, endpoint: &str) -> Result<Vec<u8>> {
        let start = Instant::now();

        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    endpoint,
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Request failed"
                );
                SearchError::from(e)
            })?;

        let status = response.status();
        debug!(endpoint, status = %status, "Received HTTP response");

        if !status.is_success() {
            warn!(
                endpoint,
                status = %status,
                latency_ms = start.elapsed().as_millis() as u64,
                "Non-success HTTP status"
            );
            return Err(SearchError::StatusError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(
            endpoint,
            bytes = body.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed successfully"
        );
        Ok(body.to_vec())
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        let mut url = self.config.endpoint(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        self.send(Method::GET, url, path).await
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    #[instrument(level = "debug", skip(self))]
    async fn search(&self, term: &str, page: u32) -> Result<ResultPage> {
        let body = self
            .get(
                SEARCH_PATH,
                &[("term", term.to_string()), ("page", page.to_string())],
            )
            .await?;
        parse_result_page(SEARCH_PATH, &body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn search_guest(&self, page: u32) -> Result<ResultPage> {
        let body = self
            .get(SEARCH_GUEST_PATH, &[("page", page.to_string())])
            .await?;
        parse_result_page(SEARCH_GUEST_PATH, &body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn history(&self) -> Result<RemoteHistory> {
        let body = self.get(HISTORY_PATH, &[]).await?;
        RemoteHistory::from_json(&body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn clear_history(&self) -> Result<()> {
        let url = self.config.endpoint(HISTORY_CLEAR_PATH)?;
        self.send(Method::POST, url, HISTORY_CLEAR_PATH).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn top_searches(&self) -> Result<Vec<String>> {
        let body = self.get(TOP_SEARCHES_PATH, &[]).await?;
        parse_top_searches(&body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn logout(&self) -> Result<()> {
        self.get(LOGOUT_PATH, &[]).await?;
        Ok(())
    }
}

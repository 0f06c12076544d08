//! Client for the UI/UR quotation service
//!
//! Fetches current and historical quotations from the rate service. Current
//! quotations are written to the local rate cache on success and served from
//! it when the service cannot be reached. Historical series are never cached.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, error, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use super::{Quotation, UnitKind};
use crate::cache::RateCache;

/// Base URL for the quotation service
pub const DEFAULT_BASE_URL: &str = "https://cotizaciones-ui-ur-bcu.onrender.com/api";

/// Errors that can occur when fetching quotations
#[derive(Debug, Error)]
pub enum RateError {
    /// Transport-level failure (DNS, connection, TLS, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status
    #[error("{message}")]
    BadStatus { status: u16, message: String },

    /// The response did not carry a JSON content type
    #[error("Response is not valid JSON")]
    NotJson,

    /// The body claimed to be JSON but could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Final failure after the cache fallback was exhausted
    #[error("{0}")]
    FetchFailed(String),
}

impl From<reqwest::Error> for RateError {
    fn from(e: reqwest::Error) -> Self {
        RateError::Network(e.to_string())
    }
}

/// A buffered HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    /// Builds a response with an `application/json` content type
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// Capability to issue `GET` requests that accept JSON
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, RateError>;
}

/// `HttpTransport` backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, RateError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Error payload the service sends alongside failed requests
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for fetching UI/UR quotations
#[derive(Clone)]
pub struct RateClient {
    transport: Arc<dyn HttpTransport>,
    cache: RateCache,
    base_url: String,
}

impl std::fmt::Debug for RateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateClient")
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl RateClient {
    /// Create a client using reqwest and the default base URL
    pub fn new(cache: RateCache) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()), cache)
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>, cache: RateCache) -> Self {
        Self {
            transport,
            cache,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the service base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the current (or dated) quotation for `kind`
    pub fn quotation_url(&self, kind: UnitKind, date: Option<NaiveDate>) -> String {
        match date {
            Some(date) => format!(
                "{}/cotizacion/{}?fecha={}",
                self.base_url,
                kind.code(),
                date.format("%Y-%m-%d")
            ),
            None => format!("{}/cotizacion/{}", self.base_url, kind.code()),
        }
    }

    /// URL of the historical series for `kind`
    pub fn history_url(
        &self,
        kind: UnitKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> String {
        let params: Vec<String> = [("inicio", start), ("fin", end)]
            .into_iter()
            .filter_map(|(name, date)| date.map(|d| format!("{}={}", name, d.format("%Y-%m-%d"))))
            .collect();

        let url = format!("{}/historico/{}", self.base_url, kind.code());
        if params.is_empty() {
            url
        } else {
            format!("{}?{}", url, params.join("&"))
        }
    }

    /// Fetch the quotation for `kind`, optionally for a specific date
    ///
    /// # Returns
    /// * `Ok(Quotation)` - From the service, or from the cache if the service failed
    ///   and a fresh entry exists
    /// * `Err(RateError::FetchFailed)` - If the request failed and no fresh cache entry exists
    ///
    /// # Behavior
    /// - A successful response overwrites the cache entry for `kind`
    /// - Any failure is logged with URL and timestamp before the cache is consulted
    pub async fn fetch_quotation(
        &self,
        kind: UnitKind,
        date: Option<NaiveDate>,
    ) -> Result<Quotation, RateError> {
        let url = self.quotation_url(kind, date);
        debug!("fetching {} quotation from {}", kind, url);

        match self.request::<Quotation>(&url).await {
            Ok(quotation) => {
                self.cache.put(kind.cache_key(), &quotation);
                Ok(quotation)
            }
            Err(e) => {
                log_failure(&format!("{} quotation", kind), &url, &e);

                if let Some(cached) = self.cache.get(kind.cache_key()) {
                    warn!("serving cached {} quotation from {}", kind, cached.effective_date);
                    return Ok(cached);
                }

                Err(RateError::FetchFailed(e.to_string()))
            }
        }
    }

    /// Fetch the quotation series for `kind` between optional bounds
    ///
    /// There is no cache fallback; any failure surfaces as `RateError::FetchFailed`.
    pub async fn fetch_history(
        &self,
        kind: UnitKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Quotation>, RateError> {
        let url = self.history_url(kind, start, end);
        debug!("fetching {} history from {}", kind, url);

        self.request::<Vec<Quotation>>(&url).await.map_err(|e| {
            log_failure(&format!("{} history", kind), &url, &e);
            RateError::FetchFailed(e.to_string())
        })
    }

    async fn request<T: DeserializeOwned>(&self, url: &str) -> Result<T, RateError> {
        let response = self.transport.get(url).await?;
        parse_response(response)
    }
}

/// Validates status and content type, then decodes the body
fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, RateError> {
    if !response.is_success() {
        let message = response
            .is_json()
            .then(|| serde_json::from_str::<ErrorBody>(&response.body).ok())
            .flatten()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("HTTP error: {}", response.status));
        return Err(RateError::BadStatus {
            status: response.status,
            message,
        });
    }

    if !response.is_json() {
        return Err(RateError::NotJson);
    }

    Ok(serde_json::from_str(&response.body)?)
}

fn log_failure(what: &str, url: &str, e: &RateError) {
    error!(
        "failed to fetch {}: {} (url: {}, at: {})",
        what,
        e,
        url,
        Utc::now().to_rfc3339()
    );
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Transport returning canned responses keyed by URL.
    ///
    /// Unknown URLs fail with a network error.
    #[derive(Default)]
    pub struct FakeTransport {
        responses: Mutex<HashMap<String, HttpResponse>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, url: &str, response: HttpResponse) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
        }

        pub fn clear(&self) {
            self.responses.lock().unwrap().clear();
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, RateError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| RateError::Network("connection refused".to_string()))
        }
    }
}

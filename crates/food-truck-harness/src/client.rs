// crates/food-truck-harness/src/client.rs
// ============================================================================
// Module: Contract HTTP Client
// Description: Timed GET requests against a base URL with transcript capture.
// Purpose: Give assertions a uniform view of status, headers, body, latency.
// Dependencies: reqwest, serde, url, tracing
// ============================================================================

//! ## Overview
//! [`ContractClient`] issues GET requests with an explicit timeout and returns
//! an [`HttpExchange`]. Transport errors become
//! [`ContractError::Transport`] instead of propagating raw so every failure
//! reads the same in test output.
//! Invariants:
//! - Every request carries a timeout.
//! - `elapsed` covers request send until response headers are received.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::contract::ContractError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One recorded request/response round trip.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// Sequence number within the client.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Requested URL.
    pub url: String,
    /// Response status, when one arrived.
    pub status: Option<u16>,
    /// Time to response headers in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Transport error, if any.
    pub error: Option<String>,
}

/// Observed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpExchange {
    /// Requested URL.
    pub url: String,
    /// Response status code.
    pub status: u16,
    /// Response headers keyed by lower-case name.
    pub headers: BTreeMap<String, String>,
    /// Response body decoded as text.
    pub body: String,
    /// Time from send until response headers arrived.
    pub elapsed: Duration,
}

impl HttpExchange {
    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidJson`] when the body does not decode
    /// into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ContractError> {
        serde_json::from_str(&self.body).map_err(|err| ContractError::InvalidJson {
            url: self.url.clone(),
            message: err.to_string(),
        })
    }

    /// Elapsed time in whole milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// GET-only HTTP client bound to one base URL.
#[derive(Debug, Clone)]
pub struct ContractClient {
    /// Base URL without a trailing slash.
    base_url: String,
    /// Underlying HTTP client.
    client: Client,
    /// Default per-request timeout.
    timeout: Duration,
    /// Recorded exchanges.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl ContractClient {
    /// Creates a client for `base_url` with a default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ContractError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            ContractError::Transport {
                url: base_url.clone(),
                message: format!("failed to build http client: {err}"),
            }
        })?;
        Ok(Self {
            base_url,
            client,
            timeout,
            transcript: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL for `path` plus encoded query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] when the URL does not parse.
    pub fn url_for(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ContractError> {
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|err| ContractError::Transport {
            url: raw.clone(),
            message: format!("invalid url: {err}"),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Issues a GET using the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] on connection, timeout, or body
    /// read failures. Non-2xx statuses are not errors here.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<HttpExchange, ContractError> {
        self.get_with_timeout(path, query, headers, self.timeout).await
    }

    /// Issues a GET with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] on connection, timeout, or body
    /// read failures.
    pub async fn get_with_timeout(
        &self,
        path: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpExchange, ContractError> {
        let url = self.url_for(path, query)?;
        self.get_url(url.as_str(), headers, timeout).await
    }

    /// Issues a GET against an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] on connection, timeout, or body
    /// read failures.
    pub async fn get_url(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpExchange, ContractError> {
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        debug!(url = %url, "GET");
        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let message = err.to_string();
                self.record(url, None, None, Some(message.clone()));
                return Err(ContractError::Transport {
                    url: url.to_string(),
                    message,
                });
            }
        };
        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                let message = format!("failed to read body: {err}");
                self.record(url, Some(status), Some(elapsed), Some(message.clone()));
                return Err(ContractError::Transport {
                    url: url.to_string(),
                    message,
                });
            }
        };
        self.record(url, Some(status), Some(elapsed), None);
        Ok(HttpExchange {
            url: url.to_string(),
            status,
            headers,
            body,
            elapsed,
        })
    }

    /// Returns a copy of the recorded exchanges.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Appends an entry to the transcript.
    fn record(
        &self,
        url: &str,
        status: Option<u16>,
        elapsed: Option<Duration>,
        error: Option<String>,
    ) {
        let Ok(mut entries) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(entries.len()).unwrap_or(u64::MAX).saturating_add(1);
        entries.push(TranscriptEntry {
            sequence,
            method: "GET".to_string(),
            url: url.to_string(),
            status,
            elapsed_ms: elapsed.map(|value| u64::try_from(value.as_millis()).unwrap_or(u64::MAX)),
            error,
        });
    }
}

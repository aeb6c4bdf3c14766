// crates/food-truck-harness/src/contract.rs
// ============================================================================
// Module: Contract Assertions
// Description: Status, body, header, latency, and record predicates.
// Purpose: Express each HTTP contract check as a fallible function.
// Dependencies: serde_json, thiserror, crate::client, crate::retry
// ============================================================================

//! ## Overview
//! Every helper returns `Result<(), ContractError>` (or the decoded value) so
//! a test reports a single, descriptive failure whether the cause was a
//! network error or a mismatch. Nothing here retries except
//! [`fetch_with_retry`], which backs the documentation page check.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::client::ContractClient;
use crate::client::HttpExchange;
use crate::models::FoodTruckRecord;
use crate::models::PermitStatus;
use crate::retry::RetryPolicy;
use crate::retry::RetryStep;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Search endpoint path.
pub const SEARCH_PATH: &str = "/api/food_trucks/search";
/// Interactive documentation page.
pub const SWAGGER_UI_PATH: &str = "/swagger/";
/// Machine-readable API description.
pub const OPENAPI_DOCUMENT_PATH: &str = "/swagger/v1/swagger.json";
/// Documentation stylesheet.
pub const SWAGGER_CSS_PATH: &str = "/swagger/swagger-ui.css";
/// Marker text on the documentation page.
pub const SWAGGER_UI_MARKER: &str = "Swagger UI";
/// Title the API declares in its description document.
pub const API_TITLE: &str = "FoodTruckApi";
/// End-to-end latency budget for a basic search.
pub const SEARCH_LATENCY_BUDGET: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A single contract violation or transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Request could not be completed.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// Status differs from the single expected value.
    #[error("{url}: expected status {expected}, got {actual}")]
    UnexpectedStatus {
        /// Requested URL.
        url: String,
        /// Expected status.
        expected: u16,
        /// Observed status.
        actual: u16,
    },
    /// Status is outside the accepted set.
    #[error("{url}: expected status in {expected:?}, got {actual}")]
    StatusNotIn {
        /// Requested URL.
        url: String,
        /// Accepted statuses.
        expected: Vec<u16>,
        /// Observed status.
        actual: u16,
    },
    /// Body lacks required text.
    #[error("{url}: body does not contain {needle:?}")]
    MissingText {
        /// Requested URL.
        url: String,
        /// Required text.
        needle: String,
    },
    /// Body is not the expected JSON.
    #[error("{url}: unexpected JSON body: {message}")]
    InvalidJson {
        /// Requested URL.
        url: String,
        /// Decode error.
        message: String,
    },
    /// JSON object lacks a field.
    #[error("missing field `{field}`")]
    MissingField {
        /// Field name.
        field: String,
    },
    /// JSON field has the wrong type.
    #[error("field `{field}` is not a {expected}")]
    WrongType {
        /// Field name.
        field: String,
        /// Expected JSON type.
        expected: String,
    },
    /// A result list was empty.
    #[error("{url}: expected a non-empty result list")]
    EmptyResult {
        /// Requested URL.
        url: String,
    },
    /// Field value does not satisfy the predicate.
    #[error("field `{field}` value {actual:?} does not contain {expected:?}")]
    FieldMismatch {
        /// Field name.
        field: String,
        /// Required substring.
        expected: String,
        /// Observed value.
        actual: String,
    },
    /// Header missing or lacking required text.
    #[error("{url}: header `{header}` is {actual:?}, expected it to contain {expected:?}")]
    HeaderMismatch {
        /// Requested URL.
        url: String,
        /// Header name.
        header: String,
        /// Required substring.
        expected: String,
        /// Observed value.
        actual: Option<String>,
    },
    /// Response took longer than the budget.
    #[error("{url}: latency {actual_ms} ms is not under the {budget_ms} ms budget")]
    LatencyExceeded {
        /// Requested URL.
        url: String,
        /// Observed latency.
        actual_ms: u64,
        /// Allowed latency.
        budget_ms: u64,
    },
    /// Polling gave up.
    #[error("{url}: gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Requested URL.
        url: String,
        /// Attempts made.
        attempts: u32,
        /// Last failure.
        last: String,
    },
}

// ============================================================================
// SECTION: Response Assertions
// ============================================================================

/// Requires an exact status code.
///
/// # Errors
///
/// Returns [`ContractError::UnexpectedStatus`] on mismatch.
pub fn expect_status(exchange: &HttpExchange, expected: u16) -> Result<(), ContractError> {
    if exchange.status == expected {
        return Ok(());
    }
    Err(ContractError::UnexpectedStatus {
        url: exchange.url.clone(),
        expected,
        actual: exchange.status,
    })
}

/// Requires the status to be one of `allowed`.
///
/// # Errors
///
/// Returns [`ContractError::StatusNotIn`] on mismatch.
pub fn expect_status_in(exchange: &HttpExchange, allowed: &[u16]) -> Result<(), ContractError> {
    if allowed.contains(&exchange.status) {
        return Ok(());
    }
    Err(ContractError::StatusNotIn {
        url: exchange.url.clone(),
        expected: allowed.to_vec(),
        actual: exchange.status,
    })
}

/// Requires the body to contain `needle`.
///
/// # Errors
///
/// Returns [`ContractError::MissingText`] when absent.
pub fn expect_body_contains(exchange: &HttpExchange, needle: &str) -> Result<(), ContractError> {
    if exchange.body.contains(needle) {
        return Ok(());
    }
    Err(ContractError::MissingText {
        url: exchange.url.clone(),
        needle: needle.to_string(),
    })
}

/// Requires a header to be present and contain `needle`.
///
/// # Errors
///
/// Returns [`ContractError::HeaderMismatch`] when missing or different.
pub fn expect_header_contains(
    exchange: &HttpExchange,
    header: &str,
    needle: &str,
) -> Result<(), ContractError> {
    let actual = exchange.header(header);
    if actual.is_some_and(|value| value.contains(needle)) {
        return Ok(());
    }
    Err(ContractError::HeaderMismatch {
        url: exchange.url.clone(),
        header: header.to_string(),
        expected: needle.to_string(),
        actual: actual.map(str::to_string),
    })
}

/// Requires the exchange to complete strictly under `budget`.
///
/// # Errors
///
/// Returns [`ContractError::LatencyExceeded`] otherwise.
pub fn expect_latency_under(exchange: &HttpExchange, budget: Duration) -> Result<(), ContractError> {
    if exchange.elapsed < budget {
        return Ok(());
    }
    Err(ContractError::LatencyExceeded {
        url: exchange.url.clone(),
        actual_ms: exchange.elapsed_ms(),
        budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
    })
}

/// Returns the first element, failing when the list is empty.
///
/// # Errors
///
/// Returns [`ContractError::EmptyResult`] for an empty list.
pub fn expect_first<'a, T>(url: &str, items: &'a [T]) -> Result<&'a T, ContractError> {
    items.first().ok_or_else(|| ContractError::EmptyResult {
        url: url.to_string(),
    })
}

/// Requires `actual` to contain `expected` (case-sensitive).
///
/// # Errors
///
/// Returns [`ContractError::FieldMismatch`] otherwise.
pub fn expect_field_contains(field: &str, actual: &str, expected: &str) -> Result<(), ContractError> {
    if actual.contains(expected) {
        return Ok(());
    }
    Err(field_mismatch(field, actual, expected))
}

/// Requires `actual` to contain `expected`, ignoring case.
///
/// # Errors
///
/// Returns [`ContractError::FieldMismatch`] otherwise.
pub fn expect_field_contains_ignore_case(
    field: &str,
    actual: &str,
    expected: &str,
) -> Result<(), ContractError> {
    if actual.to_uppercase().contains(&expected.to_uppercase()) {
        return Ok(());
    }
    Err(field_mismatch(field, actual, expected))
}

/// Builds a [`ContractError::FieldMismatch`].
fn field_mismatch(field: &str, actual: &str, expected: &str) -> ContractError {
    ContractError::FieldMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

// ============================================================================
// SECTION: Coordinates
// ============================================================================

/// Inclusive latitude/longitude acceptance ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateBounds {
    /// Minimum latitude.
    pub lat_min: f64,
    /// Maximum latitude.
    pub lat_max: f64,
    /// Minimum longitude.
    pub lon_min: f64,
    /// Maximum longitude.
    pub lon_max: f64,
}

impl CoordinateBounds {
    /// Geographic bounds the search endpoint enforces.
    pub const WGS84: Self = Self {
        lat_min: -90.0,
        lat_max: 90.0,
        lon_min: -180.0,
        lon_max: 180.0,
    };

    /// Returns true when both values lie inside the inclusive ranges.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }

    /// Status the search endpoint must return for this pair.
    #[must_use]
    pub fn expected_status(&self, lat: f64, lon: f64) -> u16 {
        if self.contains(lat, lon) { 200 } else { 400 }
    }
}

// ============================================================================
// SECTION: Search
// ============================================================================

/// Query parameters for the search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Applicant name filter.
    name: Option<String>,
    /// Street filter.
    street: Option<String>,
    /// Latitude.
    lat: Option<f64>,
    /// Longitude.
    lon: Option<f64>,
}

impl SearchQuery {
    /// Empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by applicant name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Filters by street.
    #[must_use]
    pub fn street(mut self, street: &str) -> Self {
        self.street = Some(street.to_string());
        self
    }

    /// Sets both coordinates.
    #[must_use]
    pub fn coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Query pairs in `name, street, lat, lon` order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(street) = &self.street {
            pairs.push(("street", street.clone()));
        }
        if let Some(lat) = self.lat {
            pairs.push(("lat", lat.to_string()));
        }
        if let Some(lon) = self.lon {
            pairs.push(("lon", lon.to_string()));
        }
        pairs
    }

    /// Returns true when `record` satisfies the text filters.
    ///
    /// Both filters are case-insensitive substring matches, like the search
    /// endpoint. Coordinates are not compared.
    #[must_use]
    pub fn record_matches(&self, record: &FoodTruckRecord) -> bool {
        self.name.as_deref().is_none_or(|name| record.applicant_contains_ignore_case(name))
            && self.street.as_deref().is_none_or(|street| record.address_contains_ignore_case(street))
    }

    /// Sends the query through `client`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] on request failure.
    pub async fn send(&self, client: &ContractClient) -> Result<HttpExchange, ContractError> {
        client.get(SEARCH_PATH, &self.pairs(), &[]).await
    }

    /// Sends the query with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] on request failure.
    pub async fn send_with_timeout(
        &self,
        client: &ContractClient,
        timeout: Duration,
    ) -> Result<HttpExchange, ContractError> {
        client.get_with_timeout(SEARCH_PATH, &self.pairs(), &[], timeout).await
    }
}

/// Decodes a search response into records.
///
/// # Errors
///
/// Returns [`ContractError::InvalidJson`] when the body is not an array of
/// records exposing `applicant` and `address`.
pub fn decode_records(exchange: &HttpExchange) -> Result<Vec<FoodTruckRecord>, ContractError> {
    exchange.json()
}

/// Requires the body to be a JSON array.
///
/// # Errors
///
/// Returns [`ContractError::InvalidJson`] otherwise.
pub fn expect_json_array(exchange: &HttpExchange) -> Result<Vec<Value>, ContractError> {
    match exchange.json::<Value>()? {
        Value::Array(items) => Ok(items),
        other => Err(ContractError::InvalidJson {
            url: exchange.url.clone(),
            message: format!("expected a JSON array, got {}", json_type(&other)),
        }),
    }
}

// ============================================================================
// SECTION: API Description
// ============================================================================

/// View over an OpenAPI/Swagger description document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiDocument {
    /// Parsed document.
    document: Value,
}

impl OpenApiDocument {
    /// Parses the exchange body; the document must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidJson`] for malformed bodies.
    pub fn parse(exchange: &HttpExchange) -> Result<Self, ContractError> {
        let document: Value = exchange.json()?;
        if !document.is_object() {
            return Err(ContractError::InvalidJson {
                url: exchange.url.clone(),
                message: format!("expected a JSON object, got {}", json_type(&document)),
            });
        }
        Ok(Self {
            document,
        })
    }

    /// Returns true when an `openapi` or `swagger` version key is present.
    #[must_use]
    pub fn has_version_key(&self) -> bool {
        self.document.get("openapi").is_some() || self.document.get("swagger").is_some()
    }

    /// Number of documented paths.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.document.get("paths").and_then(Value::as_object).map_or(0, serde_json::Map::len)
    }

    /// Returns `info.title`, if declared.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.document.pointer("/info/title").and_then(Value::as_str)
    }
}

// ============================================================================
// SECTION: Mock Provider
// ============================================================================

/// Decodes and validates the permit-status payload shape.
///
/// # Errors
///
/// Returns [`ContractError::MissingField`] or [`ContractError::WrongType`]
/// when `status` or `permit_valid` are absent or mistyped.
pub fn decode_permit_status(exchange: &HttpExchange) -> Result<PermitStatus, ContractError> {
    let body: Value = exchange.json()?;
    let status = body
        .get("status")
        .ok_or_else(|| missing_field("status"))?
        .as_str()
        .ok_or_else(|| wrong_type("status", "string"))?
        .to_string();
    let permit_valid = body
        .get("permit_valid")
        .ok_or_else(|| missing_field("permit_valid"))?
        .as_bool()
        .ok_or_else(|| wrong_type("permit_valid", "boolean"))?;
    Ok(PermitStatus {
        status,
        permit_valid,
    })
}

/// Builds a [`ContractError::MissingField`].
fn missing_field(field: &str) -> ContractError {
    ContractError::MissingField {
        field: field.to_string(),
    }
}

/// Builds a [`ContractError::WrongType`].
fn wrong_type(field: &str, expected: &str) -> ContractError {
    ContractError::WrongType {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}

/// JSON type name for diagnostics.
const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Polling
// ============================================================================

/// GETs `path` until it answers 200 or the policy budget is spent.
///
/// Transport errors and non-200 statuses both count as failed attempts.
///
/// # Errors
///
/// Returns [`ContractError::RetryExhausted`] with the last failure.
pub async fn fetch_with_retry(
    client: &ContractClient,
    path: &str,
    policy: RetryPolicy,
) -> Result<HttpExchange, ContractError> {
    let outcome = policy
        .run(|_| async move {
            match client.get(path, &[], &[]).await {
                Ok(exchange) if exchange.status == 200 => RetryStep::Done(exchange),
                Ok(exchange) => RetryStep::Retry(format!("status {}", exchange.status)),
                Err(err) => RetryStep::Retry(err.to_string()),
            }
        })
        .await;
    match outcome {
        Ok(done) => Ok(done.value),
        Err(exhausted) => Err(ContractError::RetryExhausted {
            url: format!("{}{path}", client.base_url()),
            attempts: exhausted.attempts,
            last: exhausted.last,
        }),
    }
}

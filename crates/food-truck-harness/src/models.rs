// crates/food-truck-harness/src/models.rs
// ============================================================================
// Module: Observed Models
// Description: Projections of API and mock-provider payloads.
// Purpose: Decode only the fields the contract checks depend on.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These types mirror what the harness observes over HTTP. They are never
//! constructed for the service; extra fields in responses are ignored.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

/// Header carrying the mock provider API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";
/// API key the mock provider accepts.
pub const VALID_API_KEY: &str = "test-key-123";
/// API key the mock provider must reject.
pub const INVALID_API_KEY: &str = "wrong-secret-key";
/// Permit status reported for the registered truck.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Food truck record as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodTruckRecord {
    /// Permit applicant (business) name.
    #[serde(alias = "Applicant")]
    pub applicant: String,
    /// Street address.
    #[serde(alias = "Address")]
    pub address: String,
    /// Latitude, when exposed.
    #[serde(default, alias = "Latitude", alias = "lat", deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    /// Longitude, when exposed.
    #[serde(default, alias = "Longitude", alias = "lon", deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

impl FoodTruckRecord {
    /// Case-insensitive applicant substring match.
    #[must_use]
    pub fn applicant_contains_ignore_case(&self, needle: &str) -> bool {
        self.applicant.to_uppercase().contains(&needle.to_uppercase())
    }

    /// Case-insensitive address substring match.
    #[must_use]
    pub fn address_contains_ignore_case(&self, needle: &str) -> bool {
        self.address.to_uppercase().contains(&needle.to_uppercase())
    }
}

/// Accepts coordinates encoded as numbers or numeric strings.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Mock provider permit-status payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitStatus {
    /// Permit status label.
    pub status: String,
    /// Whether the permit is valid.
    pub permit_valid: bool,
}

impl PermitStatus {
    /// Returns true when the status is `ACTIVE`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }
}

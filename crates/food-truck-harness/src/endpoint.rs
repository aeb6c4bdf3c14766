// crates/food-truck-harness/src/endpoint.rs
// ============================================================================
// Module: Endpoint Resolver
// Description: Mock permit-provider address selection per execution context.
// Purpose: Reach the mock provider from the host or from inside the network.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The mock provider is reachable under its container-network hostname when
//! the tests themselves run inside a container, and under a host-mapped port
//! otherwise. [`ExecutionContext`] is resolved once by the caller and passed
//! in; [`MockProviderEndpoint::resolve`] is a pure function of it.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Marker file present inside Docker containers.
pub const CONTAINER_MARKER: &str = "/.dockerenv";
/// Mock provider base URL on the container network.
pub const IN_NETWORK_BASE_URL: &str = "http://mock-provider:8080";
/// Mock provider base URL through the host port mapping.
pub const HOST_MAPPED_BASE_URL: &str = "http://localhost:8081";
/// Permit-status check path served by the mock provider.
pub const PERMIT_STATUS_PATH: &str = "/external-check/truck-permit-status";

/// Where the test process is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Directly on the host.
    Host,
    /// Inside a container attached to the service network.
    Container,
}

impl ExecutionContext {
    /// Checks `marker` once and classifies the current process.
    #[must_use]
    pub fn detect(marker: &Path) -> Self {
        if marker.exists() { Self::Container } else { Self::Host }
    }

    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionContext {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("host") {
            return Ok(Self::Host);
        }
        if trimmed.eq_ignore_ascii_case("container") {
            return Ok(Self::Container);
        }
        Err(format!("unknown execution context `{trimmed}` (expected host or container)"))
    }
}

/// Resolved mock provider base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProviderEndpoint {
    /// Base URL without a trailing slash.
    base_url: String,
}

impl MockProviderEndpoint {
    /// Picks one of the two fixed addresses for `context`.
    #[must_use]
    pub fn resolve(context: ExecutionContext) -> Self {
        match context {
            ExecutionContext::Container => Self::from_base_url(IN_NETWORK_BASE_URL),
            ExecutionContext::Host => Self::from_base_url(HOST_MAPPED_BASE_URL),
        }
    }

    /// Uses an explicit base URL.
    #[must_use]
    pub fn from_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the permit-status check.
    #[must_use]
    pub fn permit_status_url(&self) -> String {
        format!("{}{PERMIT_STATUS_PATH}", self.base_url)
    }

    /// Permit-status URL with its last path segment replaced by `segment`.
    #[must_use]
    pub fn sibling_route(&self, segment: &str) -> String {
        let url = self.permit_status_url();
        match url.rsplit_once('/') {
            Some((parent, _)) => format!("{parent}/{segment}"),
            None => format!("{url}/{segment}"),
        }
    }
}

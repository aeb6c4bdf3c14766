// system-tests/tests/helpers/target.rs
// ============================================================================
// Module: Contract Target
// Description: Clients and budgets pointing at one API and one mock provider.
// Purpose: Let the same checks run against live services or local stubs.
// Dependencies: food-truck-harness, serde
// ============================================================================

use std::time::Duration;

use food_truck_harness::ContractClient;
use food_truck_harness::ContractError;
use food_truck_harness::MockProviderEndpoint;
use food_truck_harness::RetryPolicy;
use food_truck_harness::TranscriptEntry;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Per-request timeout for ordinary contract checks.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Request timeout used by the latency check.
pub const LATENCY_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
/// Documentation page polling budget while the container warms up.
pub const DOCS_RETRY: RetryPolicy = RetryPolicy::fixed(10, Duration::from_secs(1));

/// Timeouts and retry budgets applied by the checks.
#[derive(Debug, Clone, Copy)]
pub struct TargetBudgets {
    /// Default request timeout.
    pub request: Duration,
    /// Timeout for the latency request.
    pub latency_request: Duration,
    /// Documentation page polling policy.
    pub docs_retry: RetryPolicy,
}

impl TargetBudgets {
    /// Budgets for live services, honoring the configured timeout floor.
    pub fn live(config: &SystemTestConfig) -> Self {
        Self {
            request: config.resolve_timeout(REQUEST_TIMEOUT),
            latency_request: config.resolve_timeout(LATENCY_REQUEST_TIMEOUT),
            docs_retry: DOCS_RETRY,
        }
    }

    /// Budgets for in-process stubs.
    pub const fn local() -> Self {
        Self {
            request: Duration::from_secs(2),
            latency_request: LATENCY_REQUEST_TIMEOUT,
            docs_retry: RetryPolicy::fixed(10, Duration::from_millis(20)),
        }
    }
}

/// Both request transcripts of one target.
#[derive(Debug, Serialize)]
pub struct TargetTranscript {
    api: Vec<TranscriptEntry>,
    mock_provider: Vec<TranscriptEntry>,
}

/// API and mock-provider clients under one set of budgets.
#[derive(Debug, Clone)]
pub struct ContractTarget {
    /// Client bound to the API base URL.
    pub api: ContractClient,
    /// Client bound to the mock provider base URL.
    pub mock: ContractClient,
    /// Resolved mock provider endpoint.
    pub mock_endpoint: MockProviderEndpoint,
    /// Budgets applied by the checks.
    pub budgets: TargetBudgets,
}

impl ContractTarget {
    /// Builds clients for `api_base_url` and `mock_endpoint`.
    pub fn new(
        api_base_url: &str,
        mock_endpoint: MockProviderEndpoint,
        budgets: TargetBudgets,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            api: ContractClient::new(api_base_url, budgets.request)?,
            mock: ContractClient::new(mock_endpoint.base_url(), budgets.request)?,
            mock_endpoint,
            budgets,
        })
    }

    /// Snapshot of every request made so far.
    pub fn transcript(&self) -> TargetTranscript {
        TargetTranscript {
            api: self.api.transcript(),
            mock_provider: self.mock.transcript(),
        }
    }
}

// crates/food-truck-harness/src/readiness.rs
// ============================================================================
// Module: Readiness Prober
// Description: TCP connect probes and the bounded readiness polling policy.
// Purpose: Detect when a freshly started service accepts connections.
// Dependencies: thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`is_ready`] makes one short-lived TCP connection attempt and reports the
//! outcome without raising. [`wait_until_ready`] polls a [`TcpProbe`] under a
//! [`ReadinessPolicy`] and, after the first successful connect, waits a fixed
//! grace period once so in-process startup can finish beyond socket
//! acceptance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio::time::timeout;
use tracing::info;
use tracing::trace;

use crate::retry::RetryPolicy;
use crate::retry::RetryStep;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound for a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of readiness polls.
pub const DEFAULT_READY_ATTEMPTS: u32 = 20;
/// Default gap between readiness polls.
pub const DEFAULT_READY_INTERVAL: Duration = Duration::from_secs(1);
/// Default grace delay applied once after the first successful poll.
pub const DEFAULT_READY_GRACE: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Returns whether `localhost:port` currently accepts TCP connections.
pub async fn is_ready(port: u16) -> bool {
    TcpProbe::localhost(port).is_ready().await
}

/// Connect-only probe for a host and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpProbe {
    /// Host name or address to connect to.
    host: String,
    /// Target TCP port.
    port: u16,
    /// Bound for each connect attempt.
    connect_timeout: Duration,
}

impl TcpProbe {
    /// Builds a probe for an arbitrary host.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Builds a probe for `localhost`.
    #[must_use]
    pub fn localhost(port: u16) -> Self {
        Self::new("localhost", port)
    }

    /// Overrides the per-attempt connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Returns the `host:port` label used in diagnostics.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Makes one connect attempt; the connection is closed immediately.
    pub async fn is_ready(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        matches!(timeout(self.connect_timeout, connect).await, Ok(Ok(_)))
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Polling budget for readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Maximum number of connect polls.
    pub attempts: u32,
    /// Gap between polls.
    pub interval: Duration,
    /// Extra delay applied once after the first successful poll.
    pub grace: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_READY_ATTEMPTS,
            interval: DEFAULT_READY_INTERVAL,
            grace: DEFAULT_READY_GRACE,
        }
    }
}

impl ReadinessPolicy {
    /// Returns the underlying retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.attempts, self.interval)
    }
}

/// Report returned once the probe succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyReport {
    /// Number of polls it took to connect.
    pub attempts: u32,
}

/// The probe never connected within the policy budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("timeout: {address} never accepted connections after {attempts} attempts")]
pub struct ReadinessTimeout {
    /// Probed `host:port`.
    pub address: String,
    /// Number of polls made.
    pub attempts: u32,
}

/// Polls `probe` until it connects, then waits the grace period once.
///
/// # Errors
///
/// Returns [`ReadinessTimeout`] when every poll failed.
pub async fn wait_until_ready(
    probe: &TcpProbe,
    policy: &ReadinessPolicy,
) -> Result<ReadyReport, ReadinessTimeout> {
    let address = probe.address();
    let outcome = policy
        .retry_policy()
        .run(|attempt| async move {
            trace!(attempt, address = %probe.address(), "probing");
            if probe.is_ready().await { RetryStep::Done(()) } else { RetryStep::Retry(()) }
        })
        .await;
    match outcome {
        Ok(done) => {
            info!(address = %address, attempts = done.attempts, "service is accepting connections");
            sleep(policy.grace).await;
            Ok(ReadyReport {
                attempts: done.attempts,
            })
        }
        Err(exhausted) => Err(ReadinessTimeout {
            address,
            attempts: exhausted.attempts,
        }),
    }
}

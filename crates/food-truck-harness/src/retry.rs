// crates/food-truck-harness/src/retry.rs
// ============================================================================
// Module: Bounded Retry
// Description: Fixed-interval retry with a terminal failure after N attempts.
// Purpose: Share one polling discipline between readiness and page checks.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`RetryPolicy`] runs an async attempt until it reports
//! [`RetryStep::Done`] or the attempt budget is spent. There is no backoff:
//! every gap between attempts is exactly [`RetryPolicy::interval`], and no
//! sleep follows the final attempt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryStep<T, E> {
    /// The attempt succeeded; stop polling.
    Done(T),
    /// The attempt failed; poll again if budget remains.
    Retry(E),
}

/// Successful result together with the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    /// Value returned by the successful attempt.
    pub value: T,
    /// One-based index of the successful attempt.
    pub attempts: u32,
}

/// Returned when every attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Number of attempts made.
    pub attempts: u32,
    /// Failure reported by the last attempt.
    pub last: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempts: {}", self.attempts, self.last)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// Fixed-interval retry budget.
///
/// # Invariants
/// - At least one attempt is always made, even when built with zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts.
    max_attempts: u32,
    /// Delay between consecutive attempts.
    interval: Duration,
}

impl RetryPolicy {
    /// Builds a policy with a fixed attempt budget and interval.
    #[must_use]
    pub const fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Returns the effective attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.max_attempts == 0 { 1 } else { self.max_attempts }
    }

    /// Returns the delay between attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `attempt` until it succeeds or the budget is exhausted.
    ///
    /// The closure receives the one-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] carrying the last failure when no attempt
    /// succeeded.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<Attempted<T>, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = RetryStep<T, E>>,
    {
        let max_attempts = self.max_attempts();
        let mut current = 0u32;
        loop {
            current = current.saturating_add(1);
            match attempt(current).await {
                RetryStep::Done(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: current,
                    });
                }
                RetryStep::Retry(last) => {
                    if current >= max_attempts {
                        return Err(RetryExhausted {
                            attempts: current,
                            last,
                        });
                    }
                    debug!(attempt = current, max_attempts, "attempt failed, retrying");
                    sleep(self.interval).await;
                }
            }
        }
    }
}

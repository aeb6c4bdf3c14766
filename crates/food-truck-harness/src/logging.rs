// crates/food-truck-harness/src/logging.rs
// ============================================================================
// Module: Logging
// Description: tracing subscriber setup for tests and the env binary.
// Purpose: One place to configure filters and output targets.
// Dependencies: tracing-subscriber
// ============================================================================

//! Subscriber installation for harness logging.

use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// libtest-captured output; shown only for failing tests.
    TestWriter,
    /// Process stderr.
    Stderr,
}

/// Installs a global fmt subscriber honoring `RUST_LOG`.
///
/// Falls back to `default_directive` when `RUST_LOG` is unset or invalid.
/// Returns false when a subscriber was already installed, which is expected
/// when several tests share a process.
pub fn init_logging(default_directive: &str, target: LogTarget) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match target {
        LogTarget::TestWriter => builder.with_test_writer().try_init().is_ok(),
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init().is_ok(),
    }
}

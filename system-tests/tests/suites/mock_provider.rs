// system-tests/tests/suites/mock_provider.rs
// ============================================================================
// Module: Mock Provider Suite
// Description: Permit-status happy path, payload shape, and negative routes.
// Purpose: Verify the mock provider honours its contract directly.
// Dependencies: system-tests helpers
// ============================================================================

//! Direct mock provider checks.

use helpers::artifacts::CheckResult;
use helpers::artifacts::TestReporter;
use helpers::checks;
use helpers::session::live_target;

use crate::helpers;

const FEATURE: &str = "Infrastructure";

#[tokio::test(flavor = "multi_thread")]
async fn mock_direct() -> CheckResult {
    let mut reporter = TestReporter::labelled("mock_direct", FEATURE, "Direct Mock Verification")?;
    let target = live_target().await?;
    let outcome = checks::mock_authorized(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_schema_validation() -> CheckResult {
    let mut reporter = TestReporter::labelled("mock_schema_validation", FEATURE, "Data Integrity")?;
    let target = live_target().await?;
    let outcome = checks::mock_schema(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_rejects_missing_key() -> CheckResult {
    let mut reporter = TestReporter::labelled("mock_rejects_missing_key", FEATURE, "Security")?;
    let target = live_target().await?;
    let outcome = checks::mock_missing_key(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_rejects_invalid_key() -> CheckResult {
    let mut reporter = TestReporter::labelled("mock_rejects_invalid_key", FEATURE, "Security")?;
    let target = live_target().await?;
    let outcome = checks::mock_invalid_key(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_not_found() -> CheckResult {
    let mut reporter = TestReporter::labelled("mock_not_found", FEATURE, "Negative Testing")?;
    let target = live_target().await?;
    let outcome = checks::mock_unknown_route(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

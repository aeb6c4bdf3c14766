// system-tests/tests/suites/edge_cases.rs
// ============================================================================
// Module: Edge Case Suite
// Description: Coordinate boundaries, latency budget, and character encoding.
// Purpose: Probe the search endpoint at the limits of its input contract.
// Dependencies: system-tests helpers
// ============================================================================

//! Performance and edge-case checks against the live container.

use helpers::artifacts::CheckResult;
use helpers::artifacts::TestReporter;
use helpers::checks;
use helpers::session::live_target;

use crate::helpers;

const FEATURE: &str = "Performance & Edge Cases";

async fn boundary_case(test_name: &str, lat: f64, lon: f64) -> CheckResult {
    let mut reporter = TestReporter::labelled(test_name, FEATURE, "Coordinate Boundary Testing")?;
    let target = live_target().await?;
    let outcome = checks::coordinate_boundary(&target, &mut reporter, lat, lon).await;
    reporter.conclude(&target.transcript(), outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn coordinate_upper_bounds_accepted() -> CheckResult {
    boundary_case("coordinate_upper_bounds_accepted", 90.0, 180.0).await
}

#[tokio::test(flavor = "multi_thread")]
async fn coordinate_lower_bounds_accepted() -> CheckResult {
    boundary_case("coordinate_lower_bounds_accepted", -90.0, -180.0).await
}

#[tokio::test(flavor = "multi_thread")]
async fn latitude_past_bound_rejected() -> CheckResult {
    boundary_case("latitude_past_bound_rejected", 90.1, 0.0).await
}

#[tokio::test(flavor = "multi_thread")]
async fn longitude_past_bound_rejected() -> CheckResult {
    boundary_case("longitude_past_bound_rejected", 0.0, 180.1).await
}

#[tokio::test(flavor = "multi_thread")]
async fn api_latency_threshold() -> CheckResult {
    let mut reporter = TestReporter::labelled("api_latency_threshold", FEATURE, "Latency Threshold")?;
    let target = live_target().await?;
    let outcome = checks::latency_under_budget(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn non_ascii_search() -> CheckResult {
    let mut reporter = TestReporter::labelled("non_ascii_search", FEATURE, "Character Encoding")?;
    let target = live_target().await?;
    let outcome = checks::non_ascii_search(&target, &mut reporter).await;
    reporter.conclude(&target.transcript(), outcome)
}

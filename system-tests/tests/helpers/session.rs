// system-tests/tests/helpers/session.rs
// ============================================================================
// Module: Live Session
// Description: Once-per-process bootstrap shared by every live test.
// Purpose: Build and start the API container before any live check runs.
// Dependencies: food-truck-harness, system-tests, tokio, url
// ============================================================================

//! ## Overview
//! The first live test to call [`live_target`] runs the bootstrap; every
//! other test waits on the same cell and receives the same outcome. The cell
//! is per process, so every live suite is aggregated into one test binary.
//! A failed bootstrap is cached, so every later test fails immediately with
//! the same diagnostic instead of running against an unready service. The
//! container is left running; `food-truck-env down` removes it.

use std::sync::Arc;

use food_truck_harness::BootstrapPlan;
use food_truck_harness::Bootstrapper;
use food_truck_harness::ContainerRuntime;
use food_truck_harness::DockerCli;
use food_truck_harness::ReadinessPolicy;
use food_truck_harness::ServiceInstance;
use food_truck_harness::TcpProbe;
use food_truck_harness::logging::LogTarget;
use food_truck_harness::logging::init_logging;
use food_truck_harness::wait_until_ready;
use system_tests::config::SystemTestConfig;
use tokio::sync::OnceCell;
use tracing::info;
use url::Url;

use super::target::ContractTarget;
use super::target::TargetBudgets;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_DIRECTIVE: &str = "info,food_truck_harness=debug";

/// Cell holding one session outcome, failures included.
pub type SessionCell = OnceCell<Result<Arc<LiveSession>, String>>;

/// Session outcome shared by every live test in the process.
static SESSION: SessionCell = OnceCell::const_new();

/// Bootstrapped environment.
#[derive(Debug)]
pub struct LiveSession {
    /// Loaded configuration.
    pub config: SystemTestConfig,
    /// Container started by this session, when bootstrapping was not skipped.
    pub instance: Option<ServiceInstance>,
}

/// Returns the session, bootstrapping it on first use.
pub async fn live_session() -> Result<Arc<LiveSession>, String> {
    shared_session(&SESSION, || async {
        init_logging(DEFAULT_LOG_DIRECTIVE, LogTarget::TestWriter);
        let config = SystemTestConfig::load()?;
        let plan = BootstrapPlan::rooted_at(&config.project_root);
        start_session(config, DockerCli::default(), plan).await
    })
    .await
}

/// Returns a fresh contract target for the live session.
pub async fn live_target() -> Result<ContractTarget, String> {
    let session = live_session().await?;
    let config = &session.config;
    ContractTarget::new(
        &config.api_base_url,
        config.mock_provider_endpoint(),
        TargetBudgets::live(config),
    )
    .map_err(|err| err.to_string())
}

/// Runs `init` at most once for `cell`; concurrent callers wait for it and
/// every caller receives the same outcome.
pub async fn shared_session<F, Fut>(cell: &SessionCell, init: F) -> Result<Arc<LiveSession>, String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<LiveSession>, String>>,
{
    cell.get_or_init(init).await.clone()
}

/// Bootstraps through `runtime`, or only awaits the API when bootstrapping
/// is skipped.
pub async fn start_session<R: ContainerRuntime>(
    config: SystemTestConfig,
    runtime: R,
    plan: BootstrapPlan,
) -> Result<Arc<LiveSession>, String> {
    info!(
        api = %config.api_base_url,
        context = %config.execution_context,
        skip_bootstrap = config.skip_bootstrap,
        "starting live session"
    );
    let instance = if config.skip_bootstrap {
        await_existing_api(&config.api_base_url).await?;
        None
    } else {
        let instance = Bootstrapper::new(runtime, plan).run().await.map_err(|err| {
            format!(
                "session bootstrap failed at {} (instance {}): {err}",
                err.stage(),
                err.instance_state().as_str()
            )
        })?;
        info!(
            container = instance.container_name(),
            state = instance.state().as_str(),
            "live session ready"
        );
        Some(instance)
    };
    Ok(Arc::new(LiveSession {
        config,
        instance,
    }))
}

/// Waits for an externally managed API to accept connections.
async fn await_existing_api(api_base_url: &str) -> Result<(), String> {
    let url = Url::parse(api_base_url).map_err(|err| format!("invalid API_BASE_URL: {err}"))?;
    let host = url.host_str().ok_or("API_BASE_URL has no host")?.to_string();
    let port = url.port_or_known_default().ok_or("API_BASE_URL has no port")?;
    let probe = TcpProbe::new(host, port);
    wait_until_ready(&probe, &ReadinessPolicy::default())
        .await
        .map(|_| ())
        .map_err(|err| format!("session readiness failed: {err}"))
}

// crates/food-truck-harness/src/bootstrap.rs
// ============================================================================
// Module: Environment Bootstrapper
// Description: Session setup state machine for the API container.
// Purpose: Validate fixtures, rebuild, relaunch, and await the service once.
// Dependencies: thiserror, tracing, crate::runtime, crate::readiness
// ============================================================================

//! ## Overview
//! [`Bootstrapper::run`] walks
//! `START -> VALIDATE_FIXTURES -> CLEAN_PRIOR -> BUILD_IMAGE -> RUN_CONTAINER
//! -> AWAIT_READY -> READY` exactly once. Every stage except `CLEAN_PRIOR` is
//! terminal on failure; cleanup errors are swallowed because an absent prior
//! container is the normal case. The [`InstanceState`] advances alongside the
//! stages and a [`BootstrapError`] reports the last state reached.
//! Invariants:
//! - At most one container with the configured name exists; the cleanup stage
//!   force-removes any previous instance before a new build.
//! - No stage runs after a failed stage.
//! - The bootstrapper never tears the container down; see [`teardown`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::readiness::ReadinessPolicy;
use crate::readiness::ReadinessTimeout;
use crate::readiness::TcpProbe;
use crate::readiness::wait_until_ready;
use crate::runtime::ContainerRuntime;
use crate::runtime::RuntimeError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixture CSV the API image is seeded from, relative to the build context.
pub const DEFAULT_FIXTURE_PATH: &str = "data/Mobile_Food_Facility_Permit.csv";
/// Image tag built for the API.
pub const DEFAULT_IMAGE_NAME: &str = "foodtrucksapi";
/// Fixed container name; at most one instance exists at a time.
pub const DEFAULT_CONTAINER_NAME: &str = "foodtrucks-container";
/// API port published to the same host port.
pub const DEFAULT_API_PORT: u16 = 5000;
/// Host the readiness probe connects to.
pub const DEFAULT_PROBE_HOST: &str = "localhost";

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Inputs for one bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    /// Fixture file that must exist before building.
    pub fixture_path: PathBuf,
    /// Directory holding the image build description.
    pub build_context: PathBuf,
    /// Image tag to build.
    pub image_name: String,
    /// Container name to (re)create.
    pub container_name: String,
    /// Port published by the container and probed for readiness.
    pub api_port: u16,
    /// Host used by the readiness probe.
    pub probe_host: String,
    /// Readiness polling budget.
    pub readiness: ReadinessPolicy,
}

impl Default for BootstrapPlan {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

impl BootstrapPlan {
    /// Builds the default plan with fixture and build context under `root`.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            fixture_path: root.join(DEFAULT_FIXTURE_PATH),
            build_context: root.to_path_buf(),
            image_name: DEFAULT_IMAGE_NAME.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            api_port: DEFAULT_API_PORT,
            probe_host: DEFAULT_PROBE_HOST.to_string(),
            readiness: ReadinessPolicy::default(),
        }
    }

    /// Base URL of the API once the container is ready.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.probe_host, self.api_port)
    }
}

// ============================================================================
// SECTION: Stages
// ============================================================================

/// Bootstrap state machine stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BootstrapStage {
    /// Nothing has run yet.
    Start,
    /// Checking the fixture file.
    ValidateFixtures,
    /// Removing any prior container.
    CleanPrior,
    /// Building the image.
    BuildImage,
    /// Launching the container.
    RunContainer,
    /// Polling for readiness.
    AwaitReady,
    /// Service is ready for tests.
    Ready,
}

impl BootstrapStage {
    /// Stable upper-case label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::ValidateFixtures => "VALIDATE_FIXTURES",
            Self::CleanPrior => "CLEAN_PRIOR",
            Self::BuildImage => "BUILD_IMAGE",
            Self::RunContainer => "RUN_CONTAINER",
            Self::AwaitReady => "AWAIT_READY",
            Self::Ready => "READY",
        }
    }
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Service Instance
// ============================================================================

/// Lifecycle state of the service under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// No container has been launched by this run.
    Absent,
    /// Image build started; no container launched yet.
    Building,
    /// Container launched but not yet confirmed ready.
    Running,
    /// Container accepted connections and the grace period elapsed.
    Ready,
}

impl InstanceState {
    /// Lower-case label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Building => "building",
            Self::Running => "running",
            Self::Ready => "ready",
        }
    }
}

/// The running container under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    /// Image the container was started from.
    image_name: String,
    /// Container name.
    container_name: String,
    /// Published API port.
    port: u16,
    /// Base URL for API requests.
    base_url: String,
    /// Lifecycle state.
    state: InstanceState,
    /// Stages visited while bootstrapping.
    stages: Vec<BootstrapStage>,
}

impl ServiceInstance {
    /// Image name.
    #[must_use]
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// Container name.
    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Published API port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> InstanceState {
        self.state
    }

    /// Stages visited while bootstrapping, in order.
    #[must_use]
    pub fn stages(&self) -> &[BootstrapStage] {
        &self.stages
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session-fatal bootstrap failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The fixture data file is missing.
    #[error(
        "fixture file not found: {}; make sure the CSV is inside a folder named 'data'",
        .path.display()
    )]
    MissingFixture {
        /// Expected fixture location.
        path: PathBuf,
    },
    /// The image build did not succeed.
    #[error("image build for `{image}` failed: {source}")]
    BuildFailed {
        /// Image tag being built.
        image: String,
        /// Runtime failure.
        #[source]
        source: RuntimeError,
    },
    /// The container could not be launched.
    #[error("container `{container}` failed to launch: {source}")]
    LaunchFailed {
        /// Container name.
        container: String,
        /// Runtime failure.
        #[source]
        source: RuntimeError,
    },
    /// The service never accepted connections.
    #[error(transparent)]
    ReadinessTimeout(#[from] ReadinessTimeout),
}

impl BootstrapError {
    /// Last lifecycle state reached before the failure.
    #[must_use]
    pub const fn instance_state(&self) -> InstanceState {
        match self {
            Self::MissingFixture {
                ..
            } => InstanceState::Absent,
            Self::BuildFailed {
                ..
            }
            | Self::LaunchFailed {
                ..
            } => InstanceState::Building,
            Self::ReadinessTimeout(_) => InstanceState::Running,
        }
    }

    /// Stage at which the bootstrap failed.
    #[must_use]
    pub const fn stage(&self) -> BootstrapStage {
        match self {
            Self::MissingFixture {
                ..
            } => BootstrapStage::ValidateFixtures,
            Self::BuildFailed {
                ..
            } => BootstrapStage::BuildImage,
            Self::LaunchFailed {
                ..
            } => BootstrapStage::RunContainer,
            Self::ReadinessTimeout(_) => BootstrapStage::AwaitReady,
        }
    }
}

// ============================================================================
// SECTION: Bootstrapper
// ============================================================================

/// Runs the bootstrap state machine against a container runtime.
pub struct Bootstrapper<R> {
    /// Container runtime.
    runtime: R,
    /// Bootstrap inputs.
    plan: BootstrapPlan,
    /// Stages entered so far.
    stages: Vec<BootstrapStage>,
    /// Current lifecycle state.
    state: InstanceState,
}

impl<R: ContainerRuntime> Bootstrapper<R> {
    /// Creates a bootstrapper for `plan`.
    pub const fn new(runtime: R, plan: BootstrapPlan) -> Self {
        Self {
            runtime,
            plan,
            stages: Vec::new(),
            state: InstanceState::Absent,
        }
    }

    /// Records and logs a stage transition.
    fn enter(&mut self, stage: BootstrapStage) {
        info!(stage = %stage, container = %self.plan.container_name, "bootstrap stage");
        self.stages.push(stage);
    }

    /// Advances the lifecycle state.
    fn transition(&mut self, state: InstanceState) {
        debug!(from = self.state.as_str(), to = state.as_str(), "instance state");
        self.state = state;
    }

    /// Runs every stage in order and returns the ready instance.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError`] on the first failing stage other than
    /// cleanup; no later stage runs.
    pub async fn run(mut self) -> Result<ServiceInstance, BootstrapError> {
        self.enter(BootstrapStage::Start);

        self.enter(BootstrapStage::ValidateFixtures);
        if !self.plan.fixture_path.exists() {
            error!(path = %self.plan.fixture_path.display(), "fixture file missing");
            return Err(BootstrapError::MissingFixture {
                path: self.plan.fixture_path.clone(),
            });
        }

        self.enter(BootstrapStage::CleanPrior);
        if let Err(err) = self.runtime.remove_container(&self.plan.container_name).await {
            debug!(error = %err, "no prior container removed");
        }

        self.enter(BootstrapStage::BuildImage);
        self.transition(InstanceState::Building);
        info!(
            image = %self.plan.image_name,
            context = %self.plan.build_context.display(),
            "building image"
        );
        self.runtime.build_image(&self.plan.image_name, &self.plan.build_context).await.map_err(
            |source| BootstrapError::BuildFailed {
                image: self.plan.image_name.clone(),
                source,
            },
        )?;

        self.enter(BootstrapStage::RunContainer);
        self.runtime
            .run_container(&self.plan.image_name, &self.plan.container_name, self.plan.api_port)
            .await
            .map_err(|source| BootstrapError::LaunchFailed {
                container: self.plan.container_name.clone(),
                source,
            })?;
        self.transition(InstanceState::Running);

        self.enter(BootstrapStage::AwaitReady);
        let probe = TcpProbe::new(self.plan.probe_host.clone(), self.plan.api_port);
        wait_until_ready(&probe, &self.plan.readiness).await?;

        self.enter(BootstrapStage::Ready);
        self.transition(InstanceState::Ready);
        Ok(ServiceInstance {
            image_name: self.plan.image_name.clone(),
            container_name: self.plan.container_name.clone(),
            port: self.plan.api_port,
            base_url: self.plan.base_url(),
            state: self.state,
            stages: self.stages,
        })
    }
}

// ============================================================================
// SECTION: Teardown
// ============================================================================

/// Force-removes the named container.
///
/// Bootstrapping never calls this; the next session's cleanup stage removes
/// the previous instance instead.
///
/// # Errors
///
/// Returns [`RuntimeError`] when the runtime reports a failure.
pub async fn teardown<R>(runtime: &R, container_name: &str) -> Result<(), RuntimeError>
where
    R: ContainerRuntime + ?Sized,
{
    info!(container = %container_name, "tearing down container");
    runtime.remove_container(container_name).await
}

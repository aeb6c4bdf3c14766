// system-tests/src/bin/food_truck_env.rs
// ============================================================================
// Module: Food Truck Environment Tool
// Description: Manual control of the API container used by the system tests.
// Purpose: Bring the environment up, tear it down, and report its status.
// Dependencies: clap, food-truck-harness, system-tests, thiserror, tokio
// ============================================================================

//! ## Overview
//! `food-truck-env up` runs the same bootstrap sequence as the test session.
//! `down` is the explicit teardown the session never performs on its own.
//! `status` probes the API port once and asks the runtime whether the
//! container is running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use food_truck_harness::BootstrapPlan;
use food_truck_harness::Bootstrapper;
use food_truck_harness::ContainerRuntime;
use food_truck_harness::DockerCli;
use food_truck_harness::TcpProbe;
use food_truck_harness::bootstrap::DEFAULT_API_PORT;
use food_truck_harness::bootstrap::DEFAULT_CONTAINER_NAME;
use food_truck_harness::bootstrap::DEFAULT_PROBE_HOST;
use food_truck_harness::logging::LogTarget;
use food_truck_harness::logging::init_logging;
use food_truck_harness::teardown;
use system_tests::config::SystemTestConfig;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "food-truck-env", disable_help_subcommand = true)]
struct Cli {
    /// Docker-compatible binary to invoke.
    #[arg(long, value_name = "PROGRAM", default_value = "docker", global = true)]
    runtime: String,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate fixtures, rebuild the image, start the container, and wait.
    Up(UpCommand),
    /// Force-remove the API container.
    Down(ContainerArgs),
    /// Report readiness and container state.
    Status(ContainerArgs),
}

/// Options for `up`.
#[derive(Args, Debug)]
struct UpCommand {
    /// Build context holding `data/` (defaults to the configured project root).
    #[arg(long, value_name = "PATH")]
    project_root: Option<PathBuf>,
    /// Readiness attempts before giving up.
    #[arg(long, value_name = "N")]
    attempts: Option<u32>,
}

/// Container selection shared by `down` and `status`.
#[derive(Args, Debug)]
struct ContainerArgs {
    /// Container name.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_CONTAINER_NAME)]
    container: String,
    /// Published API port.
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_API_PORT)]
    port: u16,
}

/// CLI failure carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Wraps any displayable error with context.
    fn context(context: &str, err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("{context}: {err}"),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    init_logging("info", LogTarget::Stderr);
    match run().await {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("food-truck-env: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// Executes the command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let runtime = DockerCli::new(cli.runtime);
    match cli.command {
        Commands::Up(command) => command_up(runtime, command).await,
        Commands::Down(args) => command_down(&runtime, &args).await,
        Commands::Status(args) => command_status(&runtime, &args).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Connect bound for the single `status` probe.
const STATUS_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Runs the bootstrap sequence once.
async fn command_up(runtime: DockerCli, command: UpCommand) -> CliResult<ExitCode> {
    let config = SystemTestConfig::load().map_err(|err| CliError::context("config", err))?;
    let root = command.project_root.unwrap_or(config.project_root);
    let mut plan = BootstrapPlan::rooted_at(&root);
    if let Some(attempts) = command.attempts {
        plan.readiness.attempts = attempts;
    }
    let instance = Bootstrapper::new(runtime, plan)
        .run()
        .await
        .map_err(|err| {
            let label =
                format!("bootstrap failed at {} (instance {})", err.stage(), err.instance_state().as_str());
            CliError::context(&label, err)
        })?;
    write_stdout_line(&format!(
        "{}: {} (container {}, image {})",
        instance.state().as_str(),
        instance.base_url(),
        instance.container_name(),
        instance.image_name()
    ))?;
    Ok(ExitCode::SUCCESS)
}

/// Removes the container.
async fn command_down(runtime: &DockerCli, args: &ContainerArgs) -> CliResult<ExitCode> {
    teardown(runtime, &args.container)
        .await
        .map_err(|err| CliError::context("teardown failed", err))?;
    write_stdout_line(&format!("removed: {}", args.container))?;
    Ok(ExitCode::SUCCESS)
}

/// Reports container and port state; exits non-zero when not ready.
async fn command_status(runtime: &DockerCli, args: &ContainerArgs) -> CliResult<ExitCode> {
    let running = match runtime.container_running(&args.container).await {
        Ok(running) => running.to_string(),
        Err(err) => format!("unknown ({err})"),
    };
    let ready = TcpProbe::new(DEFAULT_PROBE_HOST, args.port)
        .with_connect_timeout(STATUS_CONNECT_TIMEOUT)
        .is_ready()
        .await;
    write_stdout_line(&format!("container {}: running={running}", args.container))?;
    write_stdout_line(&format!("port {}: ready={ready}", args.port))?;
    if let Ok(config) = SystemTestConfig::load() {
        write_stdout_line(&format!(
            "mock provider ({}): {}",
            config.execution_context,
            config.mock_provider_endpoint().permit_status_url()
        ))?;
    }
    Ok(if ready { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::context("stdout", err))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for the food-truck harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: food-truck-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed. The execution
//! context is resolved once at load time so individual tests never probe the
//! filesystem themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use food_truck_harness::ExecutionContext;
use food_truck_harness::MockProviderEndpoint;
use food_truck_harness::SqliteHelper;
use food_truck_harness::db::DEFAULT_DATABASE_PATH;
use food_truck_harness::endpoint::CONTAINER_MARKER;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// API base URL used when `API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Returns the workspace root, used as project root when none is configured.
///
/// libtest runs each binary from its package directory, so a relative default
/// would resolve under `system-tests/` instead of the repository root.
#[must_use]
pub fn default_project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Base URL of the API under test.
    ApiBaseUrl,
    /// SQLite database path for the storage helper.
    DatabasePath,
    /// Optional artifact run root override.
    RunRoot,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Execution context: `host`, `container`, or `auto`.
    ExecutionContext,
    /// Optional explicit mock provider base URL.
    MockProviderUrl,
    /// Skip the container bootstrap (`true`/`false` or `1`/`0`).
    SkipBootstrap,
    /// Directory holding the API build context and `data/` fixtures.
    ProjectRoot,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiBaseUrl => "API_BASE_URL",
            Self::DatabasePath => "DATABASE_PATH",
            Self::RunRoot => "FOOD_TRUCK_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "FOOD_TRUCK_SYSTEM_TEST_TIMEOUT_SEC",
            Self::ExecutionContext => "FOOD_TRUCK_SYSTEM_TEST_EXECUTION_CONTEXT",
            Self::MockProviderUrl => "FOOD_TRUCK_SYSTEM_TEST_MOCK_PROVIDER_URL",
            Self::SkipBootstrap => "FOOD_TRUCK_SYSTEM_TEST_SKIP_BOOTSTRAP",
            Self::ProjectRoot => "FOOD_TRUCK_SYSTEM_TEST_PROJECT_ROOT",
        }
    }

    /// Every key, in declaration order.
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::ApiBaseUrl,
            Self::DatabasePath,
            Self::RunRoot,
            Self::TimeoutSeconds,
            Self::ExecutionContext,
            Self::MockProviderUrl,
            Self::SkipBootstrap,
            Self::ProjectRoot,
        ]
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestConfig {
    /// Base URL of the API under test, without a trailing slash.
    pub api_base_url: String,
    /// SQLite database path.
    pub database_path: PathBuf,
    /// Optional artifact run root override.
    pub run_root: Option<PathBuf>,
    /// Optional timeout override; acts as a minimum for request timeouts.
    pub timeout: Option<Duration>,
    /// Where the test process runs, resolved once.
    pub execution_context: ExecutionContext,
    /// Explicit mock provider base URL, bypassing context resolution.
    pub mock_provider_url: Option<String>,
    /// Use an already-running API instead of building a container.
    pub skip_bootstrap: bool,
    /// API build context and fixture root; defaults to the workspace root.
    pub project_root: PathBuf,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        Self::load_with_marker(Path::new(CONTAINER_MARKER))
    }

    /// Loads configuration, probing `marker` when the context is `auto`.
    ///
    /// # Errors
    ///
    /// Same as [`SystemTestConfig::load`].
    pub fn load_with_marker(marker: &Path) -> Result<Self, String> {
        let api_base_url = read_env_nonempty(SystemTestEnv::ApiBaseUrl.as_str())?
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let database_path = read_env_nonempty(SystemTestEnv::DatabasePath.as_str())?
            .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from);
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let execution_context = parse_execution_context(
            SystemTestEnv::ExecutionContext.as_str(),
            read_env_nonempty(SystemTestEnv::ExecutionContext.as_str())?,
            marker,
        )?;
        let mock_provider_url = read_env_nonempty(SystemTestEnv::MockProviderUrl.as_str())?;
        let skip_bootstrap = parse_bool_env(
            SystemTestEnv::SkipBootstrap.as_str(),
            read_env_nonempty(SystemTestEnv::SkipBootstrap.as_str())?,
        )?;
        let project_root = read_env_nonempty(SystemTestEnv::ProjectRoot.as_str())?
            .map_or_else(default_project_root, PathBuf::from);
        Ok(Self {
            api_base_url,
            database_path,
            run_root,
            timeout,
            execution_context,
            mock_provider_url,
            skip_bootstrap,
            project_root,
        })
    }

    /// Mock provider endpoint: the explicit URL when set, else the context's.
    #[must_use]
    pub fn mock_provider_endpoint(&self) -> MockProviderEndpoint {
        self.mock_provider_url.as_deref().map_or_else(
            || MockProviderEndpoint::resolve(self.execution_context),
            MockProviderEndpoint::from_base_url,
        )
    }

    /// Database helper bound to the configured path.
    #[must_use]
    pub fn database(&self) -> SqliteHelper {
        SqliteHelper::new(Some(&self.database_path))
    }

    /// Returns the effective timeout; the override acts as a minimum so an
    /// explicitly longer timeout is never shortened.
    #[must_use]
    pub fn resolve_timeout(&self, requested: Duration) -> Duration {
        self.timeout.map_or(requested, |floor| requested.max(floor))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable; unset means false.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

/// Parses the execution context; unset or `auto` probes `marker`.
///
/// # Errors
///
/// Returns an error for values other than `host`, `container`, or `auto`.
fn parse_execution_context(
    name: &str,
    raw: Option<String>,
    marker: &Path,
) -> Result<ExecutionContext, String> {
    match raw {
        None => Ok(ExecutionContext::detect(marker)),
        Some(value) if value.trim().eq_ignore_ascii_case("auto") => {
            Ok(ExecutionContext::detect(marker))
        }
        Some(value) => value.parse().map_err(|err| format!("{name}: {err}")),
    }
}

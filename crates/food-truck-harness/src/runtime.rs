// crates/food-truck-harness/src/runtime.rs
// ============================================================================
// Module: Container Runtime
// Description: Container lifecycle seam and its Docker CLI implementation.
// Purpose: Keep the bootstrapper independent of the concrete runtime.
// Dependencies: async-trait, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`ContainerRuntime`] is the narrow set of lifecycle operations the
//! bootstrapper needs. [`DockerCli`] shells out to the `docker` binary.
//! Image builds inherit stdio so build output stays visible; every other
//! command captures output so failures can quote stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::process::Output;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Container runtime failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime binary could not be started.
    #[error("failed to invoke `{command}`: {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The runtime command ran but reported failure.
    #[error("`{command}` exited with {status}: {detail}")]
    NonZeroExit {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stderr, or a pointer to inherited output.
        detail: String,
    },
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Container lifecycle operations used by the bootstrapper.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Force-removes the named container.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when no such container exists or the runtime
    /// cannot be reached.
    async fn remove_container(&self, name: &str) -> Result<(), RuntimeError>;

    /// Builds and tags an image from a build context directory.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the build does not succeed.
    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), RuntimeError>;

    /// Starts a detached container publishing `port` on the same host port.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the container cannot be launched.
    async fn run_container(&self, image: &str, name: &str, port: u16) -> Result<(), RuntimeError>;

    /// Reports whether the named container is running.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the container cannot be inspected.
    async fn container_running(&self, name: &str) -> Result<bool, RuntimeError>;
}

// ============================================================================
// SECTION: Docker CLI
// ============================================================================

/// [`ContainerRuntime`] backed by the `docker` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCli {
    /// Program name or path of the docker binary.
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerCli {
    /// Uses an explicit docker-compatible binary (for example `podman`).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Renders a command line for diagnostics.
    fn render(&self, args: &[&str]) -> String {
        let mut rendered = self.program.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    /// Runs a command with captured output.
    async fn captured(&self, args: &[&str]) -> Result<Output, RuntimeError> {
        let command = self.render(args);
        debug!(command = %command, "invoking container runtime");
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                command,
                source,
            })
    }

    /// Runs a command with captured output and requires success.
    async fn captured_success(&self, args: &[&str]) -> Result<Output, RuntimeError> {
        let output = self.captured(args).await?;
        if output.status.success() {
            return Ok(output);
        }
        Err(RuntimeError::NonZeroExit {
            command: self.render(args),
            status: output.status.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
        self.captured_success(&["rm", "-f", name]).await.map(|_| ())
    }

    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), RuntimeError> {
        let context = context.to_string_lossy().into_owned();
        let args = ["build", "-t", tag, context.as_str()];
        let command = self.render(&args);
        debug!(command = %command, "invoking container runtime");
        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| RuntimeError::Spawn {
                command: command.clone(),
                source,
            })?;
        if status.success() {
            return Ok(());
        }
        Err(RuntimeError::NonZeroExit {
            command,
            status: status.to_string(),
            detail: "build output was streamed to the terminal".to_string(),
        })
    }

    async fn run_container(&self, image: &str, name: &str, port: u16) -> Result<(), RuntimeError> {
        let mapping = format!("{port}:{port}");
        self.captured_success(&["run", "-d", "--name", name, "-p", mapping.as_str(), image])
            .await
            .map(|_| ())
    }

    async fn container_running(&self, name: &str) -> Result<bool, RuntimeError> {
        let output =
            self.captured_success(&["inspect", "-f", "{{.State.Running}}", name]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
    }
}

// crates/food-truck-harness/src/lib.rs
// ============================================================================
// Module: Food Truck Harness Library
// Description: Reusable mechanisms for black-box contract testing.
// Purpose: Bootstrap the API container and verify its HTTP contracts.
// Dependencies: async-trait, reqwest, rusqlite, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! This crate provides the building blocks of the food-truck system tests:
//! a bounded [`RetryPolicy`], a TCP [`readiness`] prober, the
//! [`ContainerRuntime`] seam with a Docker CLI implementation, the session
//! [`Bootstrapper`], the mock-provider [`MockProviderEndpoint`] resolver, an
//! HTTP [`ContractClient`], and the assertion helpers in [`contract`].
//! Invariants:
//! - Configuration is injected by callers; the library never reads process
//!   environment on its own (the marker probe in [`ExecutionContext::detect`]
//!   is an explicit call).
//! - Every network call carries an explicit timeout.
//! - Bootstrap failures are terminal; later stages never run after a failure.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bootstrap;
pub mod client;
pub mod contract;
pub mod db;
pub mod endpoint;
pub mod logging;
pub mod models;
pub mod readiness;
pub mod retry;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bootstrap::BootstrapError;
pub use bootstrap::BootstrapPlan;
pub use bootstrap::BootstrapStage;
pub use bootstrap::Bootstrapper;
pub use bootstrap::InstanceState;
pub use bootstrap::ServiceInstance;
pub use bootstrap::teardown;
pub use client::ContractClient;
pub use client::HttpExchange;
pub use client::TranscriptEntry;
pub use contract::ContractError;
pub use contract::CoordinateBounds;
pub use contract::OpenApiDocument;
pub use contract::SearchQuery;
pub use db::DbError;
pub use db::SqliteHelper;
pub use endpoint::ExecutionContext;
pub use endpoint::MockProviderEndpoint;
pub use models::FoodTruckRecord;
pub use models::PermitStatus;
pub use readiness::ReadinessPolicy;
pub use readiness::ReadinessTimeout;
pub use readiness::TcpProbe;
pub use readiness::is_ready;
pub use readiness::wait_until_ready;
pub use retry::RetryExhausted;
pub use retry::RetryPolicy;
pub use retry::RetryStep;
pub use runtime::ContainerRuntime;
pub use runtime::DockerCli;
pub use runtime::RuntimeError;

// ============================================================================
// SECTION: Tests
// ============================================================================

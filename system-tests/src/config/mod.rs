// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for the food-truck system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: food-truck-harness
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! a small typed structure shared by the session fixture, the reporters, and
//! the `food-truck-env` binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::DEFAULT_API_BASE_URL;
pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::default_project_root;
pub use env::read_env_strict;

// system-tests/src/lib.rs
// ============================================================================
// Module: Food Truck System Tests Library
// Description: Shared configuration for the food-truck system tests.
// Purpose: Give test binaries and the env tool one configuration source.
// Dependencies: food-truck-harness
// ============================================================================

//! ## Overview
//! This crate hosts the environment-backed configuration used by the
//! food-truck system tests in `system-tests/tests` and by the
//! `food-truck-env` binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

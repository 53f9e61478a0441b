//! Shared test utilities for azmigrate integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs over a temporary working directory
//! - Fixture builders for configuration text and planner values

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;

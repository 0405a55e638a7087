//! # Sect Test Utilities
//!
//! Shared testing utilities for the simulation:
//! - Determinism test harness
//! - State fixtures
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;

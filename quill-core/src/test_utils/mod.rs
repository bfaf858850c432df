//! Test utilities shared by unit and integration tests
//!
//! Builders for the domain types plus helpers that render them the way the
//! API serves them.

pub mod fixtures;

pub use fixtures::*;

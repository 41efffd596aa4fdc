//! Common test utilities for topology-engine
//!
//! Shared fixtures and assertions for integration tests.

#![allow(dead_code)]

mod assertions;
mod fixtures;

pub use assertions::*;
pub use fixtures::*;

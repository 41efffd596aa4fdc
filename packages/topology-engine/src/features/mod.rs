//! Feature modules
//!
//! Dependency order: schema → model → generator / session → query_engine →
//! statistics.

pub mod generator;
pub mod model;
pub mod query_engine;
pub mod schema;
pub mod session;
pub mod statistics;

//! Shared utilities

pub mod deadline;

pub use deadline::Deadline;

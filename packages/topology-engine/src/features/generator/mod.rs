//! Topology Generator Feature
//!
//! Round-robin fan-out of a synthetic infrastructure hierarchy.

mod catalog;
pub mod generator;

pub use generator::{GeneratedTopology, TopologyGenerator};

//! Session Feature
//!
//! The single write path into a graph store, and the loader for snapshots.

pub mod session;

pub use session::{ImportReport, TopologySession};

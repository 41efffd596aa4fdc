//! Query engine infrastructure: snapshot index and traversal

pub mod graph_index;
pub(crate) mod traversal_engine;

pub use graph_index::{GraphSnapshot, SkippedRecord};

//! Traversal & Query Engine Feature
//!
//! ```text
//! query_engine.rs (public operations on GraphSnapshot)
//!           ↓
//! domain/ (paths, subgraphs)
//!           ↓
//! infrastructure/ (snapshot index, BFS)
//! ```
//!
//! # Usage
//! ```ignore
//! let snapshot = session.load_snapshot().await?;
//! if let Some(path) = snapshot.shortest_path(&pod_id, &switch_id)? {
//!     println!("{} hops through {:?}", path.hops(), path.layers());
//! }
//! let compute = snapshot.layer_subgraph(ProjectionLayer::Compute);
//! ```

pub mod domain;
pub mod infrastructure;
mod query_engine;

pub use domain::{Direction, PathHop, PathStep, Subgraph, TopologyPath};
pub use infrastructure::{GraphSnapshot, SkippedRecord};

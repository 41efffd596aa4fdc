//! Schema Feature
//!
//! Kinds, hierarchy layers and the relationship allow-list.

pub mod kinds;
pub mod layers;
pub mod registry;

pub use kinds::{EntityKind, RelationshipKind};
pub use layers::{InfrastructureLayer, ProjectionLayer};
pub use registry::{EndpointPair, SchemaRegistry};

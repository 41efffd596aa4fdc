/*
 * Topology Engine - Infrastructure topology graph
 *
 * Feature-First Architecture:
 * - config/      : Generator sizing, environment presets, YAML / env loading
 * - shared/      : Cross-feature utilities (deadlines)
 * - features/    : Vertical slices (schema → model → generator → session → query → statistics)
 *
 * Storage lives behind the `topology_store::GraphStore` port; this crate
 * never assumes a backend enforces any graph invariant.
 */

#![allow(clippy::module_inception)] // query_engine::query_engine
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Configuration (generator sizing, presets, loading)
pub mod config;

/// Error types
pub mod errors;

/// Feature modules
pub mod features;

/// Shared utilities
pub mod shared;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, Environment, GeneratorConfig, TopologyConfig};
pub use errors::{Result, TopologyError};
pub use features::generator::{GeneratedTopology, TopologyGenerator};
pub use features::model::{
    decode_properties, encode_properties, Entity, EntityAttributes, KindResolver, PropertyMap,
    Relationship,
};
pub use features::query_engine::{
    Direction, GraphSnapshot, PathStep, SkippedRecord, Subgraph, TopologyPath,
};
pub use features::schema::{
    EntityKind, InfrastructureLayer, ProjectionLayer, RelationshipKind, SchemaRegistry,
};
pub use features::session::{ImportReport, TopologySession};
pub use features::statistics::{ResourceSummary, StatisticsAggregator, TopologyStats};
pub use shared::Deadline;

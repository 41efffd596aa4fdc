//! Query result types
//!
//! Plain data handed to external consumers (renderers, exporters). Nothing
//! here borrows from the snapshot it came from.

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::features::model::{Entity, Relationship};
use crate::features::schema::{InfrastructureLayer, RelationshipKind};

/// Which way a relationship was walked relative to its stored direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// source -> target
    Outbound,
    /// target -> source
    Inbound,
}

/// Relationship used to reach a path step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathHop {
    pub relationship_id: String,
    pub kind: RelationshipKind,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub entity: Entity,
    /// `None` for the first step
    pub via: Option<PathHop>,
}

impl PathStep {
    pub fn relationship_kind(&self) -> Option<RelationshipKind> {
        self.via.as_ref().map(|hop| hop.kind)
    }
}

/// Ordered entity sequence from source to target; never empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyPath {
    steps: Vec<PathStep>,
}

impl TopologyPath {
    pub(crate) fn new(steps: Vec<PathStep>) -> Self {
        debug_assert!(!steps.is_empty());
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of entities on the path
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of relationships traversed
    pub fn hops(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn source(&self) -> Option<&Entity> {
        self.steps.first().map(|s| &s.entity)
    }

    pub fn target(&self) -> Option<&Entity> {
        self.steps.last().map(|s| &s.entity)
    }

    pub fn entity_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.entity.id()).collect()
    }

    pub fn relationship_kinds(&self) -> Vec<RelationshipKind> {
        self.steps.iter().filter_map(PathStep::relationship_kind).collect()
    }

    /// Infrastructure layers crossed, in first-seen order
    pub fn layers(&self) -> Vec<InfrastructureLayer> {
        let mut layers = Vec::new();
        for step in &self.steps {
            let layer = step.entity.kind().layer();
            if !layers.contains(&layer) {
                layers.push(layer);
            }
        }
        layers
    }
}

/// Induced subgraph: every edge has both endpoints in `nodes`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Subgraph {
    pub nodes: Vec<Entity>,
    pub edges: Vec<Relationship>,
}

impl Subgraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id() == id)
    }

    /// Convert to a petgraph `DiGraph` (node weight = entity, edge weight = kind)
    pub fn to_digraph(&self) -> DiGraph<&Entity, RelationshipKind> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut indices: FxHashMap<&str, NodeIndex> = FxHashMap::default();
        for node in &self.nodes {
            indices.insert(node.id(), graph.add_node(node));
        }
        for edge in &self.edges {
            if let (Some(&s), Some(&t)) = (indices.get(edge.source_id()), indices.get(edge.target_id())) {
                graph.add_edge(s, t, edge.kind());
            }
        }
        graph
    }
}

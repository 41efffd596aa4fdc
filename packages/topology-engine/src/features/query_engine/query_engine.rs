//! Query surface over a [`GraphSnapshot`]
//!
//! Every operation is a pure read; callers share one snapshot across threads.

use rayon::prelude::*;

use super::domain::{PathHop, PathStep, Subgraph, TopologyPath};
use super::infrastructure::traversal_engine::TraversalEngine;
use super::infrastructure::GraphSnapshot;
use crate::errors::{Result, TopologyError};
use crate::features::model::properties::collect_text;
use crate::features::model::Entity;
use crate::features::schema::{EntityKind, ProjectionLayer, RelationshipKind};
use crate::shared::Deadline;

impl GraphSnapshot {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.index_of(id).map(|idx| self.entity_at(idx))
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| TopologyError::EntityNotFound(id.to_string()))
    }

    /// All entities of one kind, in load order
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<&Entity> {
        self.entities().iter().filter(|e| e.kind() == kind).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Traversal
    // ═══════════════════════════════════════════════════════════════════════

    /// Fewest-hop path, relationships walked in either direction
    ///
    /// `Ok(None)` means the two entities are disconnected; an unknown id is
    /// an `EntityNotFound` error.
    pub fn shortest_path(&self, source_id: &str, target_id: &str) -> Result<Option<TopologyPath>> {
        self.shortest_path_within(source_id, target_id, Deadline::none())
    }

    pub fn shortest_path_within(
        &self,
        source_id: &str,
        target_id: &str,
        deadline: Deadline,
    ) -> Result<Option<TopologyPath>> {
        let source = self.require(source_id)?;
        let target = self.require(target_id)?;

        let Some(indices) = TraversalEngine::new(self).shortest_path(source, target, deadline)? else {
            return Ok(None);
        };

        let steps = indices
            .into_iter()
            .map(|(idx, adj)| PathStep {
                entity: self.entity_at(idx).clone(),
                via: adj.map(|adj| {
                    let rel = self.relationship_at(adj.relationship);
                    PathHop {
                        relationship_id: rel.id().to_string(),
                        kind: rel.kind(),
                        direction: adj.direction,
                    }
                }),
            })
            .collect();
        Ok(Some(TopologyPath::new(steps)))
    }

    /// Entities one relationship away, either direction, without duplicates
    pub fn neighbors(&self, id: &str) -> Result<Vec<&Entity>> {
        let idx = self.require(id)?;
        Ok(TraversalEngine::new(self)
            .neighbors(idx, None)
            .into_iter()
            .map(|n| self.entity_at(n))
            .collect())
    }

    /// Neighbors reachable through the given relationship kinds only
    pub fn neighbors_via(&self, id: &str, kinds: &[RelationshipKind]) -> Result<Vec<&Entity>> {
        let idx = self.require(id)?;
        Ok(TraversalEngine::new(self)
            .neighbors(idx, Some(kinds))
            .into_iter()
            .map(|n| self.entity_at(n))
            .collect())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Search
    // ═══════════════════════════════════════════════════════════════════════

    /// Case-insensitive substring match over names, identifying attributes
    /// (hostname, IP address, namespace, image) and property values
    ///
    /// Results are sorted by kind, then name, then id. A blank term matches
    /// nothing.
    pub fn search(&self, term: &str) -> Vec<&Entity> {
        self.search_matching(term, None)
    }

    /// [`search`](Self::search) restricted to the given entity kinds
    pub fn search_in(&self, term: &str, kinds: &[EntityKind]) -> Vec<&Entity> {
        self.search_matching(term, Some(kinds))
    }

    fn search_matching(&self, term: &str, kinds: Option<&[EntityKind]>) -> Vec<&Entity> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<&Entity> = self
            .entities()
            .par_iter()
            .filter(|e| kinds.map_or(true, |kinds| kinds.contains(&e.kind())))
            .filter(|e| entity_matches(e, &needle))
            .collect();

        hits.sort_by(|a, b| {
            a.kind()
                .cmp(&b.kind())
                .then_with(|| a.name().cmp(b.name()))
                .then_with(|| a.id().cmp(b.id()))
        });
        hits
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Projection
    // ═══════════════════════════════════════════════════════════════════════

    /// Induced subgraph over the allowed kinds
    ///
    /// An edge is kept only when both endpoints are kept.
    pub fn filtered_subgraph(&self, allowed: &[EntityKind]) -> Subgraph {
        let keep: Vec<bool> = self
            .entities()
            .iter()
            .map(|e| allowed.contains(&e.kind()))
            .collect();

        let nodes = self
            .entities()
            .iter()
            .zip(&keep)
            .filter(|(_, &kept)| kept)
            .map(|(e, _)| e.clone())
            .collect();

        let edges = self
            .relationships()
            .iter()
            .filter(|rel| {
                let kept = |id: &str| self.index_of(id).is_some_and(|idx| keep[idx]);
                kept(rel.source_id()) && kept(rel.target_id())
            })
            .cloned()
            .collect();

        Subgraph { nodes, edges }
    }

    /// Preset view: network, compute or container tier
    pub fn layer_subgraph(&self, layer: ProjectionLayer) -> Subgraph {
        self.filtered_subgraph(layer.kinds())
    }
}

fn entity_matches(entity: &Entity, needle: &str) -> bool {
    let matches = |text: &str| text.to_lowercase().contains(needle);
    if matches(entity.name()) {
        return true;
    }
    if entity.attributes().searchable_text().into_iter().any(matches) {
        return true;
    }
    let mut values = Vec::new();
    for value in entity.properties().values() {
        collect_text(value, &mut values);
    }
    values.iter().any(|v| matches(v.as_str()))
}

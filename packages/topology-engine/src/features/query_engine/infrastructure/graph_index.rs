// Infrastructure: GraphSnapshot - immutable entity/relationship index
//
// Adjacency lists are built once, in relationship insertion order, which
// makes BFS tie-breaking deterministic for a given load.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::errors::{Result, TopologyError};
use crate::features::model::{Entity, KindResolver, Relationship};
use crate::features::query_engine::domain::Direction;
use crate::features::schema::EntityKind;

/// One adjacency entry: a relationship seen from one of its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Adjacency {
    pub relationship: usize,
    pub neighbor: usize,
    pub direction: Direction,
}

/// A stored record left out of a snapshot, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub id: String,
    pub reason: String,
}

/// Immutable, queryable view of the whole topology
///
/// `Send + Sync`; share it behind an `Arc` for concurrent readers.
#[derive(Debug, Default)]
pub struct GraphSnapshot {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,

    /// Entity id -> position in `entities`
    by_id: FxHashMap<String, usize>,

    /// Per entity, inbound and outbound relationships in insertion order
    adjacency: Vec<Vec<Adjacency>>,

    skipped: Vec<SkippedRecord>,
}

impl GraphSnapshot {
    /// Index a consistent set of entities and relationships
    ///
    /// Fails on duplicate entity ids and on relationships whose endpoints
    /// are not among `entities`.
    pub fn new(entities: Vec<Entity>, relationships: Vec<Relationship>) -> Result<Self> {
        Self::with_skipped(entities, relationships, Vec::new())
    }

    pub(crate) fn with_skipped(
        entities: Vec<Entity>,
        relationships: Vec<Relationship>,
        skipped: Vec<SkippedRecord>,
    ) -> Result<Self> {
        let mut by_id = FxHashMap::default();
        by_id.reserve(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            if by_id.insert(entity.id().to_string(), idx).is_some() {
                return Err(TopologyError::validation(format!(
                    "duplicate entity id {}",
                    entity.id()
                )));
            }
        }

        let mut adjacency: Vec<Vec<Adjacency>> = vec![Vec::new(); entities.len()];
        for (r, rel) in relationships.iter().enumerate() {
            let endpoint = |id: &str| {
                by_id.get(id).copied().ok_or_else(|| {
                    TopologyError::ReferentialIntegrity(format!(
                        "relationship {} references missing entity {}",
                        rel.id(),
                        id
                    ))
                })
            };
            let s = endpoint(rel.source_id())?;
            let t = endpoint(rel.target_id())?;

            adjacency[s].push(Adjacency {
                relationship: r,
                neighbor: t,
                direction: Direction::Outbound,
            });
            if s != t {
                adjacency[t].push(Adjacency {
                    relationship: r,
                    neighbor: s,
                    direction: Direction::Inbound,
                });
            }
        }

        Ok(Self {
            entities,
            relationships,
            by_id,
            adjacency,
            skipped,
        })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Records dropped while loading (undecodable or dangling)
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn entity_at(&self, idx: usize) -> &Entity {
        &self.entities[idx]
    }

    pub(crate) fn relationship_at(&self, idx: usize) -> &Relationship {
        &self.relationships[idx]
    }

    pub(crate) fn adjacency(&self, idx: usize) -> &[Adjacency] {
        &self.adjacency[idx]
    }
}

impl KindResolver for GraphSnapshot {
    fn resolve_kind(&self, id: &str) -> Option<EntityKind> {
        self.index_of(id).map(|idx| self.entities[idx].kind())
    }
}

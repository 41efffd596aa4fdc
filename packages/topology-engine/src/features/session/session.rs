//! Topology Session
//!
//! Explicit handle on a [`GraphStore`]. All writes pass through here so the
//! graph invariants (unique ids, existing endpoints, allowed kind pairs) are
//! checked by the engine, whatever the backend enforces.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use topology_store::{DeleteOutcome, GraphStore, ScanFilter, StoreStats, StoredRecord};
use tracing::{debug, info, warn};

use crate::errors::{Result, TopologyError};
use crate::features::generator::GeneratedTopology;
use crate::features::model::{Entity, EntityAttributes, PropertyMap, Relationship};
use crate::features::query_engine::{GraphSnapshot, SkippedRecord};
use crate::features::schema::{EntityKind, RelationshipKind, SchemaRegistry};
use crate::shared::Deadline;

/// Entities written per deadline check during bulk import
const IMPORT_CHECK_INTERVAL: usize = 500;

/// Counts written by [`TopologySession::import`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub entities_written: usize,
    pub relationships_written: usize,
}

pub struct TopologySession {
    store: Arc<dyn GraphStore>,
    registry: &'static SchemaRegistry,
    /// Serializes writes so endpoint checks cannot race a cascade delete
    write_lock: Mutex<()>,
}

impl TopologySession {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self::with_registry(store, SchemaRegistry::global())
    }

    pub fn with_registry(store: Arc<dyn GraphStore>, registry: &'static SchemaRegistry) -> Self {
        Self {
            store,
            registry,
            write_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &'static SchemaRegistry {
        self.registry
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════════════

    /// Validate, create and store a new entity
    pub async fn create_entity(
        &self,
        name: impl Into<String>,
        attributes: EntityAttributes,
        properties: PropertyMap,
    ) -> Result<Entity> {
        let entity = Entity::new(name, attributes, properties)?;
        self.insert_entity(&entity).await?;
        Ok(entity)
    }

    /// Store an already-constructed entity; its id must be unused
    pub async fn insert_entity(&self, entity: &Entity) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure_unused(entity.id()).await?;
        self.store.put_node(&entity.to_record()?).await?;
        debug!("Stored {} {}", entity.kind(), entity.id());
        Ok(())
    }

    /// Create a relationship between two stored entities
    pub async fn create_relationship(
        &self,
        kind: RelationshipKind,
        source_id: &str,
        target_id: &str,
        properties: PropertyMap,
    ) -> Result<Relationship> {
        let _guard = self.write_lock.lock().await;

        let mut kinds: FxHashMap<String, EntityKind> = FxHashMap::default();
        for id in [source_id, target_id] {
            if let Some(kind) = self.stored_kind(id).await? {
                kinds.insert(id.to_string(), kind);
            }
        }
        let relationship =
            Relationship::new(self.registry, &kinds, kind, source_id, target_id, properties)?;
        self.store.put_edge(&relationship.to_record()?).await?;
        debug!(
            "Stored {} {} -> {}",
            relationship.kind(),
            relationship.source_id(),
            relationship.target_id()
        );
        Ok(relationship)
    }

    /// Replace an entity's property map
    pub async fn update_properties(&self, id: &str, properties: PropertyMap) -> Result<Entity> {
        let _guard = self.write_lock.lock().await;
        let mut entity = self
            .fetch_entity(id)
            .await?
            .ok_or_else(|| TopologyError::EntityNotFound(id.to_string()))?;
        entity.set_properties(properties)?;
        self.store.put_node(&entity.to_record()?).await?;
        Ok(entity)
    }

    /// Delete an entity and every relationship touching it
    pub async fn delete_entity(&self, id: &str) -> Result<DeleteOutcome> {
        let _guard = self.write_lock.lock().await;
        match self.store.get(id).await? {
            Some(StoredRecord::Node(_)) => {}
            _ => return Err(TopologyError::EntityNotFound(id.to_string())),
        }
        let outcome = self.store.delete_cascade(id).await?;
        info!(
            "Deleted entity {} and {} relationships",
            id, outcome.edges_removed
        );
        Ok(outcome)
    }

    /// Delete a single relationship; returns whether it existed
    pub async fn delete_relationship(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        match self.store.get(id).await? {
            Some(StoredRecord::Edge(_)) => {}
            _ => return Ok(false),
        }
        let outcome = self.store.delete_cascade(id).await?;
        Ok(outcome.edges_removed > 0)
    }

    /// Write a generated topology: all entities first, then relationships
    ///
    /// Holds the write lock for the whole import. Endpoints are checked
    /// against the batch and then the store.
    pub async fn import(
        &self,
        topology: &GeneratedTopology,
        deadline: Deadline,
    ) -> Result<ImportReport> {
        let _guard = self.write_lock.lock().await;
        let mut report = ImportReport::default();

        let mut batch: FxHashMap<&str, EntityKind> = FxHashMap::default();
        batch.reserve(topology.entities.len());
        for (n, entity) in topology.entities.iter().enumerate() {
            if n % IMPORT_CHECK_INTERVAL == 0 {
                deadline.check("entity import")?;
            }
            if batch.insert(entity.id(), entity.kind()).is_some() {
                return Err(TopologyError::validation(format!(
                    "duplicate entity id {} in import batch",
                    entity.id()
                )));
            }
            self.ensure_unused(entity.id()).await?;
            self.store.put_node(&entity.to_record()?).await?;
            report.entities_written += 1;
        }

        for (n, rel) in topology.relationships.iter().enumerate() {
            if n % IMPORT_CHECK_INTERVAL == 0 {
                deadline.check("relationship import")?;
            }
            let source_kind = self.batch_or_stored_kind(&batch, rel.source_id()).await?;
            let target_kind = self.batch_or_stored_kind(&batch, rel.target_id()).await?;
            self.registry.check(rel.kind(), source_kind, target_kind)?;
            self.store.put_edge(&rel.to_record()?).await?;
            report.relationships_written += 1;
        }

        info!(
            "Imported {} entities and {} relationships",
            report.entities_written, report.relationships_written
        );
        Ok(report)
    }

    /// Remove every entity and relationship
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.clear().await?;
        info!("Cleared topology store");
        Ok(())
    }

    /// Release the store; later calls fail with `StoreUnavailable`
    pub async fn close(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.close().await?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════════

    pub async fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        self.fetch_entity(id).await
    }

    pub async fn get_relationship(&self, id: &str) -> Result<Option<Relationship>> {
        match self.store.get(id).await? {
            Some(StoredRecord::Edge(edge)) => Ok(Some(Relationship::from_record(&edge)?)),
            _ => Ok(None),
        }
    }

    /// Stored entities of one kind, in insertion order
    ///
    /// Fails with `Serialization` if any matching record cannot be decoded.
    pub async fn entities_of_kind(&self, kind: EntityKind) -> Result<Vec<Entity>> {
        let batch = self
            .store
            .scan(&ScanFilter::node_labels([kind.as_str()]))
            .await?;
        if let Some(bad) = batch.undecodable.into_iter().next() {
            return Err(bad.error.into());
        }
        batch
            .records
            .iter()
            .filter_map(StoredRecord::as_node)
            .map(Entity::from_record)
            .collect()
    }

    pub async fn store_stats(&self) -> Result<StoreStats> {
        Ok(self.store.stats().await?)
    }

    /// Read the whole graph into an immutable snapshot
    ///
    /// Records that fail to decode are logged, skipped and listed in
    /// [`GraphSnapshot::skipped`]; so are relationships whose endpoints did
    /// not load. Store failures abort the load.
    pub async fn load_snapshot(&self) -> Result<GraphSnapshot> {
        let nodes = self.store.scan(&ScanFilter::nodes()).await?;
        let edges = self.store.scan(&ScanFilter::edges()).await?;

        let mut skipped: Vec<SkippedRecord> = nodes
            .undecodable
            .iter()
            .chain(&edges.undecodable)
            .map(|row| {
                warn!("Skipping undecodable record {}: {}", row.id, row.error);
                SkippedRecord {
                    id: row.id.clone(),
                    reason: row.error.to_string(),
                }
            })
            .collect();
        let mut entities = Vec::with_capacity(nodes.len());
        let mut loaded: FxHashSet<String> = FxHashSet::default();
        for record in nodes.records.iter().filter_map(StoredRecord::as_node) {
            match Entity::from_record(record) {
                Ok(entity) => {
                    loaded.insert(entity.id().to_string());
                    entities.push(entity);
                }
                Err(err) => {
                    warn!("Skipping entity {}: {}", record.id, err);
                    skipped.push(SkippedRecord {
                        id: record.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut relationships = Vec::with_capacity(edges.len());
        for record in edges.records.iter().filter_map(StoredRecord::as_edge) {
            let relationship = match Relationship::from_record(record) {
                Ok(rel) => rel,
                Err(err) => {
                    warn!("Skipping relationship {}: {}", record.id, err);
                    skipped.push(SkippedRecord {
                        id: record.id.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let missing = [relationship.source_id(), relationship.target_id()]
                .into_iter()
                .find(|id| !loaded.contains(*id));
            if let Some(missing) = missing {
                warn!(
                    "Skipping relationship {}: endpoint {} not loaded",
                    record.id, missing
                );
                skipped.push(SkippedRecord {
                    id: record.id.clone(),
                    reason: format!("endpoint {} not loaded", missing),
                });
                continue;
            }
            relationships.push(relationship);
        }

        info!(
            "Loaded snapshot: {} entities, {} relationships, {} skipped",
            entities.len(),
            relationships.len(),
            skipped.len()
        );
        GraphSnapshot::with_skipped(entities, relationships, skipped)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════

    async fn ensure_unused(&self, id: &str) -> Result<()> {
        if self.store.get(id).await?.is_some() {
            return Err(TopologyError::validation(format!("id {} already exists", id)));
        }
        Ok(())
    }

    async fn fetch_entity(&self, id: &str) -> Result<Option<Entity>> {
        match self.store.get(id).await? {
            Some(StoredRecord::Node(node)) => Ok(Some(Entity::from_record(&node)?)),
            _ => Ok(None),
        }
    }

    /// Kind of a stored entity; `None` when absent or not an entity
    async fn stored_kind(&self, id: &str) -> Result<Option<EntityKind>> {
        match self.store.get(id).await? {
            Some(StoredRecord::Node(node)) => Ok(Some(node.label.parse()?)),
            _ => Ok(None),
        }
    }

    async fn batch_or_stored_kind(
        &self,
        batch: &FxHashMap<&str, EntityKind>,
        id: &str,
    ) -> Result<EntityKind> {
        if let Some(kind) = batch.get(id) {
            return Ok(*kind);
        }
        self.stored_kind(id).await?.ok_or_else(|| {
            TopologyError::ReferentialIntegrity(format!("endpoint {} does not exist", id))
        })
    }
}

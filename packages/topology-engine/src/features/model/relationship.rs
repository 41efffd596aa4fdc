//! Relationship value object and endpoint resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::BuildHasher;
use topology_store::EdgeRecord;
use uuid::Uuid;

use super::entity::{format_timestamp, parse_timestamp, Entity};
use super::properties::{decode_properties, encode_properties, validate_properties, PropertyMap};
use super::records::{AttributeReader, AttributeWriter};
use crate::errors::{Result, TopologyError};
use crate::features::schema::{EntityKind, RelationshipKind, SchemaRegistry};

/// Resolves an entity id to its kind
///
/// Implemented by id → kind maps, entity slices and graph snapshots, so the
/// same constructor serves generation, session writes and tests.
pub trait KindResolver {
    fn resolve_kind(&self, id: &str) -> Option<EntityKind>;
}

impl<S: BuildHasher> KindResolver for HashMap<String, EntityKind, S> {
    fn resolve_kind(&self, id: &str) -> Option<EntityKind> {
        self.get(id).copied()
    }
}

impl KindResolver for [Entity] {
    fn resolve_kind(&self, id: &str) -> Option<EntityKind> {
        self.iter().find(|e| e.id() == id).map(Entity::kind)
    }
}

/// Directed, typed edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    id: String,
    kind: RelationshipKind,
    source_id: String,
    target_id: String,
    properties: PropertyMap,
    created_at: DateTime<Utc>,
}

impl Relationship {
    /// Validate endpoints against `resolver` and the allow-list, then create
    pub fn new<R>(
        registry: &SchemaRegistry,
        resolver: &R,
        kind: RelationshipKind,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        properties: PropertyMap,
    ) -> Result<Self>
    where
        R: KindResolver + ?Sized,
    {
        let source_id = source_id.into();
        let target_id = target_id.into();

        let source_kind = resolver.resolve_kind(&source_id).ok_or_else(|| {
            TopologyError::ReferentialIntegrity(format!(
                "{} source entity {} does not exist",
                kind, source_id
            ))
        })?;
        let target_kind = resolver.resolve_kind(&target_id).ok_or_else(|| {
            TopologyError::ReferentialIntegrity(format!(
                "{} target entity {} does not exist",
                kind, target_id
            ))
        })?;
        registry.check(kind, source_kind, target_kind)?;
        validate_properties(&properties)?;

        Ok(Self {
            id: format!("rel-{}", Uuid::new_v4().simple()),
            kind,
            source_id,
            target_id,
            properties,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn touches(&self, entity_id: &str) -> bool {
        self.source_id == entity_id || self.target_id == entity_id
    }

    pub fn to_record(&self) -> Result<EdgeRecord> {
        let mut record = EdgeRecord::new(
            self.id.as_str(),
            self.kind.as_str(),
            self.source_id.as_str(),
            self.target_id.as_str(),
        );
        let encoded = encode_properties(&self.properties)?;
        AttributeWriter::new(&mut record.attributes)
            .text("properties", &encoded)
            .text("created_at", &format_timestamp(self.created_at));
        Ok(record)
    }

    /// Rebuild from an edge record; endpoints are not re-checked here
    pub fn from_record(record: &EdgeRecord) -> Result<Self> {
        let kind: RelationshipKind = record.rel_type.parse()?;
        let r = AttributeReader::new(&record.id, &record.attributes);
        let properties = match r.opt_text("properties")? {
            Some(encoded) => decode_properties(&encoded)?,
            None => PropertyMap::new(),
        };
        Ok(Self {
            id: record.id.clone(),
            kind,
            source_id: record.source_id.clone(),
            target_id: record.target_id.clone(),
            properties,
            created_at: parse_timestamp(&record.id, &r.text("created_at")?)?,
        })
    }
}

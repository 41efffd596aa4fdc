//! Entity value object

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use topology_store::NodeRecord;
use uuid::Uuid;

use super::attributes::EntityAttributes;
use super::properties::{decode_properties, encode_properties, validate_properties, PropertyMap};
use super::records::{AttributeReader, AttributeWriter};
use crate::errors::{Result, TopologyError};
use crate::features::schema::EntityKind;

/// One infrastructure component
///
/// The id is assigned once at creation and never changes. The kind is the
/// discriminant of [`EntityAttributes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tags: Vec<String>,
    properties: PropertyMap,
    #[serde(flatten)]
    attributes: EntityAttributes,
}

impl Entity {
    /// Validate and create a new entity with a fresh id
    ///
    /// Nothing is allocated when validation fails.
    pub fn new(
        name: impl Into<String>,
        attributes: EntityAttributes,
        properties: PropertyMap,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TopologyError::validation(format!(
                "{} requires a non-empty name",
                attributes.kind()
            )));
        }
        attributes.validate()?;
        validate_properties(&properties)?;

        let now = Utc::now();
        Ok(Self {
            id: Self::new_id(attributes.kind()),
            name,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            properties,
            attributes,
        })
    }

    fn new_id(kind: EntityKind) -> String {
        format!("{}-{}", kind.id_prefix(), Uuid::new_v4().simple())
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.attributes.kind()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn attributes(&self) -> &EntityAttributes {
        &self.attributes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the property map and bump `updated_at`
    pub fn set_properties(&mut self, properties: PropertyMap) -> Result<()> {
        validate_properties(&properties)?;
        self.properties = properties;
        self.updated_at = Utc::now().max(self.updated_at);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Store mapping
    // ═══════════════════════════════════════════════════════════════════════

    /// Flatten into a primitive-only node record
    pub fn to_record(&self) -> Result<NodeRecord> {
        let mut record = NodeRecord::new(self.id.as_str(), self.kind().as_str());
        let encoded = encode_properties(&self.properties)?;
        AttributeWriter::new(&mut record.attributes)
            .text("name", &self.name)
            .text("created_at", &format_timestamp(self.created_at))
            .text("updated_at", &format_timestamp(self.updated_at))
            .list("tags", &self.tags)
            .text("properties", &encoded);
        self.attributes.write_to(&mut record.attributes)?;
        Ok(record)
    }

    /// Rebuild an entity from a node record
    ///
    /// Unknown labels fail with `KindNotRegistered`, malformed attributes with
    /// `Serialization`, and stored values that no longer pass field
    /// validation with `Validation`.
    pub fn from_record(record: &NodeRecord) -> Result<Self> {
        let kind: EntityKind = record.label.parse()?;
        let r = AttributeReader::new(&record.id, &record.attributes);

        let properties = match r.opt_text("properties")? {
            Some(encoded) => decode_properties(&encoded)?,
            None => PropertyMap::new(),
        };
        let attributes = EntityAttributes::read_from(kind, &r)?;
        attributes.validate()?;

        Ok(Self {
            id: record.id.clone(),
            name: r.text("name")?,
            created_at: parse_timestamp(&record.id, &r.text("created_at")?)?,
            updated_at: parse_timestamp(&record.id, &r.text("updated_at")?)?,
            tags: r.list("tags")?,
            properties,
            attributes,
        })
    }
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            TopologyError::serialization(format!("record {}: bad timestamp {:?}: {}", id, raw, e))
        })
}

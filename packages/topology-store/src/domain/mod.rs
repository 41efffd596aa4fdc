//! Domain layer for the graph store port
//!
//! # Primitive-only records
//!
//! Backends behind [`GraphStore`] accept only scalars and arrays of scalars as
//! attribute values. [`AttributeValue`] has no map variant, so a nested
//! structure cannot reach a backend without being encoded to text first.
//!
//! # Domain Models
//!
//! - `NodeRecord`: one stored entity (label = entity kind)
//! - `EdgeRecord`: one stored directed relationship
//! - `StoredRecord`: result of an id lookup (node or edge)
//! - `ScanFilter`: record class + optional kind restriction
//! - `ScanBatch`: scanned records plus rows that failed to decode
//!
//! # Port Trait
//!
//! - `GraphStore`: create/read/delete-by-id plus filtered scans
//!
//! # Examples
//!
//! ```rust,ignore
//! use topology_store::{GraphStore, NodeRecord, ScanFilter};
//!
//! async fn example(store: impl GraphStore) -> Result<()> {
//!     let node = NodeRecord::new("sw-1", "NetworkSwitch")
//!         .with_attribute("name", "Switch-01");
//!     store.put_node(&node).await?;
//!
//!     let switches = store.scan(&ScanFilter::node_labels(["NetworkSwitch"])).await?;
//!     assert_eq!(switches.len(), 1);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Result, StorageError};

// ═══════════════════════════════════════════════════════════════════════════
// Attribute Values
// ═══════════════════════════════════════════════════════════════════════════

/// A single primitive value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Attribute value accepted by a backend: a scalar or a flat array of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(Scalar::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Text elements of an array; `None` if this is not an all-text array
    pub fn as_text_list(&self) -> Option<Vec<String>> {
        match self {
            AttributeValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    Scalar::Text(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Scalar(Scalar::Text(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Scalar(Scalar::Int(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Scalar(Scalar::Bool(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Scalar(Scalar::Float(value))
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        AttributeValue::Array(values.into_iter().map(Scalar::Text).collect())
    }
}

/// Attribute map with stable key ordering
pub type Attributes = BTreeMap<String, AttributeValue>;

// ═══════════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════════

/// Stored entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Globally unique id
    pub id: String,
    /// Entity kind name (e.g. "Server")
    pub label: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Stored directed relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    /// Relationship kind name (e.g. "HOSTS")
    pub rel_type: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl EdgeRecord {
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Whether this edge has `id` as either endpoint
    pub fn touches(&self, id: &str) -> bool {
        self.source_id == id || self.target_id == id
    }
}

/// Result of an id lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum StoredRecord {
    Node(NodeRecord),
    Edge(EdgeRecord),
}

impl StoredRecord {
    pub fn id(&self) -> &str {
        match self {
            StoredRecord::Node(node) => &node.id,
            StoredRecord::Edge(edge) => &edge.id,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRecord> {
        match self {
            StoredRecord::Node(node) => Some(node),
            StoredRecord::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeRecord> {
        match self {
            StoredRecord::Edge(edge) => Some(edge),
            StoredRecord::Node(_) => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Scan Filter / Outcomes
// ═══════════════════════════════════════════════════════════════════════════

/// Record class plus an optional kind restriction
///
/// `None` kinds means "every record of the class".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    Nodes(Option<Vec<String>>),
    Edges(Option<Vec<String>>),
}

impl ScanFilter {
    pub fn nodes() -> Self {
        ScanFilter::Nodes(None)
    }

    pub fn edges() -> Self {
        ScanFilter::Edges(None)
    }

    pub fn node_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScanFilter::Nodes(Some(labels.into_iter().map(Into::into).collect()))
    }

    pub fn edge_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScanFilter::Edges(Some(types.into_iter().map(Into::into).collect()))
    }

    /// Whether a record passes the filter
    pub fn matches(&self, record: &StoredRecord) -> bool {
        match (self, record) {
            (ScanFilter::Nodes(kinds), StoredRecord::Node(node)) => {
                kinds.as_ref().map_or(true, |k| k.contains(&node.label))
            }
            (ScanFilter::Edges(kinds), StoredRecord::Edge(edge)) => {
                kinds.as_ref().map_or(true, |k| k.contains(&edge.rel_type))
            }
            _ => false,
        }
    }
}

/// What a cascading delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// A node with the id existed and was removed
    pub node_removed: bool,
    /// Edges removed (the edge itself when the id named an edge)
    pub edges_removed: usize,
}

impl DeleteOutcome {
    pub fn is_noop(&self) -> bool {
        !self.node_removed && self.edges_removed == 0
    }
}

/// Stored row whose attributes a backend could not decode
#[derive(Debug)]
pub struct UndecodableRecord {
    pub id: String,
    /// Always `ErrorKind::Serialization`
    pub error: StorageError,
}

/// Result of a scan
///
/// One corrupt row never fails the whole scan; it is reported in
/// `undecodable` and the remaining rows are still returned.
#[derive(Debug, Default)]
pub struct ScanBatch {
    /// Decoded records, in insertion order
    pub records: Vec<StoredRecord>,
    pub undecodable: Vec<UndecodableRecord>,
}

impl ScanBatch {
    pub fn from_records(records: Vec<StoredRecord>) -> Self {
        Self {
            records,
            undecodable: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(StoredRecord::id).collect()
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub node_count: usize,
    pub edge_count: usize,
}

// ═══════════════════════════════════════════════════════════════════════════
// Port Trait: GraphStore
// ═══════════════════════════════════════════════════════════════════════════

/// Graph storage abstraction
///
/// Backends persist records as given. They do not validate entity kinds,
/// relationship endpoints, or allow-lists; callers validate before `put_*`.
///
/// # Ordering
///
/// `scan` returns records in first-insertion order. Re-putting an existing id
/// updates it in place without moving it.
///
/// # Lifecycle
///
/// A store is opened by its constructor and closed with [`GraphStore::close`].
/// Every operation on a closed store fails with `ErrorKind::Unavailable`.
///
/// # Implementations
///
/// - `InMemoryGraphStore`: IndexMap-backed, for tests and embedding
/// - `SqliteGraphStore`: file or in-memory SQLite database
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert or update a node
    ///
    /// # Errors
    ///
    /// `Conflict` if the id is already used by an edge.
    async fn put_node(&self, node: &NodeRecord) -> Result<()>;

    /// Insert or update an edge
    ///
    /// # Errors
    ///
    /// `Conflict` if the id is already used by a node.
    async fn put_edge(&self, edge: &EdgeRecord) -> Result<()>;

    /// Look up a node or edge by id
    async fn get(&self, id: &str) -> Result<Option<StoredRecord>>;

    /// Remove a record; removing a node also removes every edge touching it
    async fn delete_cascade(&self, id: &str) -> Result<DeleteOutcome>;

    /// All records matching the filter, in insertion order
    ///
    /// Rows that fail to decode land in [`ScanBatch::undecodable`]; only
    /// backend failures are returned as `Err`.
    async fn scan(&self, filter: &ScanFilter) -> Result<ScanBatch>;

    /// Remove every record
    async fn clear(&self) -> Result<()>;

    /// Record counts
    async fn stats(&self) -> Result<StoreStats>;

    /// Release the backend; later calls fail with `Unavailable`
    async fn close(&self) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

//! SQLite adapter for GraphStore
//!
//! Attributes are stored as a JSON object of primitive values. The `seq`
//! column preserves first-insertion order; upserts keep the original `seq`.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    Attributes, DeleteOutcome, EdgeRecord, GraphStore, NodeRecord, ScanBatch, ScanFilter,
    StoreStats, StoredRecord, UndecodableRecord,
};
use crate::{Result, StorageError};

/// SQLite-based GraphStore implementation
#[derive(Clone)]
pub struct SqliteGraphStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteGraphStore {
    /// Open (or create) a store at the given path
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(StorageError::unavailable("SQLite store is closed")),
        }
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS nodes (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            attributes TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS edges (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            rel_type TEXT NOT NULL,
            source_id TEXT NOT NULL,
            target_id TEXT NOT NULL,
            attributes TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(label)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_edges_type ON edges(rel_type)",
        [],
    )?;

    Ok(())
}

/// Attribute JSON is decoded outside the row mapper so a corrupt column is a
/// `Serialization` error for that row, not a database failure.
fn decode_attributes(id: &str, raw: &str) -> Result<Attributes> {
    serde_json::from_str(raw).map_err(|e| {
        StorageError::serialization(format!("record {}: undecodable attributes: {}", id, e))
            .with_source(e)
    })
}

/// Node row with its attribute column still encoded
struct RawNode {
    id: String,
    label: String,
    attributes: String,
}

impl RawNode {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            attributes: row.get(2)?,
        })
    }

    fn decode(self) -> Result<NodeRecord> {
        let attributes = decode_attributes(&self.id, &self.attributes)?;
        Ok(NodeRecord {
            id: self.id,
            label: self.label,
            attributes,
        })
    }
}

/// Edge row with its attribute column still encoded
struct RawEdge {
    id: String,
    rel_type: String,
    source_id: String,
    target_id: String,
    attributes: String,
}

impl RawEdge {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            rel_type: row.get(1)?,
            source_id: row.get(2)?,
            target_id: row.get(3)?,
            attributes: row.get(4)?,
        })
    }

    fn decode(self) -> Result<EdgeRecord> {
        let attributes = decode_attributes(&self.id, &self.attributes)?;
        Ok(EdgeRecord {
            id: self.id,
            rel_type: self.rel_type,
            source_id: self.source_id,
            target_id: self.target_id,
            attributes,
        })
    }
}

/// Decode scanned rows; failures are collected per row
fn into_batch<R>(
    rows: Vec<R>,
    id_of: impl Fn(&R) -> String,
    decode: impl Fn(R) -> Result<StoredRecord>,
) -> ScanBatch {
    let mut batch = ScanBatch::default();
    for row in rows {
        let id = id_of(&row);
        match decode(row) {
            Ok(record) => batch.records.push(record),
            Err(error) => {
                warn!("Undecodable row {}: {}", id, error);
                batch.undecodable.push(UndecodableRecord { id, error });
            }
        }
    }
    batch
}

fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
    let found: Option<i64> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

/// `?1, ?2, ...` placeholder list for an IN clause
fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn put_node(&self, node: &NodeRecord) -> Result<()> {
        self.with_conn(|conn| {
            if exists(conn, "edges", &node.id)? {
                return Err(StorageError::conflict(&node.id));
            }
            conn.execute(
                "INSERT INTO nodes (id, label, attributes) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET label = excluded.label, attributes = excluded.attributes",
                params![&node.id, &node.label, serde_json::to_string(&node.attributes)?],
            )?;
            Ok(())
        })
    }

    async fn put_edge(&self, edge: &EdgeRecord) -> Result<()> {
        self.with_conn(|conn| {
            if exists(conn, "nodes", &edge.id)? {
                return Err(StorageError::conflict(&edge.id));
            }
            conn.execute(
                "INSERT INTO edges (id, rel_type, source_id, target_id, attributes)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET rel_type = excluded.rel_type,
                    source_id = excluded.source_id, target_id = excluded.target_id,
                    attributes = excluded.attributes",
                params![
                    &edge.id,
                    &edge.rel_type,
                    &edge.source_id,
                    &edge.target_id,
                    serde_json::to_string(&edge.attributes)?
                ],
            )?;
            Ok(())
        })
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>> {
        self.with_conn(|conn| {
            let node = conn
                .query_row(
                    "SELECT id, label, attributes FROM nodes WHERE id = ?1",
                    params![id],
                    RawNode::from_row,
                )
                .optional()?;
            if let Some(node) = node {
                return Ok(Some(StoredRecord::Node(node.decode()?)));
            }

            let edge = conn
                .query_row(
                    "SELECT id, rel_type, source_id, target_id, attributes FROM edges WHERE id = ?1",
                    params![id],
                    RawEdge::from_row,
                )
                .optional()?;
            edge.map(|raw| raw.decode().map(StoredRecord::Edge)).transpose()
        })
    }

    async fn delete_cascade(&self, id: &str) -> Result<DeleteOutcome> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            let node_removed = tx.execute("DELETE FROM nodes WHERE id = ?1", params![id])? > 0;
            let edges_removed = if node_removed {
                tx.execute(
                    "DELETE FROM edges WHERE source_id = ?1 OR target_id = ?1",
                    params![id],
                )?
            } else {
                tx.execute("DELETE FROM edges WHERE id = ?1", params![id])?
            };

            tx.commit()?;
            debug!(id, node_removed, edges_removed, "sqlite cascade delete");
            Ok(DeleteOutcome {
                node_removed,
                edges_removed,
            })
        })
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<ScanBatch> {
        self.with_conn(|conn| match filter {
            ScanFilter::Nodes(labels) => {
                let (sql, args) = match labels {
                    Some(labels) => (
                        format!(
                            "SELECT id, label, attributes FROM nodes WHERE label IN ({}) ORDER BY seq",
                            placeholders(labels.len())
                        ),
                        labels.clone(),
                    ),
                    None => (
                        "SELECT id, label, attributes FROM nodes ORDER BY seq".to_string(),
                        Vec::new(),
                    ),
                };
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(args.iter()), RawNode::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(into_batch(
                    rows,
                    |raw: &RawNode| raw.id.clone(),
                    |raw: RawNode| raw.decode().map(StoredRecord::Node),
                ))
            }
            ScanFilter::Edges(types) => {
                let (sql, args) = match types {
                    Some(types) => (
                        format!(
                            "SELECT id, rel_type, source_id, target_id, attributes FROM edges
                             WHERE rel_type IN ({}) ORDER BY seq",
                            placeholders(types.len())
                        ),
                        types.clone(),
                    ),
                    None => (
                        "SELECT id, rel_type, source_id, target_id, attributes FROM edges ORDER BY seq"
                            .to_string(),
                        Vec::new(),
                    ),
                };
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(args.iter()), RawEdge::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(into_batch(
                    rows,
                    |raw: &RawEdge| raw.id.clone(),
                    |raw: RawEdge| raw.decode().map(StoredRecord::Edge),
                ))
            }
        })
    }

    async fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM edges", [])?;
            conn.execute("DELETE FROM nodes", [])?;
            Ok(())
        })
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.with_conn(|conn| {
            let nodes: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
            let edges: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
            Ok(StoreStats {
                node_count: nodes as usize,
                edge_count: edges as usize,
            })
        })
    }

    async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, err)| StorageError::from(err))?;
        }
        Ok(())
    }
}

//! In-Memory Graph Store
//!
//! IndexMap-backed implementation. Insertion order is preserved across
//! updates and deletes, matching the `scan` ordering contract.

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::domain::{
    DeleteOutcome, EdgeRecord, GraphStore, NodeRecord, ScanBatch, ScanFilter, StoreStats,
    StoredRecord,
};
use crate::{Result, StorageError};

#[derive(Default)]
struct Inner {
    nodes: IndexMap<String, NodeRecord>,
    edges: IndexMap<String, EdgeRecord>,
    closed: bool,
}

impl Inner {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(StorageError::unavailable("in-memory store is closed"));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryGraphStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn put_node(&self, node: &NodeRecord) -> Result<()> {
        let mut inner = self.inner.write();
        inner.ensure_open()?;
        if inner.edges.contains_key(&node.id) {
            return Err(StorageError::conflict(&node.id));
        }
        inner.nodes.insert(node.id.clone(), node.clone());
        Ok(())
    }

    async fn put_edge(&self, edge: &EdgeRecord) -> Result<()> {
        let mut inner = self.inner.write();
        inner.ensure_open()?;
        if inner.nodes.contains_key(&edge.id) {
            return Err(StorageError::conflict(&edge.id));
        }
        inner.edges.insert(edge.id.clone(), edge.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>> {
        let inner = self.inner.read();
        inner.ensure_open()?;
        if let Some(node) = inner.nodes.get(id) {
            return Ok(Some(StoredRecord::Node(node.clone())));
        }
        Ok(inner.edges.get(id).cloned().map(StoredRecord::Edge))
    }

    async fn delete_cascade(&self, id: &str) -> Result<DeleteOutcome> {
        let mut inner = self.inner.write();
        inner.ensure_open()?;

        if inner.nodes.shift_remove(id).is_some() {
            let before = inner.edges.len();
            inner.edges.retain(|_, edge| !edge.touches(id));
            return Ok(DeleteOutcome {
                node_removed: true,
                edges_removed: before - inner.edges.len(),
            });
        }

        let edges_removed = usize::from(inner.edges.shift_remove(id).is_some());
        Ok(DeleteOutcome {
            node_removed: false,
            edges_removed,
        })
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<ScanBatch> {
        let inner = self.inner.read();
        inner.ensure_open()?;

        let records: Vec<StoredRecord> = match filter {
            ScanFilter::Nodes(_) => inner
                .nodes
                .values()
                .map(|n| StoredRecord::Node(n.clone()))
                .filter(|r| filter.matches(r))
                .collect(),
            ScanFilter::Edges(_) => inner
                .edges
                .values()
                .map(|e| StoredRecord::Edge(e.clone()))
                .filter(|r| filter.matches(r))
                .collect(),
        };
        Ok(ScanBatch::from_records(records))
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.ensure_open()?;
        inner.nodes.clear();
        inner.edges.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let inner = self.inner.read();
        inner.ensure_open()?;
        Ok(StoreStats {
            node_count: inner.nodes.len(),
            edge_count: inner.edges.len(),
        })
    }

    async fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.closed = true;
        inner.nodes.clear();
        inner.edges.clear();
        Ok(())
    }
}

//! Session integration tests
//!
//! Persistence through real backends, tolerance of corrupt records, store
//! failure classification and concurrent writers.

#[path = "../common/mod.rs"]
mod common;

use async_trait::async_trait;
use common::*;
use std::sync::Arc;
use topology_engine::{
    EntityKind, PropertyMap, RelationshipKind, TopologyError, TopologyGenerator, TopologySession,
};
use topology_store::{
    DeleteOutcome, EdgeRecord, GraphStore, InMemoryGraphStore, NodeRecord, ScanBatch, ScanFilter,
    StorageError, StoreStats, StoredRecord,
};

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_topology_survives_reopen() {
    use topology_store::SqliteGraphStore;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topology.db");

    let topology = {
        let session = TopologySession::new(Arc::new(SqliteGraphStore::new(&path).unwrap()));
        let topology = TopologyGenerator::new(small_config())
            .populate(&session)
            .await
            .unwrap();
        session.close().await.unwrap();
        topology
    };

    let session = TopologySession::new(Arc::new(SqliteGraphStore::new(&path).unwrap()));
    let snapshot = session.load_snapshot().await.unwrap();
    assert!(snapshot.skipped().is_empty());
    assert_eq!(snapshot.entity_count(), topology.entities.len());
    assert_eq!(snapshot.relationship_count(), topology.relationships.len());
    assert_snapshot_consistent(&snapshot);

    // Entities decode back to exactly what was generated, nested properties included
    for original in &topology.entities {
        let loaded = snapshot.entity(original.id()).unwrap();
        assert_eq!(loaded, original);
    }
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_cascade_delete() {
    use topology_store::SqliteGraphStore;

    let session = TopologySession::new(Arc::new(SqliteGraphStore::in_memory().unwrap()));
    let server = session
        .create_entity("Server-01", server_attributes("srv-01"), PropertyMap::new())
        .await
        .unwrap();
    let vm = session
        .create_entity("VM-01", vm_attributes("vm-01"), PropertyMap::new())
        .await
        .unwrap();
    session
        .create_relationship(RelationshipKind::Hosts, server.id(), vm.id(), PropertyMap::new())
        .await
        .unwrap();

    let outcome = session.delete_entity(server.id()).await.unwrap();
    assert_eq!(outcome.edges_removed, 1);

    let stats = session.store_stats().await.unwrap();
    assert_eq!((stats.node_count, stats.edge_count), (1, 0));
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_corrupt_row_is_skipped_not_retryable() {
    use topology_store::SqliteGraphStore;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topology.db");

    let (kept, broken) = {
        let session = TopologySession::new(Arc::new(SqliteGraphStore::new(&path).unwrap()));
        let kept = session
            .create_entity("Server-01", server_attributes("srv-01"), PropertyMap::new())
            .await
            .unwrap();
        let broken = session
            .create_entity("Server-02", server_attributes("srv-02"), PropertyMap::new())
            .await
            .unwrap();
        session.close().await.unwrap();
        (kept, broken)
    };

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "UPDATE nodes SET attributes = '{broken' WHERE id = ?1",
            [broken.id()],
        )
        .unwrap();
    }

    let session = TopologySession::new(Arc::new(SqliteGraphStore::new(&path).unwrap()));
    let snapshot = session.load_snapshot().await.unwrap();
    assert_eq!(snapshot.entity_count(), 1);
    assert_eq!(snapshot.entity(kept.id()), Some(&kept));
    assert_eq!(snapshot.skipped().len(), 1);
    assert_eq!(snapshot.skipped()[0].id, broken.id());

    // A targeted read of the corrupt row is a deterministic failure
    let err = session.get_entity(broken.id()).await.unwrap_err();
    assert!(matches!(err, TopologyError::Serialization(_)));
    assert!(!err.is_retryable());

    let err = session.entities_of_kind(EntityKind::Server).await.unwrap_err();
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_corrupt_entity_record_is_skipped() {
    let store = Arc::new(InMemoryGraphStore::new());
    let session = TopologySession::new(store.clone());
    let server = session
        .create_entity("Server-01", server_attributes("srv-01"), owner_properties("infra"))
        .await
        .unwrap();

    // Hand-written record whose properties blob is not JSON
    let corrupt = NodeRecord::new("srv-corrupt", "Server")
        .with_attribute("name", "Server-02")
        .with_attribute("properties", "{not json")
        .with_attribute("hostname", "srv-02");
    store.put_node(&corrupt).await.unwrap();

    let snapshot = session.load_snapshot().await.unwrap();
    assert_eq!(snapshot.entity_count(), 1);
    assert!(snapshot.entity(server.id()).is_some());
    assert_eq!(snapshot.skipped().len(), 1);
    assert_eq!(snapshot.skipped()[0].id, "srv-corrupt");
}

#[tokio::test]
async fn test_unknown_label_and_dangling_edge_are_skipped() {
    let store = Arc::new(InMemoryGraphStore::new());
    let session = TopologySession::new(store.clone());
    let server = session
        .create_entity("Server-01", server_attributes("srv-01"), PropertyMap::new())
        .await
        .unwrap();

    store
        .put_node(&NodeRecord::new("rtr-1", "Router").with_attribute("name", "edge"))
        .await
        .unwrap();
    store
        .put_edge(&EdgeRecord::new("rel-dangling", "HOSTS", server.id(), "vm-gone"))
        .await
        .unwrap();

    let snapshot = session.load_snapshot().await.unwrap();
    assert_eq!(snapshot.entity_count(), 1);
    assert_eq!(snapshot.relationship_count(), 0);

    let skipped: Vec<&str> = snapshot.skipped().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(skipped, vec!["rtr-1", "rel-dangling"]);
}

#[tokio::test]
async fn test_relationship_checks_stored_kinds() {
    let session = memory_session();
    let server = session
        .create_entity("Server-01", server_attributes("srv-01"), PropertyMap::new())
        .await
        .unwrap();
    let vm = session
        .create_entity("VM-01", vm_attributes("vm-01"), PropertyMap::new())
        .await
        .unwrap();

    let err = session
        .create_relationship(RelationshipKind::Hosts, vm.id(), server.id(), PropertyMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::SchemaViolation { .. }));

    let err = session
        .create_relationship(RelationshipKind::Hosts, server.id(), "vm-missing", PropertyMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::ReferentialIntegrity(_)));

    assert_eq!(session.store_stats().await.unwrap().edge_count, 0);
}

/// Store that is always down
struct UnreachableStore;

#[async_trait]
impl GraphStore for UnreachableStore {
    async fn put_node(&self, _node: &NodeRecord) -> topology_store::Result<()> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn put_edge(&self, _edge: &EdgeRecord) -> topology_store::Result<()> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn get(&self, _id: &str) -> topology_store::Result<Option<StoredRecord>> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn delete_cascade(&self, _id: &str) -> topology_store::Result<DeleteOutcome> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn scan(&self, _filter: &ScanFilter) -> topology_store::Result<ScanBatch> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn clear(&self) -> topology_store::Result<()> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn stats(&self) -> topology_store::Result<StoreStats> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn close(&self) -> topology_store::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unreachable_store_is_retryable() {
    let session = TopologySession::new(Arc::new(UnreachableStore));

    let err = session
        .create_entity("Server-01", server_attributes("srv-01"), PropertyMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::StoreUnavailable(_)));
    assert!(err.is_retryable());

    let err = session.load_snapshot().await.unwrap_err();
    assert!(err.is_retryable());

    // Validation still happens before the store is touched
    let err = session
        .create_entity("  ", server_attributes("srv-01"), PropertyMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::Validation(_)));
    assert!(!err.is_retryable());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_link_and_delete_never_dangles() {
    let session = Arc::new(memory_session());
    let server = session
        .create_entity("Server-01", server_attributes("srv-01"), PropertyMap::new())
        .await
        .unwrap();

    let mut vm_ids = Vec::new();
    for i in 0..20 {
        let vm = session
            .create_entity(format!("VM-{:02}", i), vm_attributes("vm"), PropertyMap::new())
            .await
            .unwrap();
        vm_ids.push(vm.id().to_string());
    }

    let mut handles = Vec::new();
    for vm_id in vm_ids.clone() {
        let linker = session.clone();
        let server_id = server.id().to_string();
        handles.push(tokio::spawn(async move {
            // May lose the race with the delete below; any error must be a clean rejection
            match linker
                .create_relationship(RelationshipKind::Hosts, &server_id, &vm_id, PropertyMap::new())
                .await
            {
                Ok(_) | Err(TopologyError::ReferentialIntegrity(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }));
    }
    for vm_id in vm_ids.iter().step_by(2).cloned() {
        let deleter = session.clone();
        handles.push(tokio::spawn(async move {
            deleter.delete_entity(&vm_id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = session.load_snapshot().await.unwrap();
    assert!(snapshot.skipped().is_empty());
    assert_snapshot_consistent(&snapshot);
    assert_eq!(snapshot.entities_of_kind(EntityKind::VirtualMachine).len(), 10);
    assert_eq!(
        snapshot.relationship_count(),
        snapshot.neighbors(server.id()).unwrap().len()
    );
}

//! Query integration tests over generated topologies

#[path = "../common/mod.rs"]
mod common;

use common::*;
use std::sync::Arc;
use topology_engine::{
    Entity, EntityAttributes, EntityKind, GraphSnapshot, ProjectionLayer, PropertyMap,
    RelationshipKind, TopologyError, TopologyGenerator,
};

#[test]
fn test_container_reaches_switch_through_port() {
    let snapshot = generated_snapshot(small_config());
    let container = snapshot.entities_of_kind(EntityKind::Container)[0];
    let switch = snapshot.entities_of_kind(EntityKind::NetworkSwitch)[0];

    let path = snapshot
        .shortest_path(container.id(), switch.id())
        .unwrap()
        .expect("container is wired to a port of the first switch");
    assert_eq!(path.hops(), 2);
    assert_eq!(path.source().unwrap().id(), container.id());
    assert_eq!(path.target().unwrap().id(), switch.id());
    assert_eq!(
        path.relationship_kinds(),
        vec![RelationshipKind::ConnectedTo, RelationshipKind::Contains]
    );
}

#[test]
fn test_every_pair_in_generated_topology_is_connected() {
    let snapshot = generated_snapshot(small_config());
    let anchor = snapshot.entities()[0].id().to_string();
    for entity in snapshot.entities() {
        let path = snapshot.shortest_path(&anchor, entity.id()).unwrap();
        assert!(path.is_some(), "{} unreachable", entity.id());
    }
}

#[test]
fn test_path_is_deterministic() {
    let snapshot = generated_snapshot(small_config());
    let container = snapshot.entities_of_kind(EntityKind::Container).last().copied().unwrap();
    // Last container sits under the last server, and its port shares that server's VLAN
    let server = snapshot.entities_of_kind(EntityKind::Server).last().copied().unwrap();

    let first = snapshot.shortest_path(container.id(), server.id()).unwrap();
    let second = snapshot.shortest_path(container.id(), server.id()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.unwrap().hops(), 3);
}

#[test]
fn test_isolated_entity_is_unreachable_not_missing() {
    let base = TopologyGenerator::new(small_config()).generate().unwrap();
    let isolated = Entity::new("Server-99", server_attributes("srv-99"), PropertyMap::new()).unwrap();
    let isolated_id = isolated.id().to_string();

    let mut entities = base.entities;
    entities.push(isolated);
    let snapshot = GraphSnapshot::new(entities, base.relationships).unwrap();
    let switch = snapshot.entities_of_kind(EntityKind::NetworkSwitch)[0].id().to_string();

    assert!(snapshot.shortest_path(&switch, &isolated_id).unwrap().is_none());
    assert!(snapshot.neighbors(&isolated_id).unwrap().is_empty());

    let err = snapshot.shortest_path(&switch, "srv-nope").unwrap_err();
    assert!(matches!(err, TopologyError::EntityNotFound(_)));
}

#[test]
fn test_layer_projections_keep_only_internal_edges() {
    let snapshot = generated_snapshot(small_config());

    let compute = snapshot.layer_subgraph(ProjectionLayer::Compute);
    assert_subgraph_closed(&compute);
    assert_eq!(compute.node_count(), 2 + 4);
    assert_eq!(compute.edge_count(), 4);
    assert!(compute.edges.iter().all(|e| e.kind() == RelationshipKind::Hosts));

    let network = snapshot.layer_subgraph(ProjectionLayer::Network);
    assert_subgraph_closed(&network);
    assert_eq!(network.node_count(), 2 + 8 + 3);
    // switch CONTAINS port, port BELONGS_TO VLAN
    assert_eq!(network.edge_count(), 8 + 8);

    let container = snapshot.layer_subgraph(ProjectionLayer::Container);
    assert_subgraph_closed(&container);
    assert!(container.edges.iter().all(|e| e.kind() == RelationshipKind::Contains));

    let graph = compute.to_digraph();
    assert_eq!(graph.node_count(), compute.node_count());
    assert_eq!(graph.edge_count(), compute.edge_count());
}

#[test]
fn test_custom_filter_drops_cross_layer_edges() {
    let snapshot = generated_snapshot(small_config());
    let sub = snapshot.filtered_subgraph(&[EntityKind::Container, EntityKind::NetworkPort]);
    assert_subgraph_closed(&sub);
    assert!(sub
        .edges
        .iter()
        .all(|e| e.kind() == RelationshipKind::ConnectedTo));
    assert_eq!(sub.edge_count(), snapshot.entities_of_kind(EntityKind::Container).len());

    assert_eq!(snapshot.filtered_subgraph(&[]).node_count(), 0);
}

#[test]
fn test_search_by_name_and_nested_property() {
    let snapshot = generated_snapshot(small_config());

    let hits = snapshot.search("switch-01");
    assert!(!hits.is_empty());
    assert_eq!(hits[0].kind(), EntityKind::NetworkSwitch);
    for pair in hits.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!((a.kind(), a.name(), a.id()) <= (b.kind(), b.name(), b.id()));
    }

    // "team-N" only lives inside the nested pod owner property
    let pods = snapshot.search("TEAM-1");
    assert!(!pods.is_empty());
    assert!(pods.iter().all(|e| e.kind() == EntityKind::KubernetesPod));

    let ports = snapshot.search_in("switch-01", &[EntityKind::NetworkPort]);
    assert_eq!(ports.len(), 4);

    assert!(snapshot.search("").is_empty());
    assert!(snapshot.search("no-such-thing").is_empty());
}

#[test]
fn test_search_by_hostname_and_ip() {
    let snapshot = generated_snapshot(small_config());

    let by_hostname = snapshot.search("SRV-01.example.com");
    assert_eq!(by_hostname.len(), 1);
    assert_eq!(by_hostname[0].name(), "Server-01");

    let by_ip = snapshot.search("10.1.0.1");
    assert_eq!(by_ip.len(), 1);
    assert_eq!(by_ip[0].name(), "Server-01");

    let pod = snapshot.search("10.244.0.3");
    assert_eq!(pod.len(), 1);
    assert_eq!(pod[0].kind(), EntityKind::KubernetesPod);

    // Pods name their VM through node_name
    let vm_hits = snapshot.search("vm-01-01.example.com");
    let kinds: Vec<EntityKind> = vm_hits.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::VirtualMachine,
            EntityKind::KubernetesPod,
            EntityKind::KubernetesPod,
        ]
    );
}

#[test]
fn test_snapshot_shared_across_threads() {
    let snapshot = Arc::new(generated_snapshot(small_config()));
    let containers = ids(&snapshot.entities_of_kind(EntityKind::Container));
    let switch = snapshot.entities_of_kind(EntityKind::NetworkSwitch)[0].id().to_string();

    let handles: Vec<_> = containers
        .into_iter()
        .map(|container| {
            let snapshot = Arc::clone(&snapshot);
            let switch = switch.clone();
            std::thread::spawn(move || {
                let path = snapshot.shortest_path(&container, &switch).unwrap();
                path.map(|p| p.hops())
            })
        })
        .collect();

    for handle in handles {
        let hops = handle.join().unwrap().expect("generated topology is connected");
        assert!(hops >= 2);
    }
}

#[test]
fn test_vm_neighbors_span_layers() {
    let snapshot = generated_snapshot(small_config());
    let vm = snapshot.entities_of_kind(EntityKind::VirtualMachine)[0];

    let kinds: Vec<EntityKind> = snapshot
        .neighbors(vm.id())
        .unwrap()
        .iter()
        .map(|e| e.kind())
        .collect();
    assert_eq!(kinds.iter().filter(|k| **k == EntityKind::Server).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == EntityKind::KubernetesPod).count(), 2);
    assert!(matches!(vm.attributes(), EntityAttributes::VirtualMachine(_)));
}

//! Generator integration tests
//!
//! Exact fan-out counts, round-robin wiring, and populate() through a session.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;
use topology_engine::{
    ConfigError, EntityKind, GeneratorConfig, RelationshipKind, StatisticsAggregator,
    TopologyError, TopologyGenerator,
};

#[test]
fn test_reference_sizing_counts() {
    let topology = TopologyGenerator::new(reference_config()).generate().unwrap();

    let expected = [
        (EntityKind::NetworkSwitch, 3),
        (EntityKind::NetworkPort, 72),
        (EntityKind::Vlan, 10),
        (EntityKind::Server, 5),
        (EntityKind::VirtualMachine, 50),
        (EntityKind::KubernetesPod, 300),
        (EntityKind::Container, 600),
    ];
    for (kind, count) in expected {
        assert_eq!(topology.count_of(kind), count, "{}", kind);
    }

    assert_eq!(topology.relationships.len(), 1699);
    assert_eq!(topology.relationship_count_of(RelationshipKind::Contains), 72 + 600);
    assert_eq!(topology.relationship_count_of(RelationshipKind::BelongsTo), 72 + 5);
    assert_eq!(topology.relationship_count_of(RelationshipKind::Hosts), 50);
    assert_eq!(topology.relationship_count_of(RelationshipKind::RunsOn), 300);
    assert_eq!(topology.relationship_count_of(RelationshipKind::ConnectedTo), 600);
}

#[test]
fn test_reference_topology_is_consistent() {
    let snapshot = generated_snapshot(reference_config());
    assert_snapshot_consistent(&snapshot);

    let stats = StatisticsAggregator::counts(&snapshot);
    assert_eq!(stats.total_entities, reference_config().expected_entity_count());
    assert_eq!(stats.total_relationships, 1699);
}

#[test]
fn test_each_port_has_one_vlan_and_each_vm_one_host() {
    let snapshot = generated_snapshot(small_config());

    for port in snapshot.entities_of_kind(EntityKind::NetworkPort) {
        let vlans = snapshot
            .neighbors_via(port.id(), &[RelationshipKind::BelongsTo])
            .unwrap();
        assert_eq!(vlans.len(), 1);
        assert_eq!(vlans[0].kind(), EntityKind::Vlan);
    }
    for vm in snapshot.entities_of_kind(EntityKind::VirtualMachine) {
        let hosts = snapshot
            .neighbors_via(vm.id(), &[RelationshipKind::Hosts])
            .unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].kind(), EntityKind::Server);
    }
}

#[test]
fn test_vlans_shared_round_robin() {
    // 8 ports over 3 VLANs: 3, 3, 2 members
    let snapshot = generated_snapshot(small_config());
    let members: Vec<usize> = snapshot
        .entities_of_kind(EntityKind::Vlan)
        .iter()
        .map(|vlan| {
            snapshot
                .neighbors_via(vlan.id(), &[RelationshipKind::BelongsTo])
                .unwrap()
                .iter()
                .filter(|e| e.kind() == EntityKind::NetworkPort)
                .count()
        })
        .collect();
    assert_eq!(members, vec![3, 3, 2]);
}

#[test]
fn test_invalid_env_sizing_generates_nothing() {
    let env: HashMap<&str, &str> = [("PODS_PER_VM", "-1")].into_iter().collect();
    let err = GeneratorConfig::default()
        .with_overrides(|key| env.get(key).map(|v| v.to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Range { .. }));

    let err = TopologyGenerator::new(small_config().switch_count(0))
        .generate()
        .unwrap_err();
    assert!(matches!(err, TopologyError::Config(_)));
}

#[test]
fn test_overflowing_sizing_fails_fast() {
    let config = GeneratorConfig::default()
        .switch_count(usize::MAX / 2)
        .ports_per_switch(4);
    let err = TopologyGenerator::new(config).generate().unwrap_err();
    assert!(matches!(err, TopologyError::Config(ConfigError::Range { .. })));

    let config = small_config().pods_per_vm(usize::MAX).containers_per_pod(2);
    assert!(TopologyGenerator::new(config).generate().is_err());
}

#[test]
fn test_yaml_file_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "switch_count: 1\nports_per_switch: 2\nvlan_count: 1").unwrap();
    writeln!(file, "server_count: 1\nvms_per_server: 1\npods_per_vm: 1\ncontainers_per_pod: 1").unwrap();

    let config = GeneratorConfig::from_yaml(file.path()).unwrap();
    let topology = TopologyGenerator::new(config).generate().unwrap();
    assert_eq!(topology.entities.len(), 1 + 2 + 1 + 1 + 1 + 1 + 1);
    assert_eq!(topology.relationships.len(), 2 + 2 + 1 + 1 + 1 + 1 + 1);
}

#[tokio::test]
async fn test_populate_writes_through_session() {
    let session = memory_session();
    let topology = TopologyGenerator::new(small_config())
        .populate(&session)
        .await
        .unwrap();

    let stats = session.store_stats().await.unwrap();
    assert_eq!(stats.node_count, topology.entities.len());
    assert_eq!(stats.edge_count, topology.relationships.len());

    let snapshot = session.load_snapshot().await.unwrap();
    assert!(snapshot.skipped().is_empty());
    assert_eq!(
        StatisticsAggregator::counts(&snapshot),
        topology_engine::TopologyStats::from_parts(&topology.entities, &topology.relationships)
    );
}

#[tokio::test]
async fn test_populate_twice_rejects_duplicate_ids() {
    let session = memory_session();
    let generator = TopologyGenerator::new(small_config());
    let topology = generator.generate().unwrap();

    session
        .import(&topology, topology_engine::Deadline::none())
        .await
        .unwrap();
    let err = session
        .import(&topology, topology_engine::Deadline::none())
        .await
        .unwrap_err();
    assert!(matches!(err, TopologyError::Validation(_)));
}

//! Test fixtures

use serde_json::json;
use std::sync::Arc;
use topology_engine::features::model::{ServerAttributes, VirtualMachineAttributes};
use topology_engine::{
    Entity, EntityAttributes, GeneratorConfig, GraphSnapshot, PropertyMap, TopologyGenerator,
    TopologySession,
};
use topology_store::InMemoryGraphStore;

/// The reference sizing: 3 switches x 24 ports, 10 VLANs, 5 servers x 10 VMs x 6 pods x 2 containers
pub fn reference_config() -> GeneratorConfig {
    GeneratorConfig::default()
        .switch_count(3)
        .ports_per_switch(24)
        .vlan_count(10)
        .server_count(5)
        .vms_per_server(10)
        .pods_per_vm(6)
        .containers_per_pod(2)
}

/// Small but complete topology: every tier present, a few of each
pub fn small_config() -> GeneratorConfig {
    GeneratorConfig::default()
        .switch_count(2)
        .ports_per_switch(4)
        .vlan_count(3)
        .server_count(2)
        .vms_per_server(2)
        .pods_per_vm(2)
        .containers_per_pod(2)
}

pub fn generated_snapshot(config: GeneratorConfig) -> GraphSnapshot {
    TopologyGenerator::new(config)
        .generate()
        .expect("generation succeeds")
        .into_snapshot()
        .expect("generated topology is consistent")
}

pub fn memory_session() -> TopologySession {
    TopologySession::new(Arc::new(InMemoryGraphStore::new()))
}

pub fn server_attributes(hostname: &str) -> EntityAttributes {
    EntityAttributes::Server(ServerAttributes {
        hostname: hostname.to_string(),
        cpu_cores: 32,
        memory_gb: 128,
        storage_gb: 2000,
        os: Some("Ubuntu 22.04".to_string()),
        ..Default::default()
    })
}

pub fn vm_attributes(hostname: &str) -> EntityAttributes {
    EntityAttributes::VirtualMachine(VirtualMachineAttributes {
        hostname: hostname.to_string(),
        cpu_cores: Some(4),
        memory_gb: Some(16),
        ..Default::default()
    })
}

pub fn owner_properties(team: &str) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert("owner".to_string(), json!({"team": team, "pager": true}));
    props
}

pub fn ids(entities: &[&Entity]) -> Vec<String> {
    entities.iter().map(|e| e.id().to_string()).collect()
}

//! Deterministic topology fan-out
//!
//! Builds a complete infrastructure hierarchy in dependency order:
//! switches, ports, VLANs, servers, VMs, pods, containers. Every attribute
//! is derived from entity indices; the only nondeterminism in the output is
//! the uuid part of each id and the creation timestamps.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::catalog::*;
use crate::config::GeneratorConfig;
use crate::errors::{Result, TopologyError};
use crate::features::model::{
    ContainerAttributes, Entity, EntityAttributes, PodAttributes, PortAttributes, PropertyMap,
    Relationship, ServerAttributes, SwitchAttributes, VirtualMachineAttributes, VlanAttributes,
};
use crate::features::query_engine::GraphSnapshot;
use crate::features::schema::{EntityKind, RelationshipKind, SchemaRegistry};
use crate::features::session::TopologySession;
use crate::shared::Deadline;

/// Output of one generation run, entities and relationships in creation order
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratedTopology {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl GeneratedTopology {
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn relationship_count_of(&self, kind: RelationshipKind) -> usize {
        self.relationships.iter().filter(|r| r.kind() == kind).count()
    }

    /// Index the generated graph for querying without a store round-trip
    pub fn into_snapshot(self) -> Result<GraphSnapshot> {
        GraphSnapshot::new(self.entities, self.relationships)
    }
}

/// Accumulates entities and relationships, validating each through the model
struct TopologyBuilder<'r> {
    registry: &'r SchemaRegistry,
    kinds: FxHashMap<String, EntityKind>,
    topology: GeneratedTopology,
}

impl<'r> TopologyBuilder<'r> {
    fn new(registry: &'r SchemaRegistry, config: &GeneratorConfig) -> Self {
        let mut topology = GeneratedTopology::default();
        topology.entities.reserve(config.expected_entity_count());
        topology
            .relationships
            .reserve(config.expected_relationship_count());
        Self {
            registry,
            kinds: FxHashMap::default(),
            topology,
        }
    }

    fn add(&mut self, name: String, attributes: EntityAttributes, properties: PropertyMap) -> Result<String> {
        let entity = Entity::new(name, attributes, properties)?;
        let id = entity.id().to_string();
        self.kinds.insert(id.clone(), entity.kind());
        self.topology.entities.push(entity);
        Ok(id)
    }

    fn link(
        &mut self,
        kind: RelationshipKind,
        source_id: &str,
        target_id: &str,
        properties: PropertyMap,
    ) -> Result<()> {
        let relationship =
            Relationship::new(self.registry, &self.kinds, kind, source_id, target_id, properties)?;
        self.topology.relationships.push(relationship);
        Ok(())
    }
}

fn props<const N: usize>(pairs: [(&str, Value); N]) -> PropertyMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| TopologyError::validation(format!("{} {} exceeds u32 range", what, value)))
}

fn switch_name(index: usize) -> String {
    format!("Switch-{:02}", index + 1)
}

fn server_name(index: usize) -> String {
    format!("Server-{:02}", index + 1)
}

fn vlan_name(index: usize) -> String {
    let base = pick(&VLAN_NAMES, index);
    match index / VLAN_NAMES.len() {
        0 => format!("VLAN-{}", base),
        round => format!("VLAN-{}-{}", base, round + 1),
    }
}

/// Deterministic topology generator
pub struct TopologyGenerator {
    config: GeneratorConfig,
    registry: &'static SchemaRegistry,
}

impl TopologyGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_registry(config, SchemaRegistry::global())
    }

    pub fn with_registry(config: GeneratorConfig, registry: &'static SchemaRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the topology in memory
    pub fn generate(&self) -> Result<GeneratedTopology> {
        self.generate_within(Deadline::none())
    }

    /// Build the topology, aborting between steps once `deadline` passes
    ///
    /// Configuration is validated up front, so an invalid count produces no
    /// entities at all.
    pub fn generate_within(&self, deadline: Deadline) -> Result<GeneratedTopology> {
        let c = &self.config;
        c.validate()?;
        info!(
            "Generating topology: {} switches x {} ports, {} VLANs, {} servers x {} VMs x {} pods x {} containers",
            c.switch_count,
            c.ports_per_switch,
            c.vlan_count,
            c.server_count,
            c.vms_per_server,
            c.pods_per_vm,
            c.containers_per_pod
        );

        let mut b = TopologyBuilder::new(self.registry, c);

        // 1. Switches
        deadline.check("switch generation")?;
        let mut switch_ids = Vec::with_capacity(c.switch_count);
        for i in 0..c.switch_count {
            let attributes = EntityAttributes::NetworkSwitch(SwitchAttributes {
                vendor: pick(&SWITCH_VENDORS, i).to_string(),
                model: Some(pick(&SWITCH_MODELS, i).to_string()),
                ip_address: Some(ip_address("192.168", i)),
                mac_address: Some(mac_address(0x01, i)),
                port_count: Some(to_u32(c.ports_per_switch, "ports_per_switch")?),
                location: Some(pick(&LOCATIONS, i).to_string()),
            });
            let properties = props([("firmware", json!(format!("{}.{}.1", 15 + i % 3, i % 10)))]);
            switch_ids.push(b.add(switch_name(i), attributes, properties)?);
        }
        debug!("Created {} switches", switch_ids.len());

        // 2. Ports, switch -CONTAINS-> port
        deadline.check("port generation")?;
        let mut port_ids = Vec::with_capacity(c.switch_count * c.ports_per_switch);
        for (s, switch_id) in switch_ids.iter().enumerate() {
            for p in 0..c.ports_per_switch {
                let global = port_ids.len();
                let number = to_u32(p + 1, "port number")?;
                let status = if global % 10 == 9 { "down" } else { "up" };
                let attributes = EntityAttributes::NetworkPort(PortAttributes {
                    port_number: number,
                    port_type: Some(pick(&PORT_TYPES, global).to_string()),
                    status: Some(status.to_string()),
                    speed: Some(pick(&PORT_SPEEDS, global).to_string()),
                    duplex: Some("full".to_string()),
                });
                let port_id = b.add(
                    format!("{}-Port-{:02}", switch_name(s), number),
                    attributes,
                    PropertyMap::new(),
                )?;
                b.link(
                    RelationshipKind::Contains,
                    switch_id,
                    &port_id,
                    props([("port_number", json!(number))]),
                )?;
                port_ids.push(port_id);
            }
        }
        debug!("Created {} ports", port_ids.len());

        // 3. VLANs, port i -BELONGS_TO-> VLAN (i mod vlan_count)
        deadline.check("VLAN generation")?;
        let mut vlan_ids = Vec::with_capacity(c.vlan_count);
        for i in 0..c.vlan_count {
            let vlan_id = FIRST_VLAN_ID + to_u32(i, "VLAN index")?;
            let attributes = EntityAttributes::Vlan(VlanAttributes {
                vlan_id,
                subnet: Some(format!("10.{}.{}.0/24", vlan_id / 100, vlan_id % 100)),
                gateway: Some(format!("10.{}.{}.1", vlan_id / 100, vlan_id % 100)),
                description: Some(format!("{} network segment", pick(&VLAN_NAMES, i))),
            });
            vlan_ids.push(b.add(vlan_name(i), attributes, PropertyMap::new())?);
        }
        for (i, port_id) in port_ids.iter().enumerate() {
            let mode = if i % 2 == 0 { "access" } else { "trunk" };
            b.link(
                RelationshipKind::BelongsTo,
                port_id,
                &vlan_ids[i % vlan_ids.len()],
                props([("mode", json!(mode))]),
            )?;
        }
        debug!("Created {} VLANs", vlan_ids.len());

        // 4. Servers, server i -BELONGS_TO-> VLAN (i mod vlan_count)
        deadline.check("server generation")?;
        let mut server_ids = Vec::with_capacity(c.server_count);
        for i in 0..c.server_count {
            let attributes = EntityAttributes::Server(ServerAttributes {
                hostname: format!("srv-{:02}.example.com", i + 1),
                cpu_cores: pick(&SERVER_CPU_CORES, i),
                memory_gb: pick(&SERVER_MEMORY_GB, i),
                storage_gb: pick(&SERVER_STORAGE_GB, i),
                ip_address: Some(ip_address("10.1", i)),
                mac_address: Some(mac_address(0x02, i)),
                os: Some(pick(&SERVER_OS, i).to_string()),
                rack_location: Some(format!("Rack-{:02}-U{:02}", i / RACK_UNITS + 1, i % RACK_UNITS + 1)),
            });
            let server_id = b.add(server_name(i), attributes, PropertyMap::new())?;
            b.link(
                RelationshipKind::BelongsTo,
                &server_id,
                &vlan_ids[i % vlan_ids.len()],
                props([("interface", json!("eth0"))]),
            )?;
            server_ids.push(server_id);
        }
        debug!("Created {} servers", server_ids.len());

        // 5. VMs, server -HOSTS-> VM
        deadline.check("VM generation")?;
        let mut vms: Vec<(String, String)> = Vec::with_capacity(c.server_count * c.vms_per_server);
        for (s, server_id) in server_ids.iter().enumerate() {
            for v in 0..c.vms_per_server {
                let global = vms.len();
                let hypervisor = pick(&HYPERVISORS, global);
                let hostname = format!("vm-{:02}-{:02}.example.com", s + 1, v + 1);
                let attributes = EntityAttributes::VirtualMachine(VirtualMachineAttributes {
                    hostname: hostname.clone(),
                    cpu_cores: Some(pick(&VM_CPU_CORES, global)),
                    memory_gb: Some(pick(&VM_MEMORY_GB, global)),
                    storage_gb: Some(pick(&VM_STORAGE_GB, global)),
                    ip_address: Some(ip_address("10.2", global)),
                    os: Some(pick(&VM_OS, global).to_string()),
                    hypervisor: Some(hypervisor.to_string()),
                    vm_id: Some(format!("vmid-{:06}", global + 1)),
                });
                let vm_id = b.add(
                    format!("{}-VM-{:02}", server_name(s), v + 1),
                    attributes,
                    PropertyMap::new(),
                )?;
                b.link(
                    RelationshipKind::Hosts,
                    server_id,
                    &vm_id,
                    props([("hypervisor", json!(hypervisor))]),
                )?;
                vms.push((vm_id, hostname));
            }
        }
        debug!("Created {} virtual machines", vms.len());

        // 6. Pods, VM -RUNS_ON-> pod
        deadline.check("pod generation")?;
        let mut pods: Vec<(String, String)> = Vec::with_capacity(vms.len() * c.pods_per_vm);
        for (vm_id, vm_hostname) in &vms {
            deadline.check("pod generation")?;
            for _ in 0..c.pods_per_vm {
                let global = pods.len();
                let namespace = pick(&NAMESPACES, global);
                let app = format!("app-{}", global % 10 + 1);
                let name = format!("pod-{}-{:04}", namespace, global + 1);
                let labels = [
                    ("app".to_string(), app.clone()),
                    ("environment".to_string(), pick(&DEPLOY_ENVIRONMENTS, global).to_string()),
                    ("version".to_string(), format!("v1.{}.0", global % 10)),
                ]
                .into_iter()
                .collect();
                let annotations = [(
                    "deployment.kubernetes.io/revision".to_string(),
                    (global % 5 + 1).to_string(),
                )]
                .into_iter()
                .collect();
                let attributes = EntityAttributes::KubernetesPod(PodAttributes {
                    namespace: namespace.to_string(),
                    pod_ip: Some(ip_address("10.244", global)),
                    node_name: Some(vm_hostname.clone()),
                    labels,
                    annotations,
                    phase: Some(pick(&POD_PHASES, global).to_string()),
                    restart_count: Some(to_u32(global % 4, "restart count")?),
                });
                let properties = props([(
                    "owner",
                    json!({"team": format!("team-{}", global % 4 + 1), "app": app}),
                )]);
                let pod_id = b.add(name.clone(), attributes, properties)?;
                b.link(
                    RelationshipKind::RunsOn,
                    vm_id,
                    &pod_id,
                    props([("namespace", json!(namespace))]),
                )?;
                pods.push((pod_id, name));
            }
        }
        debug!("Created {} pods", pods.len());

        // 7. Containers, pod -CONTAINS-> container
        deadline.check("container generation")?;
        let mut container_ids = Vec::with_capacity(pods.len() * c.containers_per_pod);
        for (pod_id, pod_name) in &pods {
            for n in 0..c.containers_per_pod {
                let global = container_ids.len();
                let (image, tag) = pick(&CONTAINER_IMAGES, global);
                let short = image.rsplit('/').next().unwrap_or(image);
                let status = pick(&CONTAINER_STATUSES, global);
                let port = 3000 + global % 6000;
                let environment_vars = [
                    ("ENV".to_string(), pick(&DEPLOY_ENVIRONMENTS, global).to_string()),
                    ("LOG_LEVEL".to_string(), pick(&LOG_LEVELS, global).to_string()),
                    ("MAX_CONNECTIONS".to_string(), (100 + global % 900).to_string()),
                ]
                .into_iter()
                .collect();
                let attributes = EntityAttributes::Container(ContainerAttributes {
                    image: image.to_string(),
                    image_tag: Some(tag.to_string()),
                    container_id: Some(format!("cid-{:012x}", global + 1)),
                    ports: vec![format!("{}/tcp", port)],
                    environment_vars,
                    cpu_limit: Some(format!("{}m", 100 + (global * 50) % 1900)),
                    memory_limit: Some(format!("{}Mi", 128 * (1 + global % 32))),
                    status: Some(status.to_string()),
                });
                let container_id = b.add(
                    format!("{}-{}-{}", pod_name, short, n + 1),
                    attributes,
                    PropertyMap::new(),
                )?;
                b.link(
                    RelationshipKind::Contains,
                    pod_id,
                    &container_id,
                    props([("image", json!(format!("{}:{}", image, tag)))]),
                )?;
                container_ids.push(container_id);
            }
        }
        debug!("Created {} containers", container_ids.len());

        // 8. Container j -CONNECTED_TO-> port (j mod port_count)
        deadline.check("container wiring")?;
        for (j, container_id) in container_ids.iter().enumerate() {
            b.link(
                RelationshipKind::ConnectedTo,
                container_id,
                &port_ids[j % port_ids.len()],
                props([("protocol", json!("tcp"))]),
            )?;
        }

        let topology = b.topology;
        info!(
            "Generated topology: {} entities, {} relationships",
            topology.entities.len(),
            topology.relationships.len()
        );
        Ok(topology)
    }

    /// Generate and write the topology through `session`
    pub async fn populate(&self, session: &TopologySession) -> Result<GeneratedTopology> {
        self.populate_within(session, Deadline::none()).await
    }

    pub async fn populate_within(
        &self,
        session: &TopologySession,
        deadline: Deadline,
    ) -> Result<GeneratedTopology> {
        let topology = self.generate_within(deadline)?;
        session.import(&topology, deadline).await?;
        Ok(topology)
    }
}

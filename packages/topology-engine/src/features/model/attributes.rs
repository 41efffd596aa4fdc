//! Kind-specific typed fields
//!
//! [`EntityAttributes`] is a tagged union: its discriminant *is* the entity
//! kind, so an entity can never carry fields belonging to another kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use topology_store::Attributes;

use super::records::{AttributeReader, AttributeWriter};
use crate::errors::{Result, TopologyError};
use crate::features::schema::EntityKind;

fn require_text(kind: EntityKind, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TopologyError::validation(format!(
            "{} requires a non-empty '{}'",
            kind, field
        )));
    }
    Ok(())
}

fn require_positive(kind: EntityKind, field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(TopologyError::validation(format!(
            "{} requires '{}' greater than zero",
            kind, field
        )));
    }
    Ok(())
}

fn positive_if_set(kind: EntityKind, field: &str, value: Option<u32>) -> Result<()> {
    match value {
        Some(v) => require_positive(kind, field, v),
        None => Ok(()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Network
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchAttributes {
    pub vendor: String,
    pub model: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub port_count: Option<u32>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAttributes {
    pub port_number: u32,
    pub port_type: Option<String>,
    pub status: Option<String>,
    pub speed: Option<String>,
    pub duplex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanAttributes {
    /// 802.1Q id, 1..=4094
    pub vlan_id: u32,
    pub subnet: Option<String>,
    pub gateway: Option<String>,
    pub description: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Compute
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAttributes {
    pub hostname: String,
    pub cpu_cores: u32,
    pub memory_gb: u32,
    pub storage_gb: u32,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub os: Option<String>,
    pub rack_location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachineAttributes {
    pub hostname: String,
    pub cpu_cores: Option<u32>,
    pub memory_gb: Option<u32>,
    pub storage_gb: Option<u32>,
    pub ip_address: Option<String>,
    pub os: Option<String>,
    pub hypervisor: Option<String>,
    pub vm_id: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Orchestration / Application
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodAttributes {
    pub namespace: String,
    pub pod_ip: Option<String>,
    pub node_name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub phase: Option<String>,
    pub restart_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerAttributes {
    pub image: String,
    pub image_tag: Option<String>,
    pub container_id: Option<String>,
    pub ports: Vec<String>,
    pub environment_vars: BTreeMap<String, String>,
    pub cpu_limit: Option<String>,
    pub memory_limit: Option<String>,
    pub status: Option<String>,
}

/// CPU / memory / storage sizing of a compute entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeResources {
    pub cpu_cores: Option<u32>,
    pub memory_gb: Option<u32>,
    pub storage_gb: Option<u32>,
}

/// Typed fields, discriminated by entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EntityAttributes {
    NetworkSwitch(SwitchAttributes),
    NetworkPort(PortAttributes),
    #[serde(rename = "VLAN")]
    Vlan(VlanAttributes),
    Server(ServerAttributes),
    VirtualMachine(VirtualMachineAttributes),
    KubernetesPod(PodAttributes),
    Container(ContainerAttributes),
}

impl EntityAttributes {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityAttributes::NetworkSwitch(_) => EntityKind::NetworkSwitch,
            EntityAttributes::NetworkPort(_) => EntityKind::NetworkPort,
            EntityAttributes::Vlan(_) => EntityKind::Vlan,
            EntityAttributes::Server(_) => EntityKind::Server,
            EntityAttributes::VirtualMachine(_) => EntityKind::VirtualMachine,
            EntityAttributes::KubernetesPod(_) => EntityKind::KubernetesPod,
            EntityAttributes::Container(_) => EntityKind::Container,
        }
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            EntityAttributes::NetworkSwitch(a) => {
                require_text(kind, "vendor", &a.vendor)?;
                positive_if_set(kind, "port_count", a.port_count)
            }
            EntityAttributes::NetworkPort(a) => require_positive(kind, "port_number", a.port_number),
            EntityAttributes::Vlan(a) => {
                if !(1..=4094).contains(&a.vlan_id) {
                    return Err(TopologyError::validation(format!(
                        "VLAN requires 'vlan_id' in 1..=4094, got {}",
                        a.vlan_id
                    )));
                }
                Ok(())
            }
            EntityAttributes::Server(a) => {
                require_text(kind, "hostname", &a.hostname)?;
                require_positive(kind, "cpu_cores", a.cpu_cores)?;
                require_positive(kind, "memory_gb", a.memory_gb)?;
                require_positive(kind, "storage_gb", a.storage_gb)
            }
            EntityAttributes::VirtualMachine(a) => {
                require_text(kind, "hostname", &a.hostname)?;
                positive_if_set(kind, "cpu_cores", a.cpu_cores)?;
                positive_if_set(kind, "memory_gb", a.memory_gb)?;
                positive_if_set(kind, "storage_gb", a.storage_gb)
            }
            EntityAttributes::KubernetesPod(a) => require_text(kind, "namespace", &a.namespace),
            EntityAttributes::Container(a) => require_text(kind, "image", &a.image),
        }
    }

    /// Sizing for servers and VMs; `None` for every other kind
    pub fn resources(&self) -> Option<ComputeResources> {
        match self {
            EntityAttributes::Server(a) => Some(ComputeResources {
                cpu_cores: Some(a.cpu_cores),
                memory_gb: Some(a.memory_gb),
                storage_gb: Some(a.storage_gb),
            }),
            EntityAttributes::VirtualMachine(a) => Some(ComputeResources {
                cpu_cores: a.cpu_cores,
                memory_gb: a.memory_gb,
                storage_gb: a.storage_gb,
            }),
            _ => None,
        }
    }

    /// Identifying text fields matched by search: hostnames, addresses,
    /// namespaces and images
    pub fn searchable_text(&self) -> Vec<&str> {
        let fields: Vec<Option<&String>> = match self {
            EntityAttributes::NetworkSwitch(a) => vec![
                Some(&a.vendor),
                a.model.as_ref(),
                a.ip_address.as_ref(),
                a.mac_address.as_ref(),
                a.location.as_ref(),
            ],
            EntityAttributes::NetworkPort(_) => Vec::new(),
            EntityAttributes::Vlan(a) => vec![a.subnet.as_ref(), a.gateway.as_ref()],
            EntityAttributes::Server(a) => vec![
                Some(&a.hostname),
                a.ip_address.as_ref(),
                a.mac_address.as_ref(),
                a.rack_location.as_ref(),
            ],
            EntityAttributes::VirtualMachine(a) => vec![
                Some(&a.hostname),
                a.ip_address.as_ref(),
                a.vm_id.as_ref(),
            ],
            EntityAttributes::KubernetesPod(a) => vec![
                Some(&a.namespace),
                a.pod_ip.as_ref(),
                a.node_name.as_ref(),
            ],
            EntityAttributes::Container(a) => vec![Some(&a.image), a.container_id.as_ref()],
        };
        fields.into_iter().flatten().map(String::as_str).collect()
    }

    pub(crate) fn write_to(&self, attrs: &mut Attributes) -> Result<()> {
        let mut w = AttributeWriter::new(attrs);
        match self {
            EntityAttributes::NetworkSwitch(a) => {
                w.text("vendor", &a.vendor)
                    .opt_text("model", &a.model)
                    .opt_text("ip_address", &a.ip_address)
                    .opt_text("mac_address", &a.mac_address)
                    .opt_count("port_count", a.port_count)
                    .opt_text("location", &a.location);
            }
            EntityAttributes::NetworkPort(a) => {
                w.count("port_number", a.port_number)
                    .opt_text("port_type", &a.port_type)
                    .opt_text("status", &a.status)
                    .opt_text("speed", &a.speed)
                    .opt_text("duplex", &a.duplex);
            }
            EntityAttributes::Vlan(a) => {
                w.count("vlan_id", a.vlan_id)
                    .opt_text("subnet", &a.subnet)
                    .opt_text("gateway", &a.gateway)
                    .opt_text("description", &a.description);
            }
            EntityAttributes::Server(a) => {
                w.text("hostname", &a.hostname)
                    .count("cpu_cores", a.cpu_cores)
                    .count("memory_gb", a.memory_gb)
                    .count("storage_gb", a.storage_gb)
                    .opt_text("ip_address", &a.ip_address)
                    .opt_text("mac_address", &a.mac_address)
                    .opt_text("os", &a.os)
                    .opt_text("rack_location", &a.rack_location);
            }
            EntityAttributes::VirtualMachine(a) => {
                w.text("hostname", &a.hostname)
                    .opt_count("cpu_cores", a.cpu_cores)
                    .opt_count("memory_gb", a.memory_gb)
                    .opt_count("storage_gb", a.storage_gb)
                    .opt_text("ip_address", &a.ip_address)
                    .opt_text("os", &a.os)
                    .opt_text("hypervisor", &a.hypervisor)
                    .opt_text("vm_id", &a.vm_id);
            }
            EntityAttributes::KubernetesPod(a) => {
                w.text("namespace", &a.namespace)
                    .opt_text("pod_ip", &a.pod_ip)
                    .opt_text("node_name", &a.node_name)
                    .opt_text("phase", &a.phase)
                    .opt_count("restart_count", a.restart_count);
                w.string_map("labels", &a.labels)?
                    .string_map("annotations", &a.annotations)?;
            }
            EntityAttributes::Container(a) => {
                w.text("image", &a.image)
                    .opt_text("image_tag", &a.image_tag)
                    .opt_text("container_id", &a.container_id)
                    .list("ports", &a.ports)
                    .opt_text("cpu_limit", &a.cpu_limit)
                    .opt_text("memory_limit", &a.memory_limit)
                    .opt_text("status", &a.status);
                w.string_map("environment_vars", &a.environment_vars)?;
            }
        }
        Ok(())
    }

    pub(crate) fn read_from(kind: EntityKind, r: &AttributeReader<'_>) -> Result<Self> {
        let attributes = match kind {
            EntityKind::NetworkSwitch => EntityAttributes::NetworkSwitch(SwitchAttributes {
                vendor: r.text("vendor")?,
                model: r.opt_text("model")?,
                ip_address: r.opt_text("ip_address")?,
                mac_address: r.opt_text("mac_address")?,
                port_count: r.opt_count("port_count")?,
                location: r.opt_text("location")?,
            }),
            EntityKind::NetworkPort => EntityAttributes::NetworkPort(PortAttributes {
                port_number: r.count("port_number")?,
                port_type: r.opt_text("port_type")?,
                status: r.opt_text("status")?,
                speed: r.opt_text("speed")?,
                duplex: r.opt_text("duplex")?,
            }),
            EntityKind::Vlan => EntityAttributes::Vlan(VlanAttributes {
                vlan_id: r.count("vlan_id")?,
                subnet: r.opt_text("subnet")?,
                gateway: r.opt_text("gateway")?,
                description: r.opt_text("description")?,
            }),
            EntityKind::Server => EntityAttributes::Server(ServerAttributes {
                hostname: r.text("hostname")?,
                cpu_cores: r.count("cpu_cores")?,
                memory_gb: r.count("memory_gb")?,
                storage_gb: r.count("storage_gb")?,
                ip_address: r.opt_text("ip_address")?,
                mac_address: r.opt_text("mac_address")?,
                os: r.opt_text("os")?,
                rack_location: r.opt_text("rack_location")?,
            }),
            EntityKind::VirtualMachine => EntityAttributes::VirtualMachine(VirtualMachineAttributes {
                hostname: r.text("hostname")?,
                cpu_cores: r.opt_count("cpu_cores")?,
                memory_gb: r.opt_count("memory_gb")?,
                storage_gb: r.opt_count("storage_gb")?,
                ip_address: r.opt_text("ip_address")?,
                os: r.opt_text("os")?,
                hypervisor: r.opt_text("hypervisor")?,
                vm_id: r.opt_text("vm_id")?,
            }),
            EntityKind::KubernetesPod => EntityAttributes::KubernetesPod(PodAttributes {
                namespace: r.text("namespace")?,
                pod_ip: r.opt_text("pod_ip")?,
                node_name: r.opt_text("node_name")?,
                labels: r.string_map("labels")?,
                annotations: r.string_map("annotations")?,
                phase: r.opt_text("phase")?,
                restart_count: r.opt_count("restart_count")?,
            }),
            EntityKind::Container => EntityAttributes::Container(ContainerAttributes {
                image: r.text("image")?,
                image_tag: r.opt_text("image_tag")?,
                container_id: r.opt_text("container_id")?,
                ports: r.list("ports")?,
                environment_vars: r.string_map("environment_vars")?,
                cpu_limit: r.opt_text("cpu_limit")?,
                memory_limit: r.opt_text("memory_limit")?,
                status: r.opt_text("status")?,
            }),
        };
        Ok(attributes)
    }
}

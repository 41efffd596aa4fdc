//! Entity and relationship kinds
//!
//! Both sets are closed. Declaration order follows the infrastructure
//! hierarchy (network, compute, virtualization, orchestration, application)
//! and is the order used for sorting and reporting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::layers::InfrastructureLayer;
use crate::errors::TopologyError;

/// Kind of infrastructure entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    NetworkSwitch,
    NetworkPort,
    #[serde(rename = "VLAN")]
    Vlan,
    Server,
    VirtualMachine,
    KubernetesPod,
    Container,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::NetworkSwitch,
        EntityKind::NetworkPort,
        EntityKind::Vlan,
        EntityKind::Server,
        EntityKind::VirtualMachine,
        EntityKind::KubernetesPod,
        EntityKind::Container,
    ];

    /// Stored label / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::NetworkSwitch => "NetworkSwitch",
            EntityKind::NetworkPort => "NetworkPort",
            EntityKind::Vlan => "VLAN",
            EntityKind::Server => "Server",
            EntityKind::VirtualMachine => "VirtualMachine",
            EntityKind::KubernetesPod => "KubernetesPod",
            EntityKind::Container => "Container",
        }
    }

    /// Prefix for generated ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::NetworkSwitch => "sw",
            EntityKind::NetworkPort => "port",
            EntityKind::Vlan => "vlan",
            EntityKind::Server => "srv",
            EntityKind::VirtualMachine => "vm",
            EntityKind::KubernetesPod => "pod",
            EntityKind::Container => "ctr",
        }
    }

    pub fn layer(&self) -> InfrastructureLayer {
        match self {
            EntityKind::NetworkSwitch | EntityKind::NetworkPort | EntityKind::Vlan => {
                InfrastructureLayer::Network
            }
            EntityKind::Server => InfrastructureLayer::Compute,
            EntityKind::VirtualMachine => InfrastructureLayer::Virtualization,
            EntityKind::KubernetesPod => InfrastructureLayer::ContainerOrchestration,
            EntityKind::Container => InfrastructureLayer::Application,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TopologyError::KindNotRegistered(s.to_string()))
    }
}

/// Kind of directed relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    Contains,
    BelongsTo,
    Hosts,
    RunsOn,
    ConnectedTo,
    DeployedOn,
    PartOf,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 7] = [
        RelationshipKind::Contains,
        RelationshipKind::BelongsTo,
        RelationshipKind::Hosts,
        RelationshipKind::RunsOn,
        RelationshipKind::ConnectedTo,
        RelationshipKind::DeployedOn,
        RelationshipKind::PartOf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Contains => "CONTAINS",
            RelationshipKind::BelongsTo => "BELONGS_TO",
            RelationshipKind::Hosts => "HOSTS",
            RelationshipKind::RunsOn => "RUNS_ON",
            RelationshipKind::ConnectedTo => "CONNECTED_TO",
            RelationshipKind::DeployedOn => "DEPLOYED_ON",
            RelationshipKind::PartOf => "PART_OF",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationshipKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TopologyError::KindNotRegistered(s.to_string()))
    }
}

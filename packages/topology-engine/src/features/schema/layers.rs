//! Infrastructure layers and visualization projections

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::kinds::EntityKind;
use crate::errors::TopologyError;

/// Hierarchy tier an entity kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InfrastructureLayer {
    Network,
    Compute,
    Virtualization,
    ContainerOrchestration,
    Application,
}

impl InfrastructureLayer {
    pub const ALL: [InfrastructureLayer; 5] = [
        InfrastructureLayer::Network,
        InfrastructureLayer::Compute,
        InfrastructureLayer::Virtualization,
        InfrastructureLayer::ContainerOrchestration,
        InfrastructureLayer::Application,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InfrastructureLayer::Network => "Network Layer",
            InfrastructureLayer::Compute => "Compute Layer",
            InfrastructureLayer::Virtualization => "Virtualization Layer",
            InfrastructureLayer::ContainerOrchestration => "Container Orchestration Layer",
            InfrastructureLayer::Application => "Application Layer",
        }
    }

    pub fn kinds(&self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| kind.layer() == *self)
            .collect()
    }
}

impl fmt::Display for InfrastructureLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named kind filter used for layered views of the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionLayer {
    /// Switches, ports, VLANs
    Network,
    /// Servers and virtual machines
    Compute,
    /// Pods and containers
    Container,
}

impl ProjectionLayer {
    pub fn kinds(&self) -> &'static [EntityKind] {
        match self {
            ProjectionLayer::Network => &[
                EntityKind::NetworkSwitch,
                EntityKind::NetworkPort,
                EntityKind::Vlan,
            ],
            ProjectionLayer::Compute => &[EntityKind::Server, EntityKind::VirtualMachine],
            ProjectionLayer::Container => &[EntityKind::KubernetesPod, EntityKind::Container],
        }
    }
}

impl FromStr for ProjectionLayer {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "network" => Ok(ProjectionLayer::Network),
            "compute" => Ok(ProjectionLayer::Compute),
            "container" => Ok(ProjectionLayer::Container),
            _ => Err(TopologyError::validation(format!(
                "unknown layer '{}': expected network, compute or container",
                s
            ))),
        }
    }
}

//! Statistics Aggregator
//!
//! Counts by kind, per-layer breakdown and compute resource totals.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::{Result, TopologyError};
use crate::features::model::{Entity, Relationship};
use crate::features::query_engine::GraphSnapshot;
use crate::features::schema::{EntityKind, InfrastructureLayer, RelationshipKind};

/// Entity and relationship counts; every kind is listed, zeros included
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyStats {
    pub entity_counts: BTreeMap<EntityKind, usize>,
    pub relationship_counts: BTreeMap<RelationshipKind, usize>,
    pub total_entities: usize,
    pub total_relationships: usize,
}

impl TopologyStats {
    pub fn from_parts(entities: &[Entity], relationships: &[Relationship]) -> Self {
        let mut entity_counts: BTreeMap<EntityKind, usize> =
            EntityKind::ALL.iter().map(|k| (*k, 0)).collect();
        for entity in entities {
            *entity_counts.entry(entity.kind()).or_default() += 1;
        }

        let mut relationship_counts: BTreeMap<RelationshipKind, usize> =
            RelationshipKind::ALL.iter().map(|k| (*k, 0)).collect();
        for rel in relationships {
            *relationship_counts.entry(rel.kind()).or_default() += 1;
        }

        Self {
            total_entities: entity_counts.values().sum(),
            total_relationships: relationship_counts.values().sum(),
            entity_counts,
            relationship_counts,
        }
    }

    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.entity_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn relationship_count(&self, kind: RelationshipKind) -> usize {
        self.relationship_counts.get(&kind).copied().unwrap_or(0)
    }
}

/// Totals and averages of CPU, memory and storage for one compute kind
///
/// Averages are taken over the entities that actually report the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSummary {
    pub kind: EntityKind,
    pub entity_count: usize,
    pub total_cpu_cores: u64,
    pub total_memory_gb: u64,
    pub total_storage_gb: u64,
    pub avg_cpu_cores: f64,
    pub avg_memory_gb: f64,
    pub avg_storage_gb: f64,
}

#[derive(Default)]
struct Accumulator {
    total: u64,
    reporting: usize,
}

impl Accumulator {
    fn add(&mut self, value: Option<u32>) {
        if let Some(v) = value {
            self.total += u64::from(v);
            self.reporting += 1;
        }
    }

    fn average(&self) -> f64 {
        if self.reporting == 0 {
            0.0
        } else {
            self.total as f64 / self.reporting as f64
        }
    }
}

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn counts(snapshot: &GraphSnapshot) -> TopologyStats {
        TopologyStats::from_parts(snapshot.entities(), snapshot.relationships())
    }

    /// Entity counts per infrastructure layer, every layer listed
    pub fn layer_breakdown(snapshot: &GraphSnapshot) -> BTreeMap<InfrastructureLayer, usize> {
        let mut layers: BTreeMap<InfrastructureLayer, usize> =
            InfrastructureLayer::ALL.iter().map(|l| (*l, 0)).collect();
        for entity in snapshot.entities() {
            *layers.entry(entity.kind().layer()).or_default() += 1;
        }
        layers
    }

    /// Resource totals for `Server` or `VirtualMachine`
    pub fn resource_summary(snapshot: &GraphSnapshot, kind: EntityKind) -> Result<ResourceSummary> {
        if !matches!(kind, EntityKind::Server | EntityKind::VirtualMachine) {
            return Err(TopologyError::validation(format!(
                "resource summary is available for Server and VirtualMachine, not {}",
                kind
            )));
        }

        let (mut cpu, mut memory, mut storage) =
            (Accumulator::default(), Accumulator::default(), Accumulator::default());
        let mut entity_count = 0;
        for entity in snapshot.entities().iter().filter(|e| e.kind() == kind) {
            entity_count += 1;
            if let Some(resources) = entity.attributes().resources() {
                cpu.add(resources.cpu_cores);
                memory.add(resources.memory_gb);
                storage.add(resources.storage_gb);
            }
        }

        Ok(ResourceSummary {
            kind,
            entity_count,
            total_cpu_cores: cpu.total,
            total_memory_gb: memory.total,
            total_storage_gb: storage.total,
            avg_cpu_cores: cpu.average(),
            avg_memory_gb: memory.average(),
            avg_storage_gb: storage.average(),
        })
    }
}

//! Statistics Feature

pub mod aggregator;

pub use aggregator::{ResourceSummary, StatisticsAggregator, TopologyStats};

//! Cooperative deadlines for long-running operations
//!
//! Checked between steps (generator tiers, BFS expansions), never preemptive.

use std::time::{Duration, Instant};

use crate::errors::{Result, TopologyError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded(stage)` once the deadline has passed
    pub fn check(&self, stage: &'static str) -> Result<()> {
        if self.is_expired() {
            return Err(TopologyError::DeadlineExceeded(stage));
        }
        Ok(())
    }
}

//! Error types for topology-engine
//!
//! Every engine operation returns [`TopologyError`]. Store failures are
//! classified on the way in so callers can tell a retryable outage from a
//! deterministic rejection.

use thiserror::Error;
use topology_store::{ErrorKind, StorageError};

use crate::config::ConfigError;
use crate::features::schema::{EntityKind, RelationshipKind};

/// Main error type for topology-engine operations
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Field-level rejection (missing/blank name, bad port number, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A relationship endpoint does not exist
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// The endpoint kinds are not on the relationship's allow-list
    #[error("Schema violation: {relationship} does not allow {source_kind} -> {target_kind}")]
    SchemaViolation {
        relationship: RelationshipKind,
        source_kind: EntityKind,
        target_kind: EntityKind,
    },

    /// Unknown entity or relationship kind name
    #[error("Kind not registered: {0}")]
    KindNotRegistered(String),

    /// Lookup by id found nothing
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Graph store unreachable or failing
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),

    /// Property encoding / record decoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Deadline passed between steps of a long operation
    #[error("Deadline exceeded during {0}")]
    DeadlineExceeded(&'static str),
}

impl TopologyError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TopologyError::Validation(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        TopologyError::Serialization(msg.into())
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TopologyError::StoreUnavailable(err) if err.is_transient())
    }
}

impl From<StorageError> for TopologyError {
    fn from(err: StorageError) -> Self {
        match err.kind {
            ErrorKind::Serialization => TopologyError::Serialization(err.message),
            ErrorKind::Conflict => TopologyError::Validation(err.message),
            ErrorKind::NotFound => TopologyError::EntityNotFound(err.message),
            _ => TopologyError::StoreUnavailable(err),
        }
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Serialization(format!("JSON error: {}", err))
    }
}

/// Result type alias for topology operations
pub type Result<T> = std::result::Result<T, TopologyError>;

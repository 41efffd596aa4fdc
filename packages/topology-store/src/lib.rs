//! Graph store port for the infrastructure topology engine
//!
//! > "The store keeps primitives; the engine keeps the invariants."
//!
//! ## Core Principles
//!
//! 1. **Primitive-only records**: attribute values are scalars or flat arrays
//!    of scalars. Nested structures are encoded to text by the caller.
//! 2. **No schema enforcement**: backends never validate kinds, endpoints, or
//!    allow-lists. Validation happens before `put_*`.
//! 3. **Stable scan order**: records come back in first-insertion order, so
//!    traversals built on a scan are deterministic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use topology_store::{GraphStore, InMemoryGraphStore, NodeRecord, EdgeRecord, ScanFilter};
//!
//! let store = InMemoryGraphStore::new();
//! store.put_node(&NodeRecord::new("srv-1", "Server")).await?;
//! store.put_node(&NodeRecord::new("vm-1", "VirtualMachine")).await?;
//! store.put_edge(&EdgeRecord::new("rel-1", "HOSTS", "srv-1", "vm-1")).await?;
//!
//! // Cascade: removes srv-1 and rel-1
//! store.delete_cascade("srv-1").await?;
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{
    AttributeValue, Attributes, DeleteOutcome, EdgeRecord, GraphStore, NodeRecord, Scalar,
    ScanBatch, ScanFilter, StoreStats, StoredRecord, UndecodableRecord,
};

pub use infrastructure::InMemoryGraphStore;

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteGraphStore;

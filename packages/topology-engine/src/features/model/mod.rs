//! Entity/Relationship Model
//!
//! Validated value objects and the primitive-encoding boundary between
//! them and the graph store.

pub mod attributes;
pub mod entity;
pub mod properties;
mod records;
pub mod relationship;

pub use attributes::{
    ComputeResources, ContainerAttributes, EntityAttributes, PodAttributes, PortAttributes,
    ServerAttributes, SwitchAttributes, VirtualMachineAttributes, VlanAttributes,
};
pub use entity::Entity;
pub use properties::{decode_properties, encode_properties, PropertyMap};
pub use relationship::{KindResolver, Relationship};

//! Shared type definitions for the node state watcher.
//!
//! This crate is the single source of truth for the records and events that
//! flow between the membership feed, the node-state store, and the
//! renderers.
//!
//! # Modules
//!
//! - [`enums`] -- Address roles and condition statuses
//! - [`structs`] -- The [`NodeRecord`] and its address, condition and taint parts
//! - [`events`] -- Membership change events delivered by a feed

pub mod enums;
pub mod events;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AddressRole, ConditionStatus};
pub use events::NodeEvent;
pub use structs::{NodeAddress, NodeCondition, NodeRecord, Taint};

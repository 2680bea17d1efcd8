//! Node-state cache and snapshot scheduling for the node state watcher.
//!
//! This crate owns the in-memory view of cluster membership and the two
//! loops that run against it: event ingestion on the write side and the
//! periodic snapshot scheduler on the read side.
//!
//! # Modules
//!
//! - [`bootstrap`] -- Timed initial load of the store from a membership source.
//! - [`config`] -- Configuration loading from `nodestate-config.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`ingestion`] -- [`EventIngestion`], which applies membership events to
//!   the store.
//! - [`pipeline`] -- [`Pipeline`], the context object wiring feed, ingestion,
//!   scheduler and renderer together.
//! - [`render`] -- The [`Renderer`] trait and the closed set of renderer names.
//! - [`scheduler`] -- [`SnapshotScheduler`], the cancellable periodic render loop.
//! - [`source`] -- [`MembershipSource`] trait and [`StaticMembershipSource`].
//! - [`store`] -- [`NodeStateStore`] and its isolated [`Snapshot`]s.
//!
//! [`EventIngestion`]: ingestion::EventIngestion
//! [`Pipeline`]: pipeline::Pipeline
//! [`Renderer`]: render::Renderer
//! [`SnapshotScheduler`]: scheduler::SnapshotScheduler
//! [`MembershipSource`]: source::MembershipSource
//! [`StaticMembershipSource`]: source::StaticMembershipSource
//! [`NodeStateStore`]: store::NodeStateStore
//! [`Snapshot`]: store::Snapshot

pub mod bootstrap;
pub mod config;
pub mod ingestion;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod source;
pub mod store;

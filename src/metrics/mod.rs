//! Instrumentation primitives shared by the four containers.
//!
//! Recording and snapshotting are split: the maps record at defined points
//! (each key comparison into a [`MetricsCell`], reachable from `&self`
//! lookups; each rotation or rehash into a plain field on the `&mut` path)
//! and expose a point-in-time [`MapMetricsSnapshot`] through
//! [`MetricsSnapshotProvider`] for the report writer and the benches.

mod cell;
mod snapshot;

pub use cell::MetricsCell;
pub use snapshot::{MapMetricsSnapshot, MetricsSnapshotProvider};

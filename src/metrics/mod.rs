//! Operation counters for both dictionaries (feature `metrics`).
//!
//! Counters are recorded inline by the dictionaries and read through
//! [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider) or the
//! inherent `metrics_snapshot()` methods.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::{RecencyMetrics, RouletteMetrics};
pub use snapshot::{RecencyMetricsSnapshot, RouletteMetricsSnapshot};
pub use traits::MetricsSnapshotProvider;

//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split into small traits so that the
//! dictionaries only ever *write* counters, while tests and benchmarks only
//! *read* them.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │     CoreMetricsRecorder     │
//!                    │  get_hit/get_miss/insert    │
//!                    │  evict/grow/trim/clear      │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                 ┌─────────────────┴─────────────────┐
//!                 ▼                                   ▼
//!        ┌──────────────────┐               ┌──────────────────┐
//!        │ RecencyMetrics   │               │ RouletteMetrics  │
//!        │ Recorder         │               │ Recorder         │
//!        └──────────────────┘               └──────────────────┘
//!
//!   &self paths use the *ReadRecorder traits (interior mutability).
//!   Consumption: MetricsSnapshotProvider<S>.
//! ```

/// Common counters for both dictionaries.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_grow(&mut self);
    fn record_trim(&mut self);
    fn record_clear(&mut self);
}

/// Metrics for recency-ordered behavior.
pub trait RecencyMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_call(&mut self);
    fn record_pop_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
}

/// Read-only recency metrics for `&self` methods.
pub trait RecencyMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
    fn record_recency_rank_call(&self);
    fn record_recency_rank_found(&self);
    fn record_recency_rank_scan_step(&self);
}

/// Metrics for random removal.
pub trait RouletteMetricsRecorder: CoreMetricsRecorder {
    fn record_remove_random_call(&mut self);
    fn record_remove_random_found(&mut self);
}

/// Read-only roulette metrics for `&self` methods.
pub trait RouletteMetricsReadRecorder {
    fn record_random_pick_call(&self);
    fn record_random_pick_found(&self);
    fn record_random_scan_step(&self);
}

/// Produce a point-in-time copy of a dictionary's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

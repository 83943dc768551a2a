#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecencyMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,

    pub grows: u64,
    pub trims: u64,
    pub clears: u64,

    pub pop_calls: u64,
    pub pop_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub peek_calls: u64,
    pub peek_found: u64,
    pub recency_rank_calls: u64,
    pub recency_rank_found: u64,
    pub recency_rank_scan_steps: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
    pub bucket_count: usize,
    pub pooled_nodes: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouletteMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,

    pub grows: u64,
    pub trims: u64,
    pub clears: u64,

    pub remove_random_calls: u64,
    pub remove_random_found: u64,
    pub random_pick_calls: u64,
    pub random_pick_found: u64,
    pub random_scan_steps: u64, // chain nodes examined by random selection

    pub len: usize,
    pub capacity: usize,
    pub bucket_count: usize,
    pub pooled_nodes: usize,
}

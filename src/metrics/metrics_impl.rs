use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CoreMetricsRecorder, RecencyMetricsReadRecorder, RecencyMetricsRecorder,
    RouletteMetricsReadRecorder, RouletteMetricsRecorder,
};

#[derive(Debug, Default)]
pub struct RecencyMetrics {
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
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
    pub recency_rank_calls: MetricsCell,
    pub recency_rank_found: MetricsCell,
    pub recency_rank_scan_steps: MetricsCell,
}

#[derive(Debug, Default)]
pub struct RouletteMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
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
    pub random_pick_calls: MetricsCell,
    pub random_pick_found: MetricsCell,
    pub random_scan_steps: MetricsCell,
}

impl CoreMetricsRecorder for RecencyMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_grow(&mut self) {
        self.grows += 1;
    }

    fn record_trim(&mut self) {
        self.trims += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl RecencyMetricsRecorder for RecencyMetrics {
    fn record_pop_call(&mut self) {
        self.pop_calls += 1;
    }

    fn record_pop_found(&mut self) {
        self.pop_found += 1;
    }

    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }
}

impl RecencyMetricsReadRecorder for RecencyMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }

    fn record_recency_rank_call(&self) {
        self.recency_rank_calls.incr();
    }

    fn record_recency_rank_found(&self) {
        self.recency_rank_found.incr();
    }

    fn record_recency_rank_scan_step(&self) {
        self.recency_rank_scan_steps.incr();
    }
}

impl RouletteMetrics {
    // Roulette lookups take `&self`, so hits and misses go through cells.
    pub fn record_lookup(&self, hit: bool) {
        self.get_calls.incr();
        if hit {
            self.get_hits.incr();
        } else {
            self.get_misses.incr();
        }
    }
}

impl CoreMetricsRecorder for RouletteMetrics {
    fn record_get_hit(&mut self) {
        self.record_lookup(true);
    }

    fn record_get_miss(&mut self) {
        self.record_lookup(false);
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_grow(&mut self) {
        self.grows += 1;
    }

    fn record_trim(&mut self) {
        self.trims += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl RouletteMetricsRecorder for RouletteMetrics {
    fn record_remove_random_call(&mut self) {
        self.remove_random_calls += 1;
    }

    fn record_remove_random_found(&mut self) {
        self.remove_random_found += 1;
    }
}

impl RouletteMetricsReadRecorder for RouletteMetrics {
    fn record_random_pick_call(&self) {
        self.random_pick_calls.incr();
    }

    fn record_random_pick_found(&self) {
        self.random_pick_found.incr();
    }

    fn record_random_scan_step(&self) {
        self.random_scan_steps.incr();
    }
}

#![no_main]

use cachedict::ds::{MAX_POOLED_NODES, NodeId, NodePool};
use libfuzzer_sys::fuzz_target;

// Fuzz insert/release/compact sequences on NodePool
//
// Tracks live ids on the side and applies every reported relocation, so any
// stale or lost node shows up as a value mismatch.
fuzz_target!(|data: &[u8]| {
    let mut pool = NodePool::new();
    let mut live: Vec<(NodeId, u8)> = Vec::new();

    for &byte in data {
        match byte % 4 {
            0 | 1 => {
                let id = pool.insert(byte);
                live.push((id, byte));
            },
            2 => {
                if live.is_empty() {
                    continue;
                }
                let (id, expected) = live.swap_remove(byte as usize % live.len());
                let (value, moved) = pool.release(id).unwrap();
                assert_eq!(value, expected);
                if let Some(r) = moved {
                    for (slot, _) in live.iter_mut() {
                        if *slot == r.from {
                            *slot = r.to;
                        }
                    }
                }
            },
            3 => {
                while let Some(step) = pool.compact_step() {
                    if let Some(r) = step {
                        for (slot, _) in live.iter_mut() {
                            if *slot == r.from {
                                *slot = r.to;
                            }
                        }
                    }
                }
                assert_eq!(pool.pooled(), 0);
            },
            _ => unreachable!(),
        }

        assert!(pool.pooled() <= MAX_POOLED_NODES);
        assert_eq!(pool.len(), live.len());
        assert_eq!(pool.slots(), pool.len() + pool.pooled());
        for &(id, expected) in &live {
            assert_eq!(pool[id], expected);
        }
    }
});

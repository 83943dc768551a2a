#![no_main]

use cachedict::{EvictionMode, RecencyDictionary, SetOutcome};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on RecencyDictionary
//
// Small key space so chains collide and the node pool cycles through its
// free-list and compaction paths. Every step is followed by a full
// structural check.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = data[0] as usize % 40;
    let mode = if data[0] & 0x80 == 0 {
        EvictionMode::Lru
    } else {
        EvictionMode::Mru
    };
    let mut dict = RecencyDictionary::with_mode(capacity, mode);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 10;
        let key = (data[idx + 1] % 64) as u32;
        let value = data[idx] as u32;

        match op {
            0 => {
                let _ = dict.set(key, value);
            },
            1 => {
                let _ = dict.add(key, value);
            },
            2 => {
                let before = dict.len();
                if let SetOutcome::Evicted(..) = dict.set_and_maintain_count(key, value) {
                    assert_eq!(dict.len(), before);
                }
                assert!(dict.contains_key(&key));
            },
            3 => {
                let _ = dict.get(&key);
            },
            4 => {
                dict.peek(&key);
            },
            5 => {
                dict.touch(&key);
            },
            6 => {
                dict.remove(&key);
            },
            7 => {
                let _ = dict.pop_least_recent();
            },
            8 => {
                let _ = dict.pop_most_recent();
            },
            9 => {
                if key % 8 == 0 {
                    dict.clear();
                } else {
                    dict.trim();
                }
            },
            _ => unreachable!(),
        }

        dict.check_invariants().unwrap();
        assert_eq!(dict.iter().count(), dict.len());

        idx += 2;
    }
});

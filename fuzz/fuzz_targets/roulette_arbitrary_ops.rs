#![no_main]

use cachedict::RouletteDictionary;
use cachedict::random::LockedRandom;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on RouletteDictionary
//
// The random source is seeded from the input so a crashing case replays
// exactly.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let capacity = data[0] as usize % 40;
    let source = LockedRandom::seeded(u64::from(data[1]));
    let mut dict = RouletteDictionary::with_random_source(capacity, source);

    let mut idx = 2;
    while idx + 1 < data.len() {
        let op = data[idx] % 9;
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
                dict.set_and_maintain_count(key, value);
                assert!(dict.contains_key(&key));
            },
            3 => {
                let _ = dict.get(&key);
            },
            4 => {
                dict.remove(&key);
            },
            5 => {
                if let Ok(picked) = dict.random_key() {
                    let picked = *picked;
                    assert!(dict.contains_key(&picked));
                } else {
                    assert!(dict.is_empty());
                }
            },
            6 => {
                let threshold = key;
                if let Ok((k, _)) = dict.random_entry_where(|k, _| *k >= threshold) {
                    assert!(*k >= threshold);
                }
            },
            7 => {
                if let Ok((k, _)) = dict.take_random() {
                    assert!(!dict.contains_key(&k));
                }
            },
            8 => {
                if key % 8 == 0 {
                    dict.clear();
                } else {
                    dict.trim();
                }
            },
            _ => unreachable!(),
        }

        dict.check_invariants().unwrap();

        idx += 2;
    }
});

// ==============================================
// CROSS-DICTIONARY INVARIANT TESTS (integration)
// ==============================================
//
// Both containers share the chained bucket table and node pool, so the
// properties below are checked against each of them through the common
// traits. Container-specific behaviour (recency order, random selection)
// lives in the per-type modules further down.

use cachedict::random::LockedRandom;
use cachedict::traits::{CoreDictionary, EvictingDictionary, RandomEviction, RecencyTracking};
use cachedict::{DictError, EvictionMode, RecencyDictionary, RouletteDictionary, SetOutcome};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn recency(capacity: usize) -> RecencyDictionary<u64, u64> {
    RecencyDictionary::with_capacity(capacity)
}

fn roulette(capacity: usize, seed: u64) -> RouletteDictionary<u64, u64, LockedRandom> {
    RouletteDictionary::with_random_source(capacity, LockedRandom::seeded(seed))
}

/// Small deterministic sequence so failures reproduce without a rand seed.
fn lcg(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state >> 33
}

mod shared_table {
    use super::*;

    fn round_trip<D: CoreDictionary<u64, u64>>(dict: &mut D, n: u64, seed: u64) {
        for key in 0..n {
            assert_eq!(dict.set(key, key * 10).unwrap(), None);
        }
        assert_eq!(dict.len(), n as usize);

        let mut state = seed;
        let mut removed = Vec::new();
        for key in 0..n {
            if lcg(&mut state) % 3 == 0 {
                assert_eq!(dict.remove(&key), Some(key * 10), "remove {key}");
                removed.push(key);
            }
        }
        assert_eq!(dict.len(), (n as usize) - removed.len());
        for &key in &removed {
            assert!(!dict.contains_key(&key), "{key} should be gone");
        }

        for &key in &removed {
            dict.add(key, key * 10).unwrap();
        }
        assert_eq!(dict.len(), n as usize);
        for key in 0..n {
            assert_eq!(dict.lookup(&key), Some(&(key * 10)), "lookup {key}");
        }
    }

    #[test]
    fn remove_and_reinsert_restores_key_set() {
        init_logging();
        let mut lru = recency(10_000);
        round_trip(&mut lru, 2_000, 1);
        lru.check_invariants().unwrap();

        let mut random = roulette(10_000, 2);
        round_trip(&mut random, 2_000, 3);
        random.check_invariants().unwrap();
    }

    fn grows_preserving_entries<D: CoreDictionary<u64, u64>>(dict: &mut D) {
        let start = dict.bucket_count();
        let n = (start * 4) as u64 + 1;
        for key in 0..n {
            dict.set(key, !key).unwrap();
        }
        assert!(
            dict.bucket_count() >= start * 4,
            "expected at least two doublings from {start}, got {}",
            dict.bucket_count()
        );
        assert!(dict.bucket_count().is_power_of_two());
        for key in 0..n {
            assert_eq!(dict.lookup(&key), Some(&!key), "lost {key} across resize");
        }
    }

    #[test]
    fn resizes_keep_every_entry() {
        init_logging();
        grows_preserving_entries(&mut recency(16));
        grows_preserving_entries(&mut roulette(16, 9));
    }

    fn add_duplicate_is_rejected<D: CoreDictionary<u64, u64>>(dict: &mut D) {
        dict.add(7, 1).unwrap();
        assert_eq!(dict.add(7, 2), Err(DictError::DuplicateKey));
        assert_eq!(dict.lookup(&7), Some(&1));
        assert_eq!(dict.set(7, 3).unwrap(), Some(1));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn duplicate_add_never_overwrites() {
        add_duplicate_is_rejected(&mut recency(4));
        add_duplicate_is_rejected(&mut roulette(4, 5));
    }

    fn clear_then_trim<D: CoreDictionary<u64, u64>>(dict: &mut D) {
        for key in 0..500 {
            dict.set(key, key).unwrap();
        }
        let grown = dict.bucket_count();
        dict.clear();
        assert!(dict.is_empty());
        assert_eq!(dict.bucket_count(), grown, "clear keeps the table size");

        dict.trim();
        assert!(dict.bucket_count() < grown, "trim shrinks an empty table");
        assert!(dict.bucket_count() >= 8);

        dict.set(1, 1).unwrap();
        assert_eq!(dict.lookup(&1), Some(&1));
    }

    #[test]
    fn clear_and_trim_leave_a_usable_table() {
        clear_then_trim(&mut recency(1_000));
        clear_then_trim(&mut roulette(1_000, 6));
    }

    #[test]
    fn remove_batch_reports_each_key() {
        let mut dict = recency(8);
        for key in 0..4 {
            dict.set(key, key + 100).unwrap();
        }
        let removed = dict.remove_batch(&[1, 9, 3]);
        assert_eq!(removed, vec![Some(101), None, Some(103)]);
        assert_eq!(CoreDictionary::len(&dict), 2);
    }
}

mod capacity_bound {
    use super::*;

    fn never_exceeds_capacity<D: EvictingDictionary<u64, u64>>(dict: &mut D, seed: u64) {
        let capacity = dict.capacity();
        let mut state = seed;
        let mut evictions = 0;
        for _ in 0..5_000 {
            let key = lcg(&mut state) % 400;
            if let SetOutcome::Evicted(..) = dict.set_and_maintain_count(key, key) {
                evictions += 1;
            }
            assert!(
                dict.len() <= capacity,
                "len {} exceeded capacity {capacity}",
                dict.len()
            );
        }
        assert!(evictions > 0, "a 400-key workload must evict at capacity {capacity}");
    }

    #[test]
    fn maintained_count_stays_within_capacity() {
        init_logging();
        let mut lru = recency(64);
        never_exceeds_capacity(&mut lru, 11);
        lru.check_invariants().unwrap();

        let mut mru = RecencyDictionary::with_mode(64, EvictionMode::Mru);
        never_exceeds_capacity(&mut mru, 12);
        mru.check_invariants().unwrap();

        let mut random = roulette(64, 13);
        never_exceeds_capacity(&mut random, 14);
        random.check_invariants().unwrap();
    }

    fn update_never_evicts<D: EvictingDictionary<u64, u64>>(dict: &mut D) {
        let capacity = dict.capacity() as u64;
        for key in 0..capacity {
            assert_eq!(dict.set_and_maintain_count(key, 0), SetOutcome::Inserted);
        }
        for key in 0..capacity {
            assert_eq!(dict.set_and_maintain_count(key, 1), SetOutcome::Updated(0));
        }
        assert_eq!(dict.len() as u64, capacity);
    }

    #[test]
    fn updates_at_capacity_do_not_evict() {
        update_never_evicts(&mut recency(16));
        update_never_evicts(&mut roulette(16, 15));
    }

    #[test]
    fn eviction_keeps_the_new_key() {
        let mut random = roulette(3, 16);
        for key in 0..3 {
            random.set_and_maintain_count(key, key);
        }
        for key in 3..200 {
            let (old_key, old_value) = random
                .set_and_maintain_count(key, key)
                .into_evicted()
                .expect("full dictionary must evict");
            assert_eq!(old_key, old_value);
            assert_ne!(old_key, key);
            assert!(random.contains_key(&key));
            assert!(!random.contains_key(&old_key));
            assert_eq!(random.len(), 3);
        }
        random.check_invariants().unwrap();
    }
}

mod recency_scenarios {
    use super::*;

    #[test]
    fn lru_capacity_two_abc() {
        let mut dict = RecencyDictionary::with_mode(2, EvictionMode::Lru);
        assert_eq!(dict.bucket_count(), 8);
        dict.set_and_maintain_count("A", ());
        dict.set_and_maintain_count("B", ());
        assert_eq!(dict.set_and_maintain_count("C", ()), SetOutcome::Evicted("A", ()));

        assert!(!dict.contains_key(&"A"));
        assert!(dict.contains_key(&"B"));
        assert!(dict.contains_key(&"C"));
        assert_eq!(dict.least_recent(), Ok((&"B", &())));
        assert_eq!(dict.most_recent(), Ok((&"C", &())));
    }

    #[test]
    fn lru_capacity_two_evicts_oldest() {
        let mut dict = RecencyDictionary::with_mode(2, EvictionMode::Lru);
        assert_eq!(dict.set_and_maintain_count("a", 1), SetOutcome::Inserted);
        assert_eq!(dict.set_and_maintain_count("b", 2), SetOutcome::Inserted);

        // Reading "a" makes "b" the eviction candidate.
        assert_eq!(dict.get(&"a"), Ok(&1));
        assert_eq!(dict.set_and_maintain_count("c", 3), SetOutcome::Evicted("b", 2));

        let keys: Vec<_> = dict.keys().copied().collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn mru_capacity_two_evicts_newest() {
        let mut dict = RecencyDictionary::with_mode(2, EvictionMode::Mru);
        dict.set_and_maintain_count("a", 1);
        dict.set_and_maintain_count("b", 2);
        assert_eq!(dict.set_and_maintain_count("c", 3), SetOutcome::Evicted("b", 2));
        assert_eq!(dict.most_recent(), Ok((&"c", &3)));
        assert_eq!(dict.least_recent(), Ok((&"a", &1)));
    }

    fn touch_then_pop<D: RecencyTracking<u32, u32>>(dict: &mut D) {
        for key in 0..5 {
            dict.set(key, key).unwrap();
        }
        assert!(dict.touch(&0));
        assert!(!dict.touch(&42));
        assert_eq!(dict.recency_rank(&0), Some(0));
        assert_eq!(dict.recency_rank(&1), Some(4));
        assert_eq!(dict.pop_least_recent(), Ok((1, 1)));
        assert_eq!(dict.least_recent(), Ok((&2, &2)));
    }

    #[test]
    fn recency_tracking_through_trait() {
        let mut dict: RecencyDictionary<u32, u32> = RecencyDictionary::with_capacity(8);
        touch_then_pop(&mut dict);
    }

    #[test]
    fn empty_recency_ends_are_errors() {
        let mut dict: RecencyDictionary<u8, u8> = RecencyDictionary::new();
        assert_eq!(dict.least_recent(), Err(DictError::EmptyContainer));
        assert_eq!(dict.most_recent(), Err(DictError::EmptyContainer));
        assert_eq!(dict.pop_most_recent(), Err(DictError::EmptyContainer));
        assert!(!dict.remove_least_recent());
    }

    #[test]
    fn owned_and_borrowed_iteration_agree() {
        let mut dict = recency(10);
        for key in 0..10 {
            dict.set(key, key * 2).unwrap();
        }
        dict.touch(&3);
        let borrowed: Vec<_> = dict.iter().map(|(k, v)| (*k, *v)).collect();
        let owned: Vec<_> = dict.into_iter().collect();
        assert_eq!(borrowed, owned);
        assert_eq!(owned[0], (3, 6));
    }
}

mod roulette_scenarios {
    use super::*;

    #[test]
    fn empty_roulette_random_key_errors() {
        let dict: RouletteDictionary<u32, u32> = RouletteDictionary::new();
        assert_eq!(dict.random_key(), Err(DictError::EmptyContainer));
        assert_eq!(dict.random_entry(), Err(DictError::EmptyContainer));
    }

    #[test]
    fn single_entry_take_random() {
        let mut dict = RouletteDictionary::new();
        dict.set("hello", "world").unwrap();
        assert_eq!(dict.random_key(), Ok(&"hello"));
        assert_eq!(dict.take_random(), Ok(("hello", "world")));
        assert!(dict.is_empty());
        assert_eq!(dict.take_random(), Err(DictError::EmptyContainer));
    }

    #[test]
    fn predicate_without_match_is_no_match() {
        let mut dict = roulette(16, 21);
        for key in 0..16 {
            dict.set(key, key).unwrap();
        }
        assert_eq!(dict.random_key_where(|k, _| *k > 100), Err(DictError::NoMatch));
        assert_eq!(dict.random_key_where(|k, _| *k == 9), Ok(&9));
        assert!(!dict.remove_random_where(|_, v| *v > 100));
        assert_eq!(dict.len(), 16);
    }

    fn drain_by_random<D: RandomEviction<u64, u64>>(dict: &mut D) -> Vec<u64> {
        let mut drained = Vec::new();
        while let Ok((key, value)) = dict.take_random() {
            assert_eq!(key, value);
            drained.push(key);
        }
        drained
    }

    #[test]
    fn take_random_drains_every_entry_once() {
        let mut dict = roulette(200, 22);
        for key in 0..200 {
            dict.set(key, key).unwrap();
        }
        let mut drained = drain_by_random(&mut dict);
        drained.sort_unstable();
        assert_eq!(drained, (0..200).collect::<Vec<_>>());
        dict.check_invariants().unwrap();
    }

    #[test]
    fn same_seed_same_choices() {
        let build = || {
            let mut dict = roulette(32, 77);
            for key in 0..32 {
                dict.set(key, key).unwrap();
            }
            dict
        };
        let a = build();
        let b = build();
        for _ in 0..20 {
            assert_eq!(a.random_key(), b.random_key());
        }
    }
}

// ==============================================
// RANDOM SOURCE CONCURRENCY TESTS (integration)
// ==============================================
//
// Random sources are called through `&self`, so one source may be shared by
// many threads. These tests drive both sources that way, then share a
// roulette dictionary behind a lock and check it stays consistent. With
// `metrics` on, unlocked `&self` reads must still count every call.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use cachedict::random::{LockedRandom, RandomSource, ThreadLocalRandom};
use cachedict::{RouletteDictionary, SetOutcome};
use parking_lot::Mutex;

mod sources {
    use super::*;

    fn hammer<R: RandomSource + Send + Sync + 'static>(source: Arc<R>, bound: usize) -> Vec<usize> {
        let num_threads = 8;
        let draws_per_thread = 2_000;

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let source = source.clone();
                thread::spawn(move || {
                    let mut hits = vec![0usize; bound];
                    for _ in 0..draws_per_thread {
                        let idx = source.next_index(bound);
                        assert!(idx < bound, "index {idx} out of 0..{bound}");
                        hits[idx] += 1;
                    }
                    hits
                })
            })
            .collect();

        let mut totals = vec![0usize; bound];
        for handle in handles {
            for (total, hits) in totals.iter_mut().zip(handle.join().unwrap()) {
                *total += hits;
            }
        }
        assert_eq!(totals.iter().sum::<usize>(), num_threads * draws_per_thread);
        totals
    }

    #[test]
    fn thread_local_source_across_threads() {
        let totals = hammer(Arc::new(ThreadLocalRandom), 16);
        assert!(totals.iter().all(|&n| n > 0), "every index drawn: {totals:?}");
    }

    #[test]
    fn locked_source_across_threads() {
        let totals = hammer(Arc::new(LockedRandom::seeded(42)), 16);
        assert!(totals.iter().all(|&n| n > 0), "every index drawn: {totals:?}");
    }

    #[test]
    fn bound_of_one_is_always_zero() {
        let locked = LockedRandom::from_entropy();
        for _ in 0..100 {
            assert_eq!(locked.next_index(1), 0);
            assert_eq!(ThreadLocalRandom.next_index(1), 0);
        }
    }
}

mod shared_roulette {
    use super::*;

    #[test]
    fn concurrent_random_reads() {
        let mut dict = RouletteDictionary::with_random_source(256, LockedRandom::seeded(3));
        for key in 0..256u64 {
            dict.set(key, key * 2).unwrap();
        }
        let dict = Arc::new(Mutex::new(dict));
        let reads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dict = dict.clone();
                let reads = reads.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        let guard = dict.lock();
                        let (key, value) = guard.random_entry().unwrap();
                        assert_eq!(*value, key * 2);
                        reads.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(reads.load(Ordering::Relaxed), 8 * 500);
        assert_eq!(dict.lock().len(), 256);
    }

    #[test]
    fn concurrent_maintained_inserts() {
        let capacity = 100;
        let dict: Arc<Mutex<RouletteDictionary<u64, u64>>> =
            Arc::new(Mutex::new(RouletteDictionary::with_capacity(capacity)));
        let evictions = Arc::new(AtomicUsize::new(0));

        let num_threads = 8;
        let inserts_per_thread = 250u64;
        let handles: Vec<_> = (0..num_threads)
            .map(|thread_id| {
                let dict = dict.clone();
                let evictions = evictions.clone();
                thread::spawn(move || {
                    for i in 0..inserts_per_thread {
                        let key = thread_id * inserts_per_thread + i;
                        let outcome = dict.lock().set_and_maintain_count(key, key);
                        match outcome {
                            SetOutcome::Evicted(old_key, old_value) => {
                                assert_eq!(old_key, old_value);
                                evictions.fetch_add(1, Ordering::Relaxed);
                            },
                            SetOutcome::Inserted => {},
                            SetOutcome::Updated(_) => panic!("keys are unique per thread"),
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let total = (num_threads * inserts_per_thread) as usize;
        let guard = dict.lock();
        assert_eq!(guard.len(), capacity);
        assert_eq!(evictions.load(Ordering::Relaxed), total - capacity);
        guard.check_invariants().unwrap();
    }
}

#[cfg(feature = "metrics")]
mod shared_read_metrics {
    use super::*;
    use cachedict::RecencyDictionary;

    const THREADS: u64 = 8;
    const READS_PER_THREAD: u64 = 20_000;

    #[test]
    fn unlocked_random_reads_count_every_pick() {
        let mut dict = RouletteDictionary::with_random_source(64, LockedRandom::seeded(5));
        for key in 0..64u64 {
            dict.set(key, key).unwrap();
        }
        let before = dict.metrics_snapshot().random_pick_calls;
        let dict = Arc::new(dict);

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let dict = Arc::clone(&dict);
                thread::spawn(move || {
                    for _ in 0..READS_PER_THREAD {
                        assert!(dict.random_key().is_ok());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = dict.metrics_snapshot();
        assert_eq!(
            snapshot.random_pick_calls - before,
            THREADS * READS_PER_THREAD,
            "random_pick_calls lost increments"
        );
        assert_eq!(snapshot.random_pick_found, snapshot.random_pick_calls);
    }

    #[test]
    fn unlocked_peeks_count_every_call() {
        let mut dict: RecencyDictionary<u64, u64> = RecencyDictionary::with_capacity(64);
        for key in 0..64u64 {
            dict.set(key, key).unwrap();
        }
        let dict = Arc::new(dict);

        let handles: Vec<_> = (0..THREADS)
            .map(|thread_id| {
                let dict = Arc::clone(&dict);
                thread::spawn(move || {
                    for i in 0..READS_PER_THREAD {
                        assert!(dict.peek(&((thread_id + i) % 64)).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = dict.metrics_snapshot();
        assert_eq!(snapshot.peek_calls, THREADS * READS_PER_THREAD);
        assert_eq!(snapshot.peek_found, THREADS * READS_PER_THREAD);
    }
}

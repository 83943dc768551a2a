//! Random index sources for roulette selection.
//!
//! A naively shared pseudo-random generator corrupts its state under
//! unsynchronized concurrent use. Every source here is therefore either
//! per-thread or lock-guarded around the single draw.
//!
//! ## Key Components
//!
//! | Source               | Storage                                    | Use                        |
//! |----------------------|--------------------------------------------|----------------------------|
//! | [`ThreadLocalRandom`]| `thread_local!` `SmallRng`, lazily seeded  | default, no contention     |
//! | [`LockedRandom`]     | one `SmallRng` behind `parking_lot::Mutex` | reproducible sequences     |
//!
//! ## Example Usage
//!
//! ```
//! use cachedict::random::{LockedRandom, RandomSource, ThreadLocalRandom};
//!
//! let tl = ThreadLocalRandom;
//! assert!(tl.next_index(10) < 10);
//!
//! let a = LockedRandom::seeded(7);
//! let b = LockedRandom::seeded(7);
//! assert_eq!(a.next_index(1000), b.next_index(1000));
//! ```

use std::cell::RefCell;
use std::fmt;

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed bucket indices.
///
/// Implementations must be safe to call through a shared reference, since
/// random *reads* (`random_key` and friends) only borrow the dictionary.
pub trait RandomSource {
    /// Returns a value in `0..bound`. `bound` is always non-zero.
    fn next_index(&self, bound: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn next_index(&self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

thread_local! {
    static THREAD_RNG: RefCell<Option<SmallRng>> = const { RefCell::new(None) };
}

/// Per-thread generator, created on first use in each thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadLocalRandom;

impl RandomSource for ThreadLocalRandom {
    fn next_index(&self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        THREAD_RNG.with(|cell| {
            let mut slot = cell.borrow_mut();
            let rng = slot.get_or_insert_with(|| SmallRng::from_rng(&mut rand::rng()));
            rng.random_range(0..bound)
        })
    }
}

/// A single generator guarded by a lock held for exactly one draw.
pub struct LockedRandom {
    rng: Mutex<SmallRng>,
}

impl LockedRandom {
    /// Creates a generator with a fixed seed; equal seeds give equal sequences.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// Creates a generator seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_rng(&mut rand::rng())),
        }
    }
}

impl RandomSource for LockedRandom {
    fn next_index(&self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        self.rng.lock().random_range(0..bound)
    }
}

impl Default for LockedRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl fmt::Debug for LockedRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedRandom").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn thread_local_stays_in_bounds() {
        let source = ThreadLocalRandom;
        for bound in [1usize, 2, 7, 8, 1024] {
            for _ in 0..200 {
                assert!(source.next_index(bound) < bound);
            }
        }
    }

    #[test]
    fn bound_of_one_always_zero() {
        assert_eq!(ThreadLocalRandom.next_index(1), 0);
        assert_eq!(LockedRandom::seeded(1).next_index(1), 0);
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let a = LockedRandom::seeded(42);
        let b = LockedRandom::seeded(42);
        let xs: Vec<_> = (0..32).map(|_| a.next_index(1 << 20)).collect();
        let ys: Vec<_> = (0..32).map(|_| b.next_index(1 << 20)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn thread_local_covers_every_index() {
        let source = ThreadLocalRandom;
        let mut seen = [false; 8];
        for _ in 0..2_000 {
            seen[source.next_index(8)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn locked_random_shared_across_threads() {
        let source = Arc::new(LockedRandom::seeded(3));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || {
                    (0..1_000).all(|_| source.next_index(16) < 16)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn reference_forwards_to_source() {
        let source = LockedRandom::seeded(9);
        let by_ref: &LockedRandom = &source;
        assert!(RandomSource::next_index(&by_ref, 5) < 5);
    }

    #[test]
    fn sources_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ThreadLocalRandom>();
        assert_send_sync::<LockedRandom>();
    }
}

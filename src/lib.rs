//! cachedict: hash dictionaries with built-in eviction for cache building.
//!
//! Two containers share one chained, power-of-two hash table:
//!
//! - [`RecencyDictionary`]: entries are also threaded onto a recency list, so
//!   the least or most recently used entry can be found and evicted in O(1).
//! - [`RouletteDictionary`]: no secondary ordering; a random entry is picked
//!   by spinning the bucket array.
//!
//! Both offer `set_and_maintain_count`, which inserts a key and, once the
//! dictionary has reached its configured capacity, evicts one entry in the
//! same call.
//!
//! ```
//! use cachedict::{EvictionMode, RecencyDictionary, RouletteDictionary, SetOutcome};
//!
//! let mut lru = RecencyDictionary::with_mode(2, EvictionMode::Lru);
//! lru.set_and_maintain_count("a", 1);
//! lru.set_and_maintain_count("b", 2);
//! assert_eq!(lru.set_and_maintain_count("c", 3), SetOutcome::Evicted("a", 1));
//!
//! let mut roulette = RouletteDictionary::new();
//! roulette.set("hello", "world").unwrap();
//! assert_eq!(roulette.take_random(), Ok(("hello", "world")));
//! ```

pub mod builder;
pub mod dict;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod random;
pub mod traits;

pub use builder::{Dict, DictBuilder, DictPolicy};
pub use dict::{EvictionMode, RecencyDictionary, RouletteDictionary, SetOutcome};
pub use error::{DictError, InvariantError};

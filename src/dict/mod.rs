//! The two dictionary types and the vocabulary they share.

pub mod recency;
pub mod roulette;

pub use recency::RecencyDictionary;
pub use roulette::RouletteDictionary;

/// Which end of the recency list `set_and_maintain_count` evicts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EvictionMode {
    /// Evict the least recently used entry.
    #[default]
    Lru,
    /// Evict the most recently used entry.
    Mru,
}

/// What a call to `set_and_maintain_count` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome<K, V> {
    /// The key was new and nothing had to be evicted.
    Inserted,
    /// The key existed; carries the replaced value.
    Updated(V),
    /// The key was new and this entry was evicted to make room.
    Evicted(K, V),
}

impl<K, V> SetOutcome<K, V> {
    /// Returns `true` if an entry was evicted.
    pub fn is_evicted(&self) -> bool {
        matches!(self, SetOutcome::Evicted(..))
    }

    /// Returns the evicted entry, if any.
    pub fn into_evicted(self) -> Option<(K, V)> {
        match self {
            SetOutcome::Evicted(key, value) => Some((key, value)),
            _ => None,
        }
    }
}

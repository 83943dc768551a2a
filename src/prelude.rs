pub use crate::builder::{Dict, DictBuilder, DictPolicy};
pub use crate::dict::{EvictionMode, RecencyDictionary, RouletteDictionary, SetOutcome};
pub use crate::error::{DictError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{RecencyMetricsSnapshot, RouletteMetricsSnapshot};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::random::{LockedRandom, RandomSource, ThreadLocalRandom};
pub use crate::traits::{CoreDictionary, EvictingDictionary, RandomEviction, RecencyTracking};

//! Power-of-two bucket sizing shared by both dictionaries.
//!
//! Bucket arrays are always a power of two long so that the bucket index is
//! `hash & (len - 1)`. The smallest array holds 8 buckets and the largest
//! `MAX_CAPACITY` buckets.

use crate::error::DictError;

/// Smallest bucket array a dictionary ever uses.
pub const MIN_BUCKETS: usize = 8;

/// Largest requested capacity (and bucket count) a dictionary accepts.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Returns the initial bucket count for a requested capacity.
///
/// Capacities up to 4 get the minimum of 8 buckets; anything larger rounds up
/// to the next power of two.
///
/// ```
/// use cachedict::ds::sizing::bucket_count_for;
///
/// assert_eq!(bucket_count_for(0).unwrap(), 8);
/// assert_eq!(bucket_count_for(5).unwrap(), 8);
/// assert_eq!(bucket_count_for(9).unwrap(), 16);
/// assert!(bucket_count_for((1 << 30) + 1).is_err());
/// ```
pub fn bucket_count_for(capacity: usize) -> Result<usize, DictError> {
    if capacity > MAX_CAPACITY {
        return Err(DictError::CapacityExceeded {
            requested: capacity,
            max: MAX_CAPACITY,
        });
    }
    if capacity <= 4 {
        return Ok(MIN_BUCKETS);
    }
    Ok(capacity.next_power_of_two().max(MIN_BUCKETS))
}

/// Returns the doubled bucket count used when a full array grows.
pub fn grown(len: usize) -> Result<usize, DictError> {
    match len.checked_mul(2) {
        Some(next) if next <= MAX_CAPACITY => Ok(next),
        _ => Err(DictError::CapacityExceeded {
            requested: len.saturating_mul(2),
            max: MAX_CAPACITY,
        }),
    }
}

/// Returns the smallest bucket count able to hold `len` entries.
pub fn trimmed(len: usize) -> usize {
    len.next_power_of_two().clamp(MIN_BUCKETS, MAX_CAPACITY)
}

/// Validates an explicitly configured bucket count.
pub fn validate_bucket_count(buckets: usize) -> Result<usize, DictError> {
    if buckets > MAX_CAPACITY {
        return Err(DictError::CapacityExceeded {
            requested: buckets,
            max: MAX_CAPACITY,
        });
    }
    if !buckets.is_power_of_two() {
        return Err(DictError::InvalidArgument(
            "bucket count must be a power of two",
        ));
    }
    if buckets < MIN_BUCKETS {
        return Err(DictError::InvalidArgument(
            "bucket count must be at least 8",
        ));
    }
    Ok(buckets)
}

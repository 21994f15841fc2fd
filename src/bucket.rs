//! Abstractions over buckets and the storage that hands them out.
//!
//! [`MemoryStorage`](crate::MemoryStorage) is the in-process implementation. Other
//! substrates implement the same pair of traits so callers can swap them without
//! changing call sites.

use std::{sync::Arc, time::Instant};

use crate::{BucketState, CapacityExceeded, LeakyBucketError, Rate};

/// A fixed-window leaky bucket: <https://en.wikipedia.org/wiki/Leaky_bucket>.
///
/// # Contract
///
/// - `0 <= remaining() <= capacity()` at every observable instant
/// - Refill happens lazily, inside [`Bucket::add`] only
/// - Concurrent `add` calls on the same bucket behave as if applied in some total order
pub trait Bucket: Send + Sync {
    /// Capacity of the bucket.
    fn capacity(&self) -> u64;

    /// Remaining units as of the last `add`.
    ///
    /// Does not apply a pending refill: once the reset instant has passed this still
    /// reports the pre-refill value. Call `add(0)` for a refill-aware read.
    fn remaining(&self) -> u64;

    /// When the bucket next refills, as of the last `add`.
    fn reset(&self) -> Instant;

    /// Consume `amount` units.
    ///
    /// If the reset instant has passed the bucket first refills to full capacity and
    /// starts a new window. If `amount` exceeds what is left, nothing is consumed and
    /// [`CapacityExceeded`] is returned. Both outcomes carry the bucket state observed
    /// after the refill check.
    fn add(&self, amount: u64) -> Result<BucketState, CapacityExceeded>;
}

/// Hands out buckets keyed by name.
///
/// Implementations guarantee at most one live bucket per name and an atomic
/// get-or-create.
pub trait Storage: Send + Sync {
    /// Bucket type handed out by this storage.
    type Bucket: Bucket;

    /// Return the bucket for `name`, creating it with `capacity` and `rate` if absent.
    ///
    /// **Sticky:** if `name` already has a bucket, it is returned unchanged and the
    /// `capacity`/`rate` arguments are ignored.
    fn create(
        &self,
        name: &str,
        capacity: u64,
        rate: Rate,
    ) -> Result<Arc<Self::Bucket>, LeakyBucketError>;

    /// Remove the bucket for `name`, if any.
    ///
    /// Handles already held by callers stay usable but are no longer reachable from
    /// the storage.
    fn remove(&self, name: &str);
}

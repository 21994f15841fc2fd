use std::{
    sync::{Arc, Weak},
    thread,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::{
    Bucket, CleanupIntervalMs, LeakyBucketError, MemoryBucket, Rate, StaleAfterMs, Storage,
};

/// Concurrent in-process bucket registry.
///
/// Maps names to [`MemoryBucket`]s using a [`DashMap`](dashmap::DashMap). Create one per
/// application (or per isolated namespace) and share it by reference or [`Arc`].
///
/// # Thread Safety
///
/// - Get-or-create runs under the key's shard lock, so concurrent `create` calls for
///   an unseen name construct exactly one bucket
/// - `add` calls go straight to the bucket's own lock; the map is not touched
/// - The shard lock is never held while waiting on a bucket lock
///
/// # Semantics & Limitations
///
/// **Sticky parameters:**
/// - The first `create` for a name fixes its capacity and rate
/// - Later calls return the same bucket and ignore their arguments (a mismatch is
///   logged at `debug` level)
///
/// **Memory growth:**
/// - Keys are only removed by [`Storage::remove`]
/// - Use [`MemoryStorage::run_cleanup_loop`] to evict idle keys
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use leakybucket::{Bucket, MemoryStorage, Rate, Storage};
///
/// let storage = MemoryStorage::new();
/// let rate = Rate::from_secs(60).unwrap();
///
/// let a = storage.create("user_123", 100, rate).unwrap();
/// let b = storage.create("user_123", 5, rate).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(b.capacity(), 100);
///
/// storage.remove("user_123");
/// let c = storage.create("user_123", 5, rate).unwrap();
/// assert_eq!(c.remaining(), 5);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    buckets: DashMap<String, Arc<MemoryBucket>>,
    cleanup_stop: Mutex<Option<Arc<Mutex<bool>>>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the storage holds no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Whether `name` currently has a bucket.
    pub fn contains(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Remove every bucket whose window ended at least `stale_after` ago and that no
    /// caller still holds a handle to.
    ///
    /// Such a bucket would be refilled by its next `add` anyway, so dropping it loses
    /// no quota state. A bucket with an outstanding handle is kept, so a key never
    /// ends up with two live buckets. Returns the number of buckets removed.
    pub fn cleanup(&self, stale_after: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        // The shard write lock is held here, so no `create` can clone the Arc meanwhile.
        self.buckets.retain(|_, bucket| {
            if Arc::strong_count(bucket) == 1 && bucket.is_idle(now, stale_after) {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            tracing::debug!(removed, "leakybucket.cleanup, evicted idle buckets");
        }

        removed
    } // end method cleanup

    /// Start the idle-eviction loop with default settings.
    ///
    /// See [`MemoryStorage::run_cleanup_loop_with_config`].
    pub fn run_cleanup_loop(self: &Arc<Self>) {
        self.run_cleanup_loop_with_config(StaleAfterMs::default(), CleanupIntervalMs::default());
    }

    /// Start a background thread that calls [`MemoryStorage::cleanup`] right away and
    /// then once per `cleanup_interval_ms`.
    ///
    /// Calling this while a loop is already running does nothing. The thread only
    /// holds a weak reference and exits once the storage is dropped or
    /// [`MemoryStorage::stop_cleanup_loop`] is called.
    ///
    /// Buckets with outstanding handles are never evicted, see [`MemoryStorage::cleanup`].
    pub fn run_cleanup_loop_with_config(
        self: &Arc<Self>,
        stale_after_ms: StaleAfterMs,
        cleanup_interval_ms: CleanupIntervalMs,
    ) {
        let mut slot = self.cleanup_stop.lock();
        if slot.is_some() {
            return;
        }

        let stop = Arc::new(Mutex::new(false));
        let storage: Weak<Self> = Arc::downgrade(self);
        let stale_after = Duration::from_millis(*stale_after_ms);
        let interval = Duration::from_millis(*cleanup_interval_ms);

        let thread_stop = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name("leakybucket-cleanup".to_string())
            .spawn(move || {
                loop {
                    {
                        // Held for the whole pass so a stop can't land mid-pass.
                        let stopped = thread_stop.lock();
                        if *stopped {
                            break;
                        }

                        let Some(storage) = storage.upgrade() else {
                            break;
                        };
                        storage.cleanup(stale_after);
                    }

                    thread::sleep(interval);
                }
            });

        match spawned {
            Ok(_) => *slot = Some(stop),
            Err(err) => {
                tracing::error!(error = ?err, "Failed to spawn leakybucket cleanup thread");
            }
        }
    } // end method run_cleanup_loop_with_config

    /// Stop the idle-eviction loop, if running.
    ///
    /// Idempotent. Waits for a pass already in progress; once this returns no further
    /// pass runs, and the thread exits at its next tick.
    pub fn stop_cleanup_loop(&self) {
        let stop = self.cleanup_stop.lock().take();
        if let Some(stop) = stop {
            *stop.lock() = true;
        }
    }

    fn log_sticky_mismatch(name: &str, bucket: &MemoryBucket, capacity: u64, rate: Rate) {
        if bucket.capacity() != capacity || bucket.rate() != rate {
            tracing::debug!(
                key = name,
                capacity = bucket.capacity(),
                rate = ?*bucket.rate(),
                requested_capacity = capacity,
                requested_rate = ?*rate,
                "leakybucket.create, bucket exists, ignoring requested parameters"
            );
        }
    }
} // end impl MemoryStorage

impl Storage for MemoryStorage {
    type Bucket = MemoryBucket;

    fn create(
        &self,
        name: &str,
        capacity: u64,
        rate: Rate,
    ) -> Result<Arc<MemoryBucket>, LeakyBucketError> {
        if let Some(bucket) = self.buckets.get(name).map(|entry| Arc::clone(entry.value())) {
            Self::log_sticky_mismatch(name, &bucket, capacity, rate);
            return Ok(bucket);
        }

        let mut created = false;
        let bucket = Arc::clone(
            self.buckets
                .entry(name.to_string())
                .or_insert_with(|| {
                    created = true;
                    Arc::new(MemoryBucket::new(capacity, rate))
                })
                .value(),
        );

        if created {
            tracing::trace!(key = name, capacity, rate = ?*rate, "leakybucket.create, new bucket");
        } else {
            Self::log_sticky_mismatch(name, &bucket, capacity, rate);
        }

        Ok(bucket)
    } // end method create

    fn remove(&self, name: &str) {
        if self.buckets.remove(name).is_some() {
            tracing::trace!(key = name, "leakybucket.remove, bucket removed");
        }
    }
} // end impl Storage for MemoryStorage

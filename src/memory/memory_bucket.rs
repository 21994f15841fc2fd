use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::{Bucket, BucketState, CapacityExceeded, Rate};

#[derive(Debug)]
struct Window {
    remaining: u64,
    reset: Instant,
}

/// In-process fixed-window bucket handed out by [`MemoryStorage`](crate::MemoryStorage).
///
/// Capacity and rate are fixed at construction. The mutable part (remaining units and
/// reset instant) sits behind a per-bucket [`parking_lot::Mutex`], so `add` calls on
/// one bucket serialize while different buckets never contend.
///
/// # Refill
///
/// There is no timer. The first [`add`](Bucket::add) at or after the reset instant
/// refills the bucket and starts a new window of length `rate` from that call.
/// [`remaining`](Bucket::remaining) and [`reset`](Bucket::reset) report the state as
/// of the last `add` and may be stale once the window has elapsed.
///
/// # Examples
///
/// ```
/// use leakybucket::{Bucket, MemoryStorage, Rate, Storage};
///
/// let storage = MemoryStorage::new();
/// let bucket = storage.create("user_123", 10, Rate::from_secs(1).unwrap()).unwrap();
///
/// let state = bucket.add(4).unwrap();
/// assert_eq!(state.remaining, 6);
///
/// let err = bucket.add(7).unwrap_err();
/// assert_eq!(err.state.remaining, 6);
/// ```
#[derive(Debug)]
pub struct MemoryBucket {
    capacity: u64,
    rate: Rate,
    window: Mutex<Window>,
}

impl MemoryBucket {
    pub(crate) fn new(capacity: u64, rate: Rate) -> Self {
        Self {
            capacity,
            rate,
            window: Mutex::new(Window {
                remaining: capacity,
                reset: Instant::now() + *rate,
            }),
        }
    } // end constructor

    /// Window length this bucket was created with.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Whether the window ended at least `stale_after` before `now`.
    ///
    /// A bucket locked by an in-flight `add` is never idle.
    pub(crate) fn is_idle(&self, now: Instant, stale_after: Duration) -> bool {
        let Some(window) = self.window.try_lock() else {
            return false;
        };

        window
            .reset
            .checked_add(stale_after)
            .is_some_and(|idle_at| now >= idle_at)
    } // end method is_idle
} // end impl MemoryBucket

impl Bucket for MemoryBucket {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn remaining(&self) -> u64 {
        self.window.lock().remaining
    }

    fn reset(&self) -> Instant {
        self.window.lock().reset
    }

    fn add(&self, amount: u64) -> Result<BucketState, CapacityExceeded> {
        let mut window = self.window.lock();

        let now = Instant::now();
        if now >= window.reset {
            window.remaining = self.capacity;
            window.reset = now + *self.rate;
        }

        if amount > window.remaining {
            return Err(CapacityExceeded {
                state: BucketState {
                    capacity: self.capacity,
                    remaining: window.remaining,
                    reset: window.reset,
                },
            });
        }

        window.remaining -= amount;

        Ok(BucketState {
            capacity: self.capacity,
            remaining: window.remaining,
            reset: window.reset,
        })
    } // end method add
} // end impl Bucket for MemoryBucket

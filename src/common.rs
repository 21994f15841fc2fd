use std::{
    ops::Deref,
    time::{Duration, Instant},
};

use crate::LeakyBucketError;

/// Snapshot of a bucket's properties at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketState {
    /// Maximum units the bucket can hold.
    pub capacity: u64,
    /// Units available when the snapshot was taken.
    pub remaining: u64,
    /// Instant at which the bucket next refills to `capacity`.
    pub reset: Instant,
}

impl BucketState {
    /// Time left until the bucket refills, or zero if the refill is already due.
    ///
    /// Useful for `Retry-After` style hints after a rejected add.
    pub fn retry_after(&self) -> Duration {
        self.reset.saturating_duration_since(Instant::now())
    }
}

/// Window length after which a bucket refills to full capacity.
///
/// Must be greater than zero and at most [`Rate::max`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(Duration);

impl Rate {
    /// Longest accepted window: 100 years.
    pub fn max() -> Self {
        Self(Duration::from_secs(100 * 365 * 24 * 60 * 60))
    }

    /// Rate of `secs` seconds.
    pub fn from_secs(secs: u64) -> Result<Self, LeakyBucketError> {
        Self::try_from(Duration::from_secs(secs))
    }

    /// Rate of `millis` milliseconds.
    pub fn from_millis(millis: u64) -> Result<Self, LeakyBucketError> {
        Self::try_from(Duration::from_millis(millis))
    }
}

impl Deref for Rate {
    type Target = Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Duration> for Rate {
    type Error = LeakyBucketError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        if value.is_zero() {
            Err(LeakyBucketError::InvalidRate(
                "Rate must be greater than 0".to_string(),
            ))
        } else if value > *Self::max() {
            Err(LeakyBucketError::InvalidRate(
                "Rate must not exceed 100 years".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// How long after its window elapsed an untouched bucket is considered idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StaleAfterMs(u64);

impl Default for StaleAfterMs {
    /// Returns 10 minutes.
    fn default() -> Self {
        Self(10 * 60 * 1000)
    }
}

impl Deref for StaleAfterMs {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u64> for StaleAfterMs {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Interval between two passes of the cleanup loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CleanupIntervalMs(u64);

impl Default for CleanupIntervalMs {
    /// Returns 30 seconds.
    fn default() -> Self {
        Self(30 * 1000)
    }
}

impl Deref for CleanupIntervalMs {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for CleanupIntervalMs {
    type Error = LeakyBucketError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(LeakyBucketError::InvalidCleanupConfig(
                "Cleanup interval must be greater than 0".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

use crate::BucketState;

/// Returned by [`Bucket::add`](crate::Bucket::add) when the requested amount does not fit.
///
/// Always carries the bucket state observed by the rejected call, after any due refill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("add exceeds free capacity")]
pub struct CapacityExceeded {
    /// Snapshot of the bucket at the time of the rejected add.
    pub state: BucketState,
}

/// Error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum LeakyBucketError {
    /// An add was rejected because the bucket is full.
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),

    /// Invalid bucket rate.
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// Invalid cleanup loop configuration.
    #[error("invalid cleanup config: {0}")]
    InvalidCleanupConfig(String),
}

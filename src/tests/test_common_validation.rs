use std::time::{Duration, Instant};

use crate::{BucketState, CleanupIntervalMs, LeakyBucketError, Rate, StaleAfterMs};

fn invalid_rate_message(err: LeakyBucketError) -> String {
    match err {
        LeakyBucketError::InvalidRate(msg) => msg,
        other => panic!("expected InvalidRate, got {other:?}"),
    }
}

#[test]
fn rate_try_from_validates_positive() {
    let rate = Rate::try_from(Duration::from_millis(1)).unwrap();
    assert_eq!(*rate, Duration::from_millis(1));

    assert_eq!(
        invalid_rate_message(Rate::try_from(Duration::ZERO).unwrap_err()),
        "Rate must be greater than 0"
    );
    assert_eq!(
        invalid_rate_message(Rate::from_secs(0).unwrap_err()),
        "Rate must be greater than 0"
    );
}

#[test]
fn rate_try_from_rejects_above_max() {
    assert!(Rate::try_from(*Rate::max()).is_ok());

    assert_eq!(
        invalid_rate_message(Rate::try_from(*Rate::max() + Duration::from_secs(1)).unwrap_err()),
        "Rate must not exceed 100 years"
    );
    assert!(Rate::try_from(Duration::MAX).is_err());
}

#[test]
fn rate_convenience_constructors() {
    assert_eq!(*Rate::from_secs(2).unwrap(), Duration::from_secs(2));
    assert_eq!(*Rate::from_millis(250).unwrap(), Duration::from_millis(250));
}

#[test]
fn cleanup_interval_ms_validates_nonzero() {
    let i = CleanupIntervalMs::try_from(1u64).unwrap();
    assert_eq!(*i, 1u64);

    let err = CleanupIntervalMs::try_from(0u64).unwrap_err();
    assert!(matches!(err, LeakyBucketError::InvalidCleanupConfig(_)));
    assert_eq!(
        err.to_string(),
        "invalid cleanup config: Cleanup interval must be greater than 0"
    );
}

#[test]
fn cleanup_defaults() {
    assert_eq!(*StaleAfterMs::default(), 600_000);
    assert_eq!(*CleanupIntervalMs::default(), 30_000);
    assert_eq!(*StaleAfterMs::from(5u64), 5);
}

#[test]
fn retry_after_is_time_until_reset() {
    let state = BucketState {
        capacity: 1,
        remaining: 0,
        reset: Instant::now() + Duration::from_secs(5),
    };
    let retry_after = state.retry_after();
    assert!(retry_after <= Duration::from_secs(5));
    assert!(retry_after > Duration::from_secs(4));

    let due = BucketState {
        reset: Instant::now(),
        ..state
    };
    std::thread::sleep(Duration::from_millis(2));
    assert_eq!(due.retry_after(), Duration::ZERO);
}

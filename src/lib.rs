#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
pub use bucket::*;

mod memory;
pub use memory::*;

mod error;
pub use error::*;

mod common;
pub use common::{BucketState, CleanupIntervalMs, Rate, StaleAfterMs};

#[cfg(test)]
mod tests;

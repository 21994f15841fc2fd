//! In-process bucket storage.
//!
//! Buckets live in the current process, in a [`DashMap`](dashmap::DashMap) keyed by
//! name, each with its own [`parking_lot::Mutex`].
//!
//! # Key Characteristics
//!
//! - **Thread-safe:** Safe for concurrent use across multiple threads
//! - **No I/O:** `create` and `remove` never fail
//! - **Process-scoped:** State is not shared across processes and does not survive
//!   restarts
//!
//! # Examples
//!
//! ```
//! use leakybucket::{Bucket, MemoryStorage, Rate, Storage};
//!
//! let storage = MemoryStorage::new();
//! let bucket = storage.create("api_endpoint", 10, Rate::from_secs(1).unwrap()).unwrap();
//!
//! match bucket.add(1) {
//!     Ok(state) => println!("allowed, {} left", state.remaining),
//!     Err(err) => println!("throttled, retry in {:?}", err.state.retry_after()),
//! }
//! ```

mod memory_bucket;
pub use memory_bucket::*;

mod memory_storage;
pub use memory_storage::*;

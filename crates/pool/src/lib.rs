//! # periwave-pool
//!
//! Per-worker scratch memory for the periwave transform hot path.
//!
//! ## Borrow / Return Cycle
//!
//! ```mermaid
//! graph LR
//!     A["BufferPool::new(config)?"] --> B["BufferPool"]
//!     B -->|"borrow_real(n)"| C["PooledBuffer (len = n.next_power_of_two())"]
//!     C -->|"drop"| D["zeroed, back on its bucket"]
//!     D -->|"borrow_real(n)"| C
//!     B -->|"release_all() / drop"| E["memory freed"]
//! ```
//!
//! Buffers are bucketed by the next power of two of the requested length.
//! A returned buffer is zeroed before it goes back on its bucket, so every
//! borrow hands out an all-zero slice. Requests above
//! [`PoolConfig::max_pooled_len`] are allocated directly and never retained,
//! and a bucket never keeps more than [`PoolConfig::max_spares_per_bucket`]
//! spares.
//!
//! ## Ownership Rules
//!
//! | Rule | How it is enforced |
//! |------|--------------------|
//! | one return per borrow | [`PooledBuffer`] returns itself on drop, including on `?` early exits |
//! | no use after return | the buffer's lifetime is tied to the borrow |
//! | no cross-thread sharing | [`BufferPool`] is neither `Send` nor `Sync` |
//! | teardown | [`with_pool`] or dropping the pool releases every retained buffer |
//!
//! A buffer leaked with [`std::mem::forget`] only costs reuse: the pool
//! allocates a fresh one next time.
//!
//! ## Quick Start
//!
//! ```
//! use periwave_pool::{BufferPool, PoolConfig};
//!
//! let pool = BufferPool::new(PoolConfig::default()).unwrap();
//! {
//!     let mut scratch = pool.borrow_real(100);
//!     assert_eq!(scratch.len(), 128);
//!     scratch[0] = 1.0;
//! }
//! let again = pool.borrow_real(120);
//! assert!(again.iter().all(|&v| v == 0.0));
//! assert_eq!(pool.stats().reuses, 1);
//! ```

mod buffer;
mod config;
mod error;
mod pool;
mod scope;

pub(crate) mod store;

pub use buffer::PooledBuffer;
pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::{BufferPool, PoolStats, bucket_len};
pub use scope::with_pool;

//! The per-worker buffer pool.

use std::cell::RefCell;
use std::marker::PhantomData;

use num_complex::Complex;

use crate::buffer::PooledBuffer;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::store::BucketStore;

/// Returns the bucket length serving a request for `min_len` elements.
///
/// This is the next power of two at or above `min_len`; a zero-length
/// request maps to the one-element bucket.
///
/// # Example
///
/// ```
/// use periwave_pool::bucket_len;
///
/// assert_eq!(bucket_len(0), 1);
/// assert_eq!(bucket_len(5), 8);
/// assert_eq!(bucket_len(64), 64);
/// ```
pub fn bucket_len(min_len: usize) -> usize {
    min_len.next_power_of_two()
}

/// Running counters for a pool.
///
/// `returns` counts every buffer handed back; of those, `discarded` were
/// dropped (oversized or bucket full) instead of being retained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total borrows.
    pub borrows: usize,
    /// Borrows served from a free list.
    pub reuses: usize,
    /// Borrows that allocated a new bucket-sized buffer.
    pub fresh: usize,
    /// Borrows above the pooled limit, allocated directly.
    pub oversized: usize,
    /// Buffers handed back.
    pub returns: usize,
    /// Returned buffers that were dropped instead of retained.
    pub discarded: usize,
}

impl PoolStats {
    /// Fraction of borrows served from a free list, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        if self.borrows == 0 {
            return 0.0;
        }
        self.reuses as f64 / self.borrows as f64
    }

    fn merged(self, other: Self) -> Self {
        Self {
            borrows: self.borrows + other.borrows,
            reuses: self.reuses + other.reuses,
            fresh: self.fresh + other.fresh,
            oversized: self.oversized + other.oversized,
            returns: self.returns + other.returns,
            discarded: self.discarded + other.discarded,
        }
    }
}

/// Bucketed scratch allocator owned by exactly one worker.
///
/// Real (`f64`) and complex (`Complex<f64>`) buffers live in separate
/// buckets. The pool is neither `Send` nor `Sync`: each worker thread or
/// task creates its own and passes it down by reference. Dropping the pool
/// (or calling [`release_all`](Self::release_all)) frees every retained
/// buffer.
pub struct BufferPool {
    config: PoolConfig,
    real: RefCell<BucketStore<f64>>,
    complex: RefCell<BucketStore<Complex<f64>>>,
    _not_send: PhantomData<*const ()>,
}

impl BufferPool {
    /// Creates an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidMaxPooledLen`] if the configuration is
    /// invalid.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            real: RefCell::new(BucketStore::new(&config)),
            complex: RefCell::new(BucketStore::new(&config)),
            _not_send: PhantomData,
        })
    }

    /// Returns the pool's sizing limits.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Borrows an all-zero real buffer of at least `min_len` elements.
    ///
    /// The buffer length is [`bucket_len(min_len)`](bucket_len), or exactly
    /// `min_len` when it exceeds the pooled limit.
    pub fn borrow_real(&self, min_len: usize) -> PooledBuffer<'_, f64> {
        let data = self.real.borrow_mut().take(min_len);
        PooledBuffer::new(data, &self.real)
    }

    /// Borrows an all-zero complex buffer of at least `min_len` elements.
    pub fn borrow_complex(&self, min_len: usize) -> PooledBuffer<'_, Complex<f64>> {
        let data = self.complex.borrow_mut().take(min_len);
        PooledBuffer::new(data, &self.complex)
    }

    /// Returns the combined counters for real and complex buffers.
    pub fn stats(&self) -> PoolStats {
        self.real.borrow().stats().merged(self.complex.borrow().stats())
    }

    /// Number of spare buffers currently retained.
    pub fn retained_buffers(&self) -> usize {
        self.real.borrow().retained() + self.complex.borrow().retained()
    }

    /// Number of spare real buffers retained in the bucket of length `len`.
    pub fn retained_real(&self, len: usize) -> usize {
        self.real.borrow().retained_in(len)
    }

    /// Drops every retained buffer and returns how many were released.
    ///
    /// Buffers still borrowed stay valid; when they come back they are
    /// dropped rather than retained unless a new borrow has recreated
    /// their bucket.
    pub fn release_all(&self) -> usize {
        self.real.borrow_mut().clear() + self.complex.borrow_mut().clear()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        let config = PoolConfig::default();
        Self {
            config,
            real: RefCell::new(BucketStore::new(&config)),
            complex: RefCell::new(BucketStore::new(&config)),
            _not_send: PhantomData,
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("config", &self.config)
            .field("retained", &self.retained_buffers())
            .finish()
    }
}

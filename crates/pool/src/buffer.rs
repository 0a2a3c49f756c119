//! Scoped handle to a pooled buffer.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::store::BucketStore;

/// A buffer borrowed from a [`BufferPool`](crate::BufferPool).
///
/// Dereferences to a slice of the full bucket length (the next power of two
/// of the requested length, or exactly the requested length for oversized
/// requests). The slice is all-zero when handed out. Dropping the handle
/// returns the buffer to its bucket exactly once.
///
/// Results must be copied out before the handle goes out of scope; the
/// borrow checker rejects any reference that would outlive it.
pub struct PooledBuffer<'p, T: Copy + Default> {
    data: Vec<T>,
    store: &'p RefCell<BucketStore<T>>,
}

impl<'p, T: Copy + Default> PooledBuffer<'p, T> {
    pub(crate) fn new(data: Vec<T>, store: &'p RefCell<BucketStore<T>>) -> Self {
        Self { data, store }
    }

    /// Copies the first `len` elements into a vector owned by the caller.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the buffer length.
    pub fn copy_prefix(&self, len: usize) -> Vec<T> {
        self.data[..len].to_vec()
    }
}

impl<T: Copy + Default> Deref for PooledBuffer<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T: Copy + Default> DerefMut for PooledBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Copy + Default> Drop for PooledBuffer<'_, T> {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        // A busy store only means this buffer is not reused.
        if let Ok(mut store) = self.store.try_borrow_mut() {
            store.give_back(data);
        }
    }
}

impl<T: Copy + Default> fmt::Debug for PooledBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

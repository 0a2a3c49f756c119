//! Bucketed free lists for one element type.

use std::collections::HashMap;

use tracing::trace;

use crate::config::PoolConfig;
use crate::pool::{PoolStats, bucket_len};

/// Free lists keyed by bucket length, plus running counters.
#[derive(Debug)]
pub(crate) struct BucketStore<T> {
    buckets: HashMap<usize, Vec<Vec<T>>>,
    max_pooled_len: usize,
    max_spares: usize,
    stats: PoolStats,
}

impl<T: Copy + Default> BucketStore<T> {
    pub(crate) fn new(config: &PoolConfig) -> Self {
        Self {
            buckets: HashMap::new(),
            max_pooled_len: config.max_pooled_len(),
            max_spares: config.max_spares_per_bucket(),
            stats: PoolStats::default(),
        }
    }

    /// Hands out an all-zero buffer of at least `min_len` elements.
    pub(crate) fn take(&mut self, min_len: usize) -> Vec<T> {
        self.stats.borrows += 1;

        if min_len > self.max_pooled_len {
            self.stats.oversized += 1;
            trace!(min_len, "oversized borrow, allocating directly");
            return vec![T::default(); min_len];
        }

        let len = bucket_len(min_len);
        match self.buckets.entry(len).or_default().pop() {
            Some(buf) => {
                self.stats.reuses += 1;
                buf
            }
            None => {
                self.stats.fresh += 1;
                trace!(bucket = len, "bucket empty, allocating");
                vec![T::default(); len]
            }
        }
    }

    /// Takes a buffer back, zeroing it if it is retained.
    pub(crate) fn give_back(&mut self, mut buf: Vec<T>) {
        self.stats.returns += 1;
        let len = buf.len();

        if len > self.max_pooled_len {
            self.stats.discarded += 1;
            return;
        }
        let Some(bucket) = self.buckets.get_mut(&len) else {
            self.stats.discarded += 1;
            return;
        };
        if bucket.len() >= self.max_spares {
            self.stats.discarded += 1;
            trace!(bucket = len, "bucket full, dropping buffer");
            return;
        }

        buf.fill(T::default());
        bucket.push(buf);
    }

    /// Number of spare buffers currently held.
    pub(crate) fn retained(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Spare buffers held for one bucket length.
    pub(crate) fn retained_in(&self, len: usize) -> usize {
        self.buckets.get(&len).map_or(0, Vec::len)
    }

    pub(crate) fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Drops every retained buffer and returns how many were held.
    pub(crate) fn clear(&mut self) -> usize {
        let released = self.retained();
        self.buckets.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max_len: usize, spares: usize) -> BucketStore<f64> {
        let config = PoolConfig::new()
            .with_max_pooled_len(max_len)
            .with_max_spares_per_bucket(spares);
        BucketStore::new(&config)
    }

    #[test]
    fn take_rounds_up_to_bucket() {
        let mut s = store(1024, 4);
        assert_eq!(s.take(5).len(), 8);
        assert_eq!(s.take(8).len(), 8);
        assert_eq!(s.take(9).len(), 16);
    }

    #[test]
    fn oversized_is_exact_and_not_retained() {
        let mut s = store(64, 4);
        let buf = s.take(100);
        assert_eq!(buf.len(), 100);
        s.give_back(buf);
        assert_eq!(s.retained(), 0);
        assert_eq!(s.stats().oversized, 1);
        assert_eq!(s.stats().discarded, 1);
    }

    #[test]
    fn returned_buffer_is_zeroed() {
        let mut s = store(64, 4);
        let mut buf = s.take(16);
        buf.iter_mut().for_each(|v| *v = 7.5);
        s.give_back(buf);
        let again = s.take(16);
        assert!(again.iter().all(|&v| v == 0.0));
        assert_eq!(s.stats().reuses, 1);
    }

    #[test]
    fn full_bucket_discards() {
        let mut s = store(64, 1);
        let a = s.take(4);
        let b = s.take(4);
        s.give_back(a);
        s.give_back(b);
        assert_eq!(s.retained_in(4), 1);
        assert_eq!(s.stats().discarded, 1);
    }

    #[test]
    fn unknown_bucket_discards() {
        let mut s = store(64, 4);
        s.give_back(vec![0.0; 32]);
        assert_eq!(s.retained(), 0);
        assert_eq!(s.stats().discarded, 1);
    }

    #[test]
    fn clear_reports_released() {
        let mut s = store(64, 4);
        let a = s.take(4);
        let b = s.take(32);
        s.give_back(a);
        s.give_back(b);
        assert_eq!(s.clear(), 2);
        assert_eq!(s.retained(), 0);
    }
}

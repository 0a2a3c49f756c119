//! Worker-scoped pool lifetime.

use tracing::debug;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::BufferPool;

/// Runs `work` with a fresh pool and releases the pool when it returns.
///
/// This is the teardown point for a worker: every buffer retained during
/// `work` is freed before `with_pool` returns, so a recycled thread never
/// carries memory from a previous task.
///
/// # Errors
///
/// Returns [`PoolError`] if `config` is invalid; `work` is not run.
///
/// # Example
///
/// ```
/// use periwave_pool::{PoolConfig, with_pool};
///
/// let total = with_pool(PoolConfig::default(), |pool| {
///     let mut buf = pool.borrow_real(4);
///     buf[..4].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
///     buf.iter().sum::<f64>()
/// })
/// .unwrap();
/// assert_eq!(total, 10.0);
/// ```
pub fn with_pool<R>(config: PoolConfig, work: impl FnOnce(&BufferPool) -> R) -> Result<R, PoolError> {
    let pool = BufferPool::new(config)?;
    let out = work(&pool);
    let stats = pool.stats();
    let released = pool.release_all();
    debug!(
        borrows = stats.borrows,
        reuses = stats.reuses,
        fresh = stats.fresh,
        oversized = stats.oversized,
        released,
        "worker pool released"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_skips_work() {
        let mut ran = false;
        let result = with_pool(PoolConfig::new().with_max_pooled_len(0), |_| ran = true);
        assert!(result.is_err());
        assert!(!ran);
    }

    #[test]
    fn returns_closure_value() {
        let len = with_pool(PoolConfig::default(), |pool| pool.borrow_real(33).len()).unwrap();
        assert_eq!(len, 64);
    }
}

use periwave_pool::{BufferPool, PoolConfig, bucket_len, with_pool};
use proptest::prelude::*;

proptest! {
    #[test]
    fn borrow_covers_request(n in 0usize..20_000) {
        let pool = BufferPool::default();
        let buf = pool.borrow_real(n);
        prop_assert!(buf.len() >= n);
        prop_assert!(buf.len().is_power_of_two());
        prop_assert_eq!(buf.len(), bucket_len(n));
    }

    #[test]
    fn reborrow_after_return_is_zero(n in 1usize..4096, fill in -1e6f64..1e6) {
        let pool = BufferPool::default();
        {
            let mut buf = pool.borrow_real(n);
            buf.fill(fill);
        }
        let buf = pool.borrow_real(bucket_len(n));
        prop_assert!(buf.iter().all(|&v| v == 0.0));
        prop_assert_eq!(pool.stats().reuses, 1);
    }

    #[test]
    fn oversized_is_exact(extra in 1usize..1000) {
        let config = PoolConfig::new().with_max_pooled_len(1024);
        let pool = BufferPool::new(config).unwrap();
        let buf = pool.borrow_real(1024 + extra);
        prop_assert_eq!(buf.len(), 1024 + extra);
    }
}

#[test]
fn early_exit_still_returns_buffer() {
    fn work(pool: &BufferPool, fail: bool) -> Result<f64, String> {
        let mut scratch = pool.borrow_real(64);
        scratch[0] = 5.0;
        if fail {
            return Err("bail".to_string());
        }
        Ok(scratch[0])
    }

    let pool = BufferPool::default();
    assert!(work(&pool, true).is_err());
    assert_eq!(pool.retained_real(64), 1);
    assert_eq!(work(&pool, false).unwrap(), 5.0);
    assert_eq!(pool.stats().reuses, 1);
}

#[test]
fn spares_bounded_under_churn() {
    let pool = BufferPool::default();
    for _ in 0..10 {
        let held: Vec<_> = (0..8).map(|_| pool.borrow_real(128)).collect();
        drop(held);
    }
    assert!(pool.retained_real(128) <= PoolConfig::DEFAULT_MAX_SPARES_PER_BUCKET);
}

#[test]
fn scoped_pool_runs_work() {
    let sum = with_pool(PoolConfig::default(), |pool| {
        let mut a = pool.borrow_real(3);
        a[..3].copy_from_slice(&[1.0, 2.0, 3.0]);
        a.copy_prefix(3).into_iter().sum::<f64>()
    })
    .unwrap();
    assert_eq!(sum, 6.0);
}

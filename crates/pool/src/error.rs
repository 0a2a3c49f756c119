//! Error types for the periwave-pool crate.

/// Error type for pool construction.
///
/// Borrowing and returning never fail: a full bucket or an oversized
/// request only falls back to direct allocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolError {
    /// Returned when the maximum pooled length is zero or not a power of two.
    #[error("max pooled length must be a non-zero power of two, got {len}")]
    InvalidMaxPooledLen {
        /// The rejected length.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_max_pooled_len() {
        let err = PoolError::InvalidMaxPooledLen { len: 100 };
        assert_eq!(
            err.to_string(),
            "max pooled length must be a non-zero power of two, got 100"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<PoolError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<PoolError>();
    }
}

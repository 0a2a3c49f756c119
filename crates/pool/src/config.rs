//! Pool sizing limits.

use crate::error::PoolError;

/// Sizing limits for a [`BufferPool`](crate::BufferPool).
///
/// # Example
///
/// ```
/// use periwave_pool::PoolConfig;
///
/// let config = PoolConfig::new()
///     .with_max_pooled_len(1 << 16)
///     .with_max_spares_per_bucket(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Largest bucket length that is retained.
    max_pooled_len: usize,
    /// Spare buffers kept per bucket.
    max_spares_per_bucket: usize,
}

impl PoolConfig {
    /// Default largest pooled bucket (2^17 elements).
    pub const DEFAULT_MAX_POOLED_LEN: usize = 131_072;

    /// Default number of spares per bucket.
    pub const DEFAULT_MAX_SPARES_PER_BUCKET: usize = 4;

    /// Creates a configuration with the default limits.
    pub fn new() -> Self {
        Self {
            max_pooled_len: Self::DEFAULT_MAX_POOLED_LEN,
            max_spares_per_bucket: Self::DEFAULT_MAX_SPARES_PER_BUCKET,
        }
    }

    /// Sets the largest bucket length that is retained.
    pub fn with_max_pooled_len(mut self, len: usize) -> Self {
        self.max_pooled_len = len;
        self
    }

    /// Sets how many spare buffers each bucket keeps.
    ///
    /// Zero disables retention entirely; every borrow then allocates.
    pub fn with_max_spares_per_bucket(mut self, spares: usize) -> Self {
        self.max_spares_per_bucket = spares;
        self
    }

    /// Returns the largest bucket length that is retained.
    pub fn max_pooled_len(&self) -> usize {
        self.max_pooled_len
    }

    /// Returns the number of spares kept per bucket.
    pub fn max_spares_per_bucket(&self) -> usize {
        self.max_spares_per_bucket
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidMaxPooledLen`] unless the maximum pooled
    /// length is a non-zero power of two.
    pub fn validate(&self) -> Result<(), PoolError> {
        if !self.max_pooled_len.is_power_of_two() {
            return Err(PoolError::InvalidMaxPooledLen {
                len: self.max_pooled_len,
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_pooled_len(), 131_072);
        assert_eq!(config.max_spares_per_bucket(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder() {
        let config = PoolConfig::new()
            .with_max_pooled_len(256)
            .with_max_spares_per_bucket(0);
        assert_eq!(config.max_pooled_len(), 256);
        assert_eq!(config.max_spares_per_bucket(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_len_rejected() {
        let err = PoolConfig::new().with_max_pooled_len(0).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidMaxPooledLen { len: 0 }));
    }

    #[test]
    fn non_power_of_two_rejected() {
        let err = PoolConfig::new()
            .with_max_pooled_len(1000)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PoolError::InvalidMaxPooledLen { len: 1000 }));
    }
}

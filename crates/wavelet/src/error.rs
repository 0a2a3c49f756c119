//! Error types for the periwave-wavelet crate.

use periwave_convolve::ConvolveError;
use periwave_pool::PoolError;

/// Broad class of a [`WaveletError`].
///
/// Callers that only need to decide how to react (fix the input, fall back
/// to the non-decimated transform, or drop a cancelled result) can match on
/// this instead of every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The call was malformed; retrying with the same input fails again.
    InvalidArgument,
    /// The signal length does not support the requested decimating
    /// decomposition. [`Modwt`](crate::Modwt) accepts any length.
    UnsupportedLength,
    /// A [`CancelToken`](crate::CancelToken) was triggered.
    Cancelled,
}

/// Error type for all fallible operations in the periwave-wavelet crate.
///
/// Every check runs before the first output element is written, so an
/// error never comes with partial coefficients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WaveletError {
    /// Returned when the input signal has no samples.
    #[error("signal is empty")]
    EmptySignal,

    /// Returned when the input data contains non-finite values (NaN or infinity).
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// Returned when a filter has no coefficients.
    #[error("filter is empty")]
    EmptyFilter,

    /// Returned when a filter contains non-finite coefficients.
    #[error("filter contains non-finite coefficients")]
    NonFiniteFilter,

    /// Returned when the filters of a bank differ in length.
    #[error("filter length mismatch: expected {expected} taps, got {got}")]
    FilterLengthMismatch {
        /// Length of the scaling decomposition filter.
        expected: usize,
        /// Length of the offending filter.
        got: usize,
    },

    /// Returned when a buffer or coefficient vector has the wrong length.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Length provided.
        got: usize,
    },

    /// Returned when a decimating transform cannot split the signal evenly.
    #[error("signal length {len} is not divisible by 2^{levels}")]
    UnsupportedLength {
        /// Length of the input.
        len: usize,
        /// Number of decimating levels requested.
        levels: usize,
    },

    /// Returned when zero decomposition levels are requested.
    #[error("at least one decomposition level is required")]
    ZeroLevels,

    /// Returned when the requested decomposition level exceeds the maximum.
    #[error("level too high: requested {requested}, max for length {len} is {max}")]
    LevelTooHigh {
        /// Level that was requested.
        requested: usize,
        /// Maximum feasible level.
        max: usize,
        /// Length of the input series.
        len: usize,
    },

    /// Returned when an unsupported wavelet filter name is provided.
    #[error("unsupported wavelet filter: {0}")]
    UnsupportedFilter(String),

    /// Returned when a configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when a transform observes a cancelled token.
    #[error("transform cancelled")]
    Cancelled,

    /// Returned when the convolution engine rejects its arguments.
    #[error("convolution failed: {0}")]
    Convolve(#[from] ConvolveError),

    /// Returned when a worker pool cannot be created.
    #[error("buffer pool: {0}")]
    Pool(#[from] PoolError),
}

impl WaveletError {
    /// Returns the broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedLength { .. } => ErrorKind::UnsupportedLength,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

//! Error types for the periwave-convolve crate.

/// Error type for all fallible operations in the periwave-convolve crate.
///
/// Every variant is an invalid argument. Inputs are checked before any
/// output element is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvolveError {
    /// Returned when the signal has no samples.
    #[error("signal is empty")]
    EmptySignal,

    /// Returned when the filter has no coefficients.
    #[error("filter is empty")]
    EmptyFilter,

    /// Returned when a stride of zero is requested.
    #[error("stride must be at least 1")]
    ZeroStride,

    /// Returned when the output slice does not match the signal length.
    #[error("output length mismatch: expected {expected}, got {got}")]
    OutputLengthMismatch {
        /// Signal length.
        expected: usize,
        /// Output slice length.
        got: usize,
    },

    /// Returned when a strategy name is not recognized.
    #[error("unknown convolution strategy: {0}")]
    UnknownStrategy(String),
}

/// Checks the arguments shared by every full-length convolution.
pub(crate) fn check_inputs(
    signal: &[f64],
    filter: &[f64],
    stride: usize,
    out: &[f64],
) -> Result<(), ConvolveError> {
    if signal.is_empty() {
        return Err(ConvolveError::EmptySignal);
    }
    if filter.is_empty() {
        return Err(ConvolveError::EmptyFilter);
    }
    if stride == 0 {
        return Err(ConvolveError::ZeroStride);
    }
    if out.len() != signal.len() {
        return Err(ConvolveError::OutputLengthMismatch {
            expected: signal.len(),
            got: out.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_signal() {
        assert_eq!(ConvolveError::EmptySignal.to_string(), "signal is empty");
    }

    #[test]
    fn error_empty_filter() {
        assert_eq!(ConvolveError::EmptyFilter.to_string(), "filter is empty");
    }

    #[test]
    fn error_zero_stride() {
        assert_eq!(
            ConvolveError::ZeroStride.to_string(),
            "stride must be at least 1"
        );
    }

    #[test]
    fn error_output_mismatch() {
        let err = ConvolveError::OutputLengthMismatch {
            expected: 8,
            got: 4,
        };
        assert_eq!(err.to_string(), "output length mismatch: expected 8, got 4");
    }

    #[test]
    fn error_unknown_strategy() {
        let err = ConvolveError::UnknownStrategy("simd".into());
        assert_eq!(err.to_string(), "unknown convolution strategy: simd");
    }

    #[test]
    fn check_inputs_order() {
        assert_eq!(
            check_inputs(&[], &[], 0, &[]),
            Err(ConvolveError::EmptySignal)
        );
        assert_eq!(
            check_inputs(&[1.0], &[], 0, &[0.0]),
            Err(ConvolveError::EmptyFilter)
        );
        assert_eq!(
            check_inputs(&[1.0], &[1.0], 0, &[0.0]),
            Err(ConvolveError::ZeroStride)
        );
        assert!(check_inputs(&[1.0, 2.0], &[1.0], 3, &[0.0, 0.0]).is_ok());
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<ConvolveError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ConvolveError>();
    }
}

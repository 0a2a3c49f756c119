//! Closed set of direct convolution strategies.

use tracing::instrument;

use crate::error::{ConvolveError, check_inputs};
use crate::{baseline, unrolled};

/// Direct periodic convolution kernel.
///
/// Both variants compute the same operator. `Baseline` reduces every signal
/// index modulo `N`; `Unrolled` splits each output into a direct run read
/// without wrapping (unrolled by [`UNROLL`](crate::UNROLL)) and a wrapped
/// tail. They agree to within floating-point rounding.
///
/// # Example
///
/// ```
/// use periwave_convolve::ConvolutionStrategy;
///
/// let strategy = ConvolutionStrategy::from_name("baseline").unwrap();
/// let mut out = [0.0; 4];
/// strategy
///     .convolve_into(&[1.0, 2.0, 3.0, 4.0], &[0.5, 0.5], 1, &mut out)
///     .unwrap();
/// assert_eq!(out, [2.5, 1.5, 2.5, 3.5]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConvolutionStrategy {
    /// Double loop with modulo indexing on every access.
    Baseline,
    /// Direct/wrapped split with an unrolled direct run.
    #[default]
    Unrolled,
}

impl ConvolutionStrategy {
    /// Parses a strategy from a case-insensitive name.
    ///
    /// | Input | Strategy |
    /// |-------|----------|
    /// | `"baseline"` | [`ConvolutionStrategy::Baseline`] |
    /// | `"unrolled"`, `"optimized"` | [`ConvolutionStrategy::Unrolled`] |
    ///
    /// # Errors
    ///
    /// Returns [`ConvolveError::UnknownStrategy`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, ConvolveError> {
        match name.to_lowercase().as_str() {
            "baseline" => Ok(Self::Baseline),
            "unrolled" | "optimized" => Ok(Self::Unrolled),
            _ => Err(ConvolveError::UnknownStrategy(name.to_string())),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Unrolled => "unrolled",
        }
    }

    /// Returns `true` for the loop-structured variant.
    pub fn is_optimized(&self) -> bool {
        matches!(self, Self::Unrolled)
    }

    /// Computes `out[n] = Σ_m signal[(n − m·stride) mod N] · filter[m]`.
    ///
    /// `out` must have the signal's length. A filter longer than the signal
    /// wraps around it as many times as needed.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ConvolveError::EmptySignal`] | `signal` is empty |
    /// | [`ConvolveError::EmptyFilter`] | `filter` is empty |
    /// | [`ConvolveError::ZeroStride`] | `stride == 0` |
    /// | [`ConvolveError::OutputLengthMismatch`] | `out.len() != signal.len()` |
    pub fn convolve_into(
        &self,
        signal: &[f64],
        filter: &[f64],
        stride: usize,
        out: &mut [f64],
    ) -> Result<(), ConvolveError> {
        check_inputs(signal, filter, stride, out)?;
        match self {
            Self::Baseline => baseline::convolve(signal, filter, stride, out),
            Self::Unrolled => unrolled::convolve(signal, filter, stride, out),
        }
        Ok(())
    }

    /// Computes `out[n] = Σ_m signal[(n + m·stride) mod N] · filter[m]`,
    /// the transpose of [`convolve_into`](Self::convolve_into).
    ///
    /// # Errors
    ///
    /// Same as [`convolve_into`](Self::convolve_into).
    pub fn adjoint_into(
        &self,
        signal: &[f64],
        filter: &[f64],
        stride: usize,
        out: &mut [f64],
    ) -> Result<(), ConvolveError> {
        check_inputs(signal, filter, stride, out)?;
        match self {
            Self::Baseline => baseline::adjoint(signal, filter, stride, out),
            Self::Unrolled => unrolled::adjoint(signal, filter, stride, out),
        }
        Ok(())
    }

    /// Evaluates `Σ_j signal[(base + j) mod N] · filter[j]` at one offset.
    ///
    /// This is the decimated analysis step: a single dot product rather than
    /// a full-length pass.
    ///
    /// # Panics
    ///
    /// Panics if `signal` is empty.
    #[inline]
    pub fn decimated_dot(&self, signal: &[f64], filter: &[f64], base: usize) -> f64 {
        match self {
            Self::Baseline => baseline::decimated_dot(signal, filter, base),
            Self::Unrolled => unrolled::decimated_dot(signal, filter, base),
        }
    }

    /// Adds `approx·scaling[j] + detail·wavelet[j]` into
    /// `out[(base + j) mod N]` for every tap `j`.
    ///
    /// Contributions accumulate: taps that wrap onto the same slot all
    /// count. This is the transpose of two [`decimated_dot`](Self::decimated_dot)
    /// evaluations at the same `base`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is empty. `scaling` and `wavelet` must have equal
    /// length; extra taps on the longer one are ignored.
    #[inline]
    pub fn decimated_accumulate(
        &self,
        out: &mut [f64],
        base: usize,
        approx: f64,
        scaling: &[f64],
        detail: f64,
        wavelet: &[f64],
    ) {
        debug_assert_eq!(scaling.len(), wavelet.len());
        let taps = scaling.len().min(wavelet.len());
        let (scaling, wavelet) = (&scaling[..taps], &wavelet[..taps]);
        match self {
            Self::Baseline => {
                baseline::decimated_accumulate(out, base, approx, scaling, detail, wavelet)
            }
            Self::Unrolled => {
                unrolled::decimated_accumulate(out, base, approx, scaling, detail, wavelet)
            }
        }
    }
}

impl std::fmt::Display for ConvolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Allocating forward convolution with the given strategy.
///
/// The returned vector belongs to the caller.
///
/// # Errors
///
/// Same as [`ConvolutionStrategy::convolve_into`], except the output length
/// check, which cannot fail.
#[instrument(level = "trace", skip(signal, filter), fields(n = signal.len(), taps = filter.len()))]
pub fn circular_convolve(
    strategy: ConvolutionStrategy,
    signal: &[f64],
    filter: &[f64],
    stride: usize,
) -> Result<Vec<f64>, ConvolveError> {
    let mut out = vec![0.0; signal.len()];
    strategy.convolve_into(signal, filter, stride, &mut out)?;
    Ok(out)
}

/// Allocating adjoint convolution with the given strategy.
///
/// # Errors
///
/// Same as [`circular_convolve`].
#[instrument(level = "trace", skip(signal, filter), fields(n = signal.len(), taps = filter.len()))]
pub fn circular_convolve_adjoint(
    strategy: ConvolutionStrategy,
    signal: &[f64],
    filter: &[f64],
    stride: usize,
) -> Result<Vec<f64>, ConvolveError> {
    let mut out = vec![0.0; signal.len()];
    strategy.adjoint_into(signal, filter, stride, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_valid() {
        assert_eq!(
            ConvolutionStrategy::from_name("Baseline").unwrap(),
            ConvolutionStrategy::Baseline
        );
        assert_eq!(
            ConvolutionStrategy::from_name("UNROLLED").unwrap(),
            ConvolutionStrategy::Unrolled
        );
        assert_eq!(
            ConvolutionStrategy::from_name("optimized").unwrap(),
            ConvolutionStrategy::Unrolled
        );
    }

    #[test]
    fn from_name_invalid() {
        let err = ConvolutionStrategy::from_name("simd").unwrap_err();
        assert!(matches!(err, ConvolveError::UnknownStrategy(ref s) if s == "simd"));
    }

    #[test]
    fn name_round_trips() {
        for s in [ConvolutionStrategy::Baseline, ConvolutionStrategy::Unrolled] {
            assert_eq!(ConvolutionStrategy::from_name(s.name()).unwrap(), s);
            assert_eq!(s.to_string(), s.name());
        }
    }

    #[test]
    fn default_is_unrolled() {
        assert_eq!(ConvolutionStrategy::default(), ConvolutionStrategy::Unrolled);
        assert!(ConvolutionStrategy::default().is_optimized());
        assert!(!ConvolutionStrategy::Baseline.is_optimized());
    }

    #[test]
    fn mismatched_output_untouched() {
        let mut out = [9.0; 2];
        let err = ConvolutionStrategy::Unrolled
            .convolve_into(&[1.0, 2.0, 3.0], &[1.0], 1, &mut out)
            .unwrap_err();
        assert_eq!(
            err,
            ConvolveError::OutputLengthMismatch {
                expected: 3,
                got: 2
            }
        );
        assert_eq!(out, [9.0; 2]);
    }

    #[test]
    fn allocating_wrappers() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let fwd = circular_convolve(ConvolutionStrategy::Baseline, &x, &[0.0, 1.0], 1).unwrap();
        assert_eq!(fwd, vec![4.0, 1.0, 2.0, 3.0]);
        let adj =
            circular_convolve_adjoint(ConvolutionStrategy::Baseline, &x, &[0.0, 1.0], 1).unwrap();
        assert_eq!(adj, vec![2.0, 3.0, 4.0, 1.0]);
    }
}

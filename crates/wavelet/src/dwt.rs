//! Multi-level decimated decomposition and reconstruction.

use periwave_convolve::ConvolutionStrategy;
use periwave_pool::BufferPool;
use tracing::{debug, instrument, warn};

use crate::error::WaveletError;
use crate::filter::FilterBank;
use crate::kernel::TransformKernel;
use crate::signal::{Signal, check_divisible, check_samples};

/// Computes the deepest decimating level reachable for a signal of length
/// `n` with a filter of `filter_len` taps.
///
/// A level can run while its input length is even, at least 2, and at
/// least the filter length.
///
/// # Example
///
/// ```
/// use periwave_wavelet::max_dwt_level;
///
/// assert_eq!(max_dwt_level(8, 2), 3);
/// assert_eq!(max_dwt_level(8, 4), 2);
/// assert_eq!(max_dwt_level(12, 2), 2);
/// ```
pub fn max_dwt_level(n: usize, filter_len: usize) -> usize {
    let mut level = 0;
    let mut len = n;
    while len >= 2 && len.is_multiple_of(2) && len >= filter_len {
        level += 1;
        len /= 2;
    }
    level
}

/// Configuration for a decimating multi-level decomposition.
///
/// # Example
///
/// ```
/// use periwave_convolve::ConvolutionStrategy;
/// use periwave_wavelet::DwtConfig;
///
/// let config = DwtConfig::new(3).with_strategy(ConvolutionStrategy::Baseline);
/// assert_eq!(config.levels(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DwtConfig {
    levels: usize,
    strategy: ConvolutionStrategy,
}

impl DwtConfig {
    /// Creates a configuration for `levels` levels with the default strategy.
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            strategy: ConvolutionStrategy::default(),
        }
    }

    /// Sets the convolution strategy.
    pub fn with_strategy(mut self, strategy: ConvolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns the requested number of levels.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Returns the convolution strategy.
    pub fn strategy(&self) -> ConvolutionStrategy {
        self.strategy
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::ZeroLevels`] if `levels == 0`.
    pub fn validate(&self) -> Result<(), WaveletError> {
        if self.levels == 0 {
            return Err(WaveletError::ZeroLevels);
        }
        Ok(())
    }
}

impl Default for DwtConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Coefficients of a multi-level decimating decomposition.
///
/// Details are stored outermost first: `detail(0)` is the finest level with
/// `N / 2` coefficients, and each following level halves. The final
/// approximation has the length of the deepest detail.
#[derive(Clone, Debug, PartialEq)]
pub struct Pyramid {
    approximation: Vec<f64>,
    details: Vec<Vec<f64>>,
    requested_levels: usize,
}

impl Pyramid {
    /// Number of levels actually computed.
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    /// Number of levels that were asked for.
    pub fn requested_levels(&self) -> usize {
        self.requested_levels
    }

    /// Returns `true` if decomposition stopped early because the
    /// approximation became shorter than the filter.
    pub fn is_truncated(&self) -> bool {
        self.levels() < self.requested_levels
    }

    /// Returns the final approximation coefficients.
    pub fn approximation(&self) -> &[f64] {
        &self.approximation
    }

    /// Returns the detail coefficients at the given level (0-indexed, finest
    /// first).
    ///
    /// Returns `None` if the level is out of range.
    pub fn detail(&self, level: usize) -> Option<&[f64]> {
        self.details.get(level).map(|v| v.as_slice())
    }

    /// Returns all detail vectors, finest first.
    pub fn details(&self) -> &[Vec<f64>] {
        &self.details
    }

    /// Total number of stored coefficients; equals the signal length.
    pub fn total_len(&self) -> usize {
        self.approximation.len() + self.details.iter().map(Vec::len).sum::<usize>()
    }

    /// Lays the pyramid out as `[approx | detail_L | … | detail_1]`.
    ///
    /// This is the layout produced by applying the single-level transform in
    /// place on the leading approximation at every level.
    pub fn to_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.total_len());
        flat.extend_from_slice(&self.approximation);
        for detail in self.details.iter().rev() {
            flat.extend_from_slice(detail);
        }
        flat
    }

    /// Splits a `[approx | detail_L | … | detail_1]` vector into a pyramid.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::ZeroLevels`] | `levels == 0` |
    /// | [`WaveletError::EmptySignal`] | `flat` is empty |
    /// | [`WaveletError::UnsupportedLength`] | `flat.len()` is not divisible by `2^levels` |
    /// | [`WaveletError::NonFiniteData`] | any coefficient is NaN or infinite |
    pub fn from_flat(flat: &[f64], levels: usize) -> Result<Self, WaveletError> {
        if levels == 0 {
            return Err(WaveletError::ZeroLevels);
        }
        check_samples(flat)?;
        check_divisible(flat.len(), levels)?;

        let mut len = flat.len() >> levels;
        let approximation = flat[..len].to_vec();
        let mut details = Vec::with_capacity(levels);
        let mut offset = len;
        for _ in 0..levels {
            details.push(flat[offset..offset + len].to_vec());
            offset += len;
            len *= 2;
        }
        details.reverse();
        Ok(Self {
            approximation,
            details,
            requested_levels: levels,
        })
    }
}

/// Decomposes `signal` into a [`Pyramid`] of `config.levels()` levels.
///
/// Each level splits the current approximation into approximation and
/// detail halves and recurses on the approximation. Decomposition stops
/// early, with a warning and [`Pyramid::is_truncated`] set, when the
/// approximation becomes shorter than the filter.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`WaveletError::ZeroLevels`] | `config.levels() == 0` |
/// | [`WaveletError::UnsupportedLength`] | `signal.len()` is not divisible by `2^levels` |
#[instrument(skip(signal, bank, pool), fields(n = signal.len(), taps = bank.len()))]
pub fn decompose(
    signal: &Signal,
    bank: &FilterBank,
    config: &DwtConfig,
    pool: &BufferPool,
) -> Result<Pyramid, WaveletError> {
    config.validate()?;
    let n = signal.len();
    let levels = config.levels();
    check_divisible(n, levels)?;

    let kernel = TransformKernel::new(bank.clone(), config.strategy());
    let mut current = pool.borrow_real(n);
    let mut coeffs = pool.borrow_real(n);
    current[..n].copy_from_slice(signal.as_slice());

    let mut len = n;
    let mut details = Vec::with_capacity(levels);
    for level in 1..=levels {
        if len < kernel.filter_len() {
            warn!(
                level,
                len,
                taps = kernel.filter_len(),
                "approximation shorter than filter, stopping early"
            );
            break;
        }
        kernel.forward_into(&current[..len], &mut coeffs[..len])?;
        let half = len / 2;
        details.push(coeffs[half..len].to_vec());
        current[..half].copy_from_slice(&coeffs[..half]);
        debug!(level, len, "decomposed level");
        len = half;
    }

    Ok(Pyramid {
        approximation: current.copy_prefix(len),
        details,
        requested_levels: levels,
    })
}

/// Reconstructs a signal from a [`Pyramid`], deepest level first.
///
/// The returned vector belongs to the caller.
///
/// # Errors
///
/// Returns [`WaveletError::LengthMismatch`] if a detail vector does not
/// match the approximation it is paired with.
#[instrument(skip(pyramid, bank, pool), fields(levels = pyramid.levels()))]
pub fn reconstruct(
    pyramid: &Pyramid,
    bank: &FilterBank,
    strategy: ConvolutionStrategy,
    pool: &BufferPool,
) -> Result<Vec<f64>, WaveletError> {
    let n = pyramid.total_len();
    let kernel = TransformKernel::new(bank.clone(), strategy);
    let mut current = pool.borrow_real(n);
    let mut coeffs = pool.borrow_real(n);

    let mut len = pyramid.approximation.len();
    current[..len].copy_from_slice(&pyramid.approximation);
    for (level, detail) in pyramid.details.iter().enumerate().rev() {
        if detail.len() != len {
            return Err(WaveletError::LengthMismatch {
                expected: len,
                got: detail.len(),
            });
        }
        coeffs[..len].copy_from_slice(&current[..len]);
        coeffs[len..2 * len].copy_from_slice(detail);
        kernel.reverse_into(&coeffs[..2 * len], &mut current[..2 * len])?;
        len *= 2;
        debug!(level = level + 1, len, "reconstructed level");
    }

    Ok(current.copy_prefix(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::WaveletFilter;
    use approx::assert_abs_diff_eq;

    fn ramp(n: usize) -> Signal {
        Signal::new((1..=n).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn max_level_stops_at_odd_length() {
        assert_eq!(max_dwt_level(1, 2), 0);
        assert_eq!(max_dwt_level(2, 2), 1);
        assert_eq!(max_dwt_level(24, 2), 3);
        assert_eq!(max_dwt_level(1024, 4), 9);
    }

    #[test]
    fn config_validation() {
        assert!(matches!(
            DwtConfig::new(0).validate(),
            Err(WaveletError::ZeroLevels)
        ));
        assert!(DwtConfig::default().validate().is_ok());
        assert_eq!(
            DwtConfig::new(2).strategy(),
            ConvolutionStrategy::Unrolled
        );
    }

    #[test]
    fn three_haar_levels_on_eight() {
        let pool = BufferPool::default();
        let bank = WaveletFilter::Haar.bank();
        let p = decompose(&ramp(8), &bank, &DwtConfig::new(3), &pool).unwrap();
        let lens: Vec<usize> = p.details().iter().map(Vec::len).collect();
        assert_eq!(lens, vec![4, 2, 1]);
        assert_eq!(p.approximation().len(), 1);
        assert_eq!(p.total_len(), 8);
        assert!(!p.is_truncated());
        // sum of 1..=8 scaled by (1/√2)^3
        assert_abs_diff_eq!(p.approximation()[0], 36.0 / 8f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn long_filter_truncates() {
        let pool = BufferPool::default();
        let bank = WaveletFilter::D4.bank();
        let p = decompose(&ramp(8), &bank, &DwtConfig::new(3), &pool).unwrap();
        assert_eq!(p.levels(), 2);
        assert_eq!(p.requested_levels(), 3);
        assert!(p.is_truncated());
        assert_eq!(p.approximation().len(), 2);
        assert_eq!(p.total_len(), 8);

        let back = reconstruct(&p, &bank, ConvolutionStrategy::Unrolled, &pool).unwrap();
        for (b, o) in back.iter().zip(ramp(8).as_slice()) {
            assert_abs_diff_eq!(b, o, epsilon = 1e-9);
        }
    }

    #[test]
    fn indivisible_length_is_unsupported() {
        let pool = BufferPool::default();
        let bank = WaveletFilter::Haar.bank();
        let err = decompose(&ramp(12), &bank, &DwtConfig::new(3), &pool).unwrap_err();
        assert!(matches!(
            err,
            WaveletError::UnsupportedLength { len: 12, levels: 3 }
        ));
        let err = decompose(&ramp(8), &bank, &DwtConfig::new(200), &pool).unwrap_err();
        assert!(matches!(err, WaveletError::UnsupportedLength { .. }));
    }

    #[test]
    fn flat_layout() {
        let pool = BufferPool::default();
        let bank = WaveletFilter::Haar.bank();
        let p = decompose(&ramp(8), &bank, &DwtConfig::new(2), &pool).unwrap();
        let flat = p.to_flat();
        assert_eq!(flat.len(), 8);
        assert_eq!(&flat[..2], p.approximation());
        assert_eq!(&flat[2..4], p.detail(1).unwrap());
        assert_eq!(&flat[4..], p.detail(0).unwrap());
        assert_eq!(Pyramid::from_flat(&flat, 2).unwrap(), p);
    }

    #[test]
    fn from_flat_rejects_bad_input() {
        assert!(matches!(
            Pyramid::from_flat(&[1.0; 8], 0),
            Err(WaveletError::ZeroLevels)
        ));
        assert!(matches!(
            Pyramid::from_flat(&[1.0; 6], 2),
            Err(WaveletError::UnsupportedLength { len: 6, levels: 2 })
        ));
        assert!(matches!(
            Pyramid::from_flat(&[], 1),
            Err(WaveletError::EmptySignal)
        ));
    }

    #[test]
    fn scratch_is_reused_across_calls() {
        let pool = BufferPool::default();
        let bank = WaveletFilter::Haar.bank();
        decompose(&ramp(16), &bank, &DwtConfig::new(2), &pool).unwrap();
        decompose(&ramp(16), &bank, &DwtConfig::new(2), &pool).unwrap();
        assert_eq!(pool.stats().reuses, 2);
    }
}

//! Maximal Overlap Discrete Wavelet Transform (MODWT).
//!
//! The non-decimated transform keeps every level at the full signal length.
//! Instead of halving the signal, level `j` convolves with the base filters
//! dilated by inserting `2^(j-1) − 1` zeros between taps, using the
//! stride-1 periodic convolution. Any signal length `N ≥ 1` is accepted.

use std::sync::OnceLock;

use periwave_convolve::ConvolutionStrategy;
use periwave_convolve::fft::FftConvolver;
use periwave_pool::BufferPool;
use tracing::{debug, instrument};

use crate::error::WaveletError;
use crate::filter::FilterBank;
use crate::signal::{Signal, check_samples};

/// Deepest MODWT level supported by [`Modwt`].
pub const MAX_MODWT_LEVEL: usize = 13;

/// Computes the deepest MODWT level whose dilated filter still fits in the
/// series without wrapping.
///
/// The maximum level `J` satisfies `L_j = (2^J - 1)(L - 1) + 1 <= N`,
/// where `L` is the filter length and `N` is the series length. Deeper
/// levels are computed fine, but their boundary coefficients mix both ends
/// of the series.
///
/// # Example
///
/// ```
/// use periwave_wavelet::max_modwt_level;
///
/// assert_eq!(max_modwt_level(256, 4), 6);
/// assert_eq!(max_modwt_level(256, 2), 8);
/// ```
pub fn max_modwt_level(n: usize, filter_len: usize) -> usize {
    let l = filter_len as f64;
    let n = n as f64;
    if l <= 1.0 || n <= 1.0 {
        return 0;
    }
    let ratio = (n - 1.0) / (l - 1.0) + 1.0;
    if ratio <= 1.0 {
        return 0;
    }
    ratio.log2().floor() as usize
}

/// How each MODWT level evaluates its convolutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvolutionMethod {
    /// Direct kernel of the configured [`ConvolutionStrategy`].
    Direct,
    /// FFT with a periodised filter.
    Fft,
    /// FFT when `N × dilated_taps` exceeds `threshold`, direct otherwise.
    Auto {
        /// Work size above which the FFT path is taken.
        threshold: usize,
    },
}

impl ConvolutionMethod {
    /// Default work threshold for [`ConvolutionMethod::Auto`].
    pub const DEFAULT_FFT_THRESHOLD: usize = 4096;

    /// Parses a method from a case-insensitive name.
    ///
    /// `"auto"` uses [`DEFAULT_FFT_THRESHOLD`](Self::DEFAULT_FFT_THRESHOLD).
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::InvalidConfig`] for names other than
    /// `"direct"`, `"fft"` and `"auto"`.
    pub fn from_name(name: &str) -> Result<Self, WaveletError> {
        match name.to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "fft" => Ok(Self::Fft),
            "auto" => Ok(Self::default()),
            _ => Err(WaveletError::InvalidConfig(format!(
                "unknown convolution method: {name}"
            ))),
        }
    }

    /// Returns `true` if a convolution of `n` samples with `taps`
    /// coefficients goes through the FFT.
    pub fn uses_fft(&self, n: usize, taps: usize) -> bool {
        match *self {
            Self::Direct => false,
            Self::Fft => true,
            Self::Auto { threshold } => n.saturating_mul(taps) > threshold,
        }
    }
}

impl Default for ConvolutionMethod {
    fn default() -> Self {
        Self::Auto {
            threshold: Self::DEFAULT_FFT_THRESHOLD,
        }
    }
}

/// Configuration for a MODWT decomposition.
///
/// # Example
///
/// ```
/// use periwave_wavelet::{ConvolutionMethod, ModwtConfig};
///
/// let config = ModwtConfig::new(4).with_method(ConvolutionMethod::Fft);
/// assert_eq!(config.levels(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModwtConfig {
    levels: usize,
    strategy: ConvolutionStrategy,
    method: ConvolutionMethod,
}

impl ModwtConfig {
    /// Creates a configuration for `levels` levels with default strategy and
    /// method.
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            strategy: ConvolutionStrategy::default(),
            method: ConvolutionMethod::default(),
        }
    }

    /// Sets the direct convolution strategy.
    pub fn with_strategy(mut self, strategy: ConvolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the convolution method.
    pub fn with_method(mut self, method: ConvolutionMethod) -> Self {
        self.method = method;
        self
    }

    /// Returns the number of decomposition levels.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Returns the direct convolution strategy.
    pub fn strategy(&self) -> ConvolutionStrategy {
        self.strategy
    }

    /// Returns the convolution method.
    pub fn method(&self) -> ConvolutionMethod {
        self.method
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::ZeroLevels`] | `levels == 0` |
    /// | [`WaveletError::InvalidConfig`] | `levels > MAX_MODWT_LEVEL` |
    pub fn validate(&self) -> Result<(), WaveletError> {
        if self.levels == 0 {
            return Err(WaveletError::ZeroLevels);
        }
        if self.levels > MAX_MODWT_LEVEL {
            return Err(WaveletError::InvalidConfig(format!(
                "MODWT supports at most {MAX_MODWT_LEVEL} levels, got {}",
                self.levels
            )));
        }
        Ok(())
    }
}

impl Default for ModwtConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// MODWT decomposition coefficients.
///
/// Contains detail coefficients at each level and the final smooth
/// (scaling) coefficients, all of the series length.
#[derive(Clone, Debug, PartialEq)]
pub struct ModwtCoeffs {
    details: Vec<Vec<f64>>,
    smooth: Vec<f64>,
}

impl ModwtCoeffs {
    /// Assembles coefficients from their parts, e.g. after thresholding.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::ZeroLevels`] | `details` is empty |
    /// | [`WaveletError::LevelTooHigh`] | more than [`MAX_MODWT_LEVEL`] detail vectors |
    /// | [`WaveletError::EmptySignal`] | `smooth` is empty |
    /// | [`WaveletError::LengthMismatch`] | a detail differs in length from `smooth` |
    /// | [`WaveletError::NonFiniteData`] | any value is NaN or infinite |
    pub fn from_parts(details: Vec<Vec<f64>>, smooth: Vec<f64>) -> Result<Self, WaveletError> {
        if details.is_empty() {
            return Err(WaveletError::ZeroLevels);
        }
        check_samples(&smooth)?;
        if details.len() > MAX_MODWT_LEVEL {
            return Err(WaveletError::LevelTooHigh {
                requested: details.len(),
                max: MAX_MODWT_LEVEL,
                len: smooth.len(),
            });
        }
        for detail in &details {
            if detail.len() != smooth.len() {
                return Err(WaveletError::LengthMismatch {
                    expected: smooth.len(),
                    got: detail.len(),
                });
            }
            check_samples(detail)?;
        }
        Ok(Self { details, smooth })
    }

    /// Returns the number of decomposition levels.
    pub fn n_levels(&self) -> usize {
        self.details.len()
    }

    /// Returns the detail coefficients at the given level (0-indexed).
    ///
    /// Returns `None` if the level is out of range.
    pub fn detail(&self, level: usize) -> Option<&[f64]> {
        self.details.get(level).map(|v| v.as_slice())
    }

    /// Returns all detail vectors, finest first.
    pub fn details(&self) -> &[Vec<f64>] {
        &self.details
    }

    /// Returns the smooth (scaling) coefficients.
    pub fn smooth(&self) -> &[f64] {
        &self.smooth
    }

    /// Returns the length of the original series.
    pub fn series_len(&self) -> usize {
        self.smooth.len()
    }

    /// Lays the coefficients out as `[W_1 | … | W_J | V_J]`.
    pub fn to_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity((self.n_levels() + 1) * self.series_len());
        for detail in &self.details {
            flat.extend_from_slice(detail);
        }
        flat.extend_from_slice(&self.smooth);
        flat
    }
}

#[derive(Debug)]
struct LevelFilters {
    scaling: Vec<f64>,
    wavelet: Vec<f64>,
}

impl LevelFilters {
    fn dilate(base: &[f64], level: usize) -> Vec<f64> {
        let gap = 1usize << (level - 1);
        let mut out = vec![0.0; (base.len() - 1) * gap + 1];
        for (m, &f) in base.iter().enumerate() {
            out[m * gap] = f;
        }
        out
    }
}

/// MODWT engine for one filter bank.
///
/// The decomposition filters are rescaled to unit energy and divided by
/// `√2`. Dilated per-level filters are built on first use and then shared
/// read-only, so one engine can serve many threads.
///
/// # Example
///
/// ```
/// use periwave_pool::BufferPool;
/// use periwave_wavelet::{Modwt, ModwtConfig, Signal, WaveletFilter};
///
/// let pool = BufferPool::default();
/// let engine = Modwt::new(&WaveletFilter::Haar.bank()).unwrap();
/// let signal = Signal::new(vec![3.0, 1.0, 4.0, 1.0, 5.0]).unwrap();
/// let coeffs = engine.forward(&signal, &ModwtConfig::new(2), &pool).unwrap();
/// assert_eq!(coeffs.series_len(), 5);
///
/// let back = engine.inverse(&coeffs, &ModwtConfig::new(2), &pool).unwrap();
/// assert!((back[2] - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct Modwt {
    scaling: Vec<f64>,
    wavelet: Vec<f64>,
    levels: [OnceLock<LevelFilters>; MAX_MODWT_LEVEL],
}

impl Modwt {
    /// Creates an engine from the decomposition filters of `bank`.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::InvalidConfig`] if either filter has zero
    /// energy.
    pub fn new(bank: &FilterBank) -> Result<Self, WaveletError> {
        Ok(Self {
            scaling: rescale(bank.scaling_dec())?,
            wavelet: rescale(bank.wavelet_dec())?,
            levels: std::array::from_fn(|_| OnceLock::new()),
        })
    }

    /// Number of taps of the undilated filters.
    pub fn filter_len(&self) -> usize {
        self.scaling.len()
    }

    /// Returns the `(scaling, wavelet)` filters of `level` (1-based),
    /// building them on first use.
    ///
    /// Returns `None` outside `1..=MAX_MODWT_LEVEL`.
    pub fn level_filters(&self, level: usize) -> Option<(&[f64], &[f64])> {
        if level == 0 || level > MAX_MODWT_LEVEL {
            return None;
        }
        let filters = self.filters(level);
        Some((&filters.scaling, &filters.wavelet))
    }

    /// Number of levels whose dilated filters have been built.
    pub fn cached_levels(&self) -> usize {
        self.levels.iter().filter(|slot| slot.get().is_some()).count()
    }

    fn filters(&self, level: usize) -> &LevelFilters {
        self.levels[level - 1].get_or_init(|| LevelFilters {
            scaling: LevelFilters::dilate(&self.scaling, level),
            wavelet: LevelFilters::dilate(&self.wavelet, level),
        })
    }

    /// Decomposes `signal` into `config.levels()` detail vectors and a
    /// smooth, each of the signal length.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::ZeroLevels`] | `config.levels() == 0` |
    /// | [`WaveletError::InvalidConfig`] | `config.levels() > MAX_MODWT_LEVEL` |
    #[instrument(skip(self, signal, pool), fields(n = signal.len(), taps = self.filter_len()))]
    pub fn forward(
        &self,
        signal: &Signal,
        config: &ModwtConfig,
        pool: &BufferPool,
    ) -> Result<ModwtCoeffs, WaveletError> {
        config.validate()?;
        let n = signal.len();
        let mut runner = LevelRunner::new(config, pool);

        let mut current = pool.borrow_real(n);
        let mut next = pool.borrow_real(n);
        current[..n].copy_from_slice(signal.as_slice());

        let mut details = Vec::with_capacity(config.levels());
        for level in 1..=config.levels() {
            let filters = self.filters(level);
            let mut detail = vec![0.0; n];
            runner.forward(&current[..n], &filters.wavelet, &mut detail)?;
            runner.forward(&current[..n], &filters.scaling, &mut next[..n])?;
            std::mem::swap(&mut current, &mut next);
            details.push(detail);
            debug!(level, taps = filters.scaling.len(), "modwt level");
        }

        Ok(ModwtCoeffs {
            details,
            smooth: current.copy_prefix(n),
        })
    }

    /// Reconstructs the series from `coeffs` through the adjoint of every
    /// level.
    ///
    /// Only the strategy and method of `config` are used; the level count
    /// comes from `coeffs`.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::Convolve`] only on internal length errors.
    #[instrument(skip(self, coeffs, pool), fields(n = coeffs.series_len(), levels = coeffs.n_levels()))]
    pub fn inverse(
        &self,
        coeffs: &ModwtCoeffs,
        config: &ModwtConfig,
        pool: &BufferPool,
    ) -> Result<Vec<f64>, WaveletError> {
        let n = coeffs.series_len();
        let mut runner = LevelRunner::new(config, pool);

        let mut current = pool.borrow_real(n);
        let mut acc = pool.borrow_real(n);
        let mut part = pool.borrow_real(n);
        current[..n].copy_from_slice(&coeffs.smooth);

        for (index, detail) in coeffs.details.iter().enumerate().rev() {
            let level = index + 1;
            let filters = self.filters(level);
            runner.adjoint(&current[..n], &filters.scaling, &mut acc[..n])?;
            runner.adjoint(detail, &filters.wavelet, &mut part[..n])?;
            for (a, p) in acc[..n].iter_mut().zip(&part[..n]) {
                *a += p;
            }
            std::mem::swap(&mut current, &mut acc);
            debug!(level, "imodwt level");
        }

        Ok(current.copy_prefix(n))
    }
}

fn rescale(filter: &[f64]) -> Result<Vec<f64>, WaveletError> {
    let energy: f64 = filter.iter().map(|v| v * v).sum();
    if energy <= 0.0 {
        return Err(WaveletError::InvalidConfig(
            "filter has zero energy".to_string(),
        ));
    }
    let scale = 1.0 / (energy.sqrt() * std::f64::consts::SQRT_2);
    Ok(filter.iter().map(|v| v * scale).collect())
}

/// Dispatches one level's convolutions to the direct or FFT engine.
struct LevelRunner<'a> {
    strategy: ConvolutionStrategy,
    method: ConvolutionMethod,
    pool: &'a BufferPool,
    fft: Option<FftConvolver>,
}

impl<'a> LevelRunner<'a> {
    fn new(config: &ModwtConfig, pool: &'a BufferPool) -> Self {
        Self {
            strategy: config.strategy(),
            method: config.method(),
            pool,
            fft: None,
        }
    }

    fn forward(&mut self, x: &[f64], filter: &[f64], out: &mut [f64]) -> Result<(), WaveletError> {
        if self.method.uses_fft(x.len(), filter.len()) {
            let fft = self.fft.get_or_insert_with(FftConvolver::new);
            fft.convolve_into(self.pool, x, filter, 1, out)?;
        } else {
            self.strategy.convolve_into(x, filter, 1, out)?;
        }
        Ok(())
    }

    fn adjoint(&mut self, x: &[f64], filter: &[f64], out: &mut [f64]) -> Result<(), WaveletError> {
        if self.method.uses_fft(x.len(), filter.len()) {
            let fft = self.fft.get_or_insert_with(FftConvolver::new);
            fft.adjoint_into(self.pool, x, filter, 1, out)?;
        } else {
            self.strategy.adjoint_into(x, filter, 1, out)?;
        }
        Ok(())
    }
}

/// Computes the MODWT of `signal` with a one-off engine for `bank`.
///
/// Prefer a long-lived [`Modwt`] when transforming many signals, so the
/// dilated filters are built once.
///
/// # Errors
///
/// Same as [`Modwt::new`] and [`Modwt::forward`].
pub fn modwt(
    signal: &Signal,
    bank: &FilterBank,
    config: &ModwtConfig,
    pool: &BufferPool,
) -> Result<ModwtCoeffs, WaveletError> {
    Modwt::new(bank)?.forward(signal, config, pool)
}

/// Reconstructs a series from MODWT coefficients (inverse MODWT).
///
/// # Errors
///
/// Same as [`Modwt::new`] and [`Modwt::inverse`].
pub fn imodwt(
    coeffs: &ModwtCoeffs,
    bank: &FilterBank,
    config: &ModwtConfig,
    pool: &BufferPool,
) -> Result<Vec<f64>, WaveletError> {
    Modwt::new(bank)?.inverse(coeffs, config, pool)
}

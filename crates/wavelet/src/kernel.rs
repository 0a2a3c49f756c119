//! Single-level decimated transform.
//!
//! A coefficient vector of length `N` holds the approximation in its first
//! half and the detail in its second half:
//!
//! ```text
//! coeffs[i]     = Σ_j signal[(2i + j) mod N] · scaling_dec[j]
//! coeffs[i + h] = Σ_j signal[(2i + j) mod N] · wavelet_dec[j]      h = N / 2
//! ```
//!
//! The reverse step accumulates every tap back into the signal, so it is the
//! exact transpose of the forward step for the same filter pair.

use periwave_convolve::ConvolutionStrategy;
use periwave_pool::BufferPool;

use crate::error::WaveletError;
use crate::filter::FilterBank;

/// One level of decimated analysis and synthesis.
///
/// # Example
///
/// ```
/// use periwave_pool::BufferPool;
/// use periwave_wavelet::{TransformKernel, WaveletFilter};
///
/// let pool = BufferPool::default();
/// let kernel = TransformKernel::new(WaveletFilter::Haar.bank(), Default::default());
/// let coeffs = kernel.forward(&pool, &[1.0, 1.0, 1.0, 1.0]).unwrap();
/// assert!(coeffs[2].abs() < 1e-12 && coeffs[3].abs() < 1e-12);
/// let back = kernel.reverse(&pool, &coeffs).unwrap();
/// assert!((back[0] - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct TransformKernel {
    bank: FilterBank,
    strategy: ConvolutionStrategy,
}

impl TransformKernel {
    /// Creates a kernel over `bank` evaluated with `strategy`.
    pub fn new(bank: FilterBank, strategy: ConvolutionStrategy) -> Self {
        Self { bank, strategy }
    }

    /// Returns the filter bank.
    pub fn bank(&self) -> &FilterBank {
        &self.bank
    }

    /// Returns the convolution strategy.
    pub fn strategy(&self) -> ConvolutionStrategy {
        self.strategy
    }

    /// Number of filter taps.
    pub fn filter_len(&self) -> usize {
        self.bank.len()
    }

    /// Writes `[approximation | detail]` for `signal` into `out`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::EmptySignal`] | `signal` is empty |
    /// | [`WaveletError::UnsupportedLength`] | `signal.len()` is odd |
    /// | [`WaveletError::LengthMismatch`] | `out.len() != signal.len()` |
    pub fn forward_into(&self, signal: &[f64], out: &mut [f64]) -> Result<(), WaveletError> {
        check_split(signal.len(), out.len())?;
        let half = signal.len() / 2;
        let (approx, detail) = out.split_at_mut(half);
        for (i, (a, d)) in approx.iter_mut().zip(detail.iter_mut()).enumerate() {
            let base = 2 * i;
            *a = self
                .strategy
                .decimated_dot(signal, self.bank.scaling_dec(), base);
            *d = self
                .strategy
                .decimated_dot(signal, self.bank.wavelet_dec(), base);
        }
        Ok(())
    }

    /// Rebuilds a signal from `[approximation | detail]` into `out`.
    ///
    /// `out` is cleared first and every tap is accumulated. Index pairs with
    /// both coefficients exactly zero contribute nothing and are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`forward_into`](Self::forward_into), with `coeffs` in place
    /// of `signal`.
    pub fn reverse_into(&self, coeffs: &[f64], out: &mut [f64]) -> Result<(), WaveletError> {
        check_split(coeffs.len(), out.len())?;
        out.fill(0.0);
        let (approx, detail) = coeffs.split_at(coeffs.len() / 2);
        for (i, (&a, &d)) in approx.iter().zip(detail).enumerate() {
            if a == 0.0 && d == 0.0 {
                continue;
            }
            self.strategy.decimated_accumulate(
                out,
                2 * i,
                a,
                self.bank.scaling_rec(),
                d,
                self.bank.wavelet_rec(),
            );
        }
        Ok(())
    }

    /// Forward step through pooled scratch; the returned vector belongs to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Same as [`forward_into`](Self::forward_into).
    pub fn forward(&self, pool: &BufferPool, signal: &[f64]) -> Result<Vec<f64>, WaveletError> {
        let n = signal.len();
        let mut scratch = pool.borrow_real(n);
        self.forward_into(signal, &mut scratch[..n])?;
        Ok(scratch.copy_prefix(n))
    }

    /// Reverse step through pooled scratch; the returned vector belongs to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Same as [`reverse_into`](Self::reverse_into).
    pub fn reverse(&self, pool: &BufferPool, coeffs: &[f64]) -> Result<Vec<f64>, WaveletError> {
        let n = coeffs.len();
        let mut scratch = pool.borrow_real(n);
        self.reverse_into(coeffs, &mut scratch[..n])?;
        Ok(scratch.copy_prefix(n))
    }
}

fn check_split(len: usize, out_len: usize) -> Result<(), WaveletError> {
    if len == 0 {
        return Err(WaveletError::EmptySignal);
    }
    if !len.is_multiple_of(2) {
        return Err(WaveletError::UnsupportedLength { len, levels: 1 });
    }
    if out_len != len {
        return Err(WaveletError::LengthMismatch {
            expected: len,
            got: out_len,
        });
    }
    Ok(())
}

//! FFT circular convolution.
//!
//! For long filters the direct kernels cost `O(N·M)`. Here the filter is
//! periodised onto the signal length, `w[(m·stride) mod N] += f[m]`, and
//! the convolution becomes a pointwise product of spectra. The adjoint uses
//! the conjugated filter spectrum. Complex scratch comes from the caller's
//! [`BufferPool`].

use num_complex::Complex;
use periwave_pool::BufferPool;
use rustfft::FftPlanner;
use tracing::trace;

use crate::error::{ConvolveError, check_inputs};

/// FFT convolution engine holding a plan cache.
///
/// A convolver is cheap to create but owns mutable planner state, so each
/// worker keeps its own.
///
/// # Example
///
/// ```
/// use periwave_convolve::fft::FftConvolver;
/// use periwave_pool::BufferPool;
///
/// let pool = BufferPool::default();
/// let mut fft = FftConvolver::new();
/// let mut out = [0.0; 4];
/// fft.convolve_into(&pool, &[1.0, 2.0, 3.0, 4.0], &[0.0, 1.0], 1, &mut out)
///     .unwrap();
/// assert!((out[0] - 4.0).abs() < 1e-12);
/// assert!((out[1] - 1.0).abs() < 1e-12);
/// ```
pub struct FftConvolver {
    planner: FftPlanner<f64>,
}

impl FftConvolver {
    /// Creates a convolver with an empty plan cache.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Forward periodic convolution, same contract as the direct kernels.
    ///
    /// # Errors
    ///
    /// Returns [`ConvolveError`] for empty inputs, zero stride, or an `out`
    /// slice whose length differs from the signal's.
    pub fn convolve_into(
        &mut self,
        pool: &BufferPool,
        signal: &[f64],
        filter: &[f64],
        stride: usize,
        out: &mut [f64],
    ) -> Result<(), ConvolveError> {
        self.run(pool, signal, filter, stride, out, false)
    }

    /// Adjoint periodic convolution, same contract as the direct kernels.
    ///
    /// # Errors
    ///
    /// Same as [`convolve_into`](Self::convolve_into).
    pub fn adjoint_into(
        &mut self,
        pool: &BufferPool,
        signal: &[f64],
        filter: &[f64],
        stride: usize,
        out: &mut [f64],
    ) -> Result<(), ConvolveError> {
        self.run(pool, signal, filter, stride, out, true)
    }

    fn run(
        &mut self,
        pool: &BufferPool,
        signal: &[f64],
        filter: &[f64],
        stride: usize,
        out: &mut [f64],
        conjugate: bool,
    ) -> Result<(), ConvolveError> {
        check_inputs(signal, filter, stride, out)?;
        let n = signal.len();
        let forward = self.planner.plan_fft_forward(n);
        let inverse = self.planner.plan_fft_inverse(n);
        trace!(n, taps = filter.len(), conjugate, "fft convolution");

        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = pool.borrow_complex(scratch_len);
        let scratch = &mut scratch[..scratch_len];

        let mut x_buf = pool.borrow_complex(n);
        let x_hat = &mut x_buf[..n];
        for (c, &v) in x_hat.iter_mut().zip(signal) {
            *c = Complex::new(v, 0.0);
        }
        forward.process_with_scratch(x_hat, scratch);

        let mut w_buf = pool.borrow_complex(n);
        let w_hat = &mut w_buf[..n];
        let step = stride % n;
        let mut k = 0;
        for &f in filter {
            // accumulate: several taps can land on one slot when M > N
            w_hat[k].re += f;
            k += step;
            if k >= n {
                k -= n;
            }
        }
        forward.process_with_scratch(w_hat, scratch);

        for (x, w) in x_hat.iter_mut().zip(w_hat.iter()) {
            *x *= if conjugate { w.conj() } else { *w };
        }
        inverse.process_with_scratch(x_hat, scratch);

        let norm = 1.0 / n as f64;
        for (o, c) in out.iter_mut().zip(x_hat.iter()) {
            *o = c.re * norm;
        }
        Ok(())
    }
}

impl Default for FftConvolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FftConvolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftConvolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConvolutionStrategy;

    fn wave(n: usize, phase: f64) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.71 + phase).cos()).collect()
    }

    #[test]
    fn agrees_with_direct() {
        let pool = BufferPool::default();
        let mut fft = FftConvolver::new();
        for (n, m, stride) in [(1, 3, 1), (6, 4, 1), (9, 20, 2), (32, 7, 4), (15, 15, 3)] {
            let x = wave(n, 0.3);
            let f = wave(m, 1.1);
            let mut a = vec![0.0; n];
            let mut b = vec![0.0; n];

            fft.convolve_into(&pool, &x, &f, stride, &mut a).unwrap();
            ConvolutionStrategy::Baseline
                .convolve_into(&x, &f, stride, &mut b)
                .unwrap();
            for (p, q) in a.iter().zip(&b) {
                assert!((p - q).abs() < 1e-10, "forward n={n} m={m}");
            }

            fft.adjoint_into(&pool, &x, &f, stride, &mut a).unwrap();
            ConvolutionStrategy::Baseline
                .adjoint_into(&x, &f, stride, &mut b)
                .unwrap();
            for (p, q) in a.iter().zip(&b) {
                assert!((p - q).abs() < 1e-10, "adjoint n={n} m={m}");
            }
        }
    }

    #[test]
    fn scratch_returns_to_pool() {
        let pool = BufferPool::default();
        let mut fft = FftConvolver::new();
        let mut out = [0.0; 8];
        fft.convolve_into(&pool, &[1.0; 8], &[0.5, 0.5], 1, &mut out)
            .unwrap();
        fft.convolve_into(&pool, &[1.0; 8], &[0.5, 0.5], 1, &mut out)
            .unwrap();
        assert!(pool.stats().reuses >= 2);
    }

    #[test]
    fn rejects_before_writing() {
        let pool = BufferPool::default();
        let mut fft = FftConvolver::new();
        let mut out = [7.0; 3];
        let err = fft
            .convolve_into(&pool, &[1.0, 2.0, 3.0], &[], 1, &mut out)
            .unwrap_err();
        assert_eq!(err, ConvolveError::EmptyFilter);
        assert_eq!(out, [7.0; 3]);
    }
}

//! Reference kernels: one modulo per signal access.
//!
//! Inputs are assumed checked: non-empty signal and filter, `out` of signal
//! length, equal-length filter pairs.

pub(crate) fn convolve(signal: &[f64], filter: &[f64], stride: usize, out: &mut [f64]) {
    let n = signal.len();
    let step = stride % n;
    for (i, slot) in out.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (m, &f) in filter.iter().enumerate() {
            let back = (m * step) % n;
            sum += signal[(i + n - back) % n] * f;
        }
        *slot = sum;
    }
}

pub(crate) fn adjoint(signal: &[f64], filter: &[f64], stride: usize, out: &mut [f64]) {
    let n = signal.len();
    let step = stride % n;
    for (i, slot) in out.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (m, &f) in filter.iter().enumerate() {
            sum += signal[(i + m * step) % n] * f;
        }
        *slot = sum;
    }
}

pub(crate) fn decimated_dot(signal: &[f64], filter: &[f64], base: usize) -> f64 {
    let n = signal.len();
    filter
        .iter()
        .enumerate()
        .map(|(j, &f)| signal[(base + j) % n] * f)
        .fold(0.0, |sum, term| sum + term)
}

pub(crate) fn decimated_accumulate(
    out: &mut [f64],
    base: usize,
    approx: f64,
    scaling: &[f64],
    detail: f64,
    wavelet: &[f64],
) {
    let n = out.len();
    for (j, (&s, &w)) in scaling.iter().zip(wavelet).enumerate() {
        out[(base + j) % n] += approx * s + detail * w;
    }
}

//! Loop-structured kernels.
//!
//! Each output element is split into a direct run, where signal indices
//! stay inside `[0, N)` and are read without wrapping, and a wrapped tail
//! stepped by explicit subtraction. Direct runs are unrolled by [`UNROLL`].
//! Results agree with the reference kernels up to summation grouping.

/// Unroll factor for the direct runs.
pub const UNROLL: usize = 4;

pub(crate) fn convolve(signal: &[f64], filter: &[f64], stride: usize, out: &mut [f64]) {
    let n = signal.len();
    let taps = filter.len();
    let s = stride % n;

    for (i, slot) in out.iter_mut().enumerate() {
        // taps m with i - m*s >= 0
        let direct = if s == 0 { taps } else { (i / s + 1).min(taps) };

        let mut sum = 0.0;
        let mut m = 0;
        while m + UNROLL <= direct {
            let k = i - m * s;
            sum += signal[k] * filter[m]
                + signal[k - s] * filter[m + 1]
                + signal[k - 2 * s] * filter[m + 2]
                + signal[k - 3 * s] * filter[m + 3];
            m += UNROLL;
        }
        while m < direct {
            sum += signal[i - m * s] * filter[m];
            m += 1;
        }

        if direct < taps {
            let mut k = i + n - direct * s;
            for &f in &filter[direct..] {
                sum += signal[k] * f;
                k = if k >= s { k - s } else { k + n - s };
            }
        }
        *slot = sum;
    }
}

pub(crate) fn adjoint(signal: &[f64], filter: &[f64], stride: usize, out: &mut [f64]) {
    let n = signal.len();
    let taps = filter.len();
    let s = stride % n;

    for (i, slot) in out.iter_mut().enumerate() {
        // taps m with i + m*s < N
        let direct = if s == 0 {
            taps
        } else {
            ((n - 1 - i) / s + 1).min(taps)
        };

        let mut sum = 0.0;
        let mut m = 0;
        while m + UNROLL <= direct {
            let k = i + m * s;
            sum += signal[k] * filter[m]
                + signal[k + s] * filter[m + 1]
                + signal[k + 2 * s] * filter[m + 2]
                + signal[k + 3 * s] * filter[m + 3];
            m += UNROLL;
        }
        while m < direct {
            sum += signal[i + m * s] * filter[m];
            m += 1;
        }

        if direct < taps {
            let mut k = i + direct * s - n;
            for &f in &filter[direct..] {
                sum += signal[k] * f;
                k += s;
                if k >= n {
                    k -= n;
                }
            }
        }
        *slot = sum;
    }
}

pub(crate) fn decimated_dot(signal: &[f64], filter: &[f64], base: usize) -> f64 {
    let n = signal.len();
    let base = base % n;
    let direct = filter.len().min(n - base);
    let (head, tail) = filter.split_at(direct);

    let mut sum = 0.0;
    let mut x_chunks = signal[base..base + direct].chunks_exact(UNROLL);
    let mut f_chunks = head.chunks_exact(UNROLL);
    for (x, f) in (&mut x_chunks).zip(&mut f_chunks) {
        sum += x[0] * f[0] + x[1] * f[1] + x[2] * f[2] + x[3] * f[3];
    }
    for (x, f) in x_chunks.remainder().iter().zip(f_chunks.remainder()) {
        sum += x * f;
    }

    let mut k = 0;
    for &f in tail {
        sum += signal[k] * f;
        k += 1;
        if k == n {
            k = 0;
        }
    }
    sum
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
    let base = base % n;
    let direct = scaling.len().min(n - base);
    let (s_head, s_tail) = scaling.split_at(direct);
    let (w_head, w_tail) = wavelet.split_at(direct);

    let mut o_chunks = out[base..base + direct].chunks_exact_mut(UNROLL);
    let mut s_chunks = s_head.chunks_exact(UNROLL);
    let mut w_chunks = w_head.chunks_exact(UNROLL);
    for ((o, s), w) in (&mut o_chunks).zip(&mut s_chunks).zip(&mut w_chunks) {
        o[0] += approx * s[0] + detail * w[0];
        o[1] += approx * s[1] + detail * w[1];
        o[2] += approx * s[2] + detail * w[2];
        o[3] += approx * s[3] + detail * w[3];
    }
    let rest = o_chunks
        .into_remainder()
        .iter_mut()
        .zip(s_chunks.remainder())
        .zip(w_chunks.remainder());
    for ((o, &s), &w) in rest {
        *o += approx * s + detail * w;
    }

    let mut k = 0;
    for (&s, &w) in s_tail.iter().zip(w_tail) {
        out[k] += approx * s + detail * w;
        k += 1;
        if k == n {
            k = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.37).sin() + 0.1 * i as f64).collect()
    }

    #[test]
    fn matches_baseline_on_wrap_heavy_shapes() {
        for (n, m, stride) in [(1, 5, 1), (3, 9, 2), (8, 8, 1), (7, 3, 4), (16, 6, 5), (5, 13, 5)] {
            let x = ramp(n);
            let f = ramp(m);
            let mut a = vec![0.0; n];
            let mut b = vec![0.0; n];

            convolve(&x, &f, stride, &mut a);
            baseline::convolve(&x, &f, stride, &mut b);
            for (p, q) in a.iter().zip(&b) {
                assert!((p - q).abs() < 1e-12, "forward n={n} m={m} s={stride}");
            }

            adjoint(&x, &f, stride, &mut a);
            baseline::adjoint(&x, &f, stride, &mut b);
            for (p, q) in a.iter().zip(&b) {
                assert!((p - q).abs() < 1e-12, "adjoint n={n} m={m} s={stride}");
            }
        }
    }

    #[test]
    fn decimated_dot_matches_baseline() {
        let x = ramp(6);
        let f = ramp(11);
        for base in 0..6 {
            let a = decimated_dot(&x, &f, base);
            let b = baseline::decimated_dot(&x, &f, base);
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn accumulate_is_bit_identical_to_baseline() {
        let s = ramp(9);
        let w: Vec<f64> = ramp(9).iter().map(|v| -v).collect();
        for base in [0, 2, 4] {
            let mut a = vec![0.5; 6];
            let mut b = vec![0.5; 6];
            decimated_accumulate(&mut a, base, 1.5, &s, -0.25, &w);
            baseline::decimated_accumulate(&mut b, base, 1.5, &s, -0.25, &w);
            assert_eq!(a, b);
        }
    }
}

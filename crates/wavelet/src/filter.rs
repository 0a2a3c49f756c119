//! Wavelet filter definitions.

use std::sync::LazyLock;

use crate::error::WaveletError;

static HAAR: LazyLock<[f64; 2]> = LazyLock::new(|| [std::f64::consts::FRAC_1_SQRT_2; 2]);

static D4: LazyLock<[f64; 4]> = LazyLock::new(|| {
    let s3 = 3.0_f64.sqrt();
    let denom = 4.0 * std::f64::consts::SQRT_2;
    [
        (1.0 + s3) / denom,
        (3.0 + s3) / denom,
        (3.0 - s3) / denom,
        (1.0 - s3) / denom,
    ]
});

static HAAR_WAVELET: LazyLock<Vec<f64>> = LazyLock::new(|| quadrature_mirror(&*HAAR));
static D4_WAVELET: LazyLock<Vec<f64>> = LazyLock::new(|| quadrature_mirror(&*D4));

/// Builds the wavelet filter `g[j] = (-1)^j h[M-1-j]` from a scaling filter.
///
/// # Example
///
/// ```
/// use periwave_wavelet::quadrature_mirror;
///
/// assert_eq!(quadrature_mirror(&[1.0, 2.0, 3.0, 4.0]), vec![4.0, -3.0, 2.0, -1.0]);
/// ```
pub fn quadrature_mirror(scaling: &[f64]) -> Vec<f64> {
    scaling
        .iter()
        .rev()
        .enumerate()
        .map(|(j, &h)| if j % 2 == 0 { h } else { -h })
        .collect()
}

/// Built-in orthogonal wavelet filters.
///
/// Coefficients are computed in closed form on first use and shared
/// read-only afterwards.
///
/// # Example
///
/// ```
/// use periwave_wavelet::WaveletFilter;
///
/// let filter = WaveletFilter::D4;
/// assert_eq!(filter.length(), 4);
/// assert_eq!(filter.scaling_coeffs().len(), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WaveletFilter {
    /// Haar wavelet (length 2).
    Haar,
    /// Daubechies D4 wavelet (length 4).
    #[default]
    D4,
}

impl WaveletFilter {
    /// Returns the filter length (number of coefficients).
    pub fn length(&self) -> usize {
        match self {
            Self::Haar => 2,
            Self::D4 => 4,
        }
    }

    /// Returns the scaling (father wavelet) coefficients.
    pub fn scaling_coeffs(&self) -> &'static [f64] {
        match self {
            Self::Haar => &*HAAR,
            Self::D4 => &*D4,
        }
    }

    /// Returns the wavelet (mother wavelet) coefficients.
    ///
    /// Derived from the scaling coefficients via the quadrature mirror
    /// filter relationship.
    pub fn wavelet_coeffs(&self) -> &'static [f64] {
        match self {
            Self::Haar => &HAAR_WAVELET,
            Self::D4 => &D4_WAVELET,
        }
    }

    /// Returns the orthogonal filter bank for this wavelet.
    pub fn bank(&self) -> FilterBank {
        FilterBank {
            scaling_dec: self.scaling_coeffs().to_vec(),
            wavelet_dec: self.wavelet_coeffs().to_vec(),
            scaling_rec: self.scaling_coeffs().to_vec(),
            wavelet_rec: self.wavelet_coeffs().to_vec(),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Haar => "haar",
            Self::D4 => "d4",
        }
    }

    /// Parses a wavelet filter from a case-insensitive name string.
    ///
    /// # Supported Names
    ///
    /// | Input | Filter |
    /// |-------|--------|
    /// | `"haar"`, `"db1"` | [`WaveletFilter::Haar`] |
    /// | `"d4"`, `"db2"` | [`WaveletFilter::D4`] |
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::UnsupportedFilter`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, WaveletError> {
        match name.to_lowercase().as_str() {
            "haar" | "db1" => Ok(Self::Haar),
            "d4" | "db2" => Ok(Self::D4),
            _ => Err(WaveletError::UnsupportedFilter(name.to_string())),
        }
    }
}

/// The four filters driving one decimated analysis/synthesis step.
///
/// Coefficients are opaque: the bank only checks that all four filters are
/// non-empty, finite, and of equal length. Perfect reconstruction holds when
/// the reconstruction pair is the decomposition pair of an orthogonal
/// wavelet, which is what [`FilterBank::orthogonal`] builds.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterBank {
    scaling_dec: Vec<f64>,
    wavelet_dec: Vec<f64>,
    scaling_rec: Vec<f64>,
    wavelet_rec: Vec<f64>,
}

impl FilterBank {
    /// Creates a bank from explicit decomposition and reconstruction filters.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::EmptyFilter`] | `scaling_dec` is empty |
    /// | [`WaveletError::FilterLengthMismatch`] | any filter differs in length from `scaling_dec` |
    /// | [`WaveletError::NonFiniteFilter`] | any coefficient is NaN or infinite |
    pub fn new(
        scaling_dec: Vec<f64>,
        wavelet_dec: Vec<f64>,
        scaling_rec: Vec<f64>,
        wavelet_rec: Vec<f64>,
    ) -> Result<Self, WaveletError> {
        let expected = scaling_dec.len();
        if expected == 0 {
            return Err(WaveletError::EmptyFilter);
        }
        for filter in [&wavelet_dec, &scaling_rec, &wavelet_rec] {
            if filter.len() != expected {
                return Err(WaveletError::FilterLengthMismatch {
                    expected,
                    got: filter.len(),
                });
            }
        }
        let all = [&scaling_dec, &wavelet_dec, &scaling_rec, &wavelet_rec];
        if !all.iter().all(|f| f.iter().all(|v| v.is_finite())) {
            return Err(WaveletError::NonFiniteFilter);
        }
        Ok(Self {
            scaling_dec,
            wavelet_dec,
            scaling_rec,
            wavelet_rec,
        })
    }

    /// Builds an orthogonal bank from a scaling filter.
    ///
    /// The wavelet filter is the [`quadrature_mirror`] of `scaling`, and
    /// reconstruction reuses the decomposition filters.
    ///
    /// # Errors
    ///
    /// Same as [`FilterBank::new`].
    pub fn orthogonal(scaling: Vec<f64>) -> Result<Self, WaveletError> {
        let wavelet = quadrature_mirror(&scaling);
        Self::new(scaling.clone(), wavelet.clone(), scaling, wavelet)
    }

    /// Number of taps in every filter.
    pub fn len(&self) -> usize {
        self.scaling_dec.len()
    }

    /// Always `false`: a bank has at least one tap.
    pub fn is_empty(&self) -> bool {
        self.scaling_dec.is_empty()
    }

    /// Low-pass analysis filter.
    pub fn scaling_dec(&self) -> &[f64] {
        &self.scaling_dec
    }

    /// High-pass analysis filter.
    pub fn wavelet_dec(&self) -> &[f64] {
        &self.wavelet_dec
    }

    /// Low-pass synthesis filter.
    pub fn scaling_rec(&self) -> &[f64] {
        &self.scaling_rec
    }

    /// High-pass synthesis filter.
    pub fn wavelet_rec(&self) -> &[f64] {
        &self.wavelet_rec
    }
}

impl From<WaveletFilter> for FilterBank {
    fn from(filter: WaveletFilter) -> Self {
        filter.bank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn filter_lengths() {
        assert_eq!(WaveletFilter::Haar.length(), 2);
        assert_eq!(WaveletFilter::D4.length(), 4);
        for f in [WaveletFilter::Haar, WaveletFilter::D4] {
            assert_eq!(f.scaling_coeffs().len(), f.length());
            assert_eq!(f.wavelet_coeffs().len(), f.length());
        }
    }

    #[test]
    fn filter_default_is_d4() {
        assert_eq!(WaveletFilter::default(), WaveletFilter::D4);
    }

    #[test]
    fn haar_coefficients() {
        let h = WaveletFilter::Haar.scaling_coeffs();
        let g = WaveletFilter::Haar.wavelet_coeffs();
        assert_abs_diff_eq!(h[0], 0.70710678, epsilon = 1e-8);
        assert_abs_diff_eq!(h[1], 0.70710678, epsilon = 1e-8);
        assert_abs_diff_eq!(g[0], 0.70710678, epsilon = 1e-8);
        assert_abs_diff_eq!(g[1], -0.70710678, epsilon = 1e-8);
    }

    #[test]
    fn scaling_filters_are_orthonormal() {
        for f in [WaveletFilter::Haar, WaveletFilter::D4] {
            let h = f.scaling_coeffs();
            let energy: f64 = h.iter().map(|v| v * v).sum();
            let sum: f64 = h.iter().sum();
            assert_abs_diff_eq!(energy, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(sum, std::f64::consts::SQRT_2, epsilon = 1e-12);
        }
        // D4 is orthogonal to its even shift
        let h = WaveletFilter::D4.scaling_coeffs();
        assert_abs_diff_eq!(h[0] * h[2] + h[1] * h[3], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn wavelet_has_zero_mean() {
        for f in [WaveletFilter::Haar, WaveletFilter::D4] {
            let sum: f64 = f.wavelet_coeffs().iter().sum();
            assert_abs_diff_eq!(sum, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn from_name_valid() {
        assert_eq!(
            WaveletFilter::from_name("haar").unwrap(),
            WaveletFilter::Haar
        );
        assert_eq!(WaveletFilter::from_name("D4").unwrap(), WaveletFilter::D4);
        assert_eq!(WaveletFilter::from_name("db2").unwrap(), WaveletFilter::D4);
    }

    #[test]
    fn from_name_invalid() {
        let err = WaveletFilter::from_name("coif4").unwrap_err();
        assert!(matches!(err, WaveletError::UnsupportedFilter(ref s) if s == "coif4"));
    }

    #[test]
    fn bank_rejects_bad_filters() {
        assert!(matches!(
            FilterBank::orthogonal(vec![]),
            Err(WaveletError::EmptyFilter)
        ));
        assert!(matches!(
            FilterBank::new(vec![1.0, 1.0], vec![1.0], vec![1.0, 1.0], vec![1.0, 1.0]),
            Err(WaveletError::FilterLengthMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            FilterBank::orthogonal(vec![1.0, f64::NAN]),
            Err(WaveletError::NonFiniteFilter)
        ));
    }

    #[test]
    fn orthogonal_bank_reuses_decomposition_filters() {
        let bank = FilterBank::orthogonal(vec![0.25, 0.5, 0.75]).unwrap();
        assert_eq!(bank.len(), 3);
        assert!(!bank.is_empty());
        assert_eq!(bank.wavelet_dec(), &[0.75, -0.5, 0.25]);
        assert_eq!(bank.scaling_rec(), bank.scaling_dec());
        assert_eq!(bank.wavelet_rec(), bank.wavelet_dec());
    }

    #[test]
    fn builtin_bank_matches_orthogonal() {
        let bank = FilterBank::from(WaveletFilter::D4);
        let built = FilterBank::orthogonal(WaveletFilter::D4.scaling_coeffs().to_vec()).unwrap();
        assert_eq!(bank, built);
    }

    #[test]
    fn filter_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<WaveletFilter>();
        assert_impl::<FilterBank>();
    }
}

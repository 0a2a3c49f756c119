//! Validated signal wrapper.

use crate::error::WaveletError;

/// A validated signal of finite `f64` samples.
///
/// Wraps a `Vec<f64>` and guarantees:
/// - length >= 1
/// - all values are finite (no NaN or infinity)
///
/// Length requirements specific to a transform (even lengths for the
/// decimating transforms) are checked by that transform.
///
/// # Example
///
/// ```
/// use periwave_wavelet::Signal;
///
/// let signal = Signal::new(vec![1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(signal.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    data: Vec<f64>,
}

impl Signal {
    /// Creates a new `Signal` after validating the data.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::EmptySignal`] | `data` is empty |
    /// | [`WaveletError::NonFiniteData`] | any element is NaN or infinite |
    pub fn new(data: Vec<f64>) -> Result<Self, WaveletError> {
        check_samples(&data)?;
        Ok(Self { data })
    }

    /// Returns the samples as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the signal is empty.
    ///
    /// Note: a valid `Signal` is never empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the signal and returns the samples.
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}

/// Checks that a raw sample slice is non-empty and finite.
pub(crate) fn check_samples(data: &[f64]) -> Result<(), WaveletError> {
    if data.is_empty() {
        return Err(WaveletError::EmptySignal);
    }
    if !data.iter().all(|v| v.is_finite()) {
        return Err(WaveletError::NonFiniteData);
    }
    Ok(())
}

/// Checks that `len` splits evenly through `levels` halvings.
pub(crate) fn check_divisible(len: usize, levels: usize) -> Result<(), WaveletError> {
    let divisible = u32::try_from(levels)
        .ok()
        .and_then(|l| 1usize.checked_shl(l))
        .is_some_and(|block| len.is_multiple_of(block));
    if !divisible {
        return Err(WaveletError::UnsupportedLength { len, levels });
    }
    Ok(())
}

impl AsRef<[f64]> for Signal {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

impl TryFrom<Vec<f64>> for Signal {
    type Error = WaveletError;

    fn try_from(data: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(data)
    }
}

//! Signal file reading.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use periwave_wavelet::Signal;

/// Reads a whitespace-separated list of samples into a validated [`Signal`].
pub fn read_signal(path: &Path) -> Result<Signal> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read signal file: {}", path.display()))?;
    let signal =
        parse_signal(&text).with_context(|| format!("invalid signal file: {}", path.display()))?;
    info!(path = %path.display(), n = signal.len(), "signal loaded");
    Ok(signal)
}

/// Parses whitespace-separated samples.
pub fn parse_signal(text: &str) -> Result<Signal> {
    let samples = text
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token
                .parse::<f64>()
                .with_context(|| format!("sample {i} is not a number: {token:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Signal::new(samples)?)
}

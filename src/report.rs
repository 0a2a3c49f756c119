//! JSON reports written by the subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use periwave_pool::PoolStats;

/// Scratch pool counters for one run.
#[derive(Debug, Serialize)]
pub struct PoolReport {
    pub borrows: usize,
    pub reuses: usize,
    pub fresh: usize,
    pub oversized: usize,
    pub returns: usize,
    pub discarded: usize,
    pub hit_rate: f64,
}

impl From<PoolStats> for PoolReport {
    fn from(stats: PoolStats) -> Self {
        Self {
            borrows: stats.borrows,
            reuses: stats.reuses,
            fresh: stats.fresh,
            oversized: stats.oversized,
            returns: stats.returns,
            discarded: stats.discarded,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Output of `periwave dwt`.
#[derive(Debug, Serialize)]
pub struct DwtReport {
    pub filter: &'static str,
    pub strategy: &'static str,
    pub requested_levels: usize,
    pub levels: usize,
    pub truncated: bool,
    pub approximation: Vec<f64>,
    /// Finest level first.
    pub details: Vec<Vec<f64>>,
    pub pool: PoolReport,
}

/// Output of `periwave modwt`.
#[derive(Debug, Serialize)]
pub struct ModwtReport {
    pub filter: &'static str,
    pub method: String,
    pub levels: usize,
    /// Finest level first.
    pub details: Vec<Vec<f64>>,
    pub smooth: Vec<f64>,
    pub pool: PoolReport,
}

/// Output of `periwave packet`.
#[derive(Debug, Serialize)]
pub struct PacketReport {
    pub filter: &'static str,
    pub levels: usize,
    pub packets: usize,
    pub packet_len: usize,
    pub coefficients: Vec<f64>,
}

/// Output of `periwave check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub filter: &'static str,
    pub strategy: &'static str,
    pub n: usize,
    pub max_dwt_level: usize,
    pub max_modwt_level: usize,
    /// `None` when the length is not divisible by `2^levels`.
    pub dwt_max_error: Option<f64>,
    pub modwt_max_error: f64,
    /// `None` when the length is not divisible by `2^levels`.
    pub packet_max_error: Option<f64>,
    pub pool: PoolReport,
}

/// Serializes `report` as pretty JSON to `output`, or stdout when `None`.
pub fn write_report<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Largest absolute difference between two equal-length slices.
pub fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_report_copies_counters() {
        let stats = PoolStats {
            borrows: 4,
            reuses: 3,
            fresh: 1,
            returns: 4,
            ..PoolStats::default()
        };
        let report = PoolReport::from(stats);
        assert_eq!(report.borrows, 4);
        assert_eq!(report.returns, 4);
        assert!((report.hit_rate - 0.75).abs() < 1e-12);
    }

    #[test]
    fn max_abs_error_picks_largest() {
        assert_eq!(max_abs_error(&[1.0, 2.0, 3.0], &[1.0, 2.5, 2.0]), 1.0);
        assert_eq!(max_abs_error(&[], &[]), 0.0);
    }

    #[test]
    fn packet_report_serializes() {
        let report = PacketReport {
            filter: "haar",
            levels: 1,
            packets: 2,
            packet_len: 1,
            coefficients: vec![1.5, -0.5],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["filter"], "haar");
        assert_eq!(json["packets"], 2);
        assert_eq!(json["coefficients"][1], -0.5);
    }

    #[test]
    fn report_written_to_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("report.json");
        write_report(&vec![1.0, 2.0], Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<f64> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![1.0, 2.0]);
    }
}

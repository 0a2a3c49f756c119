use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level periwave configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriwaveConfig {
    /// Filter and decimating transform settings.
    #[serde(default)]
    pub transform: TransformToml,

    /// Undecimated transform settings.
    #[serde(default)]
    pub modwt: ModwtToml,

    /// Packet transform settings.
    #[serde(default)]
    pub packet: PacketToml,

    /// Scratch buffer pool settings.
    #[serde(default)]
    pub pool: PoolToml,
}

impl PeriwaveConfig {
    /// Reads a config file, or returns the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformToml {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_transform_levels")]
    pub levels: usize,
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for TransformToml {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            levels: default_transform_levels(),
            strategy: default_strategy(),
        }
    }
}

fn default_filter() -> String {
    "d4".to_string()
}
fn default_transform_levels() -> usize {
    3
}
fn default_strategy() -> String {
    "unrolled".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModwtToml {
    /// Depth for `modwt`; falls back to `[transform].levels`.
    #[serde(default)]
    pub levels: Option<usize>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_fft_threshold")]
    pub fft_threshold: usize,
}

impl Default for ModwtToml {
    fn default() -> Self {
        Self {
            levels: None,
            method: default_method(),
            fft_threshold: default_fft_threshold(),
        }
    }
}

fn default_method() -> String {
    "auto".to_string()
}
fn default_fft_threshold() -> usize {
    4096
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacketToml {
    /// Depth for `packet`; falls back to `[transform].levels`.
    #[serde(default)]
    pub levels: Option<usize>,
    #[serde(default = "default_min_packet_len")]
    pub min_packet_len: usize,
    #[serde(default = "default_min_packets")]
    pub min_packets: usize,
}

impl Default for PacketToml {
    fn default() -> Self {
        Self {
            levels: None,
            min_packet_len: default_min_packet_len(),
            min_packets: default_min_packets(),
        }
    }
}

fn default_min_packet_len() -> usize {
    1024
}
fn default_min_packets() -> usize {
    2
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolToml {
    #[serde(default = "default_max_pooled_len")]
    pub max_pooled_len: usize,
    #[serde(default = "default_max_spares")]
    pub max_spares_per_bucket: usize,
}

impl Default for PoolToml {
    fn default() -> Self {
        Self {
            max_pooled_len: default_max_pooled_len(),
            max_spares_per_bucket: default_max_spares(),
        }
    }
}

fn default_max_pooled_len() -> usize {
    131_072
}
fn default_max_spares() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: PeriwaveConfig = toml::from_str("").unwrap();
        assert_eq!(config.transform.filter, "d4");
        assert_eq!(config.transform.levels, 3);
        assert_eq!(config.transform.strategy, "unrolled");
        assert_eq!(config.modwt.levels, None);
        assert_eq!(config.modwt.method, "auto");
        assert_eq!(config.modwt.fft_threshold, 4096);
        assert_eq!(config.packet.min_packet_len, 1024);
        assert_eq!(config.packet.min_packets, 2);
        assert_eq!(config.pool.max_pooled_len, 131_072);
        assert_eq!(config.pool.max_spares_per_bucket, 4);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: PeriwaveConfig = toml::from_str(
            r#"
            [transform]
            filter = "haar"

            [modwt]
            levels = 6
            method = "fft"
            "#,
        )
        .unwrap();
        assert_eq!(config.transform.filter, "haar");
        assert_eq!(config.transform.levels, 3);
        assert_eq!(config.modwt.levels, Some(6));
        assert_eq!(config.modwt.method, "fft");
        assert_eq!(config.modwt.fft_threshold, 4096);
    }

    #[test]
    fn unknown_field_rejected() {
        let result: Result<PeriwaveConfig, _> = toml::from_str(
            r#"
            [pool]
            max_len = 64
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_table_rejected() {
        let result: Result<PeriwaveConfig, _> = toml::from_str("[streaming]\nwindow = 64\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_without_path_is_default() {
        let config = PeriwaveConfig::load(None).unwrap();
        assert_eq!(config.transform.levels, 3);
    }

    #[test]
    fn load_missing_file_mentions_path() {
        let err = PeriwaveConfig::load(Some(Path::new("/nonexistent/periwave.toml")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("/nonexistent/periwave.toml"));
    }
}

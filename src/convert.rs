//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};

use crate::config::*;

use periwave_convolve::ConvolutionStrategy;
use periwave_pool::PoolConfig;
use periwave_wavelet::{
    ConvolutionMethod, DwtConfig, FilterBank, ModwtConfig, PacketConfig, ParallelPolicy,
    WaveletFilter,
};

/// Resolves the filter name, preferring the CLI override.
pub fn parse_filter(transform: &TransformToml, cli_filter: Option<&str>) -> Result<WaveletFilter> {
    let name = cli_filter.unwrap_or(&transform.filter);
    WaveletFilter::from_name(name).context("invalid [transform].filter")
}

/// Builds the analysis/synthesis bank for the selected filter.
pub fn build_filter_bank(
    transform: &TransformToml,
    cli_filter: Option<&str>,
) -> Result<FilterBank> {
    Ok(parse_filter(transform, cli_filter)?.bank())
}

/// Parses the convolution strategy name.
pub fn parse_strategy(transform: &TransformToml) -> Result<ConvolutionStrategy> {
    ConvolutionStrategy::from_name(&transform.strategy).context("invalid [transform].strategy")
}

/// Parses the MODWT convolution method, applying `fft_threshold` to `auto`.
pub fn parse_method(modwt: &ModwtToml) -> Result<ConvolutionMethod> {
    let method = ConvolutionMethod::from_name(&modwt.method).context("invalid [modwt].method")?;
    Ok(match method {
        ConvolutionMethod::Auto { .. } => ConvolutionMethod::Auto {
            threshold: modwt.fft_threshold,
        },
        other => other,
    })
}

/// Builds a validated `PoolConfig`.
pub fn build_pool_config(pool: &PoolToml) -> Result<PoolConfig> {
    let config = PoolConfig::new()
        .with_max_pooled_len(pool.max_pooled_len)
        .with_max_spares_per_bucket(pool.max_spares_per_bucket);
    config.validate().context("invalid [pool] config")?;
    Ok(config)
}

/// Builds a validated `DwtConfig`.
pub fn build_dwt_config(cfg: &PeriwaveConfig, cli_levels: Option<usize>) -> Result<DwtConfig> {
    let levels = cli_levels.unwrap_or(cfg.transform.levels);
    let config = DwtConfig::new(levels).with_strategy(parse_strategy(&cfg.transform)?);
    config.validate().context("invalid [transform] config")?;
    Ok(config)
}

/// Builds a validated `ModwtConfig`.
pub fn build_modwt_config(cfg: &PeriwaveConfig, cli_levels: Option<usize>) -> Result<ModwtConfig> {
    let levels = cli_levels
        .or(cfg.modwt.levels)
        .unwrap_or(cfg.transform.levels);
    let config = ModwtConfig::new(levels)
        .with_strategy(parse_strategy(&cfg.transform)?)
        .with_method(parse_method(&cfg.modwt)?);
    config.validate().context("invalid [modwt] config")?;
    Ok(config)
}

/// Builds a validated `PacketConfig`, including its per-worker pool config.
pub fn build_packet_config(
    cfg: &PeriwaveConfig,
    cli_levels: Option<usize>,
) -> Result<PacketConfig> {
    let levels = cli_levels
        .or(cfg.packet.levels)
        .unwrap_or(cfg.transform.levels);
    let parallel = ParallelPolicy::new()
        .with_min_packet_len(cfg.packet.min_packet_len)
        .with_min_packets(cfg.packet.min_packets);
    let config = PacketConfig::new(levels)
        .with_strategy(parse_strategy(&cfg.transform)?)
        .with_parallel(parallel)
        .with_pool(build_pool_config(&cfg.pool)?);
    config.validate().context("invalid [packet] config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_filter_overrides_config() {
        let transform = TransformToml::default();
        assert_eq!(parse_filter(&transform, None).unwrap(), WaveletFilter::D4);
        assert_eq!(
            parse_filter(&transform, Some("HAAR")).unwrap(),
            WaveletFilter::Haar
        );
    }

    #[test]
    fn unknown_filter_rejected() {
        let transform = TransformToml {
            filter: "la8".to_string(),
            ..TransformToml::default()
        };
        let err = build_filter_bank(&transform, None).unwrap_err();
        assert!(format!("{err:#}").contains("[transform].filter"));
    }

    #[test]
    fn strategy_names() {
        let mut transform = TransformToml::default();
        assert_eq!(parse_strategy(&transform).unwrap(), ConvolutionStrategy::Unrolled);
        transform.strategy = "baseline".to_string();
        assert_eq!(parse_strategy(&transform).unwrap(), ConvolutionStrategy::Baseline);
        transform.strategy = "simd".to_string();
        assert!(parse_strategy(&transform).is_err());
    }

    #[test]
    fn auto_method_takes_configured_threshold() {
        let modwt = ModwtToml {
            fft_threshold: 64,
            ..ModwtToml::default()
        };
        assert_eq!(
            parse_method(&modwt).unwrap(),
            ConvolutionMethod::Auto { threshold: 64 }
        );
    }

    #[test]
    fn explicit_methods_ignore_threshold() {
        let modwt = ModwtToml {
            method: "fft".to_string(),
            fft_threshold: 64,
            ..ModwtToml::default()
        };
        assert_eq!(parse_method(&modwt).unwrap(), ConvolutionMethod::Fft);
    }

    #[test]
    fn levels_fall_back_to_transform() {
        let cfg = PeriwaveConfig::default();
        assert_eq!(build_dwt_config(&cfg, None).unwrap().levels(), 3);
        assert_eq!(build_modwt_config(&cfg, None).unwrap().levels(), 3);
        assert_eq!(build_packet_config(&cfg, None).unwrap().levels(), 3);
        assert_eq!(build_modwt_config(&cfg, Some(5)).unwrap().levels(), 5);
    }

    #[test]
    fn zero_levels_rejected() {
        let cfg = PeriwaveConfig::default();
        assert!(build_dwt_config(&cfg, Some(0)).is_err());
        assert!(build_modwt_config(&cfg, Some(0)).is_err());
        assert!(build_packet_config(&cfg, Some(0)).is_err());
    }

    #[test]
    fn invalid_pool_rejected() {
        let pool = PoolToml {
            max_pooled_len: 0,
            ..PoolToml::default()
        };
        assert!(build_pool_config(&pool).is_err());
    }

    #[test]
    fn packet_config_carries_pool_and_policy() {
        let mut cfg = PeriwaveConfig::default();
        cfg.packet.min_packet_len = 16;
        cfg.pool.max_spares_per_bucket = 1;
        let packet = build_packet_config(&cfg, Some(2)).unwrap();
        assert_eq!(packet.parallel().min_packet_len(), 16);
        assert_eq!(packet.pool().max_spares_per_bucket(), 1);
    }
}

//! `dwt`, `modwt` and `packet` commands: decompose a signal and write the
//! coefficients as JSON.

use anyhow::Result;
use tracing::{info, info_span, warn};

use periwave_pool::with_pool;
use periwave_wavelet::{CancelToken, decompose, modwt, packet_forward};

use crate::cli::TransformArgs;
use crate::config::PeriwaveConfig;
use crate::convert;
use crate::input::read_signal;
use crate::report::{DwtReport, ModwtReport, PacketReport, write_report};

/// Run a decimating decomposition.
pub fn run_dwt(args: TransformArgs) -> Result<()> {
    let _cmd = info_span!("dwt").entered();
    let config = PeriwaveConfig::load(args.config.as_deref())?;
    let filter = convert::parse_filter(&config.transform, args.filter.as_deref())?;
    let dwt_cfg = convert::build_dwt_config(&config, args.levels)?;
    let pool_cfg = convert::build_pool_config(&config.pool)?;
    let signal = read_signal(&args.input)?;

    let bank = filter.bank();
    let (pyramid, stats) = with_pool(pool_cfg, |pool| {
        decompose(&signal, &bank, &dwt_cfg, pool).map(|p| (p, pool.stats()))
    })??;

    if pyramid.is_truncated() {
        warn!(
            requested = pyramid.requested_levels(),
            reached = pyramid.levels(),
            "decomposition stopped early"
        );
    }
    info!(levels = pyramid.levels(), "decomposition complete");

    let report = DwtReport {
        filter: filter.name(),
        strategy: dwt_cfg.strategy().name(),
        requested_levels: pyramid.requested_levels(),
        levels: pyramid.levels(),
        truncated: pyramid.is_truncated(),
        approximation: pyramid.approximation().to_vec(),
        details: pyramid.details().to_vec(),
        pool: stats.into(),
    };
    write_report(&report, args.output.as_deref())
}

/// Run a maximal overlap decomposition.
pub fn run_modwt(args: TransformArgs) -> Result<()> {
    let _cmd = info_span!("modwt").entered();
    let config = PeriwaveConfig::load(args.config.as_deref())?;
    let filter = convert::parse_filter(&config.transform, args.filter.as_deref())?;
    let modwt_cfg = convert::build_modwt_config(&config, args.levels)?;
    let pool_cfg = convert::build_pool_config(&config.pool)?;
    let signal = read_signal(&args.input)?;

    let bank = filter.bank();
    let (coeffs, stats) = with_pool(pool_cfg, |pool| {
        modwt(&signal, &bank, &modwt_cfg, pool).map(|c| (c, pool.stats()))
    })??;
    info!(levels = coeffs.n_levels(), "decomposition complete");

    let report = ModwtReport {
        filter: filter.name(),
        method: format!("{:?}", modwt_cfg.method()),
        levels: coeffs.n_levels(),
        details: coeffs.details().to_vec(),
        smooth: coeffs.smooth().to_vec(),
        pool: stats.into(),
    };
    write_report(&report, args.output.as_deref())
}

/// Run a full packet decomposition.
pub fn run_packet(args: TransformArgs) -> Result<()> {
    let _cmd = info_span!("packet").entered();
    let config = PeriwaveConfig::load(args.config.as_deref())?;
    let filter = convert::parse_filter(&config.transform, args.filter.as_deref())?;
    let packet_cfg = convert::build_packet_config(&config, args.levels)?;
    let signal = read_signal(&args.input)?;

    let coefficients = packet_forward(&signal, &filter.bank(), &packet_cfg, &CancelToken::new())?;
    let levels = packet_cfg.levels();
    info!(levels, "decomposition complete");

    let report = PacketReport {
        filter: filter.name(),
        levels,
        packets: 1 << levels,
        packet_len: signal.len() >> levels,
        coefficients,
    };
    write_report(&report, args.output.as_deref())
}

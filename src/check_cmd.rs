//! Check command: round-trip a signal through every transform.

use anyhow::Result;
use tracing::{info, info_span, warn};

use periwave_pool::{BufferPool, with_pool};
use periwave_wavelet::{
    CancelToken, DwtConfig, ErrorKind, FilterBank, PacketConfig, Signal, WaveletError, decompose,
    imodwt, max_dwt_level, max_modwt_level, modwt, packet_forward, packet_reverse, reconstruct,
};

use crate::cli::TransformArgs;
use crate::config::PeriwaveConfig;
use crate::convert;
use crate::input::read_signal;
use crate::report::{CheckReport, max_abs_error, write_report};

/// Run forward and inverse transforms and report the reconstruction error.
pub fn run(args: TransformArgs) -> Result<()> {
    let _cmd = info_span!("check").entered();
    let config = PeriwaveConfig::load(args.config.as_deref())?;
    let filter = convert::parse_filter(&config.transform, args.filter.as_deref())?;
    let dwt_cfg = convert::build_dwt_config(&config, args.levels)?;
    let modwt_cfg = convert::build_modwt_config(&config, args.levels)?;
    let packet_cfg = convert::build_packet_config(&config, args.levels)?;
    let pool_cfg = convert::build_pool_config(&config.pool)?;
    let signal = read_signal(&args.input)?;

    let bank = filter.bank();
    let n = signal.len();

    let (dwt_max_error, modwt_max_error, stats) = with_pool(pool_cfg, |pool| {
        let dwt = skip_unsupported(dwt_round_trip(&signal, &bank, &dwt_cfg, pool))?;
        let coeffs = modwt(&signal, &bank, &modwt_cfg, pool)?;
        let restored = imodwt(&coeffs, &bank, &modwt_cfg, pool)?;
        let modwt = max_abs_error(signal.as_slice(), &restored);
        Ok::<_, WaveletError>((dwt, modwt, pool.stats()))
    })??;
    let packet_max_error = skip_unsupported(packet_round_trip(&signal, &bank, &packet_cfg))?;

    info!(
        ?dwt_max_error,
        modwt_max_error,
        ?packet_max_error,
        "round trips complete"
    );

    let report = CheckReport {
        filter: filter.name(),
        strategy: dwt_cfg.strategy().name(),
        n,
        max_dwt_level: max_dwt_level(n, bank.len()),
        max_modwt_level: max_modwt_level(n, bank.len()),
        dwt_max_error,
        modwt_max_error,
        packet_max_error,
        pool: stats.into(),
    };
    write_report(&report, args.output.as_deref())
}

fn dwt_round_trip(
    signal: &Signal,
    bank: &FilterBank,
    config: &DwtConfig,
    pool: &BufferPool,
) -> Result<f64, WaveletError> {
    let pyramid = decompose(signal, bank, config, pool)?;
    let restored = reconstruct(&pyramid, bank, config.strategy(), pool)?;
    Ok(max_abs_error(signal.as_slice(), &restored))
}

fn packet_round_trip(
    signal: &Signal,
    bank: &FilterBank,
    config: &PacketConfig,
) -> Result<f64, WaveletError> {
    let cancel = CancelToken::new();
    let coeffs = packet_forward(signal, bank, config, &cancel)?;
    let restored = packet_reverse(&coeffs, bank, config, &cancel)?;
    Ok(max_abs_error(signal.as_slice(), &restored))
}

/// Maps a length the decimating transforms cannot split to `None`.
fn skip_unsupported(result: Result<f64, WaveletError>) -> Result<Option<f64>, WaveletError> {
    match result {
        Ok(err) => Ok(Some(err)),
        Err(e) if e.kind() == ErrorKind::UnsupportedLength => {
            warn!(error = %e, "skipping decimating round trip");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_length_becomes_none() {
        let err = WaveletError::UnsupportedLength { len: 6, levels: 2 };
        assert_eq!(skip_unsupported(Err(err)).unwrap(), None);
    }

    #[test]
    fn other_errors_propagate() {
        assert!(skip_unsupported(Err(WaveletError::ZeroLevels)).is_err());
        assert_eq!(skip_unsupported(Ok(1e-15)).unwrap(), Some(1e-15));
    }

    #[test]
    fn haar_round_trip_is_exact() {
        let signal = Signal::new(vec![4.0, 2.0, 5.0, 5.0, 1.0, -3.0, 0.5, 7.0]).unwrap();
        let bank = periwave_wavelet::WaveletFilter::Haar.bank();
        let pool = BufferPool::default();
        let config = DwtConfig::new(3);
        let err = dwt_round_trip(&signal, &bank, &config, &pool).unwrap();
        assert!(err < 1e-12);
        let err = packet_round_trip(&signal, &bank, &PacketConfig::new(2)).unwrap();
        assert!(err < 1e-12);
    }
}

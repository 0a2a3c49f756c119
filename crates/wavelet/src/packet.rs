//! Wavelet packet transform.
//!
//! Level `l` (0-based) splits the working vector into `2^l` equal packets
//! and applies the single-level kernel to each, so both the approximation
//! and detail halves keep splitting. Packets of one level are disjoint and
//! run on rayon workers, each with its own [`BufferPool`]. Levels are joined
//! before the next one starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use periwave_convolve::ConvolutionStrategy;
use periwave_pool::{BufferPool, PoolConfig, with_pool};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::WaveletError;
use crate::filter::FilterBank;
use crate::kernel::TransformKernel;
use crate::signal::{Signal, check_divisible, check_samples};

/// When a packet level is split across rayon workers.
///
/// A level runs in parallel only if it has at least `min_packets` packets
/// of at least `min_packet_len` samples each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelPolicy {
    min_packet_len: usize,
    min_packets: usize,
}

impl ParallelPolicy {
    /// Default minimum packet length for parallel dispatch.
    pub const DEFAULT_MIN_PACKET_LEN: usize = 1024;

    /// Default minimum packet count for parallel dispatch.
    pub const DEFAULT_MIN_PACKETS: usize = 2;

    /// Creates a policy with the default thresholds.
    pub fn new() -> Self {
        Self {
            min_packet_len: Self::DEFAULT_MIN_PACKET_LEN,
            min_packets: Self::DEFAULT_MIN_PACKETS,
        }
    }

    /// A policy that never dispatches to workers.
    pub fn sequential() -> Self {
        Self {
            min_packet_len: usize::MAX,
            min_packets: usize::MAX,
        }
    }

    /// Sets the minimum packet length.
    pub fn with_min_packet_len(mut self, len: usize) -> Self {
        self.min_packet_len = len;
        self
    }

    /// Sets the minimum packet count.
    pub fn with_min_packets(mut self, packets: usize) -> Self {
        self.min_packets = packets;
        self
    }

    /// Returns the minimum packet length.
    pub fn min_packet_len(&self) -> usize {
        self.min_packet_len
    }

    /// Returns the minimum packet count.
    pub fn min_packets(&self) -> usize {
        self.min_packets
    }

    /// Returns `true` if a level of `packets` packets of `packet_len`
    /// samples runs in parallel.
    pub fn runs_parallel(&self, packets: usize, packet_len: usize) -> bool {
        packets >= self.min_packets && packet_len >= self.min_packet_len
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a wavelet packet transform.
///
/// # Example
///
/// ```
/// use periwave_wavelet::{PacketConfig, ParallelPolicy};
///
/// let config = PacketConfig::new(3).with_parallel(ParallelPolicy::sequential());
/// assert_eq!(config.levels(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketConfig {
    levels: usize,
    strategy: ConvolutionStrategy,
    parallel: ParallelPolicy,
    pool: PoolConfig,
}

impl PacketConfig {
    /// Creates a configuration for `levels` levels with default settings.
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            strategy: ConvolutionStrategy::default(),
            parallel: ParallelPolicy::default(),
            pool: PoolConfig::default(),
        }
    }

    /// Sets the convolution strategy.
    pub fn with_strategy(mut self, strategy: ConvolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the parallel dispatch policy.
    pub fn with_parallel(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the sizing of every worker pool.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Returns the number of levels.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Returns the convolution strategy.
    pub fn strategy(&self) -> ConvolutionStrategy {
        self.strategy
    }

    /// Returns the parallel dispatch policy.
    pub fn parallel(&self) -> &ParallelPolicy {
        &self.parallel
    }

    /// Returns the worker pool sizing.
    pub fn pool(&self) -> &PoolConfig {
        &self.pool
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::ZeroLevels`] | `levels == 0` |
    /// | [`WaveletError::Pool`] | invalid pool sizing |
    pub fn validate(&self) -> Result<(), WaveletError> {
        if self.levels == 0 {
            return Err(WaveletError::ZeroLevels);
        }
        self.pool.validate()?;
        Ok(())
    }
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Cooperative cancellation flag shared between a caller and a transform.
///
/// The transform checks the flag before every level and every packet. A
/// packet already running always finishes; its result is discarded and the
/// transform returns [`WaveletError::Cancelled`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any
    /// clone of this token.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), WaveletError> {
        if self.is_cancelled() {
            return Err(WaveletError::Cancelled);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Forward,
    Reverse,
}

/// Computes the full packet decomposition of `signal` to `config.levels()`
/// levels.
///
/// The result has the signal length; after the last level it holds
/// `2^levels` packets of `N / 2^levels` coefficients.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`WaveletError::ZeroLevels`] | `config.levels() == 0` |
/// | [`WaveletError::UnsupportedLength`] | `signal.len()` is not divisible by `2^levels` |
/// | [`WaveletError::Cancelled`] | `cancel` was triggered |
#[instrument(skip(signal, bank, cancel), fields(n = signal.len()))]
pub fn packet_forward(
    signal: &Signal,
    bank: &FilterBank,
    config: &PacketConfig,
    cancel: &CancelToken,
) -> Result<Vec<f64>, WaveletError> {
    let levels = config.levels();
    run(signal.as_slice(), bank, config, cancel, Direction::Forward, 0..levels)
}

/// Inverts [`packet_forward`], deepest level first.
///
/// # Errors
///
/// Same as [`packet_forward`], plus [`WaveletError::EmptySignal`] and
/// [`WaveletError::NonFiniteData`] for invalid coefficients.
#[instrument(skip(coeffs, bank, cancel), fields(n = coeffs.len()))]
pub fn packet_reverse(
    coeffs: &[f64],
    bank: &FilterBank,
    config: &PacketConfig,
    cancel: &CancelToken,
) -> Result<Vec<f64>, WaveletError> {
    check_samples(coeffs)?;
    let levels = config.levels();
    run(coeffs, bank, config, cancel, Direction::Reverse, (0..levels).rev())
}

fn run(
    input: &[f64],
    bank: &FilterBank,
    config: &PacketConfig,
    cancel: &CancelToken,
    direction: Direction,
    order: impl Iterator<Item = usize>,
) -> Result<Vec<f64>, WaveletError> {
    config.validate()?;
    let n = input.len();
    check_divisible(n, config.levels())?;

    let kernel = TransformKernel::new(bank.clone(), config.strategy());
    let mut data = input.to_vec();
    with_pool(*config.pool(), |pool| {
        for level in order {
            cancel.check()?;
            let packet_len = n >> level;
            let packets = n / packet_len;
            let parallel = config.parallel().runs_parallel(packets, packet_len);
            if parallel {
                let pool_config = *config.pool();
                data.par_chunks_mut(packet_len).try_for_each_init(
                    || BufferPool::new(pool_config).unwrap_or_default(),
                    |worker_pool, packet| {
                        transform_packet(worker_pool, &kernel, packet, cancel, direction)
                    },
                )?;
            } else {
                data.chunks_mut(packet_len).try_for_each(|packet| {
                    transform_packet(pool, &kernel, packet, cancel, direction)
                })?;
            }
            debug!(level, packets, packet_len, parallel, ?direction, "packet level");
        }
        Ok::<(), WaveletError>(())
    })??;
    Ok(data)
}

fn transform_packet(
    pool: &BufferPool,
    kernel: &TransformKernel,
    packet: &mut [f64],
    cancel: &CancelToken,
    direction: Direction,
) -> Result<(), WaveletError> {
    cancel.check()?;
    let len = packet.len();
    let mut scratch = pool.borrow_real(len);
    match direction {
        Direction::Forward => kernel.forward_into(packet, &mut scratch[..len])?,
        Direction::Reverse => kernel.reverse_into(packet, &mut scratch[..len])?,
    }
    packet.copy_from_slice(&scratch[..len]);
    Ok(())
}

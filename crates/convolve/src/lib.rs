//! # periwave-convolve
//!
//! Periodic (circular) convolution and its adjoint.
//!
//! For a signal of length `N`, a filter of length `M` and a stride `s ≥ 1`:
//!
//! | Operator | `out[n]` |
//! |----------|----------|
//! | forward | `Σ_m signal[(n − m·s) mod N] · filter[m]` |
//! | adjoint | `Σ_m signal[(n + m·s) mod N] · filter[m]` |
//!
//! The output always has length `N`; the stride only changes which samples
//! are read. `M > N` is legal and wraps the filter around the signal.
//!
//! ## Engines
//!
//! | Engine | Cost | Notes |
//! |--------|------|-------|
//! | [`ConvolutionStrategy::Baseline`] | `O(N·M)` | modulo on every access |
//! | [`ConvolutionStrategy::Unrolled`] | `O(N·M)` | direct run unrolled by [`UNROLL`], wrapped tail by subtraction |
//! | [`fft::FftConvolver`] | `O(N log N)` | periodised filter, pooled complex scratch |
//!
//! The decimated single-offset forms ([`ConvolutionStrategy::decimated_dot`]
//! and [`ConvolutionStrategy::decimated_accumulate`]) back the single-level
//! wavelet kernel.

mod baseline;
mod error;
pub mod fft;
mod strategy;
mod unrolled;

pub use error::ConvolveError;
pub use strategy::{ConvolutionStrategy, circular_convolve, circular_convolve_adjoint};
pub use unrolled::UNROLL;

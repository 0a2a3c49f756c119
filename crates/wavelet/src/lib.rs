//! # periwave-wavelet
//!
//! Periodic wavelet transforms built on the convolution kernels of
//! `periwave-convolve` and the scratch pools of `periwave-pool`.
//!
//! ## Transform Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["Signal::new(data)?"] -->|"validate"| B["Signal"]
//!     B -->|"decompose(&signal, &bank, &config, &pool)?"| C["Pyramid"]
//!     C -->|"reconstruct(&pyramid, &bank, strategy, &pool)?"| B
//!     B -->|"Modwt::forward(&signal, &config, &pool)?"| D["ModwtCoeffs"]
//!     D -->|"Modwt::inverse(&coeffs, &config, &pool)?"| B
//!     B -->|"packet_forward(&signal, &bank, &config, &cancel)?"| E["packet coefficients"]
//!     E -->|"packet_reverse(..)?"| B
//! ```
//!
//! ## Transforms
//!
//! | Transform | Length requirement | Output |
//! |-----------|--------------------|--------|
//! | [`TransformKernel`] | `N` even | `[approx \| detail]`, length `N` |
//! | [`decompose`] | `N` divisible by `2^levels` | [`Pyramid`], `N` coefficients in total |
//! | [`Modwt`] | any `N ≥ 1`, `levels ≤ 13` | [`ModwtCoeffs`], `levels + 1` vectors of length `N` |
//! | [`packet_forward`] | `N` divisible by `2^levels` | `2^levels` packets, length `N` |
//!
//! ## Supported Filters
//!
//! | Filter | Length | Family |
//! |--------|--------|--------|
//! | [`WaveletFilter::Haar`] | 2 | Haar |
//! | [`WaveletFilter::D4`] | 4 | Daubechies |
//!
//! Any other orthogonal scaling filter can be supplied through
//! [`FilterBank::orthogonal`], and arbitrary analysis/synthesis pairs
//! through [`FilterBank::new`].
//!
//! ## Quick Start
//!
//! ```
//! use periwave_pool::BufferPool;
//! use periwave_wavelet::{DwtConfig, Signal, WaveletFilter, decompose, reconstruct};
//!
//! let pool = BufferPool::default();
//! let bank = WaveletFilter::Haar.bank();
//! let signal = Signal::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
//!
//! let config = DwtConfig::new(3);
//! let pyramid = decompose(&signal, &bank, &config, &pool).unwrap();
//! assert_eq!(pyramid.approximation().len(), 1);
//!
//! let back = reconstruct(&pyramid, &bank, config.strategy(), &pool).unwrap();
//! assert!((back[7] - 8.0).abs() < 1e-9);
//! ```

mod dwt;
mod error;
mod filter;
mod kernel;
mod modwt;
mod packet;
mod signal;

pub use dwt::{DwtConfig, Pyramid, decompose, max_dwt_level, reconstruct};
pub use error::{ErrorKind, WaveletError};
pub use filter::{FilterBank, WaveletFilter, quadrature_mirror};
pub use kernel::TransformKernel;
pub use modwt::{
    ConvolutionMethod, MAX_MODWT_LEVEL, Modwt, ModwtCoeffs, ModwtConfig, imodwt, max_modwt_level,
    modwt,
};
pub use packet::{CancelToken, PacketConfig, ParallelPolicy, packet_forward, packet_reverse};
pub use signal::Signal;

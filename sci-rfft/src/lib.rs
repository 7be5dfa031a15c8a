//! # sci-rfft
//!
//! Batched 1-D real FFTs over the last axis of N-dimensional [`ndarray`] arrays.
//!
//! A real signal of shape `[..., d]` is stored as its non-redundant half-spectrum of shape
//! `[..., d / 2 + 1, 2]`, the trailing axis holding `(re, im)` pairs. The inverse maps it back,
//! either inferring an even `d` from the bin count or taking the output shape explicitly.
//!
//! ```
//! use approx::assert_abs_diff_eq;
//! use ndarray::Array;
//! use sci_rfft::fft::{irfft1, rfft1};
//!
//! let x = Array::from_shape_fn((3, 2, 16), |(i, j, k)| ((i + j * k) as f64).sin());
//! let y = rfft1(&x)?;
//! assert_eq!(y.shape(), &[3, 2, 9, 2]);
//!
//! let back = irfft1(&y)?;
//! assert_eq!(back.shape(), x.shape());
//! for (b, x) in back.iter().zip(x.iter()) {
//!     assert_abs_diff_eq!(b, x, epsilon = 1e-5);
//! }
//! # Ok::<(), sci_rfft::Error>(())
//! ```
//!
//! The transform is delegated to `realfft` and always computed in `f32`; see
//! [`fft::Element`] for how other element types are narrowed and restored.
#![deny(missing_docs)]

pub mod fft;
pub mod kernel;

pub use ndarray;
pub use sci_rfft_core::{Error, FftError, Result};

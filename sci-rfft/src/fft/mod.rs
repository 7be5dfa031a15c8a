//! Real-input FFTs along the last axis of N-dimensional arrays.
//!
//! A signal of shape `[..., d]` maps to a half-spectrum of shape `[..., d / 2 + 1, 2]`, where the
//! trailing axis holds `(re, im)` pairs. Every leading axis is an independent batch axis.
//!
//! All transforms run in `f32` (see [`Element`]) and are staged through a host region that
//! restores the caller's element type and memory order on the way out.

mod batched;
mod kernels;
mod precision;
mod staging;
pub mod traits;

pub use batched::*;
pub use kernels::*;
pub use precision::*;
pub use sci_rfft_core::num_rs::rfft_bins;
pub use staging::Placement;

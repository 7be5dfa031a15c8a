//! Shared trait-first kernel substrate.
//!
//! Constructor validation and contiguous 1D buffer adapters used by the checked FFT kernels.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;

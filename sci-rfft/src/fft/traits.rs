//! Trait interfaces for the checked 1D transform kernels.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};

/// Forward real FFT of a single contiguous sequence.
///
/// The output is the packed half-spectrum: `len / 2 + 1` interleaved `(re, im)` pairs.
pub trait Rfft1D<T> {
    /// Transform into a caller-provided output buffer of length `2 * (len / 2 + 1)`.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Transform and allocate the packed half-spectrum.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Inverse real FFT of a single packed half-spectrum, normalized by the signal length.
pub trait Irfft1D<T> {
    /// Transform into a caller-provided output buffer of length `len`.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Transform and allocate the reconstructed signal.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

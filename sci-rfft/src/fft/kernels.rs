//! Trait-first kernel wrappers for single-sequence transforms.

use super::precision::Element;
use super::staging::host_region;
use super::traits::{Irfft1D, Rfft1D};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use ndarray::{Array3, ArrayView1, Ix1, Ix2, Ix3};
use sci_rfft_core::num_rs::{rfft_bins, rfft_c2r_owned, rfft_r2c};

/// Constructor config for [`RfftKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfftConfig {
    /// Number of real samples per transform.
    pub len: usize,
}

/// Checked forward real FFT of one contiguous sequence.
///
/// Writes the packed half-spectrum: `len / 2 + 1` bins as interleaved `re, im` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfftKernel {
    len: usize,
}

impl RfftKernel {
    /// Configured signal length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Length of the packed output, `2 * (len / 2 + 1)`.
    pub fn spectrum_len(&self) -> usize {
        2 * rfft_bins(self.len)
    }

    fn transform<T: Element>(&self, input: &[T]) -> Result<Vec<T>, ExecInvariantViolation> {
        if input.len() != self.len {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "input",
                expected: self.len,
                got: input.len(),
            });
        }
        let bins = rfft_bins(self.len);
        let spectrum = host_region(
            &ArrayView1::from(input),
            Ix2(1, self.len),
            Ix1(2 * bins),
            |signal| {
                let mut spectrum = Array3::<f32>::zeros((1, bins, 2));
                rfft_r2c(signal, spectrum.view_mut())?;
                Ok(spectrum)
            },
        )
        .map_err(ExecInvariantViolation::Primitive)?;
        Ok(spectrum.to_vec())
    }
}

impl KernelLifecycle for RfftKernel {
    type Config = RfftConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "signal length must be > 0",
            });
        }
        Ok(Self { len: config.len })
    }
}

impl<T> Rfft1D<T> for RfftKernel
where
    T: Element,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != self.spectrum_len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: self.spectrum_len(),
                got: out_slice.len(),
            });
        }
        let spectrum = self.transform(input)?;
        out_slice.copy_from_slice(&spectrum);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.transform(input)
    }
}

/// Constructor config for [`IrfftKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrfftConfig {
    /// Number of real samples to reconstruct.
    pub len: usize,
}

/// Checked inverse real FFT of one packed half-spectrum, normalized by `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrfftKernel {
    len: usize,
}

impl IrfftKernel {
    /// Configured signal length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Length of the packed input, `2 * (len / 2 + 1)`.
    pub fn spectrum_len(&self) -> usize {
        2 * rfft_bins(self.len)
    }

    fn transform<T: Element>(&self, input: &[T]) -> Result<Vec<T>, ExecInvariantViolation> {
        if input.len() != self.spectrum_len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "input",
                expected: self.spectrum_len(),
                got: input.len(),
            });
        }
        let len = self.len;
        let signal = host_region(
            &ArrayView1::from(input),
            Ix3(1, rfft_bins(len), 2),
            Ix1(len),
            |spectrum| {
                let mut signal = rfft_c2r_owned(spectrum, len)?;
                let scale = len as f32;
                signal.mapv_inplace(|v| v / scale);
                Ok(signal)
            },
        )
        .map_err(ExecInvariantViolation::Primitive)?;
        Ok(signal.to_vec())
    }
}

impl KernelLifecycle for IrfftKernel {
    type Config = IrfftConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "signal length must be > 0",
            });
        }
        Ok(Self { len: config.len })
    }
}

impl<T> Irfft1D<T> for IrfftKernel
where
    T: Element,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != self.len {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: self.len,
                got: out_slice.len(),
            });
        }
        let signal = self.transform(input)?;
        out_slice.copy_from_slice(&signal);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.transform(input)
    }
}

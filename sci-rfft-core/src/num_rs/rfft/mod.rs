mod realfft_binds;

use crate::{Error, FftError, Result};
use ndarray::{
    Array2, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, ErrorKind, ShapeError,
};
use realfft_binds::{ForwardRows, InverseRows};
use tracing::debug;

/// Number of non-redundant bins in the real FFT of a length `len` sequence, `len / 2 + 1`.
#[inline]
pub const fn rfft_bins(len: usize) -> usize {
    len / 2 + 1
}

/// Batched real-to-complex FFT over the rows of `input`.
///
/// Returns the discrete Fourier transform of each length `d` row of a `[n, d]` buffer, keeping
/// only the `d / 2 + 1` non-negative frequency bins. Bin `0` is the DC term and, for even `d`,
/// bin `d / 2` is the Nyquist term.
///
/// # Parameters
/// * `input` : `[n, d]`
///   Real rows to transform. Need not be contiguous.
/// * `output` : `[n, d / 2 + 1, 2]`
///   Destination for `(re, im)` pairs. The transform is unnormalized.
///
/// # Errors
/// [Error::InvalidArg] when `d == 0` or `output` has the wrong shape, and [Error::Fft] for any
/// failure reported by the underlying plan.
///
/// # Examples
/// ```
/// use ndarray::{array, Array3};
/// use sci_rfft_core::num_rs::rfft_r2c;
///
/// let x = array![[1.0f32, 1.0, 1.0, 1.0]];
/// let mut y = Array3::<f32>::zeros((1, 3, 2));
/// rfft_r2c(x.view(), y.view_mut()).unwrap();
/// assert_eq!(y[[0, 0, 0]], 4.0);
/// assert!(y[[0, 1, 0]].abs() < 1e-6 && y[[0, 2, 0]].abs() < 1e-6);
/// ```
pub fn rfft_r2c(input: ArrayView2<'_, f32>, mut output: ArrayViewMut3<'_, f32>) -> Result<()> {
    let (batch, len) = input.dim();
    if len == 0 {
        return Err(Error::InvalidArg {
            arg: "input".into(),
            reason: "transform length must be at least 1.".into(),
        });
    }
    let bins = rfft_bins(len);
    if output.dim() != (batch, bins, 2) {
        return Err(Error::InvalidArg {
            arg: "output".into(),
            reason: format!(
                "expected shape [{batch}, {bins}, 2], got {:?}.",
                output.shape()
            ),
        });
    }

    debug!(batch, len, bins, "rfft r2c");
    if batch == 0 {
        return Ok(());
    }
    let mut rows = ForwardRows::plan(len);
    for (row, out_row) in input.outer_iter().zip(output.outer_iter_mut()) {
        rows.process(row, out_row)?;
    }
    Ok(())
}

/// Batched complex-to-real FFT of `[n, f, 2]` half-spectra into `[n, d]` rows.
///
/// The output is unnormalized: a forward transform followed by this one scales every sample by
/// `d`. The caller picks `d` through the shape of `output`; `f` must equal `d / 2 + 1`, and
/// anything else is reported as the same [FftError::InputBuffer] the plan itself raises.
///
/// Non-zero imaginary parts at DC (and Nyquist, for even `d`) cannot be represented by a real
/// signal. They are ignored and reported through a `warn` event rather than as an error.
///
/// # Errors
/// [Error::InvalidArg] when the trailing axis of `input` is not 2, the batch sizes differ or
/// `d == 0`. [Error::Fft] when `f` does not match `d`.
///
/// # Examples
/// ```
/// use ndarray::{array, Array2};
/// use sci_rfft_core::num_rs::rfft_c2r;
///
/// let y = array![[[4.0f32, 0.0], [0.0, 0.0], [0.0, 0.0]]];
/// let mut x = Array2::<f32>::zeros((1, 4));
/// rfft_c2r(y.view(), x.view_mut()).unwrap();
/// assert!(x.iter().all(|v| (v - 4.0).abs() < 1e-6));
/// ```
pub fn rfft_c2r(input: ArrayView3<'_, f32>, mut output: ArrayViewMut2<'_, f32>) -> Result<()> {
    let (batch, bins, parts) = input.dim();
    let (out_batch, len) = output.dim();
    if out_batch != batch {
        return Err(Error::InvalidArg {
            arg: "output".into(),
            reason: format!("batch size {out_batch} does not match input batch size {batch}."),
        });
    }
    check_c2r(bins, parts, len)?;

    debug!(batch, len, bins, "rfft c2r");
    if batch == 0 {
        return Ok(());
    }
    let mut rows = InverseRows::plan(len, bins);
    for (row, out_row) in input.outer_iter().zip(output.outer_iter_mut()) {
        rows.process(row, out_row)?;
    }
    Ok(())
}

/// Batched complex-to-real FFT of `[n, f, 2]` half-spectra into a freshly allocated `[n, len]`.
///
/// Same semantics as [`rfft_c2r`], but `input` is validated against `len` before the output is
/// allocated, so an oversized `len` comes back as an error instead of an allocation failure.
///
/// # Errors
/// Everything [`rfft_c2r`] reports, plus [Error::Shape] when `[n, len]` cannot be allocated.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use sci_rfft_core::num_rs::rfft_c2r_owned;
///
/// let y = array![[[6.0f32, 0.0], [0.0, 0.0]]];
/// let x = rfft_c2r_owned(y.view(), 3).unwrap();
/// assert_eq!(x.dim(), (1, 3));
/// assert!(x.iter().all(|v| (v - 6.0).abs() < 1e-5));
///
/// assert!(rfft_c2r_owned(y.view(), usize::MAX / 2).is_err());
/// ```
pub fn rfft_c2r_owned(input: ArrayView3<'_, f32>, len: usize) -> Result<Array2<f32>> {
    let (batch, bins, parts) = input.dim();
    check_c2r(bins, parts, len)?;
    let fits = batch
        .checked_mul(len)
        .is_some_and(|n| n <= isize::MAX as usize / core::mem::size_of::<f32>());
    if !fits {
        return Err(ShapeError::from_kind(ErrorKind::Overflow).into());
    }
    let mut output = Array2::<f32>::zeros((batch, len));
    rfft_c2r(input, output.view_mut())?;
    Ok(output)
}

// Rejects what the plan would reject, before anything of size `len` is allocated.
fn check_c2r(bins: usize, parts: usize, len: usize) -> Result<()> {
    if parts != 2 {
        return Err(Error::InvalidArg {
            arg: "input".into(),
            reason: format!("trailing axis must hold (re, im) pairs, got length {parts}."),
        });
    }
    if len == 0 {
        return Err(Error::InvalidArg {
            arg: "output".into(),
            reason: "transform length must be at least 1.".into(),
        });
    }
    let expected = rfft_bins(len);
    if bins != expected {
        return Err(FftError::InputBuffer(expected, bins).into());
    }
    Ok(())
}

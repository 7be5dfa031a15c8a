use super::precision::Element;
use super::staging::host_region;
use ndarray::{Array, Array3, ArrayBase, ArrayD, Data, Dimension, IntoDimension, Ix2, Ix3, IxDyn};
use sci_rfft_core::num_rs::{rfft_bins, rfft_c2r_owned, rfft_r2c};
use sci_rfft_core::{Error, Result};

/// Signal length assumed by [`irfft1`] for a half-spectrum of `bins` bins, `(bins - 1) * 2`.
///
/// Returns `None` when `bins == 0`. The result is always even: an odd-length signal cannot be
/// recovered from its bin count alone, use [`irfft1_to_shape`] for those.
#[inline]
pub const fn inferred_signal_len(bins: usize) -> Option<usize> {
    match bins.checked_sub(1) {
        Some(b) => Some(b * 2),
        None => None,
    }
}

/// Real FFT along the last axis of `x`.
///
/// Each length `d` lane along the last axis is transformed independently. Leading axes are
/// flattened into one batch axis for the primitive and restored afterwards, so an input of
/// shape `[..., d]` produces `[..., d / 2 + 1, 2]` where the trailing axis holds `(re, im)`.
/// Bin `0` is the DC term; for even `d` bin `d / 2` is the Nyquist term.
///
/// The transform is unnormalized and computed in `f32` whatever the element type; the result is
/// converted back to `T`. Column-major inputs yield column-major outputs.
///
/// # Parameters
/// * `x` : N-dimensional input, `N >= 1`.
///
/// # Returns
/// * Half-spectrum with one more axis than `x`.
///
/// # Errors
/// * [Error::InvalidArg] if `x` is 0-dimensional, or if `d == 0` (raised by the primitive).
///
/// # Examples
/// ```
/// use approx::assert_abs_diff_eq;
/// use ndarray::array;
/// use sci_rfft::fft::rfft1;
///
/// let x = array![[1.0f64, 2.0, 3.0, 4.0], [2.0, 2.0, 2.0, 2.0]];
/// let y = rfft1(&x).unwrap();
/// assert_eq!(y.shape(), &[2, 3, 2]);
///
/// // DC, first harmonic and Nyquist of the first row.
/// assert_abs_diff_eq!(y[[0, 0, 0]], 10.0, epsilon = 1e-5);
/// assert_abs_diff_eq!(y[[0, 1, 0]], -2.0, epsilon = 1e-5);
/// assert_abs_diff_eq!(y[[0, 1, 1]], 2.0, epsilon = 1e-5);
/// assert_abs_diff_eq!(y[[0, 2, 0]], -2.0, epsilon = 1e-5);
///
/// // A constant row only has a DC term.
/// assert_abs_diff_eq!(y[[1, 0, 0]], 8.0, epsilon = 1e-5);
/// assert_abs_diff_eq!(y[[1, 1, 0]], 0.0, epsilon = 1e-5);
/// ```
pub fn rfft1<T, S, D>(x: &ArrayBase<S, D>) -> Result<Array<T, D::Larger>>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
{
    let Some((&len, outer)) = x.shape().split_last() else {
        return Err(Error::InvalidArg {
            arg: "x".into(),
            reason: "Real FFT requires at least 1-dimensional `x`.".into(),
        });
    };
    let rows = outer.iter().product::<usize>();
    let bins = rfft_bins(len);

    let mut output_dim = D::Larger::zeros(outer.len() + 2);
    {
        let dims = output_dim.slice_mut();
        dims[..outer.len()].copy_from_slice(outer);
        dims[outer.len()] = bins;
        dims[outer.len() + 1] = 2;
    }

    host_region(x, Ix2(rows, len), output_dim, |signal| {
        let mut spectrum = Array3::<f32>::zeros((rows, bins, 2));
        rfft_r2c(signal, spectrum.view_mut())?;
        Ok(spectrum)
    })
}

/// Inverse real FFT along the last two axes of `y`, inferring the signal length.
///
/// `y` has shape `[..., f, 2]` and the output has shape `[..., (f - 1) * 2]`. Samples are
/// divided by the signal length, so `irfft1(&rfft1(&x)?)` reproduces `x` up to `f32` accuracy
/// whenever the last axis of `x` is even.
///
/// The inferred length is always even. For a spectrum of an odd-length signal this silently
/// reconstructs a signal one sample shorter with the wrong values; pass the true shape to
/// [`irfft1_to_shape`] instead.
///
/// Non-zero imaginary parts at DC and Nyquist are ignored.
///
/// # Errors
/// * [Error::InvalidArg] if `y` has fewer than two axes, if `f == 0`, or if the trailing axis is
///   not of length 2.
///
/// # Examples
/// ```
/// use approx::assert_abs_diff_eq;
/// use ndarray::array;
/// use sci_rfft::fft::{irfft1, rfft1};
///
/// let x = array![0.5f32, -1.0, 2.0, 0.0, 1.5, 3.0];
/// let back = irfft1(&rfft1(&x).unwrap()).unwrap();
/// assert_eq!(back.len(), 6);
/// for (b, x) in back.iter().zip(x.iter()) {
///     assert_abs_diff_eq!(b, x, epsilon = 1e-5);
/// }
/// ```
pub fn irfft1<T, S, D>(y: &ArrayBase<S, D>) -> Result<Array<T, D::Smaller>>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
{
    let shape = y.shape();
    let ndim = shape.len();
    if ndim < 2 {
        return Err(spectrum_rank_error());
    }
    let bins = shape[ndim - 2];
    let len = inferred_signal_len(bins).ok_or_else(|| Error::InvalidArg {
        arg: "y".into(),
        reason: "Cannot infer a signal length from a spectrum without frequency bins.".into(),
    })?;

    let mut output_dim = D::Smaller::zeros(ndim - 1);
    {
        let dims = output_dim.slice_mut();
        dims[..ndim - 2].copy_from_slice(&shape[..ndim - 2]);
        dims[ndim - 2] = len;
    }

    inverse(y, len, output_dim)
}

/// Inverse real FFT along the last two axes of `y` into an explicit output shape.
///
/// The last entry of `size` is the signal length `d`; `size` itself is the shape of the result.
/// The batch axes of `size` may differ from those of `y` as long as they hold the same number
/// of lanes. Samples are divided by `d`.
///
/// `y` is expected to hold `d / 2 + 1` bins per lane. This is not checked here; the FFT
/// primitive reports the mismatch as [Error::Fft] before the output is allocated.
///
/// An empty `size` is an error here, whereas [`RealFft1d::inverse`] treats it like no size.
///
/// # Errors
/// * [Error::InvalidArg] if `y` has fewer than two axes, `size` has no axes, `d == 0`, or the
///   trailing axis of `y` is not of length 2.
/// * [Error::Fft] if the bin count does not match `d`.
/// * [Error::Shape] if `size` does not hold the same number of lanes as `y`.
///
/// # Examples
/// ```
/// use approx::assert_abs_diff_eq;
/// use ndarray::Array;
/// use sci_rfft::fft::{irfft1_to_shape, rfft1};
///
/// let x = Array::from_shape_fn((2, 3, 7), |(i, j, k)| (i * 21 + j * 7 + k) as f64 / 10.0);
/// let y = rfft1(&x).unwrap();
/// assert_eq!(y.shape(), &[2, 3, 4, 2]);
///
/// // Odd lengths need the explicit shape; the batch axes can be regrouped too.
/// let back = irfft1_to_shape(&y, (6, 7)).unwrap();
/// let flat = x.into_shape_with_order((6, 7)).unwrap();
/// for (b, x) in back.iter().zip(flat.iter()) {
///     assert_abs_diff_eq!(b, x, epsilon = 1e-5);
/// }
/// ```
pub fn irfft1_to_shape<T, S, D, Sh>(y: &ArrayBase<S, D>, size: Sh) -> Result<Array<T, Sh::Dim>>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
    Sh: IntoDimension,
{
    let output_dim = size.into_dimension();
    let Some(&len) = output_dim.slice().last() else {
        return Err(Error::InvalidArg {
            arg: "size".into(),
            reason: "Output shape must have at least one axis.".into(),
        });
    };
    inverse(y, len, output_dim)
}

fn inverse<T, S, D, E>(y: &ArrayBase<S, D>, len: usize, output_dim: E) -> Result<Array<T, E>>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
    E: Dimension,
{
    let shape = y.shape();
    let ndim = shape.len();
    if ndim < 2 {
        return Err(spectrum_rank_error());
    }
    let rows = shape[..ndim - 2].iter().product::<usize>();
    let staged_dim = Ix3(rows, shape[ndim - 2], shape[ndim - 1]);

    host_region(y, staged_dim, output_dim, |spectrum| {
        let mut signal = rfft_c2r_owned(spectrum, len)?;
        let scale = len as f32;
        signal.mapv_inplace(|v| v / scale);
        Ok(signal)
    })
}

fn spectrum_rank_error() -> Error {
    Error::InvalidArg {
        arg: "y".into(),
        reason: "Inverse real FFT requires a `[..., bins, 2]` spectrum with at least 2 axes."
            .into(),
    }
}

/// Batched 1D real FFT pair over the last axis of dynamically shaped arrays.
///
/// A thin, stateless front end over [`rfft1`], [`irfft1`] and [`irfft1_to_shape`] for callers
/// that carry the optional inverse shape around at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealFft1d;

impl RealFft1d {
    /// Forward transform, see [`rfft1`].
    pub fn forward<T, S, D>(&self, x: &ArrayBase<S, D>) -> Result<ArrayD<T>>
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
    {
        rfft1(x).map(|y| y.into_dyn())
    }

    /// Inverse transform. With a non-empty `size` the output takes exactly that shape and the
    /// signal length is its last entry. Without one, or with an empty one, the length is inferred
    /// as `(bins - 1) * 2`.
    pub fn inverse<T, S, D>(
        &self,
        y: &ArrayBase<S, D>,
        size: Option<&[usize]>,
    ) -> Result<ArrayD<T>>
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
    {
        match size {
            Some(size) if !size.is_empty() => irfft1_to_shape(y, IxDyn(size)),
            _ => irfft1(y).map(|x| x.into_dyn()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s, Array1, Array2, ArrayView1, Axis, ShapeBuilder};
    use rand::Rng;
    use rustfft::num_complex::Complex;
    use rustfft::FftPlanner;

    fn random_signal(shape: &[usize]) -> ArrayD<f64> {
        let mut rng = rand::rng();
        Array::from_shape_simple_fn(IxDyn(shape), || rng.random_range(-1.0..1.0))
    }

    fn reference_spectrum(x: ArrayView1<'_, f64>) -> Vec<Complex<f64>> {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(x.len());
        let mut buf = x.iter().map(|&v| Complex::new(v, 0.0)).collect::<Vec<_>>();
        fft.process(&mut buf);
        buf.truncate(rfft_bins(x.len()));
        buf
    }

    #[test]
    fn forward_shape_law() {
        let outers: [&[usize]; 4] = [&[], &[3], &[2, 4], &[2, 0, 3]];
        for outer in outers {
            for len in 1..=9 {
                let mut shape = outer.to_vec();
                shape.push(len);
                let y = rfft1(&random_signal(&shape)).expect("forward should succeed");

                let mut expected = outer.to_vec();
                expected.extend([len / 2 + 1, 2]);
                assert_eq!(y.shape(), expected.as_slice());
            }
        }
    }

    #[test]
    fn forward_static_dimensions() {
        let x = Array1::<f32>::zeros(10);
        let y: Array<f32, Ix2> = rfft1(&x).expect("1D forward");
        assert_eq!(y.dim(), (6, 2));

        let x = Array3::<f64>::zeros((2, 3, 5));
        let y: Array<f64, ndarray::Ix4> = rfft1(&x).expect("3D forward");
        assert_eq!(y.dim(), (2, 3, 3, 2));

        let back: Array3<f64> = irfft1(&y).expect("4D inverse");
        assert_eq!(back.dim(), (2, 3, 4));
    }

    #[test]
    fn forward_matches_full_complex_fft() {
        for len in [1usize, 2, 7, 16, 33, 64] {
            let x = random_signal(&[3, len]);
            let y = rfft1(&x).expect("forward should succeed");
            for (row, spectrum) in x.outer_iter().zip(y.outer_iter()) {
                let row = row.into_dimensionality::<ndarray::Ix1>().expect("1D row");
                let reference = reference_spectrum(row);
                for (k, bin) in reference.iter().enumerate() {
                    assert_abs_diff_eq!(spectrum[[k, 0]], bin.re, epsilon = 1e-4);
                    assert_abs_diff_eq!(spectrum[[k, 1]], bin.im, epsilon = 1e-4);
                }
            }
        }
    }

    #[test]
    fn round_trip_even_lengths() {
        for len in [2usize, 4, 10, 64, 128] {
            let x = random_signal(&[2, 3, len]);
            let back = irfft1(&rfft1(&x).expect("forward")).expect("inverse");
            assert_eq!(back.shape(), x.shape());
            for (b, x) in back.iter().zip(x.iter()) {
                assert_abs_diff_eq!(b, x, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn round_trip_with_explicit_size() {
        for len in [1usize, 3, 9, 31] {
            let x = random_signal(&[4, len]);
            let back = irfft1_to_shape(&rfft1(&x).expect("forward"), IxDyn(&[4, len]))
                .expect("inverse");
            for (b, x) in back.iter().zip(x.iter()) {
                assert_abs_diff_eq!(b, x, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn explicit_size_regroups_batch_axes() {
        let y = Array::<f32, _>::zeros((6, 5, 2));
        let back = irfft1_to_shape(&y, (2, 3, 8)).expect("6 lanes fit [2, 3]");
        assert_eq!(back.dim(), (2, 3, 8));

        let back = irfft1_to_shape(&y, [3, 2, 1, 8]).expect("6 lanes fit [3, 2, 1]");
        assert_eq!(back.shape(), &[3, 2, 1, 8]);

        let err = irfft1_to_shape(&y, (4, 8)).expect_err("6 lanes do not fit 4");
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn batch_independence() {
        let x = random_signal(&[2, 3, 16]);
        let batched = rfft1(&x).expect("batched forward");
        for i in 0..2 {
            for j in 0..3 {
                let lane = x.slice(s![i, j, ..]);
                let single = rfft1(&lane).expect("single lane forward");
                assert_eq!(batched.slice(s![i, j, .., ..]), single);
            }
        }
    }

    #[test]
    fn constant_signal_has_only_dc() {
        let c = 2.5f64;
        for len in [1usize, 6, 9] {
            let x = Array1::from_elem(len, c);
            let y = rfft1(&x).expect("forward");
            assert_abs_diff_eq!(y[[0, 0]], c * len as f64, epsilon = 1e-5);
            assert_abs_diff_eq!(y[[0, 1]], 0.0, epsilon = 1e-5);
            for bin in y.axis_iter(Axis(0)).skip(1) {
                assert_abs_diff_eq!(bin[0], 0.0, epsilon = 1e-5);
                assert_abs_diff_eq!(bin[1], 0.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn nyquist_of_alternating_signal() {
        let x = array![1.0f64, -1.0, 1.0, -1.0, 1.0, -1.0];
        let y = rfft1(&x).expect("forward");
        assert_abs_diff_eq!(y[[3, 0]], 6.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y[[3, 1]], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y[[0, 0]], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn element_type_is_restored() {
        let x = array![[0.1f64, 0.2, 0.3, 0.4]];
        let y: Array3<f64> = rfft1(&x).expect("forward");
        // Computed in f32, so every value is exactly representable as f32.
        assert!(y.iter().all(|v| *v == (*v as f32) as f64));

        let back: Array2<f64> = irfft1(&y).expect("inverse");
        assert!(back.iter().all(|v| *v == (*v as f32) as f64));
        for (b, x) in back.iter().zip(x.iter()) {
            assert_abs_diff_eq!(b, x, epsilon = 1e-6);
        }
    }

    #[test]
    fn integer_signals_truncate() {
        let x = array![1i32, 2, 3, 4];
        let y: Array2<i32> = rfft1(&x).expect("forward");
        assert_eq!(y.dim(), (3, 2));
        assert_eq!(y[[0, 0]], 10);
        assert_eq!(y[[0, 1]], 0);
    }

    #[test]
    fn odd_length_without_size_is_lossy() {
        let x = array![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = rfft1(&x).expect("forward");
        assert_eq!(y.dim(), (4, 2));

        // Four bins are read back as a 6-sample signal, not the original 7.
        let inferred = irfft1(&y).expect("inverse");
        assert_eq!(inferred.len(), 6);
        let max_err = inferred
            .iter()
            .zip(x.iter())
            .map(|(b, x)| (b - x).abs())
            .fold(0.0, f64::max);
        assert!(max_err > 1e-3, "expected a visible reconstruction error, got {max_err}");

        let exact = irfft1_to_shape(&y, 7).expect("inverse with size");
        for (b, x) in exact.iter().zip(x.iter()) {
            assert_abs_diff_eq!(b, x, epsilon = 1e-5);
        }
    }

    #[test]
    fn column_major_inputs_keep_their_order() {
        let x = random_signal(&[4, 16]);
        let x = x.into_dimensionality::<Ix2>().expect("2D");
        let mut fortran = Array2::<f64>::zeros((4, 16).f());
        fortran.assign(&x);

        let y_c = rfft1(&x).expect("row-major forward");
        let y_f = rfft1(&fortran).expect("column-major forward");
        assert_eq!(y_c, y_f);
        assert!(y_c.is_standard_layout());
        assert!(y_f.t().is_standard_layout());

        let back = irfft1(&y_f).expect("column-major inverse");
        assert!(back.t().is_standard_layout());
        for (b, x) in back.iter().zip(x.iter()) {
            assert_abs_diff_eq!(b, x, epsilon = 1e-5);
        }
    }

    #[test]
    fn strided_views_are_staged() {
        let x = random_signal(&[3, 32]);
        let every_other = x.slice(s![.., ..;2]);
        let y = rfft1(&every_other).expect("strided forward");
        let y_owned = rfft1(&every_other.to_owned()).expect("owned forward");
        assert_eq!(y, y_owned);
    }

    #[test]
    fn rank_and_length_errors() {
        let scalar = ndarray::arr0(1.0f32);
        assert!(matches!(rfft1(&scalar), Err(Error::InvalidArg { .. })));

        let empty = Array2::<f32>::zeros((3, 0));
        assert!(matches!(rfft1(&empty), Err(Error::InvalidArg { .. })));

        let flat = Array1::<f32>::zeros(4);
        assert!(matches!(irfft1(&flat), Err(Error::InvalidArg { .. })));

        let no_bins = Array3::<f32>::zeros((2, 0, 2));
        assert!(matches!(irfft1(&no_bins), Err(Error::InvalidArg { .. })));

        let not_pairs = Array3::<f32>::zeros((2, 3, 3));
        assert!(matches!(irfft1(&not_pairs), Err(Error::InvalidArg { .. })));

        let y = Array3::<f32>::zeros((2, 3, 2));
        assert!(matches!(
            irfft1_to_shape(&y, IxDyn(&[])),
            Err(Error::InvalidArg { .. })
        ));
    }

    #[test]
    fn bin_mismatch_is_reported_by_the_primitive() {
        let y = Array3::<f32>::zeros((2, 5, 2));
        let err = irfft1_to_shape(&y, (2, 4)).expect_err("4 samples need 3 bins");
        assert!(matches!(err, Error::Fft(_)));
    }

    #[test]
    fn oversized_explicit_length_is_an_error() {
        let y = Array3::<f32>::zeros((1, 3, 2));
        let err = irfft1_to_shape(&y, (1, usize::MAX / 2)).expect_err("3 bins cannot fill it");
        assert!(matches!(err, Error::Fft(crate::FftError::InputBuffer(_, 3))));

        let err = RealFft1d
            .inverse(&y, Some(&[usize::MAX / 2]))
            .expect_err("3 bins cannot fill it");
        assert!(matches!(err, Error::Fft(_)));
    }

    #[test]
    fn component_front_end() {
        let fft = RealFft1d;
        let x = random_signal(&[5, 12]);
        let y = fft.forward(&x).expect("forward");
        assert_eq!(y.shape(), &[5, 7, 2]);

        let back = fft.inverse(&y, None).expect("inferred inverse");
        assert_eq!(back.shape(), &[5, 12]);
        let empty = fft.inverse(&y, Some(&[])).expect("empty size infers the length");
        assert_eq!(empty, back);

        let regrouped = fft.inverse(&y, Some(&[60])).expect_err("60 samples need 31 bins");
        assert!(matches!(regrouped, Error::Fft(_)));

        let back = fft.inverse(&y, Some(&[5, 1, 12])).expect("explicit inverse");
        assert_eq!(back.shape(), &[5, 1, 12]);
        for (b, x) in back.iter().zip(x.iter()) {
            assert_abs_diff_eq!(b, x, epsilon = 1e-5);
        }
    }

    #[test]
    fn inferred_lengths() {
        assert_eq!(inferred_signal_len(0), None);
        assert_eq!(inferred_signal_len(1), Some(0));
        assert_eq!(inferred_signal_len(5), Some(8));
        assert_eq!(inferred_signal_len(rfft_bins(9)), Some(8));
    }
}

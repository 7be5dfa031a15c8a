//! Host compute region shared by every transform entry point.
//!
//! The primitive needs densely packed row-major `f32` buffers. A region narrows the caller's
//! array into such a buffer, runs the computation, reshapes the result, restores the element
//! type and finally hands it back in the caller's memory order. Staging buffers are owned by the
//! region and dropped on every exit path; the caller's array is never written to.

use super::precision::{restore_array, Element};
use ndarray::{Array, ArrayBase, ArrayView, Data, Dimension, ShapeBuilder};
use sci_rfft_core::Result;
use tracing::trace;

/// Memory order of an input array, reapplied to the transform output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// C order. Also used for 0/1-dimensional and non-contiguous inputs.
    RowMajor,
    /// Fortran order.
    ColumnMajor,
}

impl Placement {
    /// Classify the memory order of `a`.
    pub fn of<S, D>(a: &ArrayBase<S, D>) -> Self
    where
        S: Data,
        D: Dimension,
    {
        if a.ndim() > 1 && !a.is_standard_layout() && a.t().is_standard_layout() {
            Placement::ColumnMajor
        } else {
            Placement::RowMajor
        }
    }

    fn apply<T, D>(self, a: Array<T, D>) -> Array<T, D>
    where
        T: Element,
        D: Dimension,
    {
        match self {
            Placement::RowMajor => a,
            Placement::ColumnMajor => {
                let mut placed = Array::zeros(a.raw_dim().f());
                placed.assign(&a);
                placed
            }
        }
    }
}

/// Run `compute` on a narrowed, row-major copy of `input` viewed as `staged_dim`.
///
/// The computed buffer is reshaped (row-major) into `output_dim`, restored to `T` and placed in
/// the memory order of `input`. `staged_dim` and `output_dim` must hold exactly as many
/// elements as `input` and the computed buffer respectively, otherwise a shape error is
/// returned.
pub(crate) fn host_region<T, S, D, I, O, E, F>(
    input: &ArrayBase<S, D>,
    staged_dim: I,
    output_dim: E,
    compute: F,
) -> Result<Array<T, E>>
where
    T: Element,
    S: Data<Elem = T>,
    D: Dimension,
    I: Dimension,
    O: Dimension,
    E: Dimension,
    F: FnOnce(ArrayView<'_, f32, I>) -> Result<Array<f32, O>>,
{
    let placement = Placement::of(input);
    trace!(
        ?placement,
        input = ?input.shape(),
        staged = ?staged_dim.slice(),
        "entering host region"
    );

    let staged: Array<f32, I> =
        Array::from_shape_vec(staged_dim, input.iter().map(|v| v.narrow()).collect())?;
    let computed = compute(staged.view())?;
    let shaped = computed.into_shape_with_order(output_dim)?;
    trace!(output = ?shaped.shape(), "leaving host region");
    Ok(placement.apply(restore_array(shaped)))
}

//! Row-at-a-time adapters over [`realfft`] plans.

use crate::Result;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, FftError, RealFftPlanner, RealToComplex};
use std::sync::Arc;
use tracing::warn;

/// Planned real-to-complex transform with buffers reused across rows.
pub(super) struct ForwardRows {
    plan: Arc<dyn RealToComplex<f32>>,
    signal: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl ForwardRows {
    /// `len` must be non-zero.
    pub(super) fn plan(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(len);
        Self {
            signal: plan.make_input_vec(),
            spectrum: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            plan,
        }
    }

    /// Transform one row and write `(re, im)` pairs into `out` (`[bins, 2]`).
    pub(super) fn process(
        &mut self,
        row: ArrayView1<'_, f32>,
        mut out: ArrayViewMut2<'_, f32>,
    ) -> Result<()> {
        // The plan uses its input buffer as scratch, so every row is copied in.
        for (dst, src) in self.signal.iter_mut().zip(row.iter()) {
            *dst = *src;
        }
        self.plan
            .process_with_scratch(&mut self.signal, &mut self.spectrum, &mut self.scratch)?;
        for (mut pair, bin) in out.outer_iter_mut().zip(self.spectrum.iter()) {
            pair[0] = bin.re;
            pair[1] = bin.im;
        }
        Ok(())
    }
}

/// Planned complex-to-real transform with buffers reused across rows.
pub(super) struct InverseRows {
    plan: Arc<dyn ComplexToReal<f32>>,
    spectrum: Vec<Complex<f32>>,
    signal: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl InverseRows {
    /// `len` must be non-zero. `bins` is the number of bins actually supplied per row; the plan
    /// reports a mismatch against `len / 2 + 1` itself.
    pub(super) fn plan(len: usize, bins: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_inverse(len);
        Self {
            spectrum: vec![Complex::new(0.0, 0.0); bins],
            signal: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            plan,
        }
    }

    /// Transform one `[bins, 2]` row into `out` without normalization.
    pub(super) fn process(
        &mut self,
        row: ArrayView2<'_, f32>,
        mut out: ArrayViewMut1<'_, f32>,
    ) -> Result<()> {
        for (dst, pair) in self.spectrum.iter_mut().zip(row.outer_iter()) {
            *dst = Complex::new(pair[0], pair[1]);
        }
        match self
            .plan
            .process_with_scratch(&mut self.spectrum, &mut self.signal, &mut self.scratch)
        {
            Ok(()) => {}
            // The transform still ran with the offending imaginary parts treated as zero.
            Err(FftError::InputValues(first, last)) => {
                warn!(
                    dc = first,
                    nyquist = last,
                    "ignoring non-zero imaginary part in half-spectrum"
                );
            }
            Err(err) => return Err(err.into()),
        }
        for (dst, src) in out.iter_mut().zip(self.signal.iter()) {
            *dst = *src;
        }
        Ok(())
    }
}

use ndarray::{Array, Dimension};
use num_traits::{AsPrimitive, Zero};

/// Element types accepted by the transforms.
///
/// The real-FFT primitive only computes in `f32`. Every element is narrowed with
/// [`Element::narrow`] on the way in and rebuilt with [`Element::restore`] on the way out, so an
/// `f64` signal comes back as `f64` carrying `f32` accuracy. Integer types truncate toward zero
/// on restore and saturate at their bounds.
///
/// Implemented for every primitive numeric type.
pub trait Element: Copy + Zero + 'static {
    /// Convert into the compute precision.
    fn narrow(self) -> f32;

    /// Convert a computed value back into the caller's type.
    fn restore(value: f32) -> Self;
}

impl<T> Element for T
where
    T: Copy + Zero + 'static + AsPrimitive<f32>,
    f32: AsPrimitive<T>,
{
    #[inline]
    fn narrow(self) -> f32 {
        self.as_()
    }

    #[inline]
    fn restore(value: f32) -> Self {
        value.as_()
    }
}

/// Rebuild a computed array in the caller's element type.
pub fn restore_array<T, D>(computed: Array<f32, D>) -> Array<T, D>
where
    T: Element,
    D: Dimension,
{
    computed.mapv(T::restore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn f64_round_trips_through_f32() {
        let x = 0.1f64;
        let back = f64::restore(x.narrow());
        assert_ne!(back, x);
        assert_eq!(back, 0.1f32 as f64);
    }

    #[test]
    fn integers_truncate_and_saturate() {
        assert_eq!(i32::restore(2.9), 2);
        assert_eq!(i32::restore(-2.9), -2);
        assert_eq!(u8::restore(-4.0), 0);
        assert_eq!(u8::restore(1000.0), 255);
        assert_eq!(7i64.narrow(), 7.0);
    }

    #[test]
    fn restore_array_keeps_shape() {
        let computed = array![[1.5f32, -0.5], [2.0, 3.25]];
        let restored: ndarray::Array2<f64> = restore_array(computed);
        assert_eq!(restored, array![[1.5f64, -0.5], [2.0, 3.25]]);
    }
}

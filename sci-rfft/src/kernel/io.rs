use super::ConfigError;

use ndarray::{ArrayBase, Data, DataMut, Ix1};

/// Adapter trait for reading a contiguous signal or packed spectrum.
pub trait Read1D<T> {
    /// Borrow the underlying input as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing a contiguous signal or packed spectrum.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

// Any 1D ndarray storage binds as long as it is contiguous in logical order. Strided views are
// rejected rather than copied; the N-d API stages those.
impl<S> Read1D<S::Elem> for ArrayBase<S, Ix1>
where
    S: Data,
{
    fn read_slice(&self) -> Result<&[S::Elem], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "ndarray" })
    }
}

impl<S> Write1D<S::Elem> for ArrayBase<S, Ix1>
where
    S: DataMut,
{
    fn write_slice_mut(&mut self) -> Result<&mut [S::Elem], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "ndarray" })
    }
}

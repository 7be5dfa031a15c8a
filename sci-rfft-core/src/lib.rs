//! Shared error types and the real-FFT primitive used by `sci-rfft`.
//!
//! The transform itself is delegated to [`realfft`]; this crate only adapts it to batched,
//! densely-packed `f32` ndarray buffers.
#![deny(missing_docs)]

use core::{error, fmt};

/// Numpy-like helpers operating on plain ndarray buffers.
pub mod num_rs;

pub use realfft::FftError;

/// Errors raised whilst running sci-rfft.
#[derive(Debug)]
pub enum Error {
    /// Argument parsed into function were invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// A buffer could not be viewed or reshaped into the requested shape.
    Shape(ndarray::ShapeError),
    /// The real-FFT primitive rejected its buffers.
    Fft(FftError),
}

/// Convenience alias used across the workspace.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::Shape(err) => write!(f, "Shape error: {err}"),
            Error::Fft(err) => write!(f, "FFT primitive error: {err}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Shape(err) => Some(err),
            Error::Fft(err) => Some(err),
            Error::InvalidArg { .. } => None,
        }
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(value: ndarray::ShapeError) -> Self {
        Error::Shape(value)
    }
}

impl From<FftError> for Error {
    fn from(value: FftError) -> Self {
        Error::Fft(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn shape_errors_keep_their_source() {
        let err: Error = Array2::<f32>::from_shape_vec((2, 3), vec![0.0; 5])
            .expect_err("5 elements cannot fill 2x3")
            .into();
        assert!(matches!(err, Error::Shape(_)));
        assert!(error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Shape error"));
    }

    #[test]
    fn invalid_arg_display() {
        let err = Error::InvalidArg {
            arg: "input".into(),
            reason: "empty".into(),
        };
        assert_eq!(err.to_string(), "Invalid argument `input`: empty");
        assert!(error::Error::source(&err).is_none());
    }
}

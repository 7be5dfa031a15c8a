use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime execution invariant violations for checked kernel entrypoints.
#[derive(Debug)]
pub enum ExecInvariantViolation {
    /// A buffer length did not match the length the kernel was planned for.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
    /// The FFT primitive rejected the staged buffers; carries its error unmodified.
    Primitive(sci_rfft_core::Error),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
            ExecInvariantViolation::Primitive(err) => {
                write!(f, "Execution invariant violation: {err}")
            }
        }
    }
}

impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            ExecInvariantViolation::Primitive(err) => Some(err),
            ExecInvariantViolation::LengthMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_surface_through_execution_errors() {
        let err: ExecInvariantViolation = ConfigError::NonContiguous { arg: "signal" }.into();
        assert_eq!(err.to_string(), "Argument `signal` is not contiguous in memory.");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn length_mismatch_display() {
        let err = ExecInvariantViolation::LengthMismatch {
            arg: "spectrum",
            expected: 10,
            got: 8,
        };
        assert_eq!(
            err.to_string(),
            "Execution length mismatch on `spectrum`. Expected 10, got 8."
        );
    }

    #[test]
    fn primitive_errors_keep_their_source() {
        let err = ExecInvariantViolation::Primitive(sci_rfft_core::Error::Fft(
            sci_rfft_core::FftError::InputBuffer(5, 3),
        ));
        let source = std::error::Error::source(&err).expect("primitive error is the source");
        let core = source
            .downcast_ref::<sci_rfft_core::Error>()
            .expect("source is the core error");
        assert!(matches!(
            core,
            sci_rfft_core::Error::Fft(sci_rfft_core::FftError::InputBuffer(5, 3))
        ));
        assert!(err.to_string().starts_with("Execution invariant violation: FFT primitive error"));
    }
}

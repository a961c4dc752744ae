use core::fmt;

/// Validation errors raised while constructing sampling sets, Faraday axes,
/// or synthesis kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input vector or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration value violates its documented constraint.
    InvalidConfiguration {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// Parallel input vectors did not agree in length.
    SizeMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
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
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidConfiguration { arg, reason } => {
                write!(f, "Invalid configuration `{arg}`: {reason}")
            }
            ConfigError::SizeMismatch { arg, expected, got } => {
                write!(f, "Size mismatch on `{arg}`. Expected {expected}, got {got}.")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Runtime failures raised by checked transform entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// An input or output buffer mismatched the sampling-set length.
    SizeMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// An execution precondition was violated.
    InvalidState {
        /// Why execution could not proceed.
        reason: &'static str,
    },
    /// Adapter binding or configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for SynthesisError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::SizeMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Synthesis size mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            SynthesisError::InvalidState { reason } => {
                write!(f, "Synthesis invariant violation: {reason}")
            }
            SynthesisError::Config(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SynthesisError {}

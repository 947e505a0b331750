//! Error types for matrix and key-encapsulation operations

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during lattice KEM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operand shapes are incompatible for the requested operation
    #[error("Dimension mismatch in {op}: left is {}x{}, right is {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch {
        /// Operation that was attempted
        op: &'static str,
        /// Shape of the left operand as (rows, cols)
        left: (usize, usize),
        /// Shape of the right operand as (rows, cols)
        right: (usize, usize),
    },

    /// An unreduced entry left the i64 range
    #[error("Arithmetic overflow in {op}")]
    Overflow {
        /// Operation that overflowed
        op: &'static str,
    },

    /// Reduction was requested with a non-positive modulus
    #[error("Invalid modulus {0}: must be a positive integer")]
    InvalidModulus(i64),

    /// A parameter (sigma, dimension, table) is outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The secure randomness source could not be read
    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// Persisted data could not be parsed
    #[error("Deserialization error at line {line}: {reason}")]
    Deserialization {
        /// 1-based line number where parsing failed (0 when not line-specific)
        line: usize,
        /// What was wrong with the input
        reason: String,
    },

    /// Reading or writing persisted data failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a dimension mismatch error from two shapes
    pub fn dimension_mismatch(
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Error::DimensionMismatch { op, left, right }
    }

    /// Build an overflow error for the given operation
    pub fn overflow(op: &'static str) -> Self {
        Error::Overflow { op }
    }

    /// Build a deserialization error for the given line
    pub fn deserialization(line: usize, reason: impl Into<String>) -> Self {
        Error::Deserialization {
            line,
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<getrandom::Error> for Error {
    fn from(err: getrandom::Error) -> Self {
        Error::EntropyUnavailable(err.to_string())
    }
}

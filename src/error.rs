use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The crate's error type.
#[derive(Debug, PartialEq, Eq)]
pub enum MlErr {
    /// A shape invariant was violated (e.g. a sample does not conform to a
    /// layer's expected input shape).
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A parameter tree and a gradient tree disagree on structure.
    StructureMismatch {
        what: &'static str,
    },
    /// A configuration value is invalid for semantic or domain reasons.
    InvalidConfig(&'static str),
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            MlErr::StructureMismatch { what } => {
                write!(f, "parameter structure mismatch at {what}")
            }
            MlErr::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            MlErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl Error for MlErr {}

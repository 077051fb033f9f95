//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum RlpackError {
    /// The model identifier given at construction is not known.
    #[error("Invalid model name passed: {0}")]
    UnknownModel(String),

    /// The optimizer identifier given at construction is not known.
    #[error("Invalid optimizer name passed: {0}")]
    UnknownOptimizer(String),

    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The number of elements in a state buffer does not agree with its shape descriptor.
    #[error("Shape mismatch: shape {shape:?} needs {expected} elements, got {actual}")]
    ShapeMismatch {
        /// Declared shape.
        shape: Vec<i64>,
        /// Number of elements implied by `shape`.
        expected: usize,
        /// Number of elements actually supplied.
        actual: usize,
    },

    /// A state or action handed to the agent is not valid for the model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The replay memory holds fewer transitions than requested.
    #[error("Insufficient data: {len} transitions stored, {batch_size} requested")]
    InsufficientData {
        /// Number of stored transitions.
        len: usize,
        /// Requested batch size.
        batch_size: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}

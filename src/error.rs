//! Error types for the residual core.
//!
//! Every variant here is a fatal configuration error: the model/asset and
//! this core are out of sync and the run must stop. Numeric boundary cases
//! (cursor past the last keyframe, degenerate headings) are clamped in-line
//! and never reach this enum.

use thiserror::Error;

/// Errors that can occur while resolving or evaluating the task.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskError {
    /// A required body name is missing from the model.
    #[error("body not found: {0}")]
    BodyNotFound(String),

    /// A required kinematic marker name is missing from the model.
    #[error("marker not found: {0}")]
    MarkerNotFound(String),

    /// A required named sensor is missing from the model.
    #[error("sensor not found: {0}")]
    SensorNotFound(String),

    /// A required geometry name is missing from the model.
    #[error("geom not found: {0}")]
    GeomNotFound(String),

    /// A required scalar parameter name is missing from the model.
    #[error("parameter not found: {0}")]
    ParameterNotFound(String),

    /// The requested motion clip id is not in the clip table.
    #[error("motion clip {0} out of range")]
    ClipOutOfRange(usize),

    /// The keyframe tables do not cover the clip table.
    #[error("keyframe table holds {rows} rows but clips cover {expected}")]
    KeyframeTableMismatch {
        /// Rows actually present in the keyframe tables.
        rows: usize,
        /// Rows required by the sum of clip lengths.
        expected: usize,
    },

    /// The emitted residual length disagrees with the declared dimension.
    #[error("residual length mismatch: declared {expected}, emitted {actual}")]
    ResidualDimMismatch {
        /// Dimension declared by the external residual/sensor configuration.
        expected: usize,
        /// Dimension actually emitted by the assembler.
        actual: usize,
    },

    /// Invalid configuration input (parameter vector, gait config file).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

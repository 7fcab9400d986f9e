use thiserror::Error;

use crate::parameters::ValidationWarnings;

/// Convenience result type for masking operations.
pub type MaskingResult<T> = Result<T, MaskingError>;

/// Error type returned by transformer construction and per-row transformation.
///
/// This is a single error enum shared across the parameter framework, generators, transformers,
/// the registry and the execution engine.
#[derive(Debug, Error)]
pub enum MaskingError {
    /// A column name could not be found in the [`crate::types::Schema`].
    #[error("column with name '{0}' is not found")]
    UnknownColumn(String),

    /// A record was accessed with an index outside its column range.
    #[error("column index {idx} is out of range (record has {len} columns)")]
    ColumnIndexOutOfRange { idx: usize, len: usize },

    /// A required parameter has neither a configured value nor a default.
    #[error("parameter '{0}' is required")]
    MissingParameter(String),

    /// A parameter value could not be decoded or is not usable.
    #[error("parameter '{name}': {message}")]
    Parameter { name: String, message: String },

    /// The column storage length does not map to a supported integer width.
    #[error("unsupported int size {0}")]
    UnsupportedIntSize(i32),

    /// Requested limits do not form a valid inclusive range.
    #[error("invalid limits: min {min} max {max}: {message}")]
    InvalidLimits { min: i64, max: i64, message: String },

    /// A generator could not be built or failed to produce output.
    #[error("generator error: {0}")]
    Generator(String),

    /// Configuration validation produced at least one error-severity warning.
    #[error("fatal validation warnings: {0}")]
    FatalValidation(ValidationWarnings),

    /// A transformer was registered twice under the same name.
    #[error("transformer '{0}' is already registered")]
    DuplicateTransformer(String),

    /// No transformer is registered under the requested name.
    #[error("transformer '{0}' is not registered")]
    UnknownTransformer(String),

    /// Two transformers in one run would write the same column.
    #[error("column '{column}' (idx {idx}) is affected by both '{first}' and '{second}'")]
    AffectedColumnConflict {
        idx: usize,
        column: String,
        first: String,
        second: String,
    },

    /// Execution options are invalid or the worker pool could not be built.
    #[error("execution error: {0}")]
    Execution(String),

    /// The run was cancelled before all rows were processed.
    #[error("execution cancelled before row {row}")]
    Cancelled { row: usize },

    /// A transformer failed on a specific row.
    #[error("transformer '{transformer}' failed at row {row}: {source}")]
    Transform {
        transformer: String,
        row: usize,
        #[source]
        source: Box<MaskingError>,
    },
}

impl MaskingError {
    pub(crate) fn parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

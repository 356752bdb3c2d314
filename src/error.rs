//! Error types for parsing and row transformation.

use std::io;

use thiserror::Error;

/// Boxed cause carried by a failed predicate or mapper.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the pipeline stages.
///
/// Every variant is terminal for the current run; nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input could not be opened or read.
    #[error("cannot read '{source_name}'")]
    SourceUnavailable {
        source_name: String,
        #[source]
        source: io::Error,
    },

    /// A predicate or mapper failed on the row at position `row`
    /// (0-based, within the stage's input table).
    #[error("{stage} failed at row {row}")]
    TransformFailure {
        stage: &'static str,
        row: usize,
        #[source]
        source: BoxError,
    },

    /// The separator cannot be used to split lines.
    #[error("invalid separator: {0}")]
    InvalidSeparator(String),

    /// The stage language text could not be parsed.
    #[error("line {line}: {message}")]
    Dsl { line: usize, message: String },
}

impl PipelineError {
    pub(crate) fn transform(stage: &'static str, row: usize, source: impl Into<BoxError>) -> Self {
        PipelineError::TransformFailure {
            stage,
            row,
            source: source.into(),
        }
    }

    /// Row position of a transform failure, if this is one.
    pub fn row(&self) -> Option<usize> {
        match self {
            PipelineError::TransformFailure { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// Errors raised by row accessors inside predicates and mappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The row is shorter than the requested index.
    #[error("field {index} missing (row has {len} fields)")]
    MissingField { index: usize, len: usize },

    /// The field exists but does not convert to the requested type.
    #[error("field {index} value '{value}' is invalid: {reason}")]
    InvalidField {
        index: usize,
        value: String,
        reason: String,
    },
}

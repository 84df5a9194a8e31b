//! Error types for es-io.

use thiserror::Error;

use es_core::CoreError;
use es_schedule::ScheduleError;

/// Errors that can occur when reading or writing schedule documents.
#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IDF parse error: {0}")]
    Parse(String),

    #[error("unknown {kind} {name:?}")]
    UnknownReference { kind: &'static str, name: String },

    #[error("expected a {expected} object, got {got:?}")]
    UnexpectedType { expected: &'static str, got: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;

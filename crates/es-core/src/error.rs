//! Core error type.
//!
//! Higher crates wrap `CoreError` as one variant of their own enum via
//! `#[from]`, so a validation failure deep in a time or date constructor
//! surfaces unchanged through `?`.

use thiserror::Error;

/// Validation and parse failures of the primitive types in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid time {hour:02}:{minute:02}: hour must be 0-23 and minute 0-59")]
    InvalidTime { hour: u32, minute: u32 },

    #[error("invalid timestep {0}: must be one of 1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60")]
    InvalidTimestep(u32),

    #[error("invalid date {month}/{day}")]
    InvalidDate { month: u32, day: u32 },

    #[error("day of year {doy} is out of range for a {days}-day year")]
    InvalidDayOfYear { doy: u32, days: u32 },

    #[error("invalid day of week: {0}")]
    InvalidDayOfWeek(String),

    #[error("invalid identifier {0:?}: {1}")]
    InvalidIdentifier(String, &'static str),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `es-core`.
pub type CoreResult<T> = Result<T, CoreError>;

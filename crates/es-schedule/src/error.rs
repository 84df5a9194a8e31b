use thiserror::Error;

use es_core::{CoreError, MonthDay, Time};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("expected {expected} {what}, got {got}")]
    LengthMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("invalid schedule value {0}: values must be finite")]
    InvalidValue(f64),

    #[error("invalid averaging weights: {0}")]
    Weights(String),

    #[error("cannot remove the only breakpoint of a schedule day")]
    RemoveOnlyBreakpoint,

    #[error("cannot remove the 00:00 breakpoint of a schedule day")]
    RemoveFirstBreakpoint,

    #[error("index {index} out of range for {len} {what}")]
    IndexOutOfRange {
        index: usize,
        len:   usize,
        what:  &'static str,
    },

    #[error("schedule day times must start at 00:00, got {0}")]
    FirstTimeNotMidnight(Time),

    #[error("schedule day already has a breakpoint at {0}")]
    DuplicateTime(Time),

    #[error("schedule day has no breakpoint at {0}")]
    TimeNotFound(Time),

    #[error("start date {start} is after end date {end}")]
    DateRange { start: MonthDay, end: MonthDay },

    #[error("at least one {0} is required")]
    EmptyInput(&'static str),

    #[error("two different schedule days share the identifier {0:?}")]
    DuplicateDayIdentifier(String),

    #[error("invalid schedule type limit: {0}")]
    TypeLimit(String),

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

//! Evaluation configuration for [`ScheduleRuleset::values`](crate::ScheduleRuleset::values).

use es_core::{DayOfWeek, MonthDay, Timestep};

/// Options for producing a dense array from a ruleset.
///
/// Typically built with the fluent setters from `ValuesOptions::default()`,
/// or deserialized from an application's run configuration (with the `serde`
/// feature).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ValuesOptions {
    /// Samples per hour.  Default: 1.
    pub timestep: Timestep,

    /// First day of the output (inclusive).  Default: Jan 1.
    pub start_date: MonthDay,

    /// Last day of the output (inclusive).  Must not precede `start_date`.
    /// Default: Dec 31.
    pub end_date: MonthDay,

    /// Weekday of `start_date`.  Default: Sunday.
    pub start_day_of_week: DayOfWeek,

    /// Days evaluated with holiday semantics.
    pub holidays: Vec<MonthDay>,

    /// Evaluate over a 366-day year.  Default: false.
    pub leap_year: bool,
}

impl Default for ValuesOptions {
    fn default() -> Self {
        Self {
            timestep:          Timestep::HOURLY,
            start_date:        MonthDay::JAN_1,
            end_date:          MonthDay::DEC_31,
            start_day_of_week: DayOfWeek::Sunday,
            holidays:          Vec::new(),
            leap_year:         false,
        }
    }
}

impl ValuesOptions {
    pub fn timestep(mut self, timestep: Timestep) -> Self {
        self.timestep = timestep;
        self
    }

    pub fn date_range(mut self, start_date: MonthDay, end_date: MonthDay) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn start_day_of_week(mut self, dow: DayOfWeek) -> Self {
        self.start_day_of_week = dow;
        self
    }

    pub fn holidays(mut self, holidays: Vec<MonthDay>) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn leap_year(mut self, leap_year: bool) -> Self {
        self.leap_year = leap_year;
        self
    }
}

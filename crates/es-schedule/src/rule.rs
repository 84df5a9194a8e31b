//! `ScheduleRule`: applies a shared `ScheduleDay` on selected weekdays within
//! a date range.
//!
//! # Date ranges
//!
//! A rule covers `start_date ..= end_date`.  When `start_date > end_date` the
//! rule is *reversed* and covers the end of one year plus the start of the
//! next, e.g. Nov 15 – Feb 1:
//!
//! ```text
//! normal:   start_doy <= doy <= end_doy
//! reversed: doy <= end_doy || doy >= start_doy
//! ```
//!
//! Range bounds are converted with [`Calendar::rule_doy`], so the same rule
//! lines up with the same calendar dates in regular and leap years.

use std::fmt;
use std::sync::Arc;

use es_core::{Calendar, DayOfWeek, MonthDay};

use crate::{ScheduleDay, ScheduleError, ScheduleResult};

/// One exception to a ruleset's default day.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleRule {
    schedule_day:  Arc<ScheduleDay>,
    /// Sunday-first day flags.
    apply_days:    [bool; 7],
    apply_holiday: bool,
    start_date:    MonthDay,
    end_date:      MonthDay,
}

impl ScheduleRule {
    /// A rule over the whole year that applies on no day yet.
    pub fn new(schedule_day: impl Into<Arc<ScheduleDay>>) -> Self {
        Self {
            schedule_day:  schedule_day.into(),
            apply_days:    [false; 7],
            apply_holiday: false,
            start_date:    MonthDay::JAN_1,
            end_date:      MonthDay::DEC_31,
        }
    }

    /// Build a rule from day names (see [`apply_day_by_name`](Self::apply_day_by_name))
    /// and an optional date range defaulting to the whole year.
    pub fn from_days_applied<S: AsRef<str>>(
        schedule_day:    impl Into<Arc<ScheduleDay>>,
        applicable_days: &[S],
        start_date:      Option<MonthDay>,
        end_date:        Option<MonthDay>,
    ) -> ScheduleResult<Self> {
        let mut rule = Self::new(schedule_day).with_dates(
            start_date.unwrap_or(MonthDay::JAN_1),
            end_date.unwrap_or(MonthDay::DEC_31),
        );
        for name in applicable_days {
            rule.apply_day_by_name(name.as_ref())?;
        }
        Ok(rule)
    }

    // ── Builder-style setters ─────────────────────────────────────────────

    pub fn with_dates(mut self, start_date: MonthDay, end_date: MonthDay) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_start_date(mut self, start_date: MonthDay) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn with_end_date(mut self, end_date: MonthDay) -> Self {
        self.end_date = end_date;
        self
    }

    /// Replace all seven day flags (Sunday first).
    pub fn with_days(mut self, apply_days: [bool; 7]) -> Self {
        self.apply_days = apply_days;
        self
    }

    pub fn with_day(mut self, day: DayOfWeek) -> Self {
        self.apply_days[day.index()] = true;
        self
    }

    pub fn with_apply_holiday(mut self, apply_holiday: bool) -> Self {
        self.apply_holiday = apply_holiday;
        self
    }

    pub fn with_schedule_day(mut self, schedule_day: impl Into<Arc<ScheduleDay>>) -> Self {
        self.schedule_day = schedule_day.into();
        self
    }

    // ── Day flags ─────────────────────────────────────────────────────────

    /// Set the flag for one day of the week.
    pub fn set_apply_day(&mut self, day: DayOfWeek, apply: bool) {
        self.apply_days[day.index()] = apply;
    }

    /// Turn the rule on for a named day or day group: `sunday` … `saturday`,
    /// `weekday`, `weekend` or `all` (case-insensitive).
    pub fn apply_day_by_name(&mut self, name: &str) -> ScheduleResult<()> {
        match name.trim().to_ascii_lowercase().as_str() {
            "weekday" => self.set_apply_weekday(true),
            "weekend" => self.set_apply_weekend(true),
            "all" => self.set_apply_all(true),
            other => {
                let day = other
                    .parse::<DayOfWeek>()
                    .map_err(|_| ScheduleError::Parse(format!("{name:?} is not an acceptable day name")))?;
                self.set_apply_day(day, true);
            }
        }
        Ok(())
    }

    /// Turn the rule on for day number `dow` (Sunday = 1 … Saturday = 7).
    pub fn apply_day_by_dow(&mut self, dow: u32) -> ScheduleResult<()> {
        self.set_apply_day(DayOfWeek::from_number(dow)?, true);
        Ok(())
    }

    pub fn set_apply_weekday(&mut self, apply: bool) {
        for day in &mut self.apply_days[1..6] {
            *day = apply;
        }
    }

    pub fn set_apply_weekend(&mut self, apply: bool) {
        self.apply_days[0] = apply;
        self.apply_days[6] = apply;
    }

    pub fn set_apply_all(&mut self, apply: bool) {
        self.apply_days = [apply; 7];
    }

    pub fn set_apply_holiday(&mut self, apply: bool) {
        self.apply_holiday = apply;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn schedule_day(&self) -> &Arc<ScheduleDay> {
        &self.schedule_day
    }

    pub fn start_date(&self) -> MonthDay {
        self.start_date
    }

    pub fn end_date(&self) -> MonthDay {
        self.end_date
    }

    #[inline]
    pub fn applies_on(&self, day: DayOfWeek) -> bool {
        self.apply_days[day.index()]
    }

    pub fn apply_holiday(&self) -> bool {
        self.apply_holiday
    }

    /// `true` when every Monday–Friday flag is set.
    pub fn apply_weekday(&self) -> bool {
        self.apply_days[1..6].iter().all(|&d| d)
    }

    /// `true` when both Saturday and Sunday are set.
    pub fn apply_weekend(&self) -> bool {
        self.apply_days[0] && self.apply_days[6]
    }

    pub fn apply_all(&self) -> bool {
        self.apply_days.iter().all(|&d| d)
    }

    /// Sunday-first flags.
    pub fn week_apply_tuple(&self) -> [bool; 7] {
        self.apply_days
    }

    pub fn days_applied(&self) -> Vec<DayOfWeek> {
        DayOfWeek::ALL.into_iter().filter(|d| self.applies_on(*d)).collect()
    }

    /// `true` when the date range wraps across the end of the year.
    pub fn is_reversed(&self) -> bool {
        self.start_date > self.end_date
    }

    /// `true` when the range is Jan 1 – Dec 31.
    pub fn covers_whole_year(&self) -> bool {
        self.start_date == MonthDay::JAN_1 && self.end_date == MonthDay::DEC_31
    }

    // ── Matching ──────────────────────────────────────────────────────────

    /// Does the rule apply on day-of-year `doy` falling on weekday `dow`?
    pub fn does_rule_apply(&self, doy: u32, dow: DayOfWeek, calendar: Calendar) -> bool {
        self.applies_on(dow) && self.does_rule_apply_doy(doy, calendar)
    }

    /// Date-range test alone, ignoring the weekday flags.
    pub fn does_rule_apply_doy(&self, doy: u32, calendar: Calendar) -> bool {
        let start = calendar.rule_doy(self.start_date);
        let end = calendar.rule_doy(self.end_date);
        if self.is_reversed() {
            doy <= end || start <= doy
        } else {
            start <= doy && doy <= end
        }
    }

    /// Like [`does_rule_apply`](Self::does_rule_apply) with the weekday
    /// derived from `doy` as if the year started on a Sunday.
    #[deprecated(note = "pass the weekday explicitly to `does_rule_apply`")]
    pub fn does_rule_apply_assumed_dow(&self, doy: u32, calendar: Calendar) -> bool {
        self.does_rule_apply(doy, DayOfWeek::assumed_for_doy(doy), calendar)
    }

    /// Inclusive regular-year day-of-year segments covered by the range.
    /// A reversed rule yields two segments.
    pub(crate) fn doy_segments(&self) -> Vec<(u32, u32)> {
        let start = Calendar::REGULAR.rule_doy(self.start_date);
        let end = Calendar::REGULAR.rule_doy(self.end_date);
        if self.is_reversed() {
            vec![(1, end), (start, Calendar::REGULAR.days_in_year())]
        } else {
            vec![(start, end)]
        }
    }
}

impl fmt::Display for ScheduleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<&str> = self.days_applied().into_iter().map(DayOfWeek::name).collect();
        write!(
            f,
            "ScheduleRule: {} [days applied: {}] [date range: {} - {}]",
            self.schedule_day.display_name(),
            days.join(", "),
            self.start_date,
            self.end_date,
        )
    }
}

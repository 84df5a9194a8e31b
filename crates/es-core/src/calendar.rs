//! Calendar model: days of the week, year-less dates and day-of-year maths.
//!
//! # Day-of-year in leap years
//!
//! Schedule rules store their date range as `MonthDay`s without a year.  The
//! same rule must resolve identically in a regular and a leap year, so rule
//! dates are first mapped to a *non-leap* day of year and then shifted by one
//! for every date after February when the calendar is a leap year:
//!
//! ```text
//! rule_doy = doy_non_leap(md) + (leap_year && month > 2) as u32
//! ```
//!
//! February 29 maps to 60 in both calendars.  All date arithmetic goes through
//! [`Calendar`], so there is one code path for both cases.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::{CoreError, CoreResult};

/// Reference years used to validate and number dates.  2017 starts on a
/// Sunday, the week start assumed throughout.
const LEAP_REFERENCE_YEAR: i32 = 2016;
const REGULAR_REFERENCE_YEAR: i32 = 2017;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ── DayOfWeek ─────────────────────────────────────────────────────────────────

/// Day of the week, numbered Sunday = 1 … Saturday = 7.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayOfWeek {
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
    Saturday = 7,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// 1-based number (Sunday = 1).
    #[inline]
    pub fn number(self) -> u32 {
        self as u32
    }

    /// 0-based index into `[bool; 7]` day flags (Sunday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn from_number(n: u32) -> CoreResult<Self> {
        match n {
            1..=7 => Ok(Self::ALL[n as usize - 1]),
            _ => Err(CoreError::InvalidDayOfWeek(n.to_string())),
        }
    }

    /// The following day, wrapping Saturday to Sunday.
    #[inline]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % 7]
    }

    /// The day `n` days after `self`.
    pub fn add_days(self, n: u32) -> Self {
        Self::ALL[(self.index() + (n % 7) as usize) % 7]
    }

    #[inline]
    pub fn is_weekend(self) -> bool {
        matches!(self, DayOfWeek::Sunday | DayOfWeek::Saturday)
    }

    /// Lower-case English name.
    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    /// Weekday implied by a day of year when the year is assumed to start on
    /// a Sunday (`doy % 7`, with 0 meaning Saturday).
    pub fn assumed_for_doy(doy: u32) -> Self {
        match doy % 7 {
            0 => DayOfWeek::Saturday,
            n => Self::ALL[n as usize - 1],
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        write!(f, "{}{}", name[..1].to_ascii_uppercase(), &name[1..])
    }
}

impl FromStr for DayOfWeek {
    type Err = CoreError;

    /// Case-insensitive English day name.
    fn from_str(s: &str) -> CoreResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| CoreError::InvalidDayOfWeek(s.to_string()))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(w: Weekday) -> Self {
        Self::ALL[w.num_days_from_sunday() as usize]
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(d: DayOfWeek) -> Weekday {
        match d {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

// ── MonthDay ──────────────────────────────────────────────────────────────────

/// A calendar date without a year.  February 29 is a valid `MonthDay`.
///
/// Ordering is chronological within a year.  With the `serde` feature it
/// (de)serializes as `[month, day]`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "[u32; 2]", try_from = "[u32; 2]")
)]
pub struct MonthDay {
    month: u8,
    day:   u8,
}

impl MonthDay {
    pub const JAN_1: MonthDay = MonthDay { month: 1, day: 1 };
    pub const DEC_31: MonthDay = MonthDay { month: 12, day: 31 };

    pub fn new(month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(LEAP_REFERENCE_YEAR, month, day)
            .map(|_| Self { month: month as u8, day: day as u8 })
            .ok_or(CoreError::InvalidDate { month, day })
    }

    #[inline]
    pub fn month(self) -> u32 {
        self.month as u32
    }

    #[inline]
    pub fn day(self) -> u32 {
        self.day as u32
    }

    #[inline]
    pub fn is_leap_day(self) -> bool {
        self.month == 2 && self.day == 29
    }

    /// Day of year in a regular year; February 29 maps to 60.
    pub fn doy_non_leap(self) -> u32 {
        if self.is_leap_day() {
            return 60;
        }
        NaiveDate::from_ymd_opt(REGULAR_REFERENCE_YEAR, self.month(), self.day())
            .map(|d| d.ordinal())
            .unwrap_or(60)
    }

    pub fn to_array(self) -> [u32; 2] {
        [self.month(), self.day()]
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, MONTH_ABBR[self.month as usize - 1])
    }
}

impl From<MonthDay> for [u32; 2] {
    fn from(md: MonthDay) -> [u32; 2] {
        md.to_array()
    }
}

impl TryFrom<[u32; 2]> for MonthDay {
    type Error = CoreError;
    fn try_from(md: [u32; 2]) -> CoreResult<Self> {
        Self::new(md[0], md[1])
    }
}

impl From<NaiveDate> for MonthDay {
    fn from(d: NaiveDate) -> Self {
        Self { month: d.month() as u8, day: d.day() as u8 }
    }
}

// ── Calendar ──────────────────────────────────────────────────────────────────

/// Regular or leap year; the only input to day-of-year arithmetic.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calendar {
    pub leap_year: bool,
}

impl Calendar {
    pub const REGULAR: Calendar = Calendar { leap_year: false };
    pub const LEAP: Calendar = Calendar { leap_year: true };

    pub fn new(leap_year: bool) -> Self {
        Self { leap_year }
    }

    #[inline]
    pub fn days_in_year(self) -> u32 {
        if self.leap_year { 366 } else { 365 }
    }

    fn reference_year(self) -> i32 {
        if self.leap_year { LEAP_REFERENCE_YEAR } else { REGULAR_REFERENCE_YEAR }
    }

    /// Exact day of year of `md`.  February 29 is an error in a regular year.
    pub fn doy(self, md: MonthDay) -> CoreResult<u32> {
        NaiveDate::from_ymd_opt(self.reference_year(), md.month(), md.day())
            .map(|d| d.ordinal())
            .ok_or(CoreError::InvalidDate { month: md.month(), day: md.day() })
    }

    /// Day of year used when matching rule date ranges.  Never fails:
    /// February 29 in a regular year resolves to 60 (March 1).
    pub fn rule_doy(self, md: MonthDay) -> u32 {
        let shift = u32::from(self.leap_year && md.month() > 2);
        md.doy_non_leap() + shift
    }

    /// The date falling on day-of-year `doy`.
    pub fn month_day(self, doy: u32) -> CoreResult<MonthDay> {
        NaiveDate::from_yo_opt(self.reference_year(), doy)
            .map(MonthDay::from)
            .ok_or(CoreError::InvalidDayOfYear { doy, days: self.days_in_year() })
    }
}

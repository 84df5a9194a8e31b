//! Time-of-day and timestep model.
//!
//! # Design
//!
//! A schedule day is a sequence of breakpoints on a 24-hour clock.  Every
//! breakpoint time is a [`Time`], stored as `(hour, minute)` so that ordering
//! is exact and comparisons are O(1).  The canonical scalar is the
//! minute-of-day:
//!
//!   minute_of_day = hour * 60 + minute        (0 ..= 1439)
//!
//! Dense arrays are sampled at a [`Timestep`], the number of samples per hour.
//! Only divisors of 60 that EnergyPlus accepts are valid, so every sample
//! instant falls on a whole minute.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::{CoreError, CoreResult};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1_440;

// ── Time ──────────────────────────────────────────────────────────────────────

/// A time of day with minute resolution.
///
/// With the `serde` feature a `Time` (de)serializes as a `[hour, minute]`
/// pair, the layout used by schedule JSON documents.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "[u32; 2]", try_from = "[u32; 2]")
)]
pub struct Time {
    hour:   u8,
    minute: u8,
}

impl Time {
    pub const MIDNIGHT: Time = Time { hour: 0, minute: 0 };

    /// Create a time, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u32, minute: u32) -> CoreResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(CoreError::InvalidTime { hour, minute });
        }
        Ok(Self { hour: hour as u8, minute: minute as u8 })
    }

    /// Build a time from its minute-of-day (0 ..= 1439).
    pub fn from_mod(minute_of_day: u32) -> CoreResult<Self> {
        Self::new(minute_of_day / 60, minute_of_day % 60)
    }

    #[inline]
    pub fn hour(self) -> u32 {
        self.hour as u32
    }

    #[inline]
    pub fn minute(self) -> u32 {
        self.minute as u32
    }

    /// Minutes elapsed since 00:00.
    #[inline]
    pub fn minute_of_day(self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// `[hour, minute]`, the JSON layout.
    pub fn to_array(self) -> [u32; 2] {
        [self.hour(), self.minute()]
    }

    pub fn from_array(hm: [u32; 2]) -> CoreResult<Self> {
        Self::new(hm[0], hm[1])
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for Time {
    type Err = CoreError;

    /// Parse `"HH:MM"` (a single-digit hour is accepted).
    fn from_str(s: &str) -> CoreResult<Self> {
        let bad = || CoreError::Parse(format!("invalid time {s:?}: expected \"HH:MM\""));
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hour = h.trim().parse::<u32>().map_err(|_| bad())?;
        let minute = m.trim().parse::<u32>().map_err(|_| bad())?;
        Self::new(hour, minute)
    }
}

impl From<Time> for [u32; 2] {
    fn from(t: Time) -> [u32; 2] {
        t.to_array()
    }
}

impl TryFrom<[u32; 2]> for Time {
    type Error = CoreError;
    fn try_from(hm: [u32; 2]) -> CoreResult<Self> {
        Self::from_array(hm)
    }
}

impl From<Time> for NaiveTime {
    fn from(t: Time) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(t.minute_of_day() * 60, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl TryFrom<NaiveTime> for Time {
    type Error = CoreError;

    /// Fails when the time carries seconds; breakpoints are minute-aligned.
    fn try_from(t: NaiveTime) -> CoreResult<Self> {
        if t.second() != 0 || t.nanosecond() != 0 {
            return Err(CoreError::Parse(format!(
                "time {t} is not aligned to a whole minute"
            )));
        }
        Self::new(t.hour(), t.minute())
    }
}

// ── Timestep ──────────────────────────────────────────────────────────────────

/// Number of samples per hour for dense schedule arrays.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "u32", try_from = "u32")
)]
pub struct Timestep(u8);

impl Timestep {
    /// Every timestep EnergyPlus accepts.
    pub const VALID: [u32; 12] = [1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60];

    pub const HOURLY: Timestep = Timestep(1);

    pub fn new(per_hour: u32) -> CoreResult<Self> {
        if Self::VALID.contains(&per_hour) {
            Ok(Self(per_hour as u8))
        } else {
            Err(CoreError::InvalidTimestep(per_hour))
        }
    }

    #[inline]
    pub fn per_hour(self) -> u32 {
        self.0 as u32
    }

    /// Length of one step in minutes.
    #[inline]
    pub fn minutes(self) -> u32 {
        60 / self.0 as u32
    }

    /// Samples in one day: `24 * per_hour`.
    #[inline]
    pub fn steps_per_day(self) -> usize {
        24 * self.0 as usize
    }
}

impl Default for Timestep {
    fn default() -> Self {
        Self::HOURLY
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/h", self.0)
    }
}

impl From<Timestep> for u32 {
    fn from(t: Timestep) -> u32 {
        t.per_hour()
    }
}

impl TryFrom<u32> for Timestep {
    type Error = CoreError;
    fn try_from(n: u32) -> CoreResult<Self> {
        Self::new(n)
    }
}

//! `ScheduleDay`: one representative day of (time, value) breakpoints.
//!
//! # Evaluation model
//!
//! Each breakpoint value holds from its time until the next breakpoint time,
//! or until the end of the day for the last one.  [`ScheduleDay::values_at_timestep`]
//! samples the day into a dense array of `24 * timestep` numbers:
//!
//! ```text
//! step:         out[i] = value of the interval containing i * step_minutes
//! interpolated: out[i] = ramp((i + 1) * step_minutes)
//! ```
//!
//! where `ramp` is 0:00 → `t1` flat at `v0`, then `t_k` → `t_{k+1}` a straight
//! line from `v_{k-1}` to `v_k` (`t_n` = 24:00).  The interpolated array is the
//! EnergyPlus `Linear` output: each sample is the value reached at the end of
//! its step, and the last sample is the last breakpoint value.
//!
//! # Mutation
//!
//! A `ScheduleDay` is immutable once built.  Rulesets share days through
//! `Arc<ScheduleDay>`; edits go through [`ScheduleDay::to_builder`], which
//! returns an owned [`ScheduleDayBuilder`] and leaves the original untouched.

use std::fmt;

use es_core::{Identifier, MINUTES_PER_DAY, Time, Timestep};

use crate::{ScheduleError, ScheduleResult};

/// Absolute tolerance on the sum of averaging weights.
pub(crate) const WEIGHT_TOLERANCE: f64 = 1e-9;

// ── ScheduleDay ───────────────────────────────────────────────────────────────

/// A day schedule: breakpoint times, the values starting at those times, and
/// an interpolation flag.
///
/// Invariants (checked on every construction path):
/// - `times.len() == values.len() >= 1`
/// - `times[0] == 00:00` and times strictly increase
/// - every value is finite
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleDay {
    identifier:   Identifier,
    display_name: Option<String>,
    times:        Vec<Time>,
    values:       Vec<f64>,
    interpolate:  bool,
}

impl ScheduleDay {
    /// Build a day from parallel `values` / `times`.
    ///
    /// Times given out of order are sorted together with their values.  The
    /// sorted times must start at 00:00 and contain no duplicates.
    pub fn new(
        identifier:  Identifier,
        values:      Vec<f64>,
        times:       Vec<Time>,
        interpolate: bool,
    ) -> ScheduleResult<Self> {
        let (times, values) = check_breakpoints(times, values)?;
        Ok(Self { identifier, display_name: None, times, values, interpolate })
    }

    /// A day holding `value` from 00:00 to 24:00.
    pub fn constant(identifier: Identifier, value: f64) -> ScheduleResult<Self> {
        Self::new(identifier, vec![value], vec![Time::MIDNIGHT], false)
    }

    /// Rebuild a day from a dense array of `24 * timestep` values.
    ///
    /// With `remove_repeated`, runs of equal consecutive values collapse into a
    /// single breakpoint; otherwise every step becomes a breakpoint (useful
    /// before switching on `interpolate`).
    pub fn from_values_at_timestep(
        identifier:      Identifier,
        values:          &[f64],
        timestep:        Timestep,
        remove_repeated: bool,
    ) -> ScheduleResult<Self> {
        let expected = timestep.steps_per_day();
        if values.len() != expected {
            return Err(ScheduleError::LengthMismatch {
                expected,
                got:  values.len(),
                what: "values for one day at this timestep",
            });
        }

        let step = timestep.minutes();
        let mut times = vec![Time::MIDNIGHT];
        let mut kept = vec![values[0]];
        for (i, &v) in values.iter().enumerate().skip(1) {
            if remove_repeated && kept.last() == Some(&v) {
                continue;
            }
            times.push(Time::from_mod(i as u32 * step)?);
            kept.push(v);
        }
        Self::new(identifier, kept, times, false)
    }

    /// Weighted average of several days, sampled at `timestep_resolution`.
    ///
    /// `weights` defaults to equal weighting; when given it must have one entry
    /// per schedule and sum to 1.  Detail finer than the resolution is lost.
    pub fn average_schedules<D: AsRef<ScheduleDay>>(
        identifier:          Identifier,
        schedules:           &[D],
        weights:             Option<&[f64]>,
        timestep_resolution: Timestep,
    ) -> ScheduleResult<Self> {
        let weights = resolve_weights(schedules.len(), weights, "schedule day")?;
        let dense: Vec<Vec<f64>> = schedules
            .iter()
            .map(|s| s.as_ref().values_at_timestep(timestep_resolution))
            .collect();

        let averaged: Vec<f64> = (0..timestep_resolution.steps_per_day())
            .map(|i| dense.iter().zip(&weights).map(|(vals, w)| vals[i] * w).sum())
            .collect();

        Self::from_values_at_timestep(identifier, &averaged, timestep_resolution, true)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Human-readable name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.identifier.as_str())
    }

    /// The explicitly set display name, if any.
    pub fn raw_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    /// Number of breakpoints.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: a day has at least one breakpoint.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `true` when one value covers the whole day.
    pub fn is_constant(&self) -> bool {
        self.values.len() == 1
    }

    /// Copy of this day under a different identifier.
    pub fn with_identifier(&self, identifier: Identifier) -> Self {
        Self { identifier, ..self.clone() }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_interpolate(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Open this day for editing.
    pub fn to_builder(&self) -> ScheduleDayBuilder {
        ScheduleDayBuilder {
            identifier:   self.identifier.clone(),
            display_name: self.display_name.clone(),
            times:        self.times.clone(),
            values:       self.values.clone(),
            interpolate:  self.interpolate,
        }
    }

    // ── Evaluation ────────────────────────────────────────────────────────

    /// Dense array of exactly `24 * timestep` values for this day.
    pub fn values_at_timestep(&self, timestep: Timestep) -> Vec<f64> {
        if self.interpolate {
            self.interpolated_values(timestep)
        } else {
            self.step_values(timestep)
        }
    }

    /// Step value in effect at `time`.
    pub fn value_at(&self, time: Time) -> f64 {
        let idx = self.times.partition_point(|t| *t <= time);
        self.values[idx.saturating_sub(1)]
    }

    fn step_values(&self, timestep: Timestep) -> Vec<f64> {
        let step = timestep.minutes();
        let mut out = Vec::with_capacity(timestep.steps_per_day());
        let mut idx = 0;
        for i in 0..timestep.steps_per_day() {
            let minute = i as u32 * step;
            // Several breakpoints may start within one step; take the latest.
            while idx + 1 < self.times.len() && self.times[idx + 1].minute_of_day() <= minute {
                idx += 1;
            }
            out.push(self.values[idx]);
        }
        out
    }

    /// Samples are taken at the start of each step and then shifted one step
    /// earlier, so each entry is the value reached at the end of its step.
    /// A ramp holds the previous value on the first sample at or after its
    /// breakpoint and then advances by `1 / n_steps` per sample, where
    /// `n_steps` is the ramp length in steps (fractional when a breakpoint
    /// falls between samples).
    fn interpolated_values(&self, timestep: Timestep) -> Vec<f64> {
        let step = timestep.minutes();
        let mut raw = Vec::with_capacity(timestep.steps_per_day() + 1);
        // `next` is the index of the next breakpoint to reach.
        let mut next = 1;
        let mut until = self.until_mod(next);
        let mut i = 0u32;
        let mut n_steps = 1.0;
        let mut delta = 0.0;
        for s in 0..timestep.steps_per_day() {
            let minute = s as u32 * step;
            if minute >= until {
                delta = self.values[next] - self.values[next - 1];
                until = self.until_mod(next + 1);
                n_steps = f64::from(until - self.times[next].minute_of_day()) / f64::from(step);
                i = 0;
                raw.push(self.values[next - 1]);
                next += 1;
            } else if next == 1 {
                raw.push(self.values[0]);
            } else {
                i += 1;
                raw.push(self.values[next - 2] + f64::from(i) / n_steps * delta);
            }
        }
        raw.remove(0);
        if let Some(&v) = self.values.last() {
            raw.push(v);
        }
        raw
    }

    /// Minute of day at which the breakpoint `index` starts, or 24:00.
    fn until_mod(&self, index: usize) -> u32 {
        self.times.get(index).map_or(MINUTES_PER_DAY, |t| t.minute_of_day())
    }

    /// Rotate the dense array by `step_count` steps (positive = later in the
    /// day) and rebuild.  The new identifier records the shift in minutes.
    pub fn shift_by_step(&self, step_count: i32, timestep: Timestep) -> ScheduleResult<Self> {
        let mut dense = self.values_at_timestep(timestep);
        let len = dense.len() as i32;
        dense.rotate_right(step_count.rem_euclid(len) as usize);
        let minutes = i64::from(timestep.minutes()) * i64::from(step_count);
        let id = self.identifier.with_suffix(&format!("_Shift_{minutes}mins"));
        Self::from_values_at_timestep(id, &dense, timestep, true)
    }

    /// Mean of the hourly dense array.
    pub fn average_value(&self) -> f64 {
        let dense = self.values_at_timestep(Timestep::HOURLY);
        dense.iter().sum::<f64>() / dense.len() as f64
    }
}

impl AsRef<ScheduleDay> for ScheduleDay {
    fn as_ref(&self) -> &ScheduleDay {
        self
    }
}

impl fmt::Display for ScheduleDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleDay: {} [", self.display_name())?;
        for (i, (t, v)) in self.times.iter().zip(&self.values).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{t} {v}")?;
        }
        f.write_str("]")
    }
}

// ── ScheduleDayBuilder ────────────────────────────────────────────────────────

/// Owned, editable copy of a [`ScheduleDay`].
///
/// Breakpoint edits validate eagerly; [`build`](Self::build) re-checks the
/// full invariant set.
///
/// ```rust,ignore
/// let mut b = office_day.to_builder();
/// b.add_value(0.5, Time::new(12, 0)?)?;
/// b.remove_value(1)?;
/// let edited = b.identifier(Identifier::new("Office Lunch")?).build()?;
/// ```
#[derive(Clone, Debug)]
pub struct ScheduleDayBuilder {
    identifier:   Identifier,
    display_name: Option<String>,
    times:        Vec<Time>,
    values:       Vec<f64>,
    interpolate:  bool,
}

impl ScheduleDayBuilder {
    /// Start a day that holds `initial_value` from 00:00.
    pub fn new(identifier: Identifier, initial_value: f64) -> Self {
        Self {
            identifier,
            display_name: None,
            times:        vec![Time::MIDNIGHT],
            values:       vec![initial_value],
            interpolate:  false,
        }
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn interpolate(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Add a breakpoint; `value` takes effect at `time`.
    pub fn add_value(&mut self, value: f64, time: Time) -> ScheduleResult<&mut Self> {
        check_value(value)?;
        if self.times.contains(&time) {
            return Err(ScheduleError::DuplicateTime(time));
        }
        self.times.push(time);
        self.values.push(value);
        let n = self.times.len();
        if n > 1 && self.times[n - 1] < self.times[n - 2] {
            log::debug!("schedule day {}: re-sorting after adding {time}", self.identifier);
            sort_breakpoints(&mut self.times, &mut self.values);
        }
        Ok(self)
    }

    /// Remove the breakpoint at `index`.  The 00:00 breakpoint and the last
    /// remaining breakpoint cannot be removed.
    pub fn remove_value(&mut self, index: usize) -> ScheduleResult<&mut Self> {
        if self.values.len() <= 1 {
            return Err(ScheduleError::RemoveOnlyBreakpoint);
        }
        if index == 0 {
            return Err(ScheduleError::RemoveFirstBreakpoint);
        }
        self.check_index(index)?;
        self.times.remove(index);
        self.values.remove(index);
        Ok(self)
    }

    pub fn remove_value_by_time(&mut self, time: Time) -> ScheduleResult<&mut Self> {
        let index = self.index_of(time)?;
        self.remove_value(index)
    }

    pub fn replace_value(&mut self, index: usize, value: f64) -> ScheduleResult<&mut Self> {
        check_value(value)?;
        self.check_index(index)?;
        self.values[index] = value;
        Ok(self)
    }

    pub fn replace_value_by_time(&mut self, time: Time, value: f64) -> ScheduleResult<&mut Self> {
        let index = self.index_of(time)?;
        self.replace_value(index, value)
    }

    pub fn build(self) -> ScheduleResult<ScheduleDay> {
        let mut day = ScheduleDay::new(self.identifier, self.values, self.times, self.interpolate)?;
        day.display_name = self.display_name;
        Ok(day)
    }

    fn check_index(&self, index: usize) -> ScheduleResult<()> {
        if index >= self.values.len() {
            return Err(ScheduleError::IndexOutOfRange {
                index,
                len:  self.values.len(),
                what: "breakpoints",
            });
        }
        Ok(())
    }

    fn index_of(&self, time: Time) -> ScheduleResult<usize> {
        self.times
            .iter()
            .position(|t| *t == time)
            .ok_or(ScheduleError::TimeNotFound(time))
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_value(value: f64) -> ScheduleResult<()> {
    if value.is_finite() { Ok(()) } else { Err(ScheduleError::InvalidValue(value)) }
}

fn sort_breakpoints(times: &mut Vec<Time>, values: &mut Vec<f64>) {
    let mut pairs: Vec<(Time, f64)> = times.iter().copied().zip(values.iter().copied()).collect();
    pairs.sort_by_key(|(t, _)| *t);
    let (t, v): (Vec<Time>, Vec<f64>) = pairs.into_iter().unzip();
    *times = t;
    *values = v;
}

fn check_breakpoints(
    mut times:  Vec<Time>,
    mut values: Vec<f64>,
) -> ScheduleResult<(Vec<Time>, Vec<f64>)> {
    if values.is_empty() {
        return Err(ScheduleError::EmptyInput("schedule day value"));
    }
    if times.len() != values.len() {
        return Err(ScheduleError::LengthMismatch {
            expected: times.len(),
            got:      values.len(),
            what:     "values (one per breakpoint time)",
        });
    }
    for &v in &values {
        check_value(v)?;
    }
    if times.windows(2).any(|w| w[0] >= w[1]) {
        sort_breakpoints(&mut times, &mut values);
        if let Some(w) = times.windows(2).find(|w| w[0] == w[1]) {
            return Err(ScheduleError::DuplicateTime(w[0]));
        }
    }
    if times[0] != Time::MIDNIGHT {
        return Err(ScheduleError::FirstTimeNotMidnight(times[0]));
    }
    Ok((times, values))
}

/// Expand optional averaging weights to one weight per input.
pub(crate) fn resolve_weights(
    count:   usize,
    weights: Option<&[f64]>,
    what:    &'static str,
) -> ScheduleResult<Vec<f64>> {
    if count == 0 {
        return Err(ScheduleError::EmptyInput(what));
    }
    match weights {
        None => Ok(vec![1.0 / count as f64; count]),
        Some(w) => {
            if w.len() != count {
                return Err(ScheduleError::LengthMismatch {
                    expected: count,
                    got:      w.len(),
                    what:     "averaging weights",
                });
            }
            let sum: f64 = w.iter().sum();
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(ScheduleError::Weights(format!("weights must sum to 1, got {sum}")));
            }
            Ok(w.to_vec())
        }
    }
}

//! Weighted averaging of whole rulesets.
//!
//! # Algorithm
//!
//! 1. If every input is single-week, average one week per input and rebuild
//!    it with [`ScheduleRuleset::from_week_daily_values`].
//! 2. Otherwise, for each day of a regular year collect the tuple of active
//!    rule indices of every input.  Each distinct tuple becomes one averaged
//!    week (`{identifier}_{n}`, numbered in order of first appearance).
//! 3. Consecutive days sharing a tuple form a date range; each range
//!    contributes its week's [`ScheduleRuleset::to_rules`].
//! 4. The first resulting rule's day becomes the default; the special days
//!    come from the first week.

use es_core::{Calendar, Identifier, Timestep};

use crate::day::resolve_weights;
use crate::ruleset::year_runs;
use crate::{ScheduleError, ScheduleResult, ScheduleRuleset, WeekValues};

/// Weekdays plus holiday, summer and winter design days.
const WEEK_SLOTS: usize = 10;

impl ScheduleRuleset {
    /// Weighted average of several rulesets, sampled at `timestep_resolution`.
    ///
    /// `weights` defaults to equal weighting; when given it must have one entry
    /// per ruleset and sum to 1.  The type limit of the first input is kept.
    pub fn average_schedules(
        identifier:          Identifier,
        schedules:           &[ScheduleRuleset],
        weights:             Option<&[f64]>,
        timestep_resolution: Timestep,
    ) -> ScheduleResult<ScheduleRuleset> {
        let weights = resolve_weights(schedules.len(), weights, "schedule ruleset")?;

        if schedules.iter().all(ScheduleRuleset::is_single_week) {
            let all_rules: Vec<Vec<usize>> = schedules
                .iter()
                .map(|s| (0..s.schedule_rules().len()).collect())
                .collect();
            return average_week(identifier, schedules, &weights, timestep_resolution, &all_rules);
        }

        let keys: Vec<Vec<Vec<usize>>> = (1..=Calendar::REGULAR.days_in_year())
            .map(|doy| schedules.iter().map(|s| s.rules_on_doy(doy)).collect())
            .collect();

        let mut unique: Vec<&Vec<Vec<usize>>> = Vec::new();
        let mut weeks: Vec<ScheduleRuleset> = Vec::new();
        for key in &keys {
            if !unique.contains(&key) {
                let week_id = identifier.with_suffix(&format!("_{}", unique.len()));
                weeks.push(average_week(week_id, schedules, &weights, timestep_resolution, key)?);
                unique.push(key);
            }
        }
        log::debug!(
            "averaging {} rulesets into {}: {} distinct weeks",
            schedules.len(),
            identifier,
            weeks.len(),
        );

        let mut final_rules = Vec::new();
        for (key, start, end) in year_runs(&keys)? {
            let week = unique
                .iter()
                .position(|u| **u == key)
                .map(|i| &weeks[i])
                .ok_or_else(|| ScheduleError::Parse(format!("no averaged week for rules {key:?}")))?;
            final_rules.extend(week.to_rules(start, end)?);
        }

        let first_week = weeks.first().ok_or(ScheduleError::EmptyInput("averaged week"))?;
        let mut rules = final_rules.into_iter();
        let default = rules.next().ok_or(ScheduleError::EmptyInput("averaged rule"))?;
        ScheduleRuleset::builder(identifier, default.schedule_day().clone())
            .rules(rules.collect())
            .holiday_schedule(first_week.holiday_or_default().clone())
            .summer_designday_schedule(first_week.summer_or_default().clone())
            .winter_designday_schedule(first_week.winter_or_default().clone())
            .schedule_type_limit(schedules[0].schedule_type_limit().cloned())
            .build()
    }
}

/// Average one typical week across `schedules`, with only the rules at
/// `rule_indices[i]` active for input `i`.
fn average_week(
    identifier:   Identifier,
    schedules:    &[ScheduleRuleset],
    weights:      &[f64],
    timestep:     Timestep,
    rule_indices: &[Vec<usize>],
) -> ScheduleResult<ScheduleRuleset> {
    // One row per input, one column per week slot.
    let matrix: Vec<Vec<Vec<f64>>> = schedules
        .iter()
        .zip(rule_indices)
        .map(|(sched, indices)| {
            sched
                .week_days(indices)
                .into_iter()
                .chain([sched.holiday_or_default(), sched.summer_or_default(), sched.winter_or_default()])
                .map(|day| day.values_at_timestep(timestep))
                .collect()
        })
        .collect();

    let steps = timestep.steps_per_day();
    let mut slots: Vec<Vec<f64>> = (0..WEEK_SLOTS)
        .map(|slot| {
            (0..steps)
                .map(|i| matrix.iter().zip(weights).map(|(row, w)| row[slot][i] * w).sum())
                .collect()
        })
        .collect();

    let winter = slots.pop().unwrap_or_default();
    let summer = slots.pop().unwrap_or_default();
    let holiday = slots.pop().unwrap_or_default();
    let days: [Vec<f64>; 7] = slots.try_into().map_err(|s: Vec<Vec<f64>>| ScheduleError::LengthMismatch {
        expected: 7,
        got:      s.len(),
        what:     "weekday arrays",
    })?;

    let week = WeekValues {
        days,
        holiday,
        summer_designday: Some(summer),
        winter_designday: Some(winter),
    };
    ScheduleRuleset::from_week_daily_values(
        identifier,
        &week,
        timestep,
        schedules[0].schedule_type_limit().cloned(),
    )
}

//! `ScheduleRuleset`: a default day plus prioritized rules, resolved into
//! dense annual arrays.
//!
//! # Resolution (per day of year)
//!
//! ```text
//! holiday:  first rule with apply_holiday whose date range covers doy
//!           → else holiday_schedule → else default_day_schedule
//! other:    first rule whose date range covers doy and whose flag for
//!           the weekday is set → else default_day_schedule
//! ```
//!
//! The weekday advances with a rolling counter from
//! [`ValuesOptions::start_day_of_week`], wrapping Saturday → Sunday.  Each
//! distinct `ScheduleDay` (by `Arc` identity) is sampled once per call.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use es_core::{Calendar, DayOfWeek, Identifier, MonthDay, Timestep};

use crate::{ScheduleDay, ScheduleError, ScheduleResult, ScheduleRule, ScheduleTypeLimit, ValuesOptions};

#[cfg(feature = "fx-hash")]
pub(crate) type DayMap<V> = rustc_hash::FxHashMap<*const ScheduleDay, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type DayMap<V> = HashMap<*const ScheduleDay, V>;

// ── Week inputs ───────────────────────────────────────────────────────────────

/// Dense daily arrays for one typical week, Sunday first.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekValues {
    pub days:             [Vec<f64>; 7],
    pub holiday:          Vec<f64>,
    /// Defaults to the weekday array with the highest average.
    pub summer_designday: Option<Vec<f64>>,
    /// Defaults to the weekday array with the lowest average.
    pub winter_designday: Option<Vec<f64>>,
}

/// Day schedules for one typical week, Sunday first.
#[derive(Clone, Debug)]
pub struct WeekSchedules {
    pub days:             [Arc<ScheduleDay>; 7],
    pub holiday:          Arc<ScheduleDay>,
    pub summer_designday: Arc<ScheduleDay>,
    pub winter_designday: Arc<ScheduleDay>,
}

/// A run of consecutive days of the year sharing the same set of rules whose
/// date ranges cover them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekPeriod {
    pub rule_indices: Vec<usize>,
    pub start_date:   MonthDay,
    pub end_date:     MonthDay,
}

// ── ScheduleRuleset ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleRuleset {
    identifier:                Identifier,
    display_name:              Option<String>,
    default_day_schedule:      Arc<ScheduleDay>,
    schedule_rules:            Vec<ScheduleRule>,
    holiday_schedule:          Option<Arc<ScheduleDay>>,
    summer_designday_schedule: Option<Arc<ScheduleDay>>,
    winter_designday_schedule: Option<Arc<ScheduleDay>>,
    schedule_type_limit:       Option<ScheduleTypeLimit>,
}

impl ScheduleRuleset {
    /// Start building a ruleset around `default_day`.
    pub fn builder(
        identifier:  Identifier,
        default_day: impl Into<Arc<ScheduleDay>>,
    ) -> ScheduleRulesetBuilder {
        ScheduleRulesetBuilder::new(identifier, default_day)
    }

    /// A ruleset holding `value` all year.
    pub fn from_constant_value(
        identifier:          Identifier,
        value:               f64,
        schedule_type_limit: Option<ScheduleTypeLimit>,
    ) -> ScheduleResult<Self> {
        let day = ScheduleDay::constant(identifier.with_suffix("_Day Schedule"), value)?;
        Self::builder(identifier, day).schedule_type_limit(schedule_type_limit).build()
    }

    /// A ruleset repeating one day of `24 * timestep` values.
    pub fn from_daily_values(
        identifier:          Identifier,
        daily_values:        &[f64],
        timestep:            Timestep,
        schedule_type_limit: Option<ScheduleTypeLimit>,
    ) -> ScheduleResult<Self> {
        let day = ScheduleDay::from_values_at_timestep(
            identifier.with_suffix("_Day Schedule"),
            daily_values,
            timestep,
            true,
        )?;
        Self::builder(identifier, day).schedule_type_limit(schedule_type_limit).build()
    }

    /// A ruleset from one dense array per weekday.
    ///
    /// Identical weekday arrays share one `ScheduleDay` and one rule.  The
    /// Sunday day becomes the default; the remaining distinct days become
    /// rules.  Day identifiers are `{identifier}_{Weekday}` and
    /// `{identifier}_Hol`.
    pub fn from_week_daily_values(
        identifier:          Identifier,
        week:                &WeekValues,
        timestep:            Timestep,
        schedule_type_limit: Option<ScheduleTypeLimit>,
    ) -> ScheduleResult<Self> {
        let mut rules: Vec<ScheduleRule> = Vec::new();
        let mut applied: Vec<&[f64]> = Vec::new();
        for (day, vals) in DayOfWeek::ALL.into_iter().zip(&week.days) {
            match applied.iter().position(|a| *a == vals.as_slice()) {
                Some(i) => rules[i].set_apply_day(day, true),
                None => {
                    let id = identifier.with_suffix(&format!("_{day}"));
                    let sched = ScheduleDay::from_values_at_timestep(id, vals, timestep, true)?;
                    rules.push(ScheduleRule::new(sched).with_day(day));
                    applied.push(vals);
                }
            }
        }

        let holiday = ScheduleDay::from_values_at_timestep(
            identifier.with_suffix("_Hol"),
            &week.holiday,
            timestep,
            true,
        )?;

        let averages: Vec<f64> = applied
            .iter()
            .map(|v| v.iter().sum::<f64>() / v.len() as f64)
            .collect();
        let design_day = |values: &Option<Vec<f64>>, suffix: &str, pick: usize| match values {
            Some(v) => ScheduleDay::from_values_at_timestep(
                identifier.with_suffix(suffix),
                v,
                timestep,
                true,
            ),
            None => {
                let src = rules[pick].schedule_day();
                Ok(src.with_identifier(src.identifier().with_suffix(suffix)))
            }
        };
        let summer = design_day(&week.summer_designday, "_SmrDsn", first_extreme(&averages, |a, b| a > b))?;
        let winter = design_day(&week.winter_designday, "_WntrDsn", first_extreme(&averages, |a, b| a < b))?;

        let mut rules = rules.into_iter();
        let default = rules.next().ok_or(ScheduleError::EmptyInput("weekday schedule"))?;
        Self::builder(identifier, default.schedule_day().clone())
            .rules(rules.collect())
            .holiday_schedule(holiday)
            .summer_designday_schedule(summer)
            .winter_designday_schedule(winter)
            .schedule_type_limit(schedule_type_limit)
            .build()
    }

    /// A ruleset from one `ScheduleDay` per weekday plus the special days.
    ///
    /// Weekdays sharing an identifier share a rule.  Special days whose
    /// identifier is already used by a weekday are copied under a suffixed
    /// identifier.
    pub fn from_week_day_schedules(
        identifier:          Identifier,
        week:                WeekSchedules,
        schedule_type_limit: Option<ScheduleTypeLimit>,
    ) -> ScheduleResult<Self> {
        let mut rules: Vec<ScheduleRule> = Vec::new();
        let mut applied: Vec<Identifier> = Vec::new();
        for (day, sched) in DayOfWeek::ALL.into_iter().zip(week.days) {
            match applied.iter().position(|id| id == sched.identifier()) {
                Some(i) => rules[i].set_apply_day(day, true),
                None => {
                    applied.push(sched.identifier().clone());
                    rules.push(ScheduleRule::new(sched).with_day(day));
                }
            }
        }

        let distinct = |sched: Arc<ScheduleDay>, suffix: &str| {
            if applied.contains(sched.identifier()) {
                Arc::new(sched.with_identifier(sched.identifier().with_suffix(suffix)))
            } else {
                sched
            }
        };
        let holiday = distinct(week.holiday, "_Hol");
        let summer = distinct(week.summer_designday, "_SmrDsn");
        let winter = distinct(week.winter_designday, "_WntrDsn");

        let mut rules = rules.into_iter();
        let default = rules.next().ok_or(ScheduleError::EmptyInput("weekday schedule"))?;
        Self::builder(identifier, default.schedule_day().clone())
            .rules(rules.collect())
            .holiday_schedule(holiday)
            .summer_designday_schedule(summer)
            .winter_designday_schedule(winter)
            .schedule_type_limit(schedule_type_limit)
            .build()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.identifier.as_str())
    }

    pub fn raw_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn default_day_schedule(&self) -> &Arc<ScheduleDay> {
        &self.default_day_schedule
    }

    /// Rules in priority order (first match wins).
    pub fn schedule_rules(&self) -> &[ScheduleRule] {
        &self.schedule_rules
    }

    pub fn holiday_schedule(&self) -> Option<&Arc<ScheduleDay>> {
        self.holiday_schedule.as_ref()
    }

    pub fn summer_designday_schedule(&self) -> Option<&Arc<ScheduleDay>> {
        self.summer_designday_schedule.as_ref()
    }

    pub fn winter_designday_schedule(&self) -> Option<&Arc<ScheduleDay>> {
        self.winter_designday_schedule.as_ref()
    }

    pub fn holiday_or_default(&self) -> &Arc<ScheduleDay> {
        self.holiday_schedule.as_ref().unwrap_or(&self.default_day_schedule)
    }

    pub fn summer_or_default(&self) -> &Arc<ScheduleDay> {
        self.summer_designday_schedule.as_ref().unwrap_or(&self.default_day_schedule)
    }

    pub fn winter_or_default(&self) -> &Arc<ScheduleDay> {
        self.winter_designday_schedule.as_ref().unwrap_or(&self.default_day_schedule)
    }

    pub fn schedule_type_limit(&self) -> Option<&ScheduleTypeLimit> {
        self.schedule_type_limit.as_ref()
    }

    /// Every distinct day schedule (by identity): default, summer, winter,
    /// holiday, then rule days in priority order.
    pub fn day_schedules(&self) -> Vec<&Arc<ScheduleDay>> {
        let mut days: Vec<&Arc<ScheduleDay>> = vec![&self.default_day_schedule];
        let specials = [
            &self.summer_designday_schedule,
            &self.winter_designday_schedule,
            &self.holiday_schedule,
        ];
        let candidates = specials
            .into_iter()
            .flatten()
            .chain(self.schedule_rules.iter().map(ScheduleRule::schedule_day));
        for day in candidates {
            if !days.iter().any(|d| Arc::ptr_eq(d, day)) {
                days.push(day);
            }
        }
        days
    }

    /// `true` when one constant value covers every day.
    pub fn is_constant(&self) -> bool {
        self.default_day_schedule.is_constant()
            && self.schedule_rules.is_empty()
            && self.holiday_schedule.is_none()
            && self.summer_designday_schedule.is_none()
            && self.winter_designday_schedule.is_none()
    }

    /// `true` when every rule spans the whole year, so one week describes
    /// the schedule.
    pub fn is_single_week(&self) -> bool {
        self.schedule_rules.iter().all(ScheduleRule::covers_whole_year)
    }

    /// Open this ruleset for editing.
    pub fn to_builder(&self) -> ScheduleRulesetBuilder {
        ScheduleRulesetBuilder {
            identifier:                self.identifier.clone(),
            display_name:              self.display_name.clone(),
            default_day_schedule:      self.default_day_schedule.clone(),
            schedule_rules:            self.schedule_rules.clone(),
            holiday_schedule:          self.holiday_schedule.clone(),
            summer_designday_schedule: self.summer_designday_schedule.clone(),
            winter_designday_schedule: self.winter_designday_schedule.clone(),
            schedule_type_limit:       self.schedule_type_limit.clone(),
        }
    }

    // ── Resolution ────────────────────────────────────────────────────────

    /// The day schedule in effect on `doy`.
    pub fn schedule_day_for(
        &self,
        doy:        u32,
        dow:        DayOfWeek,
        is_holiday: bool,
        calendar:   Calendar,
    ) -> &Arc<ScheduleDay> {
        if is_holiday {
            return self
                .schedule_rules
                .iter()
                .find(|r| r.apply_holiday() && r.does_rule_apply_doy(doy, calendar))
                .map(ScheduleRule::schedule_day)
                .unwrap_or_else(|| self.holiday_or_default());
        }
        self.schedule_rules
            .iter()
            .find(|r| r.does_rule_apply(doy, dow, calendar))
            .map(ScheduleRule::schedule_day)
            .unwrap_or(&self.default_day_schedule)
    }

    /// Dense array over `opts.start_date ..= opts.end_date`, with
    /// `24 * timestep` values per day.
    pub fn values(&self, opts: &ValuesOptions) -> ScheduleResult<Vec<f64>> {
        if opts.start_date > opts.end_date {
            return Err(ScheduleError::DateRange { start: opts.start_date, end: opts.end_date });
        }
        let calendar = Calendar::new(opts.leap_year);
        let start = calendar.doy(opts.start_date)?;
        let end = calendar.doy(opts.end_date)?;
        let holidays: HashSet<u32> = opts
            .holidays
            .iter()
            .map(|h| calendar.doy(*h))
            .collect::<Result<_, _>>()?;

        let steps = opts.timestep.steps_per_day();
        let mut memo: DayMap<Vec<f64>> = DayMap::default();
        let mut out = Vec::with_capacity((end - start + 1) as usize * steps);
        let mut dow = opts.start_day_of_week;
        for doy in start..=end {
            let day = self.schedule_day_for(doy, dow, holidays.contains(&doy), calendar);
            let dense = memo
                .entry(Arc::as_ptr(day))
                .or_insert_with(|| day.values_at_timestep(opts.timestep));
            out.extend_from_slice(dense);
            dow = dow.next();
        }

        log::trace!(
            "ruleset {}: {} days at {} from {} distinct day schedules",
            self.identifier,
            end - start + 1,
            opts.timestep,
            memo.len(),
        );
        Ok(out)
    }

    /// [`values`](Self::values) for many rulesets with the same options.
    /// Runs on Rayon's thread pool with the `parallel` feature.
    pub fn values_for_all(
        rulesets: &[ScheduleRuleset],
        opts:     &ValuesOptions,
    ) -> ScheduleResult<Vec<Vec<f64>>> {
        #[cfg(not(feature = "parallel"))]
        {
            rulesets.iter().map(|r| r.values(opts)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            rulesets.par_iter().map(|r| r.values(opts)).collect()
        }
    }

    /// Indices of the rules whose date range covers `doy` of a regular year.
    pub fn rules_on_doy(&self, doy: u32) -> Vec<usize> {
        self.schedule_rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.does_rule_apply_doy(doy, Calendar::REGULAR))
            .map(|(i, _)| i)
            .collect()
    }

    /// Day schedule for each weekday (Sunday first) when only the rules at
    /// `rule_indices` are active.
    pub fn week_days(&self, rule_indices: &[usize]) -> [&Arc<ScheduleDay>; 7] {
        std::array::from_fn(|d| {
            rule_indices
                .iter()
                .filter_map(|&i| self.schedule_rules.get(i))
                .find(|r| r.week_apply_tuple()[d])
                .map(ScheduleRule::schedule_day)
                .unwrap_or(&self.default_day_schedule)
        })
    }

    /// Split a regular year into runs of days sharing the same active rules.
    pub fn week_periods(&self) -> ScheduleResult<Vec<WeekPeriod>> {
        if self.is_single_week() {
            return Ok(vec![WeekPeriod {
                rule_indices: (0..self.schedule_rules.len()).collect(),
                start_date:   MonthDay::JAN_1,
                end_date:     MonthDay::DEC_31,
            }]);
        }
        let keys: Vec<Vec<usize>> = (1..=Calendar::REGULAR.days_in_year())
            .map(|doy| self.rules_on_doy(doy))
            .collect();
        Ok(year_runs(&keys)?
            .into_iter()
            .map(|(rule_indices, start_date, end_date)| WeekPeriod { rule_indices, start_date, end_date })
            .collect())
    }

    /// Rules reproducing this ruleset between `start_date` and `end_date`,
    /// for splicing into another ruleset.
    ///
    /// Overlapping rules are clipped to the window (a reversed rule can
    /// contribute two pieces).  A final rule with the default day covers
    /// every weekday that no clipped rule covers across the whole window.
    pub fn to_rules(&self, start_date: MonthDay, end_date: MonthDay) -> ScheduleResult<Vec<ScheduleRule>> {
        if start_date > end_date {
            return Err(ScheduleError::DateRange { start: start_date, end: end_date });
        }
        let cal = Calendar::REGULAR;
        let (lo, hi) = (cal.rule_doy(start_date), cal.rule_doy(end_date));
        let to_md = |doy: u32| -> ScheduleResult<MonthDay> {
            if doy == lo {
                Ok(start_date)
            } else if doy == hi {
                Ok(end_date)
            } else {
                Ok(cal.month_day(doy)?)
            }
        };

        let mut rules = Vec::new();
        let mut covered = [false; 7];
        for rule in &self.schedule_rules {
            for (seg_start, seg_end) in rule.doy_segments() {
                let (a, b) = (seg_start.max(lo), seg_end.min(hi));
                if a > b {
                    continue;
                }
                if a == lo && b == hi {
                    for (c, applies) in covered.iter_mut().zip(rule.week_apply_tuple()) {
                        *c |= applies;
                    }
                }
                rules.push(rule.clone().with_dates(to_md(a)?, to_md(b)?));
            }
        }

        let uncovered = covered.map(|c| !c);
        if uncovered.iter().any(|&d| d) {
            rules.push(
                ScheduleRule::new(self.default_day_schedule.clone())
                    .with_days(uncovered)
                    .with_dates(start_date, end_date),
            );
        }
        Ok(rules)
    }

    /// Shift every day schedule by `step_count` steps (positive = later).
    pub fn shift_by_step(&self, step_count: i32, timestep: Timestep) -> ScheduleResult<Self> {
        let mut shifted: DayMap<Arc<ScheduleDay>> = DayMap::default();
        for day in self.day_schedules() {
            shifted.insert(Arc::as_ptr(day), Arc::new(day.shift_by_step(step_count, timestep)?));
        }
        let map = |day: &Arc<ScheduleDay>| {
            shifted.get(&Arc::as_ptr(day)).cloned().unwrap_or_else(|| day.clone())
        };

        let minutes = i64::from(timestep.minutes()) * i64::from(step_count);
        let mut builder = Self::builder(
            self.identifier.with_suffix(&format!("_Shift_{minutes}mins")),
            map(&self.default_day_schedule),
        )
        .rules(
            self.schedule_rules
                .iter()
                .map(|r| r.clone().with_schedule_day(map(r.schedule_day())))
                .collect(),
        )
        .schedule_type_limit(self.schedule_type_limit.clone());
        builder.holiday_schedule = self.holiday_schedule.as_ref().map(map);
        builder.summer_designday_schedule = self.summer_designday_schedule.as_ref().map(map);
        builder.winter_designday_schedule = self.winter_designday_schedule.as_ref().map(map);
        builder.build()
    }
}

impl fmt::Display for ScheduleRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScheduleRuleset: {} [default: {}] [rules: {}]",
            self.display_name(),
            self.default_day_schedule.display_name(),
            self.schedule_rules.len(),
        )
    }
}

// ── ScheduleRulesetBuilder ────────────────────────────────────────────────────

/// Fluent builder for [`ScheduleRuleset`].
///
/// # Optional inputs (have defaults)
///
/// | Method                           | Default              |
/// |----------------------------------|----------------------|
/// | `.rules(v)` / `.rule(r)`         | No rules             |
/// | `.holiday_schedule(d)`           | Default day          |
/// | `.summer_designday_schedule(d)`  | Default day          |
/// | `.winter_designday_schedule(d)`  | Default day          |
/// | `.schedule_type_limit(l)`        | None                 |
///
/// # Example
///
/// ```rust,ignore
/// let ruleset = ScheduleRuleset::builder(id, weekday)
///     .rule(weekend_rule)
///     .holiday_schedule(holiday)
///     .schedule_type_limit(Some(ScheduleTypeLimit::fractional()))
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct ScheduleRulesetBuilder {
    identifier:                Identifier,
    display_name:              Option<String>,
    default_day_schedule:      Arc<ScheduleDay>,
    schedule_rules:            Vec<ScheduleRule>,
    holiday_schedule:          Option<Arc<ScheduleDay>>,
    summer_designday_schedule: Option<Arc<ScheduleDay>>,
    winter_designday_schedule: Option<Arc<ScheduleDay>>,
    schedule_type_limit:       Option<ScheduleTypeLimit>,
}

impl ScheduleRulesetBuilder {
    pub fn new(identifier: Identifier, default_day: impl Into<Arc<ScheduleDay>>) -> Self {
        Self {
            identifier,
            display_name:              None,
            default_day_schedule:      default_day.into(),
            schedule_rules:            Vec::new(),
            holiday_schedule:          None,
            summer_designday_schedule: None,
            winter_designday_schedule: None,
            schedule_type_limit:       None,
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

    pub fn default_day_schedule(mut self, day: impl Into<Arc<ScheduleDay>>) -> Self {
        self.default_day_schedule = day.into();
        self
    }

    /// Replace all rules; index 0 has the highest priority.
    pub fn rules(mut self, rules: Vec<ScheduleRule>) -> Self {
        self.schedule_rules = rules;
        self
    }

    /// Append a rule at the lowest priority.
    pub fn rule(mut self, rule: ScheduleRule) -> Self {
        self.schedule_rules.push(rule);
        self
    }

    pub fn holiday_schedule(mut self, day: impl Into<Arc<ScheduleDay>>) -> Self {
        self.holiday_schedule = Some(day.into());
        self
    }

    pub fn summer_designday_schedule(mut self, day: impl Into<Arc<ScheduleDay>>) -> Self {
        self.summer_designday_schedule = Some(day.into());
        self
    }

    pub fn winter_designday_schedule(mut self, day: impl Into<Arc<ScheduleDay>>) -> Self {
        self.winter_designday_schedule = Some(day.into());
        self
    }

    pub fn schedule_type_limit(mut self, limit: Option<ScheduleTypeLimit>) -> Self {
        self.schedule_type_limit = limit;
        self
    }

    pub fn schedule_rules(&self) -> &[ScheduleRule] {
        &self.schedule_rules
    }

    /// Insert a rule at the highest priority.
    pub fn add_rule(&mut self, rule: ScheduleRule) -> &mut Self {
        self.schedule_rules.insert(0, rule);
        self
    }

    /// Append a rule at the lowest priority.
    pub fn push_rule(&mut self, rule: ScheduleRule) -> &mut Self {
        self.schedule_rules.push(rule);
        self
    }

    pub fn remove_rule(&mut self, index: usize) -> ScheduleResult<ScheduleRule> {
        self.check_rule_index(index)?;
        Ok(self.schedule_rules.remove(index))
    }

    /// Move the rule at `index` to `new_index` (0 = highest priority).
    pub fn reorder_rule(&mut self, index: usize, new_index: usize) -> ScheduleResult<&mut Self> {
        self.check_rule_index(index)?;
        self.check_rule_index(new_index)?;
        let rule = self.schedule_rules.remove(index);
        self.schedule_rules.insert(new_index, rule);
        Ok(self)
    }

    fn check_rule_index(&self, index: usize) -> ScheduleResult<()> {
        if index >= self.schedule_rules.len() {
            return Err(ScheduleError::IndexOutOfRange {
                index,
                len:  self.schedule_rules.len(),
                what: "schedule rules",
            });
        }
        Ok(())
    }

    /// Validate and build.  Two different day schedules may not share an
    /// identifier.
    pub fn build(self) -> ScheduleResult<ScheduleRuleset> {
        let ruleset = ScheduleRuleset {
            identifier:                self.identifier,
            display_name:              self.display_name,
            default_day_schedule:      self.default_day_schedule,
            schedule_rules:            self.schedule_rules,
            holiday_schedule:          self.holiday_schedule,
            summer_designday_schedule: self.summer_designday_schedule,
            winter_designday_schedule: self.winter_designday_schedule,
            schedule_type_limit:       self.schedule_type_limit,
        };

        let mut seen: HashMap<&str, &ScheduleDay> = HashMap::new();
        for day in ruleset.day_schedules() {
            match seen.get(day.identifier().as_str()) {
                Some(prev) if **prev != **day => {
                    return Err(ScheduleError::DuplicateDayIdentifier(day.identifier().to_string()));
                }
                Some(_) => {}
                None => {
                    seen.insert(day.identifier().as_str(), day);
                }
            }
        }
        Ok(ruleset)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Index of the first element that beats every other under `better`.
fn first_extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, values[best]) {
            best = i;
        }
    }
    best
}

/// Group per-day keys (index 0 = Jan 1 of a regular year) into runs of
/// equal consecutive keys with their date ranges.
pub(crate) fn year_runs<K: PartialEq + Clone>(keys: &[K]) -> ScheduleResult<Vec<(K, MonthDay, MonthDay)>> {
    let cal = Calendar::REGULAR;
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=keys.len() {
        if i == keys.len() || keys[i] != keys[start] {
            runs.push((
                keys[start].clone(),
                cal.month_day(start as u32 + 1)?,
                cal.month_day(i as u32)?,
            ));
            start = i;
        }
    }
    Ok(runs)
}

//! CSV week-schedule loader.
//!
//! # CSV format
//!
//! One row per day type of a schedule.  Values follow the three key columns;
//! a row holds `24 * timestep` of them.
//!
//! ```csv
//! identifier,day_type,timestep,v0,v1,...,v23
//! Office Occ,sunday,1,0,0,...,0
//! Office Occ,monday,1,0,0,...,0
//! ...
//! Office Occ,holiday,1,0,0,...,0
//! ```
//!
//! **`day_type`** field:
//!
//! | Value                          | Meaning                                 |
//! |--------------------------------|-----------------------------------------|
//! | `sunday` … `saturday`          | Values for that weekday (required)      |
//! | `holiday`                      | Holiday values (required)               |
//! | `summer_design`                | Summer design day (optional)            |
//! | `winter_design`                | Winter design day (optional)            |
//!
//! Every row of one schedule must share its `timestep`.  Each schedule is
//! built with [`ScheduleRuleset::from_week_daily_values`]; schedules are
//! returned in order of first appearance.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use es_core::{DayOfWeek, Identifier, Timestep};

use crate::{ScheduleError, ScheduleResult, ScheduleRuleset, ScheduleTypeLimit, WeekValues};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct WeekRecord {
    identifier: String,
    day_type:   String,
    timestep:   u32,
    values:     Vec<f64>,
}

/// Rows collected for one schedule before construction.
struct WeekRows {
    identifier: String,
    timestep:   u32,
    days:       [Option<Vec<f64>>; 7],
    holiday:    Option<Vec<f64>>,
    summer:     Option<Vec<f64>>,
    winter:     Option<Vec<f64>>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load week schedules from a CSV file.  `type_limit` is attached to every
/// ruleset.
pub fn load_week_schedules_csv(
    path:       &Path,
    type_limit: Option<&ScheduleTypeLimit>,
) -> ScheduleResult<Vec<ScheduleRuleset>> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_week_schedules_reader(file, type_limit)
}

/// Like [`load_week_schedules_csv`] but accepts any `Read` source.
pub fn load_week_schedules_reader<R: Read>(
    reader:     R,
    type_limit: Option<&ScheduleTypeLimit>,
) -> ScheduleResult<Vec<ScheduleRuleset>> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    // Rows are decoded positionally so the trailing `values` sequence absorbs
    // every remaining column regardless of the header names.
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut groups: Vec<WeekRows> = Vec::new();

    for result in csv_reader.records() {
        let record = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let row: WeekRecord = record
            .deserialize(None)
            .map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let idx = match groups.iter().position(|g| g.identifier == row.identifier) {
            Some(i) => i,
            None => {
                groups.push(WeekRows::new(row.identifier.clone(), row.timestep));
                groups.len() - 1
            }
        };
        groups[idx].insert(row)?;
    }

    // ── Build one ScheduleRuleset per identifier ──────────────────────────
    let rulesets = groups
        .into_iter()
        .map(|g| g.build(type_limit))
        .collect::<ScheduleResult<Vec<_>>>()?;
    log::info!("loaded {} week schedules from CSV", rulesets.len());
    Ok(rulesets)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

impl WeekRows {
    fn new(identifier: String, timestep: u32) -> Self {
        Self {
            identifier,
            timestep,
            days: Default::default(),
            holiday: None,
            summer: None,
            winter: None,
        }
    }

    fn insert(&mut self, row: WeekRecord) -> ScheduleResult<()> {
        if row.timestep != self.timestep {
            return Err(ScheduleError::Parse(format!(
                "schedule {:?} mixes timesteps {} and {}",
                self.identifier, self.timestep, row.timestep
            )));
        }
        let slot = match row.day_type.trim().to_ascii_lowercase().as_str() {
            "holiday" => &mut self.holiday,
            "summer_design" => &mut self.summer,
            "winter_design" => &mut self.winter,
            other => {
                let day = other.parse::<DayOfWeek>().map_err(|_| {
                    ScheduleError::Parse(format!(
                        "invalid day_type {:?}: expected a weekday name, \"holiday\", \
                         \"summer_design\" or \"winter_design\"",
                        row.day_type
                    ))
                })?;
                &mut self.days[day.index()]
            }
        };
        if slot.is_some() {
            log::warn!(
                "schedule {:?}: duplicate {} row replaces the earlier one",
                self.identifier,
                row.day_type
            );
        }
        *slot = Some(row.values);
        Ok(())
    }

    fn build(self, type_limit: Option<&ScheduleTypeLimit>) -> ScheduleResult<ScheduleRuleset> {
        let missing = |what: &str| {
            ScheduleError::Parse(format!("schedule {:?} has no {what} row", self.identifier))
        };
        let mut days: Vec<Vec<f64>> = Vec::with_capacity(7);
        for (day, values) in DayOfWeek::ALL.into_iter().zip(self.days.iter()) {
            days.push(values.clone().ok_or_else(|| missing(day.name()))?);
        }
        let week = WeekValues {
            days:             days.try_into().map_err(|_| missing("weekday"))?,
            holiday:          self.holiday.clone().ok_or_else(|| missing("holiday"))?,
            summer_designday: self.summer.clone(),
            winter_designday: self.winter.clone(),
        };
        ScheduleRuleset::from_week_daily_values(
            Identifier::new(self.identifier.as_str())?,
            &week,
            Timestep::new(self.timestep)?,
            type_limit.cloned(),
        )
    }
}

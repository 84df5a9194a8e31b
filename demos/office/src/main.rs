//! office — small end-to-end example for the energy_sched toolkit.
//!
//! Builds an office occupancy schedule and a lobby schedule, blends them into
//! a floor-area-weighted average, evaluates all three over a year and writes
//! them out as IDF and JSON.  Each format is reloaded into its own
//! `ScheduleLibrary` to check it reproduces the same annual values.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, ensure};

use es_core::{DayOfWeek, Identifier, MonthDay, Time, Timestep};
use es_io::{ScheduleLibrary, ruleset_to_idf_text, ruleset_to_json};
use es_schedule::{ScheduleDay, ScheduleRule, ScheduleRuleset, ScheduleTypeLimit, ValuesOptions, WeekValues};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR:   &str = "output/office";
const OFFICE_SHARE: f64  = 0.75; // floor area fraction; the lobby takes the rest
const TIMESTEP:     u32  = 4;    // 15-minute samples

// ── Schedules ─────────────────────────────────────────────────────────────────

fn day(name: &str, values: &[f64], hours: &[u32]) -> Result<ScheduleDay> {
    let times = hours.iter().map(|&h| Time::new(h, 0)).collect::<Result<Vec<_>, _>>()?;
    Ok(ScheduleDay::new(Identifier::new(name)?, values.to_vec(), times, false)?)
}

/// Weekdays 09:00–19:00 with a half-occupied evening, shorter summer Fridays.
fn office() -> Result<ScheduleRuleset> {
    let weekday = Arc::new(day("Office Weekday", &[0.0, 1.0, 0.5, 0.0], &[0, 9, 17, 19])?);
    let friday = Arc::new(day("Office Summer Friday", &[0.0, 1.0, 0.0], &[0, 9, 14])?);
    let weekend = day("Office Weekend", &[0.0], &[0])?;

    let weekdays = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];
    let summer_fridays = ScheduleRule::new(friday)
        .with_day(DayOfWeek::Friday)
        .with_dates(MonthDay::new(6, 1)?, MonthDay::new(8, 31)?);
    let weekday_rule = weekdays.into_iter().fold(ScheduleRule::new(weekday.clone()), ScheduleRule::with_day);

    Ok(ScheduleRuleset::builder(Identifier::new("Office Occ")?, weekend)
        .rule(summer_fridays)
        .rule(weekday_rule)
        .summer_designday_schedule(weekday)
        .schedule_type_limit(Some(ScheduleTypeLimit::fractional()))
        .build()?)
}

/// Lit 08:00–20:00 every day, with a low background level.
fn lobby() -> Result<ScheduleRuleset> {
    let steps = Timestep::HOURLY.steps_per_day();
    let open: Vec<f64> = (0..steps).map(|h| if (8..20).contains(&h) { 1.0 } else { 0.1 }).collect();
    let week = WeekValues {
        days:             std::array::from_fn(|_| open.clone()),
        holiday:          vec![0.1; steps],
        summer_designday: None,
        winter_designday: None,
    };
    Ok(ScheduleRuleset::from_week_daily_values(
        Identifier::new("Lobby Occ")?,
        &week,
        Timestep::HOURLY,
        Some(ScheduleTypeLimit::fractional()),
    )?)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== office — energy_sched schedules ===");

    let office = office()?;
    let lobby = lobby()?;
    let floor = ScheduleRuleset::average_schedules(
        Identifier::new("Floor Occ")?,
        &[office.clone(), lobby.clone()],
        Some(&[OFFICE_SHARE, 1.0 - OFFICE_SHARE]),
        Timestep::HOURLY,
    )?;
    let schedules = vec![office, lobby, floor];

    // 1. Evaluate a year with New Year's Day and Christmas as holidays.
    let opts = ValuesOptions::default()
        .timestep(Timestep::new(TIMESTEP)?)
        .start_day_of_week(DayOfWeek::Monday)
        .holidays(vec![MonthDay::JAN_1, MonthDay::new(12, 25)?]);
    let t0 = Instant::now();
    let annual = ScheduleRuleset::values_for_all(&schedules, &opts)?;
    println!("Evaluated {} schedules in {:.3} ms", schedules.len(), t0.elapsed().as_secs_f64() * 1e3);
    println!();

    // 2. Summary table.  Full-load hours = sum of fractions × hours per step.
    println!("{:<12} {:>6} {:>6} {:>10} {:>8}", "Schedule", "Days", "Rules", "Full-load h", "Peak");
    println!("{}", "-".repeat(46));
    let hours_per_step = 1.0 / f64::from(TIMESTEP);
    for (rs, values) in schedules.iter().zip(&annual) {
        let peak = values.iter().copied().fold(f64::MIN, f64::max);
        println!(
            "{:<12} {:>6} {:>6} {:>10.1} {:>8.3}",
            rs.identifier().as_str(),
            rs.day_schedules().len(),
            rs.schedule_rules().len(),
            values.iter().sum::<f64>() * hours_per_step,
            peak,
        );
    }
    println!();

    // 3. Write IDF and JSON.
    let out = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(out)?;
    let mut idf_lib = ScheduleLibrary::standard();
    let mut json_lib = ScheduleLibrary::standard();
    for rs in &schedules {
        let stem = rs.identifier().as_str().replace(' ', "_");
        let idf_path = out.join(format!("{stem}.idf"));
        let json_path = out.join(format!("{stem}.json"));
        std::fs::write(&idf_path, ruleset_to_idf_text(rs)?)?;
        std::fs::write(&json_path, ruleset_to_json(rs, false)?)?;
        idf_lib.load_idf_file(&idf_path)?;
        json_lib.load_json_file(&json_path)?;
    }
    println!("Wrote {} IDF and JSON files to {OUTPUT_DIR}", schedules.len());

    // 4. Reload each format separately and compare.
    for (format, lib) in [("IDF", &idf_lib), ("JSON", &json_lib)] {
        ensure!(lib.len() == schedules.len(), "{format}: reloaded {} of {} schedules", lib.len(), schedules.len());
        for (rs, expected) in schedules.iter().zip(&annual) {
            let reloaded = lib.values(rs.identifier().as_str(), &opts)?;
            let same = reloaded.len() == expected.len()
                && reloaded.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-9);
            ensure!(same, "{} changed on {format} reload", rs.identifier());
        }
        println!("Reloaded {} schedules from {format}; annual values match", lib.len());
    }

    Ok(())
}

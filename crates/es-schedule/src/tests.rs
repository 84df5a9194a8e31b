//! Unit tests for es-schedule.

use std::sync::Arc;

use es_core::{Calendar, DayOfWeek, Identifier, MonthDay, Time, Timestep};

use crate::{
    ScheduleDay, ScheduleError, ScheduleRule, ScheduleRuleset, ScheduleTypeLimit, ValuesOptions,
    WeekSchedules, WeekValues,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn id(s: &str) -> Identifier {
    Identifier::new(s).unwrap()
}

fn t(h: u32, m: u32) -> Time {
    Time::new(h, m).unwrap()
}

fn md(m: u32, d: u32) -> MonthDay {
    MonthDay::new(m, d).unwrap()
}

fn ts(n: u32) -> Timestep {
    Timestep::new(n).unwrap()
}

fn day(name: &str, values: &[f64], times: &[(u32, u32)]) -> ScheduleDay {
    let times = times.iter().map(|&(h, m)| t(h, m)).collect();
    ScheduleDay::new(id(name), values.to_vec(), times, false).unwrap()
}

fn constant(name: &str, v: f64) -> Arc<ScheduleDay> {
    Arc::new(ScheduleDay::constant(id(name), v).unwrap())
}

/// Occupied 09:00–17:00.
fn office_day() -> ScheduleDay {
    day("Office Occ", &[0.0, 1.0, 0.0], &[(0, 0), (9, 0), (17, 0)])
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length differs");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-9, "index {i}: {a} != {e}");
    }
}

/// Values for one day (`24 * timestep` samples) out of an annual array.
fn day_slice(values: &[f64], day_index: usize, timestep: usize) -> &[f64] {
    let n = 24 * timestep;
    &values[day_index * n..(day_index + 1) * n]
}

// ── ScheduleDay ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod schedule_day {
    use super::*;

    #[test]
    fn step_values_hourly() {
        let vals = office_day().values_at_timestep(Timestep::HOURLY);
        let mut expected = vec![0.0; 24];
        expected[9..17].fill(1.0);
        assert_eq!(vals, expected);
    }

    #[test]
    fn step_values_sub_hourly() {
        let d = day("Half", &[0.0, 1.0], &[(0, 0), (9, 30)]);
        let vals = d.values_at_timestep(ts(4));
        assert_eq!(vals.len(), 96);
        assert_eq!(vals[37], 0.0); // 09:15
        assert_eq!(vals[38], 1.0); // 09:30
    }

    #[test]
    fn several_breakpoints_inside_one_step_take_the_latest() {
        let d = day("Blip", &[0.0, 5.0, 2.0], &[(0, 0), (3, 10), (3, 20)]);
        let vals = d.values_at_timestep(Timestep::HOURLY);
        assert_eq!(vals[3], 0.0);
        assert_eq!(vals[4], 2.0);
    }

    #[test]
    fn interpolated_matches_energyplus_linear() {
        let d = ScheduleDay::new(
            id("Ramp"),
            vec![1.0, 2.0, 1.0, 2.0, 1.0],
            vec![t(0, 0), t(6, 0), t(12, 0), t(16, 0), t(20, 0)],
            true,
        )
        .unwrap();
        let expected = [
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
            1.0 + 1.0 / 6.0, 1.0 + 2.0 / 6.0, 1.5, 1.0 + 4.0 / 6.0, 1.0 + 5.0 / 6.0, 2.0,
            1.75, 1.5, 1.25, 1.0,
            1.25, 1.5, 1.75, 2.0,
            1.75, 1.5, 1.25, 1.0,
        ];
        assert_close(&d.values_at_timestep(Timestep::HOURLY), &expected);
    }

    #[test]
    fn interpolated_ramp_starts_at_breakpoint() {
        let d = office_day().with_interpolate(true);
        let vals = d.values_at_timestep(Timestep::HOURLY);
        assert_eq!(vals.len(), 24);
        assert_eq!(vals[8], 0.0);
        assert!((vals[9] - 0.125).abs() < 1e-12);
        assert!(vals[12] > 0.0 && vals[12] < 1.0);
        assert!((vals[16] - 1.0).abs() < 1e-12);
        assert!(vals[17] < 1.0);
        assert_eq!(vals[23], 0.0);
    }

    #[test]
    fn interpolated_breakpoint_between_samples() {
        // 09:30 sits between hourly samples: hold at the 10:00 sample, then
        // ramp over the 14.5 steps left in the day.
        let d = ScheduleDay::new(id("Morning"), vec![0.0, 1.0], vec![t(0, 0), t(9, 30)], true).unwrap();
        let vals = d.values_at_timestep(Timestep::HOURLY);
        assert_close(&vals[8..12], &[0.0, 0.0, 1.0 / 14.5, 2.0 / 14.5]);
        assert_eq!(vals[23], 1.0);

        let quarter = d.values_at_timestep(ts(4));
        assert_eq!(quarter[37], 0.0);
        assert_close(&quarter[38..40], &[1.0 / 58.0, 2.0 / 58.0]);
    }

    #[test]
    fn interpolated_constant_is_flat() {
        let d = ScheduleDay::constant(id("Flat"), 0.3).unwrap().with_interpolate(true);
        assert!(d.values_at_timestep(ts(6)).iter().all(|&v| v == 0.3));
    }

    #[test]
    fn value_at_time() {
        let d = office_day();
        assert_eq!(d.value_at(t(8, 59)), 0.0);
        assert_eq!(d.value_at(t(9, 0)), 1.0);
        assert_eq!(d.value_at(t(23, 59)), 0.0);
    }

    #[test]
    fn from_values_collapses_repeats() {
        let dense = office_day().values_at_timestep(Timestep::HOURLY);
        let d = ScheduleDay::from_values_at_timestep(id("Rebuilt"), &dense, Timestep::HOURLY, true).unwrap();
        assert_eq!(d.values(), &[0.0, 1.0, 0.0]);
        assert_eq!(d.times(), &[t(0, 0), t(9, 0), t(17, 0)]);

        let full = ScheduleDay::from_values_at_timestep(id("Full"), &dense, Timestep::HOURLY, false).unwrap();
        assert_eq!(full.len(), 24);
        assert_eq!(full.times()[23], t(23, 0));
    }

    #[test]
    fn from_values_rejects_wrong_length() {
        let err = ScheduleDay::from_values_at_timestep(id("Short"), &[0.0; 23], Timestep::HOURLY, true)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::LengthMismatch { expected: 24, got: 23, .. }));
    }

    #[test]
    fn construction_validates_breakpoints() {
        let unsorted = ScheduleDay::new(id("U"), vec![1.0, 0.0], vec![t(9, 0), t(0, 0)], false).unwrap();
        assert_eq!(unsorted.values(), &[0.0, 1.0]);
        assert_eq!(unsorted.times(), &[t(0, 0), t(9, 0)]);

        assert!(matches!(
            ScheduleDay::new(id("Late"), vec![1.0], vec![t(1, 0)], false),
            Err(ScheduleError::FirstTimeNotMidnight(_))
        ));
        assert!(matches!(
            ScheduleDay::new(id("Dup"), vec![1.0, 2.0, 3.0], vec![t(0, 0), t(5, 0), t(5, 0)], false),
            Err(ScheduleError::DuplicateTime(_))
        ));
        assert!(matches!(
            ScheduleDay::new(id("Len"), vec![1.0, 2.0], vec![t(0, 0)], false),
            Err(ScheduleError::LengthMismatch { .. })
        ));
        assert!(matches!(
            ScheduleDay::new(id("Nan"), vec![f64::NAN], vec![t(0, 0)], false),
            Err(ScheduleError::InvalidValue(_))
        ));
    }

    #[test]
    fn builder_add_value_keeps_order() {
        let original = office_day();
        let mut b = original.to_builder();
        b.add_value(0.5, t(12, 0)).unwrap();
        b.add_value(0.2, t(6, 0)).unwrap();
        let edited = b.build().unwrap();
        assert_eq!(edited.times(), &[t(0, 0), t(6, 0), t(9, 0), t(12, 0), t(17, 0)]);
        assert_eq!(edited.values(), &[0.0, 0.2, 1.0, 0.5, 0.0]);
        // The source day is untouched.
        assert_eq!(original.len(), 3);

        let mut b = original.to_builder();
        assert!(matches!(b.add_value(3.0, t(9, 0)), Err(ScheduleError::DuplicateTime(_))));
    }

    #[test]
    fn builder_remove_value_rules() {
        let mut b = office_day().to_builder();
        assert!(matches!(b.remove_value(0), Err(ScheduleError::RemoveFirstBreakpoint)));
        assert!(matches!(b.remove_value(7), Err(ScheduleError::IndexOutOfRange { .. })));
        b.remove_value_by_time(t(17, 0)).unwrap();
        b.remove_value(1).unwrap();
        assert!(matches!(b.remove_value(0), Err(ScheduleError::RemoveOnlyBreakpoint)));
        assert!(matches!(b.remove_value_by_time(t(9, 0)), Err(ScheduleError::TimeNotFound(_))));
        assert!(b.build().unwrap().is_constant());
    }

    #[test]
    fn builder_replace_value() {
        let mut b = office_day().to_builder();
        b.replace_value(1, 0.8).unwrap();
        b.replace_value_by_time(t(17, 0), 0.1).unwrap();
        let edited = b.interpolate(true).display_name("Office").build().unwrap();
        assert_eq!(edited.values(), &[0.0, 0.8, 0.1]);
        assert!(edited.interpolate());
        assert_eq!(edited.display_name(), "Office");
    }

    #[test]
    fn average_of_constants_is_midpoint() {
        let a = ScheduleDay::constant(id("A"), 0.2).unwrap();
        let b = ScheduleDay::constant(id("B"), 0.6).unwrap();
        let avg = ScheduleDay::average_schedules(id("Avg"), &[&a, &b], None, Timestep::HOURLY).unwrap();
        assert!(avg.is_constant());
        assert!((avg.values()[0] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn average_with_weights() {
        let a = constant("A", 0.0);
        let b = constant("B", 1.0);
        let avg = ScheduleDay::average_schedules(id("W"), &[a.clone(), b.clone()], Some(&[0.75, 0.25]), ts(2))
            .unwrap();
        assert!((avg.values()[0] - 0.25).abs() < 1e-12);

        let bad_sum = ScheduleDay::average_schedules(id("W"), &[a.clone(), b.clone()], Some(&[0.5, 0.6]), ts(1));
        assert!(matches!(bad_sum, Err(ScheduleError::Weights(_))));
        let bad_len = ScheduleDay::average_schedules(id("W"), &[a, b], Some(&[1.0]), ts(1));
        assert!(matches!(bad_len, Err(ScheduleError::LengthMismatch { .. })));
        let empty: [Arc<ScheduleDay>; 0] = [];
        assert!(matches!(
            ScheduleDay::average_schedules(id("E"), &empty, None, ts(1)),
            Err(ScheduleError::EmptyInput(_))
        ));
    }

    #[test]
    fn shift_by_step_rotates_values() {
        let shifted = office_day().shift_by_step(1, Timestep::HOURLY).unwrap();
        assert_eq!(shifted.identifier().as_str(), "Office Occ_Shift_60mins");
        assert_eq!(shifted.times(), &[t(0, 0), t(10, 0), t(18, 0)]);

        let back = office_day().shift_by_step(-2, ts(2)).unwrap();
        assert_eq!(back.identifier().as_str(), "Office Occ_Shift_-60mins");
        assert_eq!(back.value_at(t(8, 0)), 1.0);
    }

    #[test]
    fn shift_by_large_step_count() {
        let shifted = office_day().shift_by_step(i32::MAX, Timestep::HOURLY).unwrap();
        assert_eq!(shifted.identifier().as_str(), "Office Occ_Shift_128849018820mins");
        // i32::MAX steps is 7 hours modulo one day.
        assert_eq!(shifted.value_at(t(15, 0)), 0.0);
        assert_eq!(shifted.value_at(t(16, 0)), 1.0);

        let early = office_day().shift_by_step(i32::MIN, ts(60)).unwrap();
        assert_eq!(early.identifier().as_str(), "Office Occ_Shift_-2147483648mins");
    }

    #[test]
    fn display() {
        assert_eq!(
            office_day().to_string(),
            "ScheduleDay: Office Occ [00:00 0, 09:00 1, 17:00 0]"
        );
    }
}

// ── ScheduleRule ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod schedule_rule {
    use super::*;

    fn weekend_rule() -> ScheduleRule {
        ScheduleRule::new(constant("Weekend", 0.25))
            .with_day(DayOfWeek::Saturday)
            .with_day(DayOfWeek::Sunday)
    }

    #[test]
    fn default_rule_applies_nowhere() {
        let rule = ScheduleRule::new(constant("X", 1.0));
        assert!(rule.days_applied().is_empty());
        assert!(rule.covers_whole_year());
        assert!(!rule.does_rule_apply(10, DayOfWeek::Monday, Calendar::REGULAR));
    }

    #[test]
    fn weekday_flags() {
        let rule = weekend_rule();
        assert!(rule.apply_weekend());
        assert!(!rule.apply_weekday());
        assert!(rule.does_rule_apply(1, DayOfWeek::Sunday, Calendar::REGULAR));
        assert!(!rule.does_rule_apply(2, DayOfWeek::Monday, Calendar::REGULAR));
        assert_eq!(rule.week_apply_tuple(), [true, false, false, false, false, false, true]);
    }

    #[test]
    fn reversed_range_wraps_year_end() {
        let rule = weekend_rule()
            .with_days([true; 7])
            .with_dates(md(11, 15), md(2, 1));
        assert!(rule.is_reversed());
        let cal = Calendar::REGULAR;
        assert!(rule.does_rule_apply_doy(cal.doy(md(12, 25)).unwrap(), cal));
        assert!(rule.does_rule_apply_doy(cal.doy(md(1, 15)).unwrap(), cal));
        assert!(rule.does_rule_apply_doy(cal.doy(md(2, 1)).unwrap(), cal));
        assert!(rule.does_rule_apply_doy(cal.doy(md(11, 15)).unwrap(), cal));
        assert!(!rule.does_rule_apply_doy(cal.doy(md(6, 1)).unwrap(), cal));
        assert!(!rule.does_rule_apply_doy(cal.doy(md(2, 2)).unwrap(), cal));
    }

    #[test]
    fn leap_year_shifts_dates_after_february() {
        let rule = ScheduleRule::new(constant("March", 1.0)).with_dates(md(3, 1), md(3, 31));
        assert!(rule.does_rule_apply_doy(60, Calendar::REGULAR));
        assert!(!rule.does_rule_apply_doy(60, Calendar::LEAP)); // Feb 29
        assert!(rule.does_rule_apply_doy(61, Calendar::LEAP));
        assert!(rule.does_rule_apply_doy(91, Calendar::LEAP));
        assert!(!rule.does_rule_apply_doy(92, Calendar::LEAP));
    }

    #[test]
    fn apply_day_by_name_and_number() {
        let mut rule = ScheduleRule::new(constant("X", 1.0));
        rule.apply_day_by_name("Weekday").unwrap();
        assert!(rule.apply_weekday() && !rule.apply_weekend());
        rule.apply_day_by_name("saturday").unwrap();
        assert_eq!(rule.days_applied().len(), 6);
        rule.apply_day_by_dow(1).unwrap();
        assert!(rule.apply_all());
        assert!(rule.apply_day_by_name("funday").is_err());
        assert!(rule.apply_day_by_dow(8).is_err());

        rule.set_apply_all(false);
        rule.apply_day_by_name("weekend").unwrap();
        assert_eq!(rule.days_applied(), vec![DayOfWeek::Sunday, DayOfWeek::Saturday]);
    }

    #[test]
    fn from_days_applied() {
        let rule = ScheduleRule::from_days_applied(
            constant("Summer", 0.5),
            &["monday", "friday"],
            Some(md(7, 1)),
            None,
        )
        .unwrap();
        assert_eq!(rule.days_applied(), vec![DayOfWeek::Monday, DayOfWeek::Friday]);
        assert_eq!(rule.start_date(), md(7, 1));
        assert_eq!(rule.end_date(), MonthDay::DEC_31);
    }

    #[test]
    #[allow(deprecated)]
    fn assumed_weekday_treats_jan_1_as_sunday() {
        let rule = ScheduleRule::new(constant("Sun", 1.0)).with_day(DayOfWeek::Sunday);
        assert!(rule.does_rule_apply_assumed_dow(1, Calendar::REGULAR));
        assert!(!rule.does_rule_apply_assumed_dow(2, Calendar::REGULAR));
        assert!(rule.does_rule_apply_assumed_dow(8, Calendar::REGULAR));
    }

    #[test]
    fn display() {
        let rule = weekend_rule().with_dates(md(1, 1), md(6, 30));
        assert_eq!(
            rule.to_string(),
            "ScheduleRule: Weekend [days applied: sunday, saturday] [date range: 1 Jan - 30 Jun]"
        );
    }
}

// ── ScheduleRuleset ───────────────────────────────────────────────────────────

#[cfg(test)]
mod schedule_ruleset {
    use super::*;

    /// Default 0; weekends 0.25 all year.
    fn weekend_ruleset() -> ScheduleRuleset {
        let rule = ScheduleRule::new(constant("Weekend", 0.25))
            .with_day(DayOfWeek::Saturday)
            .with_day(DayOfWeek::Sunday);
        ScheduleRuleset::builder(id("Weekend Set"), constant("Zero", 0.0))
            .rule(rule)
            .build()
            .unwrap()
    }

    #[test]
    fn default_fallback_without_rules() {
        let rs = ScheduleRuleset::builder(id("Office"), office_day()).build().unwrap();
        let vals = rs.values(&ValuesOptions::default()).unwrap();
        assert_eq!(vals.len(), 8760);
        let day0 = office_day().values_at_timestep(Timestep::HOURLY);
        for d in [0, 100, 364] {
            assert_eq!(day_slice(&vals, d, 1), day0.as_slice());
        }
    }

    #[test]
    fn weekend_rule_first_week() {
        let opts = ValuesOptions::default().date_range(md(1, 1), md(1, 7));
        let vals = weekend_ruleset().values(&opts).unwrap();
        assert_eq!(vals.len(), 7 * 24);
        for d in 0..7 {
            let expected = if d == 0 || d == 6 { 0.25 } else { 0.0 };
            assert!(day_slice(&vals, d, 1).iter().all(|&v| v == expected), "day {d}");
        }
    }

    #[test]
    fn start_day_of_week_rolls() {
        let opts = ValuesOptions::default()
            .date_range(md(1, 1), md(1, 7))
            .start_day_of_week(DayOfWeek::Monday);
        let vals = weekend_ruleset().values(&opts).unwrap();
        // Monday start: Saturday is day 5, Sunday day 6.
        assert_eq!(day_slice(&vals, 0, 1)[0], 0.0);
        assert_eq!(day_slice(&vals, 5, 1)[0], 0.25);
        assert_eq!(day_slice(&vals, 6, 1)[0], 0.25);
    }

    #[test]
    fn first_matching_rule_wins() {
        let high = ScheduleRule::new(constant("High", 1.0)).with_days([true; 7]);
        let low = ScheduleRule::new(constant("Low", 0.5)).with_days([true; 7]);
        let rs = ScheduleRuleset::builder(id("Prio"), constant("Zero", 0.0))
            .rules(vec![high, low])
            .build()
            .unwrap();
        let vals = rs.values(&ValuesOptions::default()).unwrap();
        assert!(vals.iter().all(|&v| v == 1.0));

        let mut b = rs.to_builder();
        b.reorder_rule(1, 0).unwrap();
        let swapped = b.build().unwrap();
        assert_eq!(swapped.values(&ValuesOptions::default()).unwrap()[0], 0.5);
    }

    #[test]
    fn add_remove_rules() {
        let mut b = weekend_ruleset().to_builder();
        b.add_rule(ScheduleRule::new(constant("Top", 9.0)).with_day(DayOfWeek::Sunday));
        assert_eq!(b.schedule_rules()[0].schedule_day().identifier().as_str(), "Top");
        let removed = b.remove_rule(1).unwrap();
        assert_eq!(removed.schedule_day().identifier().as_str(), "Weekend");
        assert!(matches!(b.remove_rule(5), Err(ScheduleError::IndexOutOfRange { .. })));
        assert!(b.reorder_rule(0, 3).is_err());
        assert_eq!(b.build().unwrap().schedule_rules().len(), 1);
    }

    #[test]
    fn holidays() {
        let holiday_rule = ScheduleRule::new(constant("Hol Rule", 0.7))
            .with_apply_holiday(true)
            .with_dates(md(12, 1), md(12, 31));
        let rs = weekend_ruleset()
            .to_builder()
            .rule(holiday_rule)
            .holiday_schedule(constant("Holiday", 0.9))
            .build()
            .unwrap();
        let opts = ValuesOptions::default().holidays(vec![md(1, 2), md(12, 25)]);
        let vals = rs.values(&opts).unwrap();
        assert_eq!(day_slice(&vals, 1, 1)[0], 0.9); // Jan 2 → holiday schedule
        assert_eq!(day_slice(&vals, 358, 1)[0], 0.7); // Dec 25 → holiday rule
        assert_eq!(day_slice(&vals, 2, 1)[0], 0.0);

        // Without a holiday schedule, holidays fall back to the default.
        let plain = weekend_ruleset();
        let vals = plain.values(&ValuesOptions::default().holidays(vec![md(1, 1)])).unwrap();
        assert_eq!(vals[0], 0.0);
    }

    #[test]
    fn date_range_errors() {
        let rs = weekend_ruleset();
        let reversed = ValuesOptions::default().date_range(md(6, 1), md(1, 1));
        assert!(matches!(rs.values(&reversed), Err(ScheduleError::DateRange { .. })));

        let leap_day = ValuesOptions::default().date_range(md(2, 29), md(3, 1));
        assert!(matches!(rs.values(&leap_day), Err(ScheduleError::Core(_))));
        assert_eq!(rs.values(&leap_day.leap_year(true)).unwrap().len(), 48);
    }

    #[test]
    fn leap_year_rule_dates_follow_the_calendar() {
        let march = ScheduleRule::new(constant("March", 1.0))
            .with_days([true; 7])
            .with_dates(md(3, 1), md(3, 31));
        let rs = ScheduleRuleset::builder(id("March Set"), constant("Zero", 0.0))
            .rule(march)
            .build()
            .unwrap();

        let leap = rs.values(&ValuesOptions::default().leap_year(true)).unwrap();
        // Leap doy 60 is Feb 29; March is doy 61..=91.
        assert_eq!(day_slice(&leap, 59, 1)[0], 0.0);
        for idx in 60..=90 {
            assert!(day_slice(&leap, idx, 1).iter().all(|&v| v == 1.0), "leap doy {}", idx + 1);
        }
        assert_eq!(day_slice(&leap, 91, 1)[0], 0.0);

        let regular = rs.values(&ValuesOptions::default()).unwrap();
        assert_eq!(day_slice(&regular, 58, 1)[0], 0.0);
        assert_eq!(day_slice(&regular, 59, 1)[0], 1.0);
        assert_eq!(day_slice(&regular, 89, 1)[0], 1.0);
        assert_eq!(day_slice(&regular, 90, 1)[0], 0.0);
    }

    #[test]
    fn output_lengths() {
        let rs = weekend_ruleset();
        assert_eq!(rs.values(&ValuesOptions::default().leap_year(true)).unwrap().len(), 366 * 24);
        assert_eq!(rs.values(&ValuesOptions::default().timestep(ts(4))).unwrap().len(), 365 * 96);
        let single = ValuesOptions::default().date_range(md(3, 3), md(3, 3));
        assert_eq!(rs.values(&single).unwrap().len(), 24);
    }

    #[test]
    fn reversed_rule_in_annual_values() {
        let winter = ScheduleRule::new(constant("Winter", 1.0))
            .with_days([true; 7])
            .with_dates(md(11, 15), md(2, 1));
        let rs = ScheduleRuleset::builder(id("Heat"), constant("Zero", 0.0))
            .rule(winter)
            .build()
            .unwrap();
        let vals = rs.values(&ValuesOptions::default()).unwrap();
        let cal = Calendar::REGULAR;
        for (date, expected) in [(md(12, 25), 1.0), (md(1, 15), 1.0), (md(6, 1), 0.0)] {
            let idx = cal.doy(date).unwrap() as usize - 1;
            assert_eq!(day_slice(&vals, idx, 1)[0], expected, "{date}");
        }
    }

    #[test]
    fn duplicate_day_identifiers_rejected() {
        let a = ScheduleDay::constant(id("Same"), 0.0).unwrap();
        let b = ScheduleDay::constant(id("Same"), 1.0).unwrap();
        let res = ScheduleRuleset::builder(id("Dup"), a)
            .rule(ScheduleRule::new(b).with_day(DayOfWeek::Monday))
            .build();
        assert!(matches!(res, Err(ScheduleError::DuplicateDayIdentifier(_))));
    }

    #[test]
    fn day_schedules_are_unique_by_identity() {
        let zero = constant("Zero", 0.0);
        let rs = ScheduleRuleset::builder(id("U"), zero.clone())
            .holiday_schedule(zero.clone())
            .rule(ScheduleRule::new(constant("One", 1.0)).with_day(DayOfWeek::Monday))
            .rule(ScheduleRule::new(zero).with_day(DayOfWeek::Tuesday))
            .build()
            .unwrap();
        let ids: Vec<&str> = rs.day_schedules().iter().map(|d| d.identifier().as_str()).collect();
        assert_eq!(ids, vec!["Zero", "One"]);
    }

    #[test]
    fn constant_and_single_week() {
        let c = ScheduleRuleset::from_constant_value(id("Always On"), 1.0, Some(ScheduleTypeLimit::on_off()))
            .unwrap();
        assert!(c.is_constant() && c.is_single_week());
        assert_eq!(c.default_day_schedule().identifier().as_str(), "Always On_Day Schedule");
        assert_eq!(c.schedule_type_limit().map(|l| l.identifier().as_str()), Some("On-Off"));

        assert!(!weekend_ruleset().is_constant());
        assert!(weekend_ruleset().is_single_week());
        let seasonal = weekend_ruleset()
            .to_builder()
            .rule(ScheduleRule::new(constant("S", 1.0)).with_dates(md(7, 1), md(9, 1)))
            .build()
            .unwrap();
        assert!(!seasonal.is_single_week());
    }

    #[test]
    fn from_daily_values() {
        let dense = office_day().values_at_timestep(ts(2));
        let rs = ScheduleRuleset::from_daily_values(id("Daily"), &dense, ts(2), None).unwrap();
        let vals = rs.values(&ValuesOptions::default().timestep(ts(2))).unwrap();
        assert_eq!(day_slice(&vals, 200, 2), dense.as_slice());
    }

    fn week_values() -> WeekValues {
        let weekday = office_day().values_at_timestep(Timestep::HOURLY);
        let weekend = vec![0.1; 24];
        WeekValues {
            days: [
                weekend.clone(),
                weekday.clone(),
                weekday.clone(),
                weekday.clone(),
                weekday.clone(),
                weekday,
                weekend,
            ],
            holiday:          vec![0.0; 24],
            summer_designday: None,
            winter_designday: None,
        }
    }

    #[test]
    fn from_week_daily_values_dedupes_days() {
        let rs = ScheduleRuleset::from_week_daily_values(id("Office"), &week_values(), Timestep::HOURLY, None)
            .unwrap();
        assert_eq!(rs.default_day_schedule().identifier().as_str(), "Office_Sunday");
        assert_eq!(rs.schedule_rules().len(), 1);
        let rule = &rs.schedule_rules()[0];
        assert_eq!(rule.schedule_day().identifier().as_str(), "Office_Monday");
        assert!(rule.apply_weekday() && !rule.applies_on(DayOfWeek::Saturday));
        assert_eq!(rs.holiday_or_default().identifier().as_str(), "Office_Hol");
        assert_eq!(rs.summer_or_default().identifier().as_str(), "Office_Monday_SmrDsn");
        assert_eq!(rs.winter_or_default().identifier().as_str(), "Office_Sunday_WntrDsn");
        assert_eq!(rs.summer_or_default().values(), &[0.0, 1.0, 0.0]);

        // Saturday falls back to the default (the Sunday day).
        let opts = ValuesOptions::default().date_range(md(1, 1), md(1, 7));
        let vals = rs.values(&opts).unwrap();
        assert!(day_slice(&vals, 6, 1).iter().all(|&v| v == 0.1));
        assert_eq!(day_slice(&vals, 1, 1)[10], 1.0);
    }

    #[test]
    fn from_week_daily_values_explicit_design_days() {
        let mut week = week_values();
        week.summer_designday = Some(vec![1.0; 24]);
        let rs = ScheduleRuleset::from_week_daily_values(id("Office"), &week, Timestep::HOURLY, None).unwrap();
        assert_eq!(rs.summer_or_default().identifier().as_str(), "Office_SmrDsn");
        assert!(rs.summer_or_default().is_constant());
    }

    #[test]
    fn from_week_day_schedules_renames_shared_special_days() {
        let weekday = Arc::new(office_day());
        let weekend = constant("Weekend", 0.1);
        let week = WeekSchedules {
            days: [
                weekend.clone(),
                weekday.clone(),
                weekday.clone(),
                weekday.clone(),
                weekday.clone(),
                weekday.clone(),
                weekend.clone(),
            ],
            holiday:          weekend,
            summer_designday: weekday,
            winter_designday: constant("Cold", 0.0),
        };
        let rs = ScheduleRuleset::from_week_day_schedules(id("Office"), week, None).unwrap();
        assert_eq!(rs.schedule_rules().len(), 1);
        assert_eq!(rs.holiday_or_default().identifier().as_str(), "Weekend_Hol");
        assert_eq!(rs.summer_or_default().identifier().as_str(), "Office Occ_SmrDsn");
        assert_eq!(rs.winter_or_default().identifier().as_str(), "Cold");
    }

    fn summer_ruleset() -> ScheduleRuleset {
        let summer = ScheduleRule::new(constant("Summer", 0.5))
            .with_days([false, true, true, true, true, true, false])
            .with_dates(md(7, 1), md(9, 1));
        weekend_ruleset().to_builder().rule(summer).build().unwrap()
    }

    #[test]
    fn to_rules_clips_to_window() {
        let rules = summer_ruleset().to_rules(md(8, 1), md(12, 31)).unwrap();
        // Weekend rule (whole window), clipped summer rule, default for weekdays.
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].start_date(), md(8, 1));
        assert_eq!(rules[1].start_date(), md(8, 1));
        assert_eq!(rules[1].end_date(), md(9, 1));
        let default = &rules[2];
        assert_eq!(default.schedule_day().identifier().as_str(), "Zero");
        assert_eq!(default.week_apply_tuple(), [false, true, true, true, true, true, false]);
    }

    #[test]
    fn to_rules_skips_non_overlapping_and_splits_reversed() {
        let winter = ScheduleRule::new(constant("Winter", 1.0))
            .with_days([true; 7])
            .with_dates(md(11, 15), md(2, 1));
        let rs = ScheduleRuleset::builder(id("Heat"), constant("Zero", 0.0))
            .rule(winter)
            .build()
            .unwrap();
        let rules = rs.to_rules(MonthDay::JAN_1, MonthDay::DEC_31).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!((rules[0].start_date(), rules[0].end_date()), (md(1, 1), md(2, 1)));
        assert_eq!((rules[1].start_date(), rules[1].end_date()), (md(11, 15), md(12, 31)));

        let spring = rs.to_rules(md(3, 1), md(5, 31)).unwrap();
        assert_eq!(spring.len(), 1);
        assert!(spring[0].apply_all());
        assert!(rs.to_rules(md(5, 1), md(3, 1)).is_err());
    }

    #[test]
    fn spliced_rules_reproduce_values() {
        let rs = summer_ruleset();
        let spliced = ScheduleRuleset::builder(id("Spliced"), constant("Other", 9.0))
            .rules(rs.to_rules(MonthDay::JAN_1, MonthDay::DEC_31).unwrap())
            .build()
            .unwrap();
        let opts = ValuesOptions::default();
        assert_eq!(spliced.values(&opts).unwrap(), rs.values(&opts).unwrap());
    }

    #[test]
    fn week_periods_follow_rule_ranges() {
        let periods = summer_ruleset().week_periods().unwrap();
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].rule_indices, vec![0]);
        assert_eq!((periods[0].start_date, periods[0].end_date), (md(1, 1), md(6, 30)));
        assert_eq!(periods[1].rule_indices, vec![0, 1]);
        assert_eq!((periods[1].start_date, periods[1].end_date), (md(7, 1), md(9, 1)));
        assert_eq!(periods[2].end_date, md(12, 31));

        assert_eq!(weekend_ruleset().week_periods().unwrap().len(), 1);
    }

    #[test]
    fn week_days_resolve_first_rule() {
        let rs = summer_ruleset();
        let week = rs.week_days(&[0, 1]);
        assert_eq!(week[0].identifier().as_str(), "Weekend");
        assert_eq!(week[3].identifier().as_str(), "Summer");
        let no_summer = rs.week_days(&[0]);
        assert_eq!(no_summer[3].identifier().as_str(), "Zero");
    }

    #[test]
    fn shift_by_step_shifts_every_day() {
        let rs = ScheduleRuleset::builder(id("Office"), office_day())
            .rule(ScheduleRule::new(constant("Weekend", 0.0)).with_day(DayOfWeek::Sunday))
            .build()
            .unwrap();
        let shifted = rs.shift_by_step(2, Timestep::HOURLY).unwrap();
        assert_eq!(shifted.identifier().as_str(), "Office_Shift_120mins");
        assert_eq!(shifted.default_day_schedule().times()[1], t(11, 0));
        assert_eq!(
            shifted.schedule_rules()[0].schedule_day().identifier().as_str(),
            "Weekend_Shift_120mins"
        );
        assert!(shifted.schedule_rules()[0].applies_on(DayOfWeek::Sunday));
    }

    #[test]
    fn values_for_all_matches_individual_calls() {
        let sets = vec![weekend_ruleset(), summer_ruleset()];
        let opts = ValuesOptions::default();
        let all = ScheduleRuleset::values_for_all(&sets, &opts).unwrap();
        assert_eq!(all[1], sets[1].values(&opts).unwrap());
        assert_eq!(all.len(), 2);
    }
}

// ── Averaging ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod averaging {
    use super::*;

    fn office() -> ScheduleRuleset {
        let weekday = day("Office Weekday", &[0.0, 1.0, 0.5, 0.0], &[(0, 0), (9, 0), (17, 0), (19, 0)]);
        let weekend = ScheduleRule::new(constant("Office Weekend", 0.0))
            .with_day(DayOfWeek::Saturday)
            .with_day(DayOfWeek::Sunday);
        ScheduleRuleset::builder(id("Office"), weekday).rule(weekend).build().unwrap()
    }

    fn lobby() -> ScheduleRuleset {
        let weekday = day("Lobby Weekday", &[0.1, 1.0, 0.1], &[(0, 0), (8, 0), (20, 0)]);
        let weekend = ScheduleRule::new(constant("Lobby Weekend", 0.1))
            .with_day(DayOfWeek::Saturday)
            .with_day(DayOfWeek::Sunday);
        ScheduleRuleset::builder(id("Lobby"), weekday)
            .rule(weekend)
            .schedule_type_limit(Some(ScheduleTypeLimit::fractional()))
            .build()
            .unwrap()
    }

    #[test]
    fn single_week_average() {
        let avg = ScheduleRuleset::average_schedules(id("Avg"), &[office(), lobby()], None, Timestep::HOURLY)
            .unwrap();
        assert_eq!(avg.schedule_rules().len(), 1);
        assert!(avg.default_day_schedule().values_at_timestep(Timestep::HOURLY).iter().all(|&v| (v - 0.05).abs() < 1e-12));

        let weekday = avg.schedule_rules()[0].schedule_day().values_at_timestep(Timestep::HOURLY);
        let mut expected = vec![0.05; 8];
        expected.push(0.5);
        expected.extend([1.0; 8]);
        expected.extend([0.75, 0.75, 0.5]);
        expected.extend([0.05; 4]);
        assert_close(&weekday, &expected);
        // Type limit comes from the first input (none here).
        assert!(avg.schedule_type_limit().is_none());
    }

    #[test]
    fn weighted_single_week_average() {
        let avg = ScheduleRuleset::average_schedules(
            id("Weighted"),
            &[office(), lobby()],
            Some(&[0.75, 0.25]),
            Timestep::HOURLY,
        )
        .unwrap();
        let sunday = avg.default_day_schedule().values_at_timestep(Timestep::HOURLY);
        assert!(sunday.iter().all(|&v| (v - 0.025).abs() < 1e-12));
        let weekday = avg.schedule_rules()[0].schedule_day().values_at_timestep(Timestep::HOURLY);
        assert!((weekday[8] - 0.25).abs() < 1e-12);
        assert!((weekday[17] - 0.625).abs() < 1e-12);
    }

    #[test]
    fn seasonal_average_splits_the_year() {
        let seasonal = ScheduleRuleset::builder(id("Seasonal"), constant("Off", 0.0))
            .rule(ScheduleRule::new(constant("On", 1.0)).with_days([true; 7]).with_dates(md(7, 1), md(9, 1)))
            .build()
            .unwrap();
        let flat = ScheduleRuleset::from_constant_value(id("Flat"), 0.5, None).unwrap();

        let avg = ScheduleRuleset::average_schedules(id("Mix"), &[seasonal, flat], None, Timestep::HOURLY)
            .unwrap();
        let vals = avg.values(&ValuesOptions::default()).unwrap();
        let cal = Calendar::REGULAR;
        for (date, expected) in [(md(1, 1), 0.25), (md(6, 30), 0.25), (md(7, 1), 0.75), (md(9, 1), 0.75), (md(9, 2), 0.25)] {
            let idx = cal.doy(date).unwrap() as usize - 1;
            assert!((day_slice(&vals, idx, 1)[12] - expected).abs() < 1e-12, "{date}");
        }
        assert_eq!(avg.holiday_or_default().identifier().as_str(), "Mix_0_Hol");
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            ScheduleRuleset::average_schedules(id("E"), &[], None, Timestep::HOURLY),
            Err(ScheduleError::EmptyInput(_))
        ));
        assert!(matches!(
            ScheduleRuleset::average_schedules(id("W"), &[office(), lobby()], Some(&[0.6, 0.6]), Timestep::HOURLY),
            Err(ScheduleError::Weights(_))
        ));
    }
}

// ── Type limits ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod type_limit {
    use super::*;
    use crate::{NumericType, UnitType};

    #[test]
    fn validation_and_units() {
        let limit = ScheduleTypeLimit::new(id("Pct"), Some(0.0), Some(100.0), NumericType::Continuous, UnitType::Percent)
            .unwrap();
        assert_eq!(limit.unit(), "%");
        assert!(limit.accepts(55.5));
        assert!(!limit.accepts(101.0));

        let bad = ScheduleTypeLimit::new(id("Bad"), Some(2.0), Some(1.0), NumericType::Continuous, UnitType::Mode);
        assert!(matches!(bad, Err(ScheduleError::TypeLimit(_))));
    }

    #[test]
    fn discrete_and_presets() {
        let on_off = ScheduleTypeLimit::on_off();
        assert!(on_off.accepts(1.0));
        assert!(!on_off.accepts(0.5));
        assert_eq!(ScheduleTypeLimit::temperature().unit(), "C");
        assert_eq!(ScheduleTypeLimit::power().lower_limit(), None);
        assert_eq!(ScheduleTypeLimit::standard().len(), 8);
    }

    #[test]
    fn parse_enums() {
        assert_eq!("discrete".parse::<NumericType>().unwrap(), NumericType::Discrete);
        assert_eq!("".parse::<NumericType>().unwrap(), NumericType::Continuous);
        assert_eq!("activitylevel".parse::<UnitType>().unwrap(), UnitType::ActivityLevel);
        assert!("furlongs".parse::<UnitType>().is_err());
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;
    use crate::{load_week_schedules_csv, load_week_schedules_reader};

    fn row(id: &str, day_type: &str, values: &[f64]) -> String {
        let vals: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        format!("{id},{day_type},1,{}\n", vals.join(","))
    }

    fn office_csv(with_holiday: bool) -> String {
        let weekday = office_day().values_at_timestep(Timestep::HOURLY);
        let mut csv = String::from("identifier,day_type,timestep,values\n");
        for d in DayOfWeek::ALL {
            let vals = if d.is_weekend() { vec![0.0; 24] } else { weekday.clone() };
            csv.push_str(&row("Office Occ", d.name(), &vals));
        }
        if with_holiday {
            csv.push_str(&row("Office Occ", "holiday", &[0.0; 24]));
        }
        csv
    }

    #[test]
    fn loads_week_schedule() {
        let sets = load_week_schedules_reader(office_csv(true).as_bytes(), Some(&ScheduleTypeLimit::fractional()))
            .unwrap();
        assert_eq!(sets.len(), 1);
        let rs = &sets[0];
        assert_eq!(rs.identifier().as_str(), "Office Occ");
        assert_eq!(rs.schedule_rules().len(), 1);
        assert!(rs.schedule_rules()[0].apply_weekday());
        assert_eq!(rs.schedule_type_limit().map(|l| l.identifier().as_str()), Some("Fractional"));
    }

    #[test]
    fn missing_rows_and_bad_day_types() {
        let err = load_week_schedules_reader(office_csv(false).as_bytes(), None).unwrap_err();
        assert!(matches!(err, ScheduleError::Parse(msg) if msg.contains("holiday")));

        let mut bad = office_csv(true);
        bad.push_str(&row("Office Occ", "someday", &[0.0; 24]));
        assert!(matches!(load_week_schedules_reader(bad.as_bytes(), None), Err(ScheduleError::Parse(_))));
    }

    #[test]
    fn wrong_value_count_is_reported() {
        let mut csv = office_csv(true);
        csv = csv.replace("Office Occ,holiday,1,", "Office Occ,holiday,1,0,");
        assert!(matches!(
            load_week_schedules_reader(csv.as_bytes(), None),
            Err(ScheduleError::LengthMismatch { expected: 24, got: 25, .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weeks.csv");
        std::fs::write(&path, office_csv(true)).unwrap();
        assert_eq!(load_week_schedules_csv(&path, None).unwrap().len(), 1);
        assert!(matches!(
            load_week_schedules_csv(&dir.path().join("missing.csv"), None),
            Err(ScheduleError::Io(_))
        ));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_day() -> impl Strategy<Value = ScheduleDay> {
        (
            prop::collection::btree_set(1u32..1440, 0..8),
            prop::collection::vec(-100.0f64..100.0, 9),
            any::<bool>(),
        )
            .prop_map(|(minutes, values, interpolate)| {
                let mut times = vec![Time::MIDNIGHT];
                times.extend(minutes.into_iter().map(|m| Time::from_mod(m).unwrap()));
                let values = values[..times.len()].to_vec();
                ScheduleDay::new(Identifier::new("Prop").unwrap(), values, times, interpolate).unwrap()
            })
    }

    fn arb_timestep() -> impl Strategy<Value = Timestep> {
        prop::sample::select(Timestep::VALID.to_vec()).prop_map(|n| Timestep::new(n).unwrap())
    }

    proptest! {
        #[test]
        fn dense_length_is_24_times_timestep(d in arb_day(), step in arb_timestep()) {
            prop_assert_eq!(d.values_at_timestep(step).len(), 24 * step.per_hour() as usize);
        }

        #[test]
        fn dense_round_trip(d in arb_day(), step in arb_timestep()) {
            let dense = d.with_interpolate(false).values_at_timestep(step);
            let rebuilt = ScheduleDay::from_values_at_timestep(
                Identifier::new("Rebuilt").unwrap(), &dense, step, false,
            ).unwrap();
            prop_assert_eq!(rebuilt.values_at_timestep(step), dense);
        }

        #[test]
        fn equal_weight_average_of_constants(a in -50.0f64..50.0, b in -50.0f64..50.0) {
            let da = ScheduleDay::constant(Identifier::new("A").unwrap(), a).unwrap();
            let db = ScheduleDay::constant(Identifier::new("B").unwrap(), b).unwrap();
            let avg = ScheduleDay::average_schedules(
                Identifier::new("Avg").unwrap(), &[da, db], None, Timestep::HOURLY,
            ).unwrap();
            for v in avg.values_at_timestep(Timestep::HOURLY) {
                prop_assert!((v - (a + b) / 2.0).abs() < 1e-9);
            }
        }
    }
}

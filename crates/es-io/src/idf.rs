//! EnergyPlus IDF text interchange for the schedule objects.
//!
//! | Object                   | Read | Write |
//! |--------------------------|------|-------|
//! | `Schedule:Day:Interval`  | yes  | yes   |
//! | `Schedule:Day:Hourly`    | yes  |       |
//! | `Schedule:Day:List`      | yes  |       |
//! | `Schedule:Week:Daily`    | yes  | yes   |
//! | `Schedule:Week:Compact`  | yes  |       |
//! | `Schedule:Year`          | yes  | yes   |
//! | `Schedule:Constant`      | yes  | yes   |
//! | `ScheduleTypeLimits`     | yes  | yes   |
//!
//! A ruleset is written as one `Schedule:Year` plus one `Schedule:Week:Daily`
//! per distinct week (`{identifier}_Week {n}`).  Its day schedules and type
//! limit are separate objects; [`ruleset_to_idf_text`] emits all of them.
//!
//! Reading goes through [`IdfSchedules`], an index of the day, week and
//! type-limit objects of a file that `Schedule:Year` objects are resolved
//! against.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use es_core::{DayOfWeek, Identifier, MonthDay, Time, Timestep};
use es_schedule::{ScheduleDay, ScheduleRule, ScheduleRuleset, ScheduleTypeLimit};

use crate::json::unknown;
use crate::{IoError, IoResult};

pub const DAY_INTERVAL: &str = "Schedule:Day:Interval";
pub const DAY_HOURLY: &str = "Schedule:Day:Hourly";
pub const DAY_LIST: &str = "Schedule:Day:List";
pub const WEEK_DAILY: &str = "Schedule:Week:Daily";
pub const WEEK_COMPACT: &str = "Schedule:Week:Compact";
pub const YEAR: &str = "Schedule:Year";
pub const CONSTANT: &str = "Schedule:Constant";
pub const TYPE_LIMITS: &str = "ScheduleTypeLimits";

const WEEK_COMMENTS: [&str; 13] = [
    "schedule name",
    "sunday schedule",
    "monday schedule",
    "tuesday schedule",
    "wednesday schedule",
    "thursday schedule",
    "friday schedule",
    "saturday schedule",
    "holiday schedule",
    "summer design day schedule",
    "winter design day schedule",
    "custom day 1 schedule",
    "custom day 2 schedule",
];

// ── IdfObject ─────────────────────────────────────────────────────────────────

/// One IDF object: its class name and comma-separated fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdfObject {
    pub class:  String,
    pub fields: Vec<String>,
}

impl IdfObject {
    /// Parse text holding exactly one object.
    pub fn parse(text: &str) -> IoResult<Self> {
        let mut objects = split_idf_objects(text);
        match objects.len() {
            1 => Ok(objects.remove(0)),
            n => Err(IoError::Parse(format!("expected one IDF object, found {n}"))),
        }
    }

    /// Class names compare case-insensitively, as in EnergyPlus.
    pub fn is(&self, class: &str) -> bool {
        self.class.eq_ignore_ascii_case(class)
    }

    /// Field `index`, or `""` past the end.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", String::as_str)
    }

    pub fn name(&self) -> &str {
        self.field(0)
    }

    fn expect_class(&self, class: &'static str) -> IoResult<()> {
        if self.is(class) {
            return Ok(());
        }
        Err(IoError::UnexpectedType { expected: class, got: self.class.clone() })
    }

    fn fields_from(&self, start: usize) -> &[String] {
        self.fields.get(start..).unwrap_or_default()
    }
}

/// Split IDF text into objects, dropping `!` comments.
pub fn split_idf_objects(text: &str) -> Vec<IdfObject> {
    let clean: String = text
        .lines()
        .map(|line| line.split('!').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");
    clean
        .split(';')
        .filter_map(|chunk| {
            let mut parts = chunk.split(',').map(|s| s.trim().to_string());
            let class = parts.next().filter(|c| !c.is_empty())?;
            Some(IdfObject { class, fields: parts.collect() })
        })
        .collect()
}

/// Format one object, one field per line with a `!-` comment.
pub fn generate_idf_string<F, C>(class: &str, fields: &[F], comments: &[C]) -> String
where
    F: AsRef<str>,
    C: AsRef<str>,
{
    if fields.is_empty() {
        return format!("{class};\n");
    }
    let last = fields.len() - 1;
    let mut out = format!("{class},\n");
    for (i, field) in fields.iter().enumerate() {
        let value = format!("{}{}", field.as_ref(), if i == last { ';' } else { ',' });
        match comments.get(i) {
            Some(comment) => out.push_str(&format!("  {value:<26}!- {}\n", comment.as_ref())),
            None => out.push_str(&format!("  {value}\n")),
        }
    }
    out
}

// ── ScheduleDay ───────────────────────────────────────────────────────────────

/// `Schedule:Day:Interval` text for `day`.
pub fn day_to_idf(day: &ScheduleDay, type_limit: Option<&ScheduleTypeLimit>) -> String {
    let mut fields = vec![
        day.identifier().to_string(),
        type_limit.map_or_else(String::new, |l| l.identifier().to_string()),
        if day.interpolate() { "Linear" } else { "No" }.to_string(),
    ];
    let mut comments = vec![
        "schedule name".to_string(),
        "schedule type limits".to_string(),
        "interpolate to timestep".to_string(),
    ];
    for (i, value) in day.values().iter().enumerate() {
        let until = day.times().get(i + 1).map_or_else(|| "24:00".to_string(), Time::to_string);
        fields.push(until);
        comments.push(format!("time {} {{hh:mm}}", i + 1));
        fields.push(value.to_string());
        comments.push(format!("value until time {}", i + 1));
    }
    generate_idf_string(DAY_INTERVAL, &fields, &comments)
}

/// Read a `Schedule:Day:Interval`, `Schedule:Day:Hourly` or
/// `Schedule:Day:List` object.
pub fn day_from_idf(obj: &IdfObject) -> IoResult<ScheduleDay> {
    let identifier = Identifier::new(obj.name())?;

    if obj.is(DAY_HOURLY) {
        let values = parse_values(obj.fields_from(2))?;
        return Ok(ScheduleDay::from_values_at_timestep(identifier, &values, Timestep::HOURLY, true)?);
    }

    if obj.is(DAY_LIST) {
        let interpolate = parse_interpolate(obj.field(2));
        let minutes: u32 = parse_number(obj.field(3))?;
        if minutes == 0 || 60 % minutes != 0 {
            return Err(IoError::Parse(format!("{}: {minutes} minutes per item does not divide an hour", obj.name())));
        }
        let values = parse_values(obj.fields_from(4))?;
        let day = ScheduleDay::from_values_at_timestep(identifier, &values, Timestep::new(60 / minutes)?, !interpolate)?;
        return Ok(day.with_interpolate(interpolate));
    }

    obj.expect_class(DAY_INTERVAL)?;
    let interpolate = parse_interpolate(obj.field(2));
    let pairs = obj.fields_from(3);
    if pairs.len() % 2 != 0 {
        return Err(IoError::Parse(format!("{}: unpaired time/value field", obj.name())));
    }
    let mut times = vec![Time::MIDNIGHT];
    let mut values = Vec::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks(2) {
        let until = pair[0].trim();
        values.push(parse_number(&pair[1])?);
        if until != "24:00" {
            times.push(until.parse::<Time>()?);
        }
    }
    Ok(ScheduleDay::new(identifier, values, times, interpolate)?)
}

// ── ScheduleTypeLimit ─────────────────────────────────────────────────────────

pub fn type_limit_to_idf(limit: &ScheduleTypeLimit) -> String {
    let bound = |l: Option<f64>| l.map_or_else(String::new, |v| v.to_string());
    let fields = [
        limit.identifier().to_string(),
        bound(limit.lower_limit()),
        bound(limit.upper_limit()),
        limit.numeric_type().as_str().to_string(),
        limit.unit_type().as_str().to_string(),
    ];
    let comments = ["name", "lower limit value", "upper limit value", "numeric type", "unit type"];
    generate_idf_string(TYPE_LIMITS, &fields, &comments)
}

pub fn type_limit_from_idf(obj: &IdfObject) -> IoResult<ScheduleTypeLimit> {
    obj.expect_class(TYPE_LIMITS)?;
    let bound = |s: &str| -> IoResult<Option<f64>> {
        if s.is_empty() { Ok(None) } else { parse_number(s).map(Some) }
    };
    Ok(ScheduleTypeLimit::new(
        Identifier::new(obj.name())?,
        bound(obj.field(1))?,
        bound(obj.field(2))?,
        obj.field(3).parse()?,
        obj.field(4).parse()?,
    )?)
}

// ── ScheduleRuleset (write) ───────────────────────────────────────────────────

/// The ruleset's year object and its week objects.
///
/// A constant ruleset is a single `Schedule:Constant` with no weeks.
/// Otherwise the year is split into runs of days sharing the same week of
/// day schedules; identical weeks are written once.
pub fn ruleset_to_idf(ruleset: &ScheduleRuleset) -> IoResult<(String, Vec<String>)> {
    let limit_id = ruleset
        .schedule_type_limit()
        .map_or_else(String::new, |l| l.identifier().to_string());

    if ruleset.is_constant() {
        let value = ruleset.default_day_schedule().values().first().copied().unwrap_or_default();
        let fields = [ruleset.identifier().to_string(), limit_id, value.to_string()];
        let constant = generate_idf_string(CONSTANT, &fields, &["schedule name", "schedule type limits", "value"]);
        return Ok((constant, Vec::new()));
    }

    let mut week_lists: Vec<Vec<String>> = Vec::new();
    let mut runs: Vec<(usize, MonthDay, MonthDay)> = Vec::new();
    for period in ruleset.week_periods()? {
        let list: Vec<String> = ruleset
            .week_days(&period.rule_indices)
            .iter()
            .map(|day| day.identifier().to_string())
            .collect();
        let week = match week_lists.iter().position(|w| *w == list) {
            Some(i) => i,
            None => {
                week_lists.push(list);
                week_lists.len() - 1
            }
        };
        match runs.last_mut() {
            Some(run) if run.0 == week => run.2 = period.end_date,
            _ => runs.push((week, period.start_date, period.end_date)),
        }
    }

    let week_id = |i: usize| format!("{}_Week {}", ruleset.identifier(), i + 1);
    let extras = [
        ruleset.holiday_or_default(),
        ruleset.summer_or_default(),
        ruleset.winter_or_default(),
        ruleset.default_day_schedule(),
        ruleset.default_day_schedule(),
    ]
    .map(|day| day.identifier().to_string());
    let weeks = week_lists
        .into_iter()
        .enumerate()
        .map(|(i, list)| {
            let mut fields = vec![week_id(i)];
            fields.extend(list);
            fields.extend(extras.iter().cloned());
            generate_idf_string(WEEK_DAILY, &fields, &WEEK_COMMENTS)
        })
        .collect();

    let mut fields = vec![ruleset.identifier().to_string(), limit_id];
    let mut comments = vec!["schedule name".to_string(), "schedule type limits".to_string()];
    for (n, (week, start, end)) in runs.into_iter().enumerate() {
        let n = n + 1;
        fields.extend([
            week_id(week),
            start.month().to_string(),
            start.day().to_string(),
            end.month().to_string(),
            end.day().to_string(),
        ]);
        comments.extend([
            format!("week schedule name {n}"),
            format!("start month {n}"),
            format!("start day {n}"),
            format!("end month {n}"),
            format!("end day {n}"),
        ]);
    }
    Ok((generate_idf_string(YEAR, &fields, &comments), weeks))
}

/// Every object needed to define `ruleset` in an IDF: type limit, day
/// schedules, weeks and year.
pub fn ruleset_to_idf_text(ruleset: &ScheduleRuleset) -> IoResult<String> {
    let (year, weeks) = ruleset_to_idf(ruleset)?;
    let mut objects: Vec<String> = Vec::new();
    objects.extend(ruleset.schedule_type_limit().map(type_limit_to_idf));
    if !weeks.is_empty() {
        objects.extend(
            ruleset
                .day_schedules()
                .into_iter()
                .map(|day| day_to_idf(day, ruleset.schedule_type_limit())),
        );
    }
    objects.extend(weeks);
    objects.push(year);
    Ok(objects.join("\n"))
}

// ── ScheduleRuleset (read) ────────────────────────────────────────────────────

/// Rules and special days of one `Schedule:Week` object.
#[derive(Clone, Debug)]
struct IdfWeek {
    rules:   Vec<ScheduleRule>,
    holiday: Arc<ScheduleDay>,
    summer:  Arc<ScheduleDay>,
    winter:  Arc<ScheduleDay>,
}

/// Day, week and type-limit objects of an IDF, indexed by name.
#[derive(Clone, Debug, Default)]
pub struct IdfSchedules {
    days:        HashMap<String, Arc<ScheduleDay>>,
    weeks:       HashMap<String, IdfWeek>,
    type_limits: HashMap<String, ScheduleTypeLimit>,
}

impl IdfSchedules {
    /// Index `objects`.  With `strict` the first malformed object is an
    /// error; otherwise it is logged and skipped.
    pub fn from_objects(objects: &[IdfObject], strict: bool) -> IoResult<Self> {
        let mut index = Self::default();
        let skip = |obj: &IdfObject, err: IoError| -> IoResult<()> {
            if strict {
                return Err(err);
            }
            log::warn!("skipping {} {:?}: {err}", obj.class, obj.name());
            Ok(())
        };

        for obj in objects {
            if obj.is(DAY_INTERVAL) || obj.is(DAY_HOURLY) || obj.is(DAY_LIST) {
                match day_from_idf(obj) {
                    Ok(day) => {
                        index.days.insert(day.identifier().to_string(), Arc::new(day));
                    }
                    Err(e) => skip(obj, e)?,
                }
            } else if obj.is(TYPE_LIMITS) {
                match type_limit_from_idf(obj) {
                    Ok(limit) => {
                        index.type_limits.insert(limit.identifier().to_string(), limit);
                    }
                    Err(e) => skip(obj, e)?,
                }
            }
        }
        // Weeks reference days, so they go second.
        for obj in objects.iter().filter(|o| o.is(WEEK_DAILY) || o.is(WEEK_COMPACT)) {
            match index.week_from_idf(obj) {
                Ok(week) => {
                    index.weeks.insert(obj.name().to_string(), week);
                }
                Err(e) => skip(obj, e)?,
            }
        }
        Ok(index)
    }

    pub fn day(&self, name: &str) -> Option<&Arc<ScheduleDay>> {
        self.days.get(name)
    }

    pub fn type_limit(&self, name: &str) -> Option<&ScheduleTypeLimit> {
        self.type_limits.get(name)
    }

    /// Type limits sorted by identifier.
    pub fn type_limits(&self) -> Vec<&ScheduleTypeLimit> {
        let mut limits: Vec<&ScheduleTypeLimit> = self.type_limits.values().collect();
        limits.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        limits
    }

    fn day_ref(&self, name: &str) -> IoResult<Arc<ScheduleDay>> {
        self.days.get(name).cloned().ok_or_else(|| unknown("schedule day", name))
    }

    fn week_from_idf(&self, obj: &IdfObject) -> IoResult<IdfWeek> {
        if obj.is(WEEK_DAILY) {
            let mut rules: Vec<ScheduleRule> = Vec::new();
            let mut applied: Vec<&str> = Vec::new();
            for (day, name) in DayOfWeek::ALL.into_iter().zip(obj.fields_from(1).iter().take(7)) {
                match applied.iter().position(|a| *a == name.as_str()) {
                    Some(i) => rules[i].set_apply_day(day, true),
                    None => {
                        rules.push(ScheduleRule::new(self.day_ref(name)?).with_day(day));
                        applied.push(name);
                    }
                }
            }
            return Ok(IdfWeek {
                rules,
                holiday: self.day_ref(obj.field(8))?,
                summer:  self.day_ref(obj.field(9))?,
                winter:  self.day_ref(obj.field(10))?,
            });
        }

        obj.expect_class(WEEK_COMPACT)?;
        let (mut holiday, mut summer, mut winter) = (None, None, None);
        let mut rules: Vec<ScheduleRule> = Vec::new();
        for pair in obj.fields_from(1).chunks(2) {
            let [day_types, name] = pair else {
                return Err(IoError::Parse(format!("{}: unpaired day type field", obj.name())));
            };
            let day = self.day_ref(name)?;
            let mut rule = ScheduleRule::new(day.clone());
            for token in day_types.to_ascii_lowercase().split([' ', ':', '\t']) {
                match token {
                    "" | "for" => {}
                    "alldays" => rule.set_apply_all(true),
                    "weekdays" => rule.set_apply_weekday(true),
                    "weekends" => rule.set_apply_weekend(true),
                    "allotherdays" => {
                        for d in DayOfWeek::ALL {
                            if !rules.iter().any(|r| r.applies_on(d)) {
                                rule.set_apply_day(d, true);
                            }
                        }
                    }
                    "holiday" | "holidays" => holiday = Some(day.clone()),
                    "summerdesignday" => summer = Some(day.clone()),
                    "winterdesignday" => winter = Some(day.clone()),
                    other => match DayOfWeek::from_str(other) {
                        Ok(d) => rule.set_apply_day(d, true),
                        Err(_) => log::debug!("{}: ignoring day type {other:?}", obj.name()),
                    },
                }
            }
            if !rule.days_applied().is_empty() {
                rules.push(rule);
            }
        }
        let fallback = rules
            .last()
            .map(|r| r.schedule_day().clone())
            .ok_or_else(|| IoError::Parse(format!("{}: week applies to no weekday", obj.name())))?;
        Ok(IdfWeek {
            rules,
            holiday: holiday.unwrap_or_else(|| fallback.clone()),
            summer:  summer.unwrap_or_else(|| fallback.clone()),
            winter:  winter.unwrap_or(fallback),
        })
    }

    fn limit_ref(&self, name: &str) -> IoResult<Option<ScheduleTypeLimit>> {
        if name.is_empty() {
            return Ok(None);
        }
        self.type_limits
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| unknown("schedule type limit", name))
    }

    /// Assemble a ruleset from a `Schedule:Year` object.
    ///
    /// Each week contributes its rules over the week's date range.  The first
    /// rule's day becomes the default; special days come from the first week.
    pub fn ruleset_from_year(&self, year: &IdfObject) -> IoResult<ScheduleRuleset> {
        year.expect_class(YEAR)?;
        let groups = year.fields_from(2);
        if groups.is_empty() || groups.len() % 5 != 0 {
            return Err(IoError::Parse(format!("{}: expected groups of 5 week fields", year.name())));
        }

        let mut all_rules: Vec<ScheduleRule> = Vec::new();
        let mut first_week: Option<&IdfWeek> = None;
        for group in groups.chunks(5) {
            let week = self.weeks.get(&group[0]).ok_or_else(|| unknown("week schedule", &group[0]))?;
            let start = MonthDay::new(parse_number(&group[1])?, parse_number(&group[2])?)?;
            let end = MonthDay::new(parse_number(&group[3])?, parse_number(&group[4])?)?;
            all_rules.extend(week.rules.iter().map(|r| r.clone().with_dates(start, end)));
            first_week.get_or_insert(week);
        }
        let first_week = first_week.ok_or_else(|| IoError::Parse(format!("{}: no weeks", year.name())))?;

        let mut rules = all_rules.into_iter();
        let default = rules
            .next()
            .ok_or_else(|| IoError::Parse(format!("{}: weeks define no rules", year.name())))?;
        Ok(ScheduleRuleset::builder(Identifier::new(year.name())?, default.schedule_day().clone())
            .rules(rules.collect())
            .holiday_schedule(first_week.holiday.clone())
            .summer_designday_schedule(first_week.summer.clone())
            .winter_designday_schedule(first_week.winter.clone())
            .schedule_type_limit(self.limit_ref(year.field(1))?)
            .build()?)
    }

    /// A constant ruleset from a `Schedule:Constant` object.  An empty value
    /// reads as 0.
    pub fn ruleset_from_constant(&self, obj: &IdfObject) -> IoResult<ScheduleRuleset> {
        obj.expect_class(CONSTANT)?;
        let value = match obj.field(2) {
            "" => 0.0,
            v => parse_number(v)?,
        };
        Ok(ScheduleRuleset::from_constant_value(
            Identifier::new(obj.name())?,
            value,
            self.limit_ref(obj.field(1))?,
        )?)
    }
}

/// A ruleset from the text of its year (or constant) object plus the week,
/// day and type-limit objects it references.  Every object must parse.
pub fn ruleset_from_idf(
    year:       &str,
    weeks:      &[&str],
    days:       &[&str],
    type_limit: Option<&str>,
) -> IoResult<ScheduleRuleset> {
    let year = IdfObject::parse(year)?;
    let mut objects = Vec::with_capacity(weeks.len() + days.len() + 1);
    for text in days.iter().chain(weeks).chain(type_limit.as_slice()) {
        objects.push(IdfObject::parse(text)?);
    }
    let index = IdfSchedules::from_objects(&objects, true)?;
    if year.is(CONSTANT) {
        index.ruleset_from_constant(&year)
    } else {
        index.ruleset_from_year(&year)
    }
}

/// Every `Schedule:Year` and `Schedule:Constant` in `text` as a ruleset.
/// Objects that fail to resolve are logged and skipped.
pub fn extract_all_from_idf_str(text: &str) -> Vec<ScheduleRuleset> {
    let objects = split_idf_objects(text);
    extract_rulesets(&objects).1
}

pub fn extract_all_from_idf_file(path: &Path) -> IoResult<Vec<ScheduleRuleset>> {
    let text = std::fs::read_to_string(path)?;
    Ok(extract_all_from_idf_str(&text))
}

/// The lenient index of `objects` plus every ruleset that resolves against it.
pub(crate) fn extract_rulesets(objects: &[IdfObject]) -> (IdfSchedules, Vec<ScheduleRuleset>) {
    // Non-strict indexing never fails.
    let index = IdfSchedules::from_objects(objects, false).unwrap_or_default();
    let mut rulesets = Vec::new();
    for obj in objects {
        let result = if obj.is(YEAR) {
            index.ruleset_from_year(obj)
        } else if obj.is(CONSTANT) {
            index.ruleset_from_constant(obj)
        } else {
            continue;
        };
        match result {
            Ok(ruleset) => rulesets.push(ruleset),
            Err(e) => log::warn!("skipping {} {:?}: {e}", obj.class, obj.name()),
        }
    }
    (index, rulesets)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_number<T: FromStr>(s: &str) -> IoResult<T> {
    s.trim()
        .parse()
        .map_err(|_| IoError::Parse(format!("invalid number {s:?}")))
}

fn parse_values(fields: &[String]) -> IoResult<Vec<f64>> {
    fields
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| parse_number(f))
        .collect()
}

/// `No` or blank means step; `Linear`, `Average` and `Yes` all interpolate.
fn parse_interpolate(field: &str) -> bool {
    !(field.is_empty() || field.eq_ignore_ascii_case("no"))
}

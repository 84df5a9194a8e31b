//! JSON documents for the schedule objects.
//!
//! Every object has a document struct mirroring its JSON shape.  Documents
//! carry a `"type"` tag that is checked on the way in:
//!
//! | Document                 | `"type"`                                          |
//! |--------------------------|---------------------------------------------------|
//! | [`ScheduleDayDoc`]       | `ScheduleDay`                                     |
//! | [`ScheduleRuleDoc`]      | `ScheduleRule` / `ScheduleRuleAbridged`           |
//! | [`ScheduleRulesetDoc`]   | `ScheduleRuleset` / `ScheduleRulesetAbridged`     |
//! | [`ScheduleTypeLimitDoc`] | `ScheduleTypeLimit`                               |
//!
//! Abridged documents reference day schedules and type limits by identifier.
//! Day references resolve against the ruleset's own `day_schedules`; type
//! limit references resolve through a [`TypeLimitLookup`].
//!
//! # Example
//!
//! ```json
//! {
//!   "type": "ScheduleRuleset",
//!   "identifier": "Office Occ",
//!   "day_schedules": [
//!     {"type": "ScheduleDay", "identifier": "Weekday", "values": [0, 1, 0],
//!      "times": [[0, 0], [9, 0], [17, 0]], "interpolate": false}
//!   ],
//!   "default_day_schedule": "Weekday",
//!   "schedule_type_limit": {"type": "ScheduleTypeLimit", "identifier": "Fractional",
//!                           "lower_limit": 0, "upper_limit": 1}
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use es_core::{Identifier, MonthDay, Time};
use es_schedule::{
    NumericType, ScheduleDay, ScheduleRule, ScheduleRuleset, ScheduleTypeLimit, UnitType, ValuesOptions,
};

use crate::{IoError, IoResult};

pub const DAY: &str = "ScheduleDay";
pub const RULE: &str = "ScheduleRule";
pub const RULE_ABRIDGED: &str = "ScheduleRuleAbridged";
pub const RULESET: &str = "ScheduleRuleset";
pub const RULESET_ABRIDGED: &str = "ScheduleRulesetAbridged";
pub const TYPE_LIMIT: &str = "ScheduleTypeLimit";
pub const NO_LIMIT: &str = "NoLimit";

// ── TypeLimitLookup ───────────────────────────────────────────────────────────

/// Resolves type-limit identifiers found in abridged ruleset documents.
pub trait TypeLimitLookup {
    fn type_limit(&self, identifier: &str) -> Option<&ScheduleTypeLimit>;
}

impl TypeLimitLookup for HashMap<String, ScheduleTypeLimit> {
    fn type_limit(&self, identifier: &str) -> Option<&ScheduleTypeLimit> {
        self.get(identifier)
    }
}

impl TypeLimitLookup for BTreeMap<String, ScheduleTypeLimit> {
    fn type_limit(&self, identifier: &str) -> Option<&ScheduleTypeLimit> {
        self.get(identifier)
    }
}

impl TypeLimitLookup for [ScheduleTypeLimit] {
    fn type_limit(&self, identifier: &str) -> Option<&ScheduleTypeLimit> {
        self.iter().find(|l| l.identifier().as_str() == identifier)
    }
}

// ── ScheduleDay ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDayDoc {
    #[serde(rename = "type")]
    pub kind:         String,
    pub identifier:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub values:       Vec<f64>,
    /// `[hour, minute]` pairs.  Defaults to a single 00:00 breakpoint.
    #[serde(default = "midnight_only")]
    pub times:        Vec<[u32; 2]>,
    #[serde(default)]
    pub interpolate:  bool,
}

fn midnight_only() -> Vec<[u32; 2]> {
    vec![[0, 0]]
}

impl From<&ScheduleDay> for ScheduleDayDoc {
    fn from(day: &ScheduleDay) -> Self {
        Self {
            kind:         DAY.to_string(),
            identifier:   day.identifier().to_string(),
            display_name: day.raw_display_name().map(str::to_string),
            values:       day.values().to_vec(),
            times:        day.times().iter().map(|t| t.to_array()).collect(),
            interpolate:  day.interpolate(),
        }
    }
}

impl TryFrom<ScheduleDayDoc> for ScheduleDay {
    type Error = IoError;

    fn try_from(doc: ScheduleDayDoc) -> IoResult<Self> {
        check_type(&doc.kind, &[DAY])?;
        let times = doc
            .times
            .into_iter()
            .map(Time::from_array)
            .collect::<Result<Vec<_>, _>>()?;
        let day = ScheduleDay::new(Identifier::new(doc.identifier)?, doc.values, times, doc.interpolate)?;
        Ok(match doc.display_name {
            Some(name) => day.with_display_name(name),
            None => day,
        })
    }
}

// ── ScheduleRule ──────────────────────────────────────────────────────────────

/// A day schedule given in full or by identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayRef {
    Identifier(String),
    Full(ScheduleDayDoc),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRuleDoc {
    #[serde(rename = "type")]
    pub kind:            String,
    pub schedule_day:    DayRef,
    #[serde(default)]
    pub apply_sunday:    bool,
    #[serde(default)]
    pub apply_monday:    bool,
    #[serde(default)]
    pub apply_tuesday:   bool,
    #[serde(default)]
    pub apply_wednesday: bool,
    #[serde(default)]
    pub apply_thursday:  bool,
    #[serde(default)]
    pub apply_friday:    bool,
    #[serde(default)]
    pub apply_saturday:  bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub apply_holiday:   bool,
    #[serde(default = "jan_1")]
    pub start_date:      [u32; 2],
    #[serde(default = "dec_31")]
    pub end_date:        [u32; 2],
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn jan_1() -> [u32; 2] {
    MonthDay::JAN_1.to_array()
}

fn dec_31() -> [u32; 2] {
    MonthDay::DEC_31.to_array()
}

impl ScheduleRuleDoc {
    /// Document embedding the full day schedule.
    pub fn full(rule: &ScheduleRule) -> Self {
        Self::with_day(rule, RULE, DayRef::Full(ScheduleDayDoc::from(rule.schedule_day().as_ref())))
    }

    /// Document referencing the day schedule by identifier.
    pub fn abridged(rule: &ScheduleRule) -> Self {
        Self::with_day(rule, RULE_ABRIDGED, DayRef::Identifier(rule.schedule_day().identifier().to_string()))
    }

    fn with_day(rule: &ScheduleRule, kind: &str, schedule_day: DayRef) -> Self {
        let [sun, mon, tue, wed, thu, fri, sat] = rule.week_apply_tuple();
        Self {
            kind: kind.to_string(),
            schedule_day,
            apply_sunday: sun,
            apply_monday: mon,
            apply_tuesday: tue,
            apply_wednesday: wed,
            apply_thursday: thu,
            apply_friday: fri,
            apply_saturday: sat,
            apply_holiday: rule.apply_holiday(),
            start_date: rule.start_date().to_array(),
            end_date: rule.end_date().to_array(),
        }
    }

    fn apply_days(&self) -> [bool; 7] {
        [
            self.apply_sunday,
            self.apply_monday,
            self.apply_tuesday,
            self.apply_wednesday,
            self.apply_thursday,
            self.apply_friday,
            self.apply_saturday,
        ]
    }

    /// Build the rule.  An identifier reference is resolved through `days`.
    pub fn into_rule(self, days: &HashMap<String, Arc<ScheduleDay>>) -> IoResult<ScheduleRule> {
        check_type(&self.kind, &[RULE, RULE_ABRIDGED])?;
        let apply_days = self.apply_days();
        let day = match self.schedule_day {
            DayRef::Full(doc) => Arc::new(ScheduleDay::try_from(doc)?),
            DayRef::Identifier(id) => days
                .get(&id)
                .cloned()
                .ok_or_else(|| unknown("schedule day", &id))?,
        };
        Ok(ScheduleRule::new(day)
            .with_days(apply_days)
            .with_apply_holiday(self.apply_holiday)
            .with_dates(MonthDay::try_from(self.start_date)?, MonthDay::try_from(self.end_date)?))
    }
}

impl TryFrom<ScheduleRuleDoc> for ScheduleRule {
    type Error = IoError;

    fn try_from(doc: ScheduleRuleDoc) -> IoResult<Self> {
        doc.into_rule(&HashMap::new())
    }
}

// ── ScheduleTypeLimit ─────────────────────────────────────────────────────────

/// A limit value, or `{"type": "NoLimit"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitDoc {
    Value(f64),
    NoLimit(NoLimitDoc),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoLimitDoc {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for LimitDoc {
    fn default() -> Self {
        LimitDoc::NoLimit(NoLimitDoc { kind: NO_LIMIT.to_string() })
    }
}

impl LimitDoc {
    fn from_limit(limit: Option<f64>) -> Self {
        limit.map_or_else(LimitDoc::default, LimitDoc::Value)
    }

    fn into_limit(self) -> IoResult<Option<f64>> {
        match self {
            LimitDoc::Value(v) => Ok(Some(v)),
            LimitDoc::NoLimit(doc) => {
                check_type(&doc.kind, &[NO_LIMIT])?;
                Ok(None)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTypeLimitDoc {
    #[serde(rename = "type")]
    pub kind:         String,
    pub identifier:   String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lower_limit:  LimitDoc,
    #[serde(default)]
    pub upper_limit:  LimitDoc,
    #[serde(default)]
    pub numeric_type: NumericType,
    #[serde(default)]
    pub unit_type:    UnitType,
}

impl From<&ScheduleTypeLimit> for ScheduleTypeLimitDoc {
    fn from(limit: &ScheduleTypeLimit) -> Self {
        Self {
            kind:         TYPE_LIMIT.to_string(),
            identifier:   limit.identifier().to_string(),
            display_name: limit.raw_display_name().map(str::to_string),
            lower_limit:  LimitDoc::from_limit(limit.lower_limit()),
            upper_limit:  LimitDoc::from_limit(limit.upper_limit()),
            numeric_type: limit.numeric_type(),
            unit_type:    limit.unit_type(),
        }
    }
}

impl TryFrom<ScheduleTypeLimitDoc> for ScheduleTypeLimit {
    type Error = IoError;

    fn try_from(doc: ScheduleTypeLimitDoc) -> IoResult<Self> {
        check_type(&doc.kind, &[TYPE_LIMIT])?;
        let limit = ScheduleTypeLimit::new(
            Identifier::new(doc.identifier)?,
            doc.lower_limit.into_limit()?,
            doc.upper_limit.into_limit()?,
            doc.numeric_type,
            doc.unit_type,
        )?;
        Ok(match doc.display_name {
            Some(name) => limit.with_display_name(name),
            None => limit,
        })
    }
}

// ── ScheduleRuleset ───────────────────────────────────────────────────────────

/// A type limit given in full or by identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeLimitRef {
    Identifier(String),
    Full(ScheduleTypeLimitDoc),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRulesetDoc {
    #[serde(rename = "type")]
    pub kind:                      String,
    pub identifier:                String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name:              Option<String>,
    pub day_schedules:             Vec<ScheduleDayDoc>,
    pub default_day_schedule:      String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule_rules:            Vec<ScheduleRuleDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_schedule:          Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summer_designday_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winter_designday_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type_limit:       Option<TypeLimitRef>,
}

impl ScheduleRulesetDoc {
    /// Document with the type limit in full.
    pub fn full(ruleset: &ScheduleRuleset) -> Self {
        Self::new(ruleset, false)
    }

    /// Document with the type limit by identifier.
    pub fn abridged(ruleset: &ScheduleRuleset) -> Self {
        Self::new(ruleset, true)
    }

    fn new(ruleset: &ScheduleRuleset, abridged: bool) -> Self {
        let id_of = |day: &Arc<ScheduleDay>| day.identifier().to_string();
        let schedule_type_limit = ruleset.schedule_type_limit().map(|limit| {
            if abridged {
                TypeLimitRef::Identifier(limit.identifier().to_string())
            } else {
                TypeLimitRef::Full(ScheduleTypeLimitDoc::from(limit))
            }
        });
        Self {
            kind: if abridged { RULESET_ABRIDGED } else { RULESET }.to_string(),
            identifier: ruleset.identifier().to_string(),
            display_name: ruleset.raw_display_name().map(str::to_string),
            day_schedules: ruleset
                .day_schedules()
                .into_iter()
                .map(|day| ScheduleDayDoc::from(day.as_ref()))
                .collect(),
            default_day_schedule: id_of(ruleset.default_day_schedule()),
            schedule_rules: ruleset.schedule_rules().iter().map(ScheduleRuleDoc::abridged).collect(),
            holiday_schedule: ruleset.holiday_schedule().map(id_of),
            summer_designday_schedule: ruleset.summer_designday_schedule().map(id_of),
            winter_designday_schedule: ruleset.winter_designday_schedule().map(id_of),
            schedule_type_limit,
        }
    }

    /// Build the ruleset, resolving type-limit identifiers through `type_limits`.
    pub fn into_ruleset<L>(self, type_limits: &L) -> IoResult<ScheduleRuleset>
    where
        L: TypeLimitLookup + ?Sized,
    {
        check_type(&self.kind, &[RULESET, RULESET_ABRIDGED])?;

        let mut days: HashMap<String, Arc<ScheduleDay>> = HashMap::new();
        for doc in self.day_schedules {
            let day = ScheduleDay::try_from(doc)?;
            days.insert(day.identifier().to_string(), Arc::new(day));
        }
        let rules = self
            .schedule_rules
            .into_iter()
            .map(|rule| rule.into_rule(&days))
            .collect::<IoResult<Vec<_>>>()?;
        let limit = match self.schedule_type_limit {
            None => None,
            Some(TypeLimitRef::Full(doc)) => Some(ScheduleTypeLimit::try_from(doc)?),
            Some(TypeLimitRef::Identifier(id)) => Some(
                type_limits
                    .type_limit(&id)
                    .cloned()
                    .ok_or_else(|| unknown("schedule type limit", &id))?,
            ),
        };

        let day = |id: &str| days.get(id).cloned().ok_or_else(|| unknown("schedule day", id));
        let mut builder = ScheduleRuleset::builder(Identifier::new(self.identifier)?, day(&self.default_day_schedule)?)
            .rules(rules)
            .schedule_type_limit(limit);
        if let Some(id) = &self.holiday_schedule {
            builder = builder.holiday_schedule(day(id)?);
        }
        if let Some(id) = &self.summer_designday_schedule {
            builder = builder.summer_designday_schedule(day(id)?);
        }
        if let Some(id) = &self.winter_designday_schedule {
            builder = builder.winter_designday_schedule(day(id)?);
        }
        if let Some(name) = self.display_name {
            builder = builder.display_name(name);
        }
        Ok(builder.build()?)
    }
}

impl TryFrom<ScheduleRulesetDoc> for ScheduleRuleset {
    type Error = IoError;

    fn try_from(doc: ScheduleRulesetDoc) -> IoResult<Self> {
        doc.into_ruleset(&HashMap::<String, ScheduleTypeLimit>::new())
    }
}

// ── String helpers ────────────────────────────────────────────────────────────

pub fn day_to_json(day: &ScheduleDay) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(&ScheduleDayDoc::from(day))?)
}

pub fn day_from_json(json: &str) -> IoResult<ScheduleDay> {
    ScheduleDay::try_from(serde_json::from_str::<ScheduleDayDoc>(json)?)
}

pub fn rule_to_json(rule: &ScheduleRule) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(&ScheduleRuleDoc::full(rule))?)
}

pub fn rule_from_json(json: &str) -> IoResult<ScheduleRule> {
    ScheduleRule::try_from(serde_json::from_str::<ScheduleRuleDoc>(json)?)
}

/// Serialize a ruleset; `abridged` writes the type limit by identifier.
pub fn ruleset_to_json(ruleset: &ScheduleRuleset, abridged: bool) -> IoResult<String> {
    let doc = ScheduleRulesetDoc::new(ruleset, abridged);
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a full or abridged ruleset document.
pub fn ruleset_from_json<L>(json: &str, type_limits: &L) -> IoResult<ScheduleRuleset>
where
    L: TypeLimitLookup + ?Sized,
{
    serde_json::from_str::<ScheduleRulesetDoc>(json)?.into_ruleset(type_limits)
}

pub fn type_limit_to_json(limit: &ScheduleTypeLimit) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(&ScheduleTypeLimitDoc::from(limit))?)
}

pub fn type_limit_from_json(json: &str) -> IoResult<ScheduleTypeLimit> {
    ScheduleTypeLimit::try_from(serde_json::from_str::<ScheduleTypeLimitDoc>(json)?)
}

/// Build a ruleset from any schedule document, dispatching on `"type"`.
pub fn schedule_from_value<L>(value: Value, type_limits: &L) -> IoResult<ScheduleRuleset>
where
    L: TypeLimitLookup + ?Sized,
{
    let kind = document_type(&value)?;
    if kind != RULESET && kind != RULESET_ABRIDGED {
        return Err(IoError::UnexpectedType { expected: RULESET, got: kind.to_string() });
    }
    serde_json::from_value::<ScheduleRulesetDoc>(value)?.into_ruleset(type_limits)
}

/// The `"type"` tag of a document.
pub fn document_type(value: &Value) -> IoResult<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| IoError::Parse("JSON document lacks a \"type\" key".to_string()))
}

/// Evaluation options from a run configuration document.  Missing keys take
/// their defaults.
pub fn values_options_from_json(json: &str) -> IoResult<ValuesOptions> {
    Ok(serde_json::from_str(json)?)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_type(got: &str, accepted: &[&'static str]) -> IoResult<()> {
    if accepted.contains(&got) {
        return Ok(());
    }
    Err(IoError::UnexpectedType {
        expected: accepted.first().copied().unwrap_or_default(),
        got:      got.to_string(),
    })
}

pub(crate) fn unknown(kind: &'static str, name: &str) -> IoError {
    IoError::UnknownReference { kind, name: name.to_string() }
}

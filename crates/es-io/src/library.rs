//! `ScheduleLibrary`: a registry of type limits and rulesets keyed by
//! identifier, filled from JSON and IDF files.
//!
//! # Loading order
//!
//! Rulesets reference type limits by identifier, so every loader registers
//! type limits before it resolves schedules.  [`ScheduleLibrary::load_dir`]
//! loads all `.idf` files before all `.json` files for the same reason.
//!
//! Loading is lenient at the file level: an object that fails to resolve is
//! logged at `warn` and skipped.  A file that cannot be read or is not valid
//! JSON is an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use es_schedule::{ScheduleRuleset, ScheduleTypeLimit, ValuesOptions};

use crate::idf::{extract_rulesets, split_idf_objects};
use crate::json::{
    RULESET, RULESET_ABRIDGED, ScheduleTypeLimitDoc, TYPE_LIMIT, TypeLimitLookup, document_type,
    schedule_from_value, unknown,
};
use crate::{IoError, IoResult};

#[derive(Clone, Debug, Default)]
pub struct ScheduleLibrary {
    type_limits: BTreeMap<String, ScheduleTypeLimit>,
    schedules:   BTreeMap<String, ScheduleRuleset>,
}

impl ScheduleLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A library holding the standard type-limit presets.
    pub fn standard() -> Self {
        let mut lib = Self::new();
        for limit in ScheduleTypeLimit::standard() {
            lib.add_type_limit(limit);
        }
        lib
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register `limit`, returning any limit it replaced.
    pub fn add_type_limit(&mut self, limit: ScheduleTypeLimit) -> Option<ScheduleTypeLimit> {
        self.type_limits.insert(limit.identifier().to_string(), limit)
    }

    /// Register `schedule`, returning any schedule it replaced.
    pub fn add_schedule(&mut self, schedule: ScheduleRuleset) -> Option<ScheduleRuleset> {
        let id = schedule.identifier().to_string();
        if self.schedules.contains_key(&id) {
            log::debug!("replacing schedule {id:?}");
        }
        self.schedules.insert(id, schedule)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn schedule(&self, identifier: &str) -> Option<&ScheduleRuleset> {
        self.schedules.get(identifier)
    }

    pub fn schedules(&self) -> impl Iterator<Item = &ScheduleRuleset> {
        self.schedules.values()
    }

    pub fn type_limits(&self) -> impl Iterator<Item = &ScheduleTypeLimit> {
        self.type_limits.values()
    }

    /// Number of schedules (type limits are not counted).
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Annual values of the schedule named `identifier`.
    pub fn values(&self, identifier: &str, opts: &ValuesOptions) -> IoResult<Vec<f64>> {
        let schedule = self.schedule(identifier).ok_or_else(|| unknown("schedule", identifier))?;
        Ok(schedule.values(opts)?)
    }

    // ── IDF ───────────────────────────────────────────────────────────────

    /// Register every type limit and every resolvable `Schedule:Year` /
    /// `Schedule:Constant` in `text`.  Returns the number of schedules added.
    pub fn load_idf_str(&mut self, text: &str) -> usize {
        let objects = split_idf_objects(text);
        let (index, rulesets) = extract_rulesets(&objects);
        for limit in index.type_limits() {
            self.add_type_limit(limit.clone());
        }
        let count = rulesets.len();
        for ruleset in rulesets {
            self.add_schedule(ruleset);
        }
        count
    }

    pub fn load_idf_file(&mut self, path: &Path) -> IoResult<usize> {
        let text = std::fs::read_to_string(path)?;
        let count = self.load_idf_str(&text);
        log::info!("loaded {count} schedules from {}", path.display());
        Ok(count)
    }

    // ── JSON ──────────────────────────────────────────────────────────────

    /// Register the documents in `json`: a single document, an array of
    /// documents, or an object mapping identifiers to documents.  Type-limit
    /// documents are registered first so rulesets in the same file can
    /// reference them.  Returns the number of schedules added.
    pub fn load_json_str(&mut self, json: &str) -> IoResult<usize> {
        let docs = match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => items,
            obj @ Value::Object(_) if obj.get("type").is_some() => vec![obj],
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            other => {
                return Err(IoError::Parse(format!("expected a JSON object or array, got {other}")));
            }
        };

        let mut schedules = Vec::new();
        for doc in docs {
            let kind = document_type(&doc).map(str::to_owned);
            match kind.as_deref() {
                Ok(TYPE_LIMIT) => match serde_json::from_value::<ScheduleTypeLimitDoc>(doc)
                    .map_err(IoError::from)
                    .and_then(ScheduleTypeLimit::try_from)
                {
                    Ok(limit) => {
                        self.add_type_limit(limit);
                    }
                    Err(e) => log::warn!("skipping type limit document: {e}"),
                },
                Ok(RULESET | RULESET_ABRIDGED) => schedules.push(doc),
                Ok(other) => log::debug!("ignoring {other} document"),
                Err(e) => log::warn!("skipping document: {e}"),
            }
        }

        let mut count = 0;
        for doc in schedules {
            match schedule_from_value(doc, &self.type_limits) {
                Ok(ruleset) => {
                    self.add_schedule(ruleset);
                    count += 1;
                }
                Err(e) => log::warn!("skipping schedule document: {e}"),
            }
        }
        Ok(count)
    }

    pub fn load_json_file(&mut self, path: &Path) -> IoResult<usize> {
        let text = std::fs::read_to_string(path)?;
        let count = self.load_json_str(&text)?;
        log::info!("loaded {count} schedules from {}", path.display());
        Ok(count)
    }

    // ── Directories ───────────────────────────────────────────────────────

    /// Load every `.idf` then every `.json` file directly inside `dir`.
    /// Returns the total number of schedules added.
    pub fn load_dir(&mut self, dir: &Path) -> IoResult<usize> {
        let files = sorted_files(dir)?;
        let mut count = 0;
        for path in files.iter().filter(|p| has_extension(p, "idf")) {
            count += self.load_idf_file(path)?;
        }
        for path in files.iter().filter(|p| has_extension(p, "json")) {
            count += self.load_json_file(path)?;
        }
        log::info!("schedule library holds {} schedules after loading {}", self.len(), dir.display());
        Ok(count)
    }
}

impl TypeLimitLookup for ScheduleLibrary {
    fn type_limit(&self, identifier: &str) -> Option<&ScheduleTypeLimit> {
        self.type_limits.get(identifier)
    }
}

fn sorted_files(dir: &Path) -> IoResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

//! `es-io` — interchange formats and a schedule registry for the
//! `energy_sched` toolkit.
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`json`]    | Tagged JSON documents for days, rules, rulesets, type limits |
//! | [`idf`]     | EnergyPlus IDF objects: parse, generate, resolve rulesets    |
//! | [`library`] | `ScheduleLibrary`, loaded from `.idf` / `.json` files        |
//! | [`error`]   | `IoError`, `IoResult<T>`                                     |
//!
//! # Usage
//!
//! ```rust,ignore
//! use es_io::ScheduleLibrary;
//! use es_schedule::ValuesOptions;
//!
//! let mut lib = ScheduleLibrary::standard();
//! lib.load_dir(Path::new("./schedules"))?;
//! let occ = lib.values("Office Occ", &ValuesOptions::default())?;
//! ```

pub mod error;
pub mod idf;
pub mod json;
pub mod library;


pub use error::{IoError, IoResult};
pub use idf::{
    IdfObject, IdfSchedules, day_from_idf, day_to_idf, extract_all_from_idf_file, extract_all_from_idf_str,
    ruleset_from_idf, ruleset_to_idf, ruleset_to_idf_text, type_limit_from_idf, type_limit_to_idf,
};
pub use json::{
    ScheduleDayDoc, ScheduleRuleDoc, ScheduleRulesetDoc, ScheduleTypeLimitDoc, TypeLimitLookup, ruleset_from_json,
    ruleset_to_json,
};
pub use library::ScheduleLibrary;

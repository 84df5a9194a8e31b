//! `es-schedule` — schedule days, rules and rulesets for building-energy
//! simulation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`day`]       | `ScheduleDay`, `ScheduleDayBuilder`                         |
//! | [`rule`]      | `ScheduleRule`                                              |
//! | [`ruleset`]   | `ScheduleRuleset`, `ScheduleRulesetBuilder`, week inputs    |
//! | [`average`]   | `ScheduleRuleset::average_schedules`                        |
//! | [`typelimit`] | `ScheduleTypeLimit`, `NumericType`, `UnitType`              |
//! | [`options`]   | `ValuesOptions`                                             |
//! | [`loader`]    | `load_week_schedules_csv`, `load_week_schedules_reader`     |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                        |
//!
//! # Evaluation model (summary)
//!
//! ```text
//! ScheduleRuleset::values(opts)
//!   for doy in start..=end:
//!     day  = first matching rule (date range + weekday) or default
//!     out += day.values_at_timestep(opts.timestep)     // memoized per day
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `serde`    | Serde derives on `ValuesOptions` and the type-limit enums |
//! | `parallel` | `ScheduleRuleset::values_for_all` runs on Rayon         |
//! | `fx-hash`  | FxHash for the per-call day-values memo                 |

pub mod average;
pub mod day;
pub mod error;
pub mod loader;
pub mod options;
pub mod rule;
pub mod ruleset;
pub mod typelimit;

#[cfg(test)]
mod tests;

pub use day::{ScheduleDay, ScheduleDayBuilder};
pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_week_schedules_csv, load_week_schedules_reader};
pub use options::ValuesOptions;
pub use rule::ScheduleRule;
pub use ruleset::{ScheduleRuleset, ScheduleRulesetBuilder, WeekPeriod, WeekSchedules, WeekValues};
pub use typelimit::{NumericType, ScheduleTypeLimit, UnitType};

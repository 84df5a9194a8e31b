//! `es-core` — foundational types for the `energy_sched` schedule toolkit.
//!
//! This crate is a dependency of every other `es-*` crate.  It has no `es-*`
//! dependencies and few external ones (`chrono` for calendar arithmetic and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`time`]        | `Time` (time of day), `Timestep`                      |
//! | [`calendar`]    | `DayOfWeek`, `MonthDay`, `Calendar`                   |
//! | [`ids`]         | `Identifier`                                          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod calendar;
pub mod error;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use calendar::{Calendar, DayOfWeek, MonthDay};
pub use error::{CoreError, CoreResult};
pub use ids::Identifier;
pub use time::{MINUTES_PER_DAY, Time, Timestep};

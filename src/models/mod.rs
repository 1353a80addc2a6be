//! Domain models for attendance marking.
//!
//! # Core Concepts
//!
//! - [`Roster`]: the fixed, ordered list of students for a class. Each student
//!   gets a [`StudentId`] that indexes per-session state.
//! - [`AttendanceStatus`]: one of `Absent`, `Present`, `Late`, `EarlyLeave`,
//!   advanced through a fixed cycle.
//! - [`AttendanceRecord`]: the permanent, per-day outcome of a submitted
//!   session. One record per date; resubmitting a date replaces it.
//!
//! Sessions themselves are ephemeral and live in [`crate::session`].

mod record;
mod roster;
mod status;

pub use record::*;
pub use roster::*;
pub use status::*;

//! Class attendance marking.
//!
//! An operator marks each student of a fixed roster with one of four
//! statuses during a time-boxed [`session::AttendanceSession`], submits it as a
//! per-day [`models::AttendanceRecord`], and later reviews attendance rates
//! computed by [`summary::summarize`] over every stored record.

pub mod config;
pub mod db;
pub mod desk;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod store;
pub mod summary;

pub use desk::AttendanceDesk;
pub use error::{AttendanceError, PersistenceError, ValidationError};

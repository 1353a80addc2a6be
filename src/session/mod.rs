//! The in-memory marking session.
//!
//! A session is started with a roster snapshot, accepts status toggles while
//! open, and is finalized once by [`AttendanceSession::submit`]. The marking
//! window is enforced by delivering [`AttendanceSession::expire`] from the
//! outside (see [`ExpiryTimer`]); the session itself never looks at a clock.

mod timer;

pub use timer::*;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{AttendanceRecord, AttendanceStatus, Roster, StatusCounts, StudentId};

/// How long a session accepts toggles after it starts.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// What the lock blocks once the marking window has closed.
///
/// - `ToggleOnly`: toggles are rejected, a final submit is still accepted
/// - `ToggleAndSubmit`: both toggles and submit are rejected
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    #[default]
    ToggleOnly,
    ToggleAndSubmit,
}

/// Result of a toggle request. Ignored toggles change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Changed(AttendanceStatus),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Locked,
    Submitted,
    UnknownStudent,
}

impl ToggleOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// One bounded attendance-marking interaction.
///
/// `statuses[i]` belongs to the roster student with id `i`. Once `submitted`
/// is set the status array is frozen.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    id: Uuid,
    roster: Roster,
    statuses: Vec<AttendanceStatus>,
    locked: bool,
    submitted: bool,
    policy: LockPolicy,
    started_at: DateTime<Utc>,
    record: Option<AttendanceRecord>,
}

impl AttendanceSession {
    /// Start a session with every student marked absent.
    pub fn start(roster: Roster) -> Self {
        Self::start_with_policy(roster, LockPolicy::default())
    }

    pub fn start_with_policy(roster: Roster, policy: LockPolicy) -> Self {
        let statuses = vec![AttendanceStatus::Absent; roster.len()];
        Self {
            id: Uuid::new_v4(),
            roster,
            statuses,
            locked: false,
            submitted: false,
            policy,
            started_at: Utc::now(),
            record: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Whether toggles are currently accepted.
    pub fn is_open(&self) -> bool {
        !self.locked && !self.submitted
    }

    /// The record produced by `submit`, kept so a failed save can be retried.
    pub fn record(&self) -> Option<&AttendanceRecord> {
        self.record.as_ref()
    }

    pub fn status_of(&self, name: &str) -> Option<AttendanceStatus> {
        self.roster.id_of(name).map(|id| self.statuses[id.index()])
    }

    /// Name and status of every student, in roster order.
    pub fn statuses(&self) -> impl Iterator<Item = (&str, AttendanceStatus)> {
        self.roster
            .iter()
            .map(|(id, name)| (name, self.statuses[id.index()]))
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for status in &self.statuses {
            counts.add(*status);
        }
        counts
    }

    /// Advance a student's status by name.
    pub fn toggle_status(&mut self, name: &str) -> ToggleOutcome {
        match self.roster.id_of(name) {
            Some(id) => self.toggle(id),
            None => ToggleOutcome::Ignored(IgnoreReason::UnknownStudent),
        }
    }

    /// Advance a student's status along the marking cycle.
    pub fn toggle(&mut self, id: StudentId) -> ToggleOutcome {
        if self.submitted {
            return ToggleOutcome::Ignored(IgnoreReason::Submitted);
        }
        if self.locked {
            return ToggleOutcome::Ignored(IgnoreReason::Locked);
        }
        let Some(slot) = self.statuses.get_mut(id.index()) else {
            return ToggleOutcome::Ignored(IgnoreReason::UnknownStudent);
        };
        *slot = slot.next();
        ToggleOutcome::Changed(*slot)
    }

    /// Close the marking window. Returns `true` if this call applied the lock.
    pub fn expire(&mut self) -> bool {
        if self.submitted || self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Finalize the session into a record dated `date`.
    ///
    /// Names land in each list in roster order.
    pub fn submit(&mut self, date: NaiveDate) -> Result<AttendanceRecord, ValidationError> {
        if self.submitted {
            return Err(ValidationError::AlreadySubmitted);
        }
        if self.locked && self.policy == LockPolicy::ToggleAndSubmit {
            return Err(ValidationError::SessionLocked);
        }

        let mut record = AttendanceRecord::new(date);
        for (id, name) in self.roster.iter() {
            record.push(name, self.statuses[id.index()]);
        }

        self.submitted = true;
        self.record = Some(record.clone());
        Ok(record)
    }
}

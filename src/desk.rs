//! The single-operator controller that ties a session to the record store.
//!
//! The desk owns the roster, at most one active session with its expiry
//! timer, and a cached copy of the stored records. The cache only changes
//! after the store confirms a write, so a failed save leaves the desk and the
//! store agreeing with each other.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AttendanceError, PersistenceError, ValidationError};
use crate::models::{AttendanceRecord, Roster};
use crate::session::{
    AttendanceSession, ExpiryTimer, LockPolicy, SessionEvent, ToggleOutcome, DEFAULT_WINDOW,
};
use crate::store::RecordStore;
use crate::summary::{summarize, Summary};

struct ActiveSession {
    session: AttendanceSession,
    timer: Option<ExpiryTimer>,
}

pub struct AttendanceDesk {
    store: RecordStore,
    roster: Roster,
    window: Duration,
    policy: LockPolicy,
    active: Option<ActiveSession>,
    records: Vec<AttendanceRecord>,
    events: UnboundedSender<SessionEvent>,
}

impl AttendanceDesk {
    /// Create a desk. Expiry events arrive on the returned receiver and must
    /// be passed back through [`AttendanceDesk::handle_event`].
    pub fn new(
        store: RecordStore,
        roster: Roster,
        window: Duration,
        policy: LockPolicy,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let desk = Self {
            store,
            roster,
            window,
            policy,
            active: None,
            records: Vec::new(),
            events,
        };
        (desk, rx)
    }

    pub fn with_defaults(
        store: RecordStore,
        roster: Roster,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        Self::new(store, roster, DEFAULT_WINDOW, LockPolicy::default())
    }

    pub fn from_config(
        store: RecordStore,
        config: &Config,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        Self::new(
            store,
            config.roster.clone(),
            config.window(),
            config.lock_policy,
        )
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Records as of the last successful load or save.
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn session(&self) -> Option<&AttendanceSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Reload the cached records from the store.
    pub async fn refresh(&mut self) -> Result<&[AttendanceRecord], PersistenceError> {
        self.records = self.store.load_all().await?;
        Ok(&self.records)
    }

    /// Summary over the cached records for the current roster.
    pub fn summary(&self) -> Summary {
        summarize(&self.records, &self.roster)
    }

    // ============================================================
    // Session lifecycle
    // ============================================================

    /// Start a fresh session, discarding any session still open.
    ///
    /// Must be called inside a tokio runtime: it arms the expiry timer.
    pub fn begin_session(&mut self) -> Uuid {
        self.end_session();

        let session = AttendanceSession::start_with_policy(self.roster.clone(), self.policy);
        let id = session.id();
        let timer = ExpiryTimer::arm(id, self.window, self.events.clone());

        tracing::info!(
            session_id = %id,
            students = self.roster.len(),
            window_secs = self.window.as_secs(),
            "Attendance session started"
        );

        self.active = Some(ActiveSession {
            session,
            timer: Some(timer),
        });
        id
    }

    /// Discard the active session, submitted or not, and cancel its timer.
    pub fn end_session(&mut self) -> Option<AttendanceSession> {
        let active = self.active.take()?;
        if let Some(timer) = active.timer {
            timer.cancel();
        }
        tracing::debug!(session_id = %active.session.id(), "Attendance session closed");
        Some(active.session)
    }

    pub fn toggle(&mut self, name: &str) -> Result<ToggleOutcome, ValidationError> {
        let active = self.active.as_mut().ok_or(ValidationError::NoActiveSession)?;
        let outcome = active.session.toggle_status(name);
        log_toggle(name, outcome);
        Ok(outcome)
    }

    /// Toggle by 1-based position in the roster listing.
    pub fn toggle_at(&mut self, position: usize) -> Result<ToggleOutcome, ValidationError> {
        let name = self
            .roster
            .id_at(position)
            .and_then(|id| self.roster.name(id))
            .map(str::to_string)
            .ok_or_else(|| ValidationError::UnknownStudent(format!("#{}", position)))?;
        self.toggle(&name)
    }

    /// Apply an event from the expiry timer. Returns whether a lock was applied.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Expired { session_id } => {
                let Some(active) = self
                    .active
                    .as_mut()
                    .filter(|a| a.session.id() == session_id)
                else {
                    tracing::debug!(%session_id, "Ignoring expiry for a closed session");
                    return false;
                };
                active.timer = None;
                let locked = active.session.expire();
                if locked {
                    tracing::warn!(%session_id, "Marking window closed, attendance is locked");
                }
                locked
            }
        }
    }

    // ============================================================
    // Submission
    // ============================================================

    /// Finalize the active session for `date` and save the record.
    ///
    /// If the save fails the session stays submitted and keeps its record;
    /// call [`AttendanceDesk::retry_save`] to try again.
    pub async fn submit(&mut self, date: NaiveDate) -> Result<AttendanceRecord, AttendanceError> {
        let active = self.active.as_mut().ok_or(ValidationError::NoActiveSession)?;
        let record = active.session.submit(date)?;
        if let Some(timer) = active.timer.take() {
            timer.cancel();
        }

        let counts = record.counts();
        tracing::info!(
            session_id = %active.session.id(),
            date = %record.date,
            present = counts.present,
            late = counts.late,
            early_leave = counts.early_leave,
            absent = counts.absent,
            "Attendance submitted"
        );

        self.save(record).await
    }

    /// Save the submitted record of the active session again.
    pub async fn retry_save(&mut self) -> Result<AttendanceRecord, AttendanceError> {
        let record = self
            .session()
            .and_then(|s| s.record())
            .cloned()
            .ok_or(ValidationError::NothingToSave)?;
        self.save(record).await
    }

    async fn save(
        &mut self,
        record: AttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceError> {
        if let Err(e) = self.store.upsert(record.clone()).await {
            tracing::warn!(date = %record.date, "Failed to save attendance: {}", e);
            return Err(e.into());
        }

        self.records.retain(|r| r.date != record.date);
        self.records.push(record.clone());
        Ok(record)
    }
}

fn log_toggle(name: &str, outcome: ToggleOutcome) {
    match outcome {
        ToggleOutcome::Changed(status) => {
            tracing::debug!(student = name, status = status.as_str(), "Status changed")
        }
        ToggleOutcome::Ignored(reason) => {
            tracing::debug!(student = name, ?reason, "Toggle ignored")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn desk() -> (AttendanceDesk, UnboundedReceiver<SessionEvent>) {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        AttendanceDesk::with_defaults(RecordStore::new(db), Roster::new(["A", "B"]).unwrap())
    }

    #[tokio::test]
    async fn toggle_without_session_is_rejected() {
        let (mut desk, _rx) = desk();
        assert_eq!(desk.toggle("A"), Err(ValidationError::NoActiveSession));
    }

    #[tokio::test]
    async fn toggle_by_position() {
        let (mut desk, _rx) = desk();
        desk.begin_session();
        assert!(desk.toggle_at(2).unwrap().is_changed());
        assert!(desk.toggle_at(3).is_err());
        assert_eq!(
            desk.session().unwrap().status_of("B"),
            Some(crate::models::AttendanceStatus::Present)
        );
    }

    #[tokio::test]
    async fn stale_expiry_is_ignored() {
        let (mut desk, _rx) = desk();
        let first = desk.begin_session();
        desk.begin_session();

        assert!(!desk.handle_event(SessionEvent::Expired { session_id: first }));
        assert!(!desk.session().unwrap().is_locked());
    }

    #[tokio::test]
    async fn retry_without_submission_is_rejected() {
        let (mut desk, _rx) = desk();
        desk.begin_session();
        let err = desk.retry_save().await.unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::Validation(ValidationError::NothingToSave)
        ));
    }
}

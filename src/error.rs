//! Error types shared by the session, the record store and the desk.

use thiserror::Error;

/// A rejected operation. Never fatal and never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("attendance has already been submitted for this session")]
    AlreadySubmitted,

    #[error("the marking window has closed")]
    SessionLocked,

    #[error("student not on the roster: {0}")]
    UnknownStudent(String),

    #[error("student listed more than once: {0}")]
    DuplicateStudent(String),

    #[error("student names must not be blank")]
    BlankStudent,

    #[error("no attendance session is open")]
    NoActiveSession,

    #[error("session has no submitted record to save")]
    NothingToSave,
}

/// Storage read/write failure.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored attendance data is corrupt: {0}")]
    Corrupt(String),

    #[error("failed to serialize attendance data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Any error the desk can return.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl AttendanceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

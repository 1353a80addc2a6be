//! Async front for the record store.
//!
//! SQLite calls run on tokio's blocking pool. Writes pass through a shared
//! gate so at most one read-modify-write is in flight, whichever clone of the
//! store issues it.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::Database;
use crate::error::PersistenceError;
use crate::models::AttendanceRecord;

type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Clone)]
pub struct RecordStore {
    db: Database,
    write_gate: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Store `record`, replacing any record for the same date.
    pub async fn upsert(&self, record: AttendanceRecord) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let db = self.db.clone();
        run_blocking(move || db.upsert_record(&record)).await
    }

    pub async fn load_all(&self) -> Result<Vec<AttendanceRecord>> {
        let db = self.db.clone();
        run_blocking(move || db.get_all_records()).await
    }

    pub async fn export_json(&self) -> Result<String> {
        let db = self.db.clone();
        run_blocking(move || db.export_json()).await
    }

    pub async fn import_json(&self, json: String) -> Result<usize> {
        let _gate = self.write_gate.lock().await;
        let db = self.db.clone();
        run_blocking(move || db.import_json(&json)).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PersistenceError::Unavailable(format!("storage task failed: {}", e)))?
}

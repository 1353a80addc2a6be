//! SQLite-backed record store.
//!
//! Holds one [`AttendanceRecord`] per calendar date. Writes are upserts keyed
//! by date and run inside a transaction, so a failed write leaves the stored
//! collection exactly as it was.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::error::PersistenceError;
use crate::models::AttendanceRecord;

type Result<T> = std::result::Result<T, PersistenceError>;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path.parent().ok_or_else(|| {
            PersistenceError::Unavailable("Database path has no parent directory".to_string())
        })?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!("Opened attendance database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::Unavailable("database lock poisoned".to_string()))
    }

    // ============================================================
    // Record operations
    // ============================================================

    /// Insert `record`, replacing any record already stored for its date.
    ///
    /// The replacement becomes the newest record in insertion order.
    pub fn upsert_record(&self, record: &AttendanceRecord) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let replaced = upsert_in(&tx, record)?;
        tx.commit()?;

        tracing::info!(
            date = %record.date,
            replaced,
            "Saved attendance record"
        );
        Ok(())
    }

    /// Every stored record, oldest insertion first. Empty on first run.
    pub fn get_all_records(&self) -> Result<Vec<AttendanceRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT date, present, late, early_leave, absent
             FROM attendance_records ORDER BY seq",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRecord {
                    date: row.get(0)?,
                    present: row.get(1)?,
                    late: row.get(2)?,
                    early_leave: row.get(3)?,
                    absent: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRecord::parse).collect()
    }

    pub fn get_record(&self, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT date, present, late, early_leave, absent
                 FROM attendance_records WHERE date = ?",
                [format_date(date)],
                |row| {
                    Ok(RawRecord {
                        date: row.get(0)?,
                        present: row.get(1)?,
                        late: row.get(2)?,
                        early_leave: row.get(3)?,
                        absent: row.get(4)?,
                    })
                },
            )
            .optional()?;

        raw.map(RawRecord::parse).transpose()
    }

    pub fn delete_record(&self, date: NaiveDate) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "DELETE FROM attendance_records WHERE date = ?",
            [format_date(date)],
        )?;
        Ok(rows > 0)
    }

    // ============================================================
    // JSON interchange
    // ============================================================

    /// All records as a JSON array, in insertion order.
    pub fn export_json(&self) -> Result<String> {
        let records = self.get_all_records()?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Upsert every record of a JSON array, in order. A date repeated in the
    /// input keeps its last entry. Nothing is written if the input does not
    /// parse, a record lists a student under more than one status, or any
    /// write fails.
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let records: Vec<AttendanceRecord> = serde_json::from_str(json)
            .map_err(|e| PersistenceError::Corrupt(format!("invalid record list: {}", e)))?;
        for record in &records {
            record
                .check_disjoint()
                .map_err(|e| PersistenceError::Corrupt(format!("{}: {}", record.date, e)))?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for record in &records {
            upsert_in(&tx, record)?;
        }
        tx.commit()?;

        tracing::info!("Imported {} attendance records", records.len());
        Ok(records.len())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<platform data dir>/attendance.db`.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "attendance-register").ok_or_else(|| {
        PersistenceError::Unavailable("Could not determine data directory".to_string())
    })?;
    Ok(dirs.data_dir().join("attendance.db"))
}

/// Returns whether an existing row for the date was replaced.
fn upsert_in(conn: &Connection, record: &AttendanceRecord) -> Result<bool> {
    let date = format_date(record.date);
    let replaced = conn.execute("DELETE FROM attendance_records WHERE date = ?", [&date])?;

    conn.execute(
        "INSERT INTO attendance_records (date, present, late, early_leave, absent, recorded_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            &date,
            serde_json::to_string(&record.present)?,
            serde_json::to_string(&record.late)?,
            serde_json::to_string(&record.early_leave)?,
            serde_json::to_string(&record.absent)?,
            Utc::now().to_rfc3339(),
        ),
    )?;

    Ok(replaced > 0)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

struct RawRecord {
    date: String,
    present: String,
    late: String,
    early_leave: String,
    absent: String,
}

impl RawRecord {
    fn parse(self) -> Result<AttendanceRecord> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| PersistenceError::Corrupt(format!("bad date {:?}: {}", self.date, e)))?;
        Ok(AttendanceRecord {
            date,
            present: parse_names(&self.date, "present", &self.present)?,
            late: parse_names(&self.date, "late", &self.late)?,
            early_leave: parse_names(&self.date, "early_leave", &self.early_leave)?,
            absent: parse_names(&self.date, "absent", &self.absent)?,
        })
    }
}

fn parse_names(date: &str, column: &str, json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| {
        PersistenceError::Corrupt(format!("bad {} list for {}: {}", column, date, e))
    })
}

//! Plain-text rendering of sessions, records and summaries.

use crate::models::{AttendanceRecord, AttendanceStatus};
use crate::session::AttendanceSession;
use crate::summary::Summary;

const PRESENT: &str = "✅";
const LATE: &str = "⏰";
const EARLY_LEAVE: &str = "🏃";
const ABSENT: &str = "❌";

/// Get the marker shown next to a student with this status.
fn status_symbol(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => PRESENT,
        AttendanceStatus::Late => LATE,
        AttendanceStatus::EarlyLeave => EARLY_LEAVE,
        AttendanceStatus::Absent => ABSENT,
    }
}

/// Numbered roster with each student's current mark.
///
/// ```text
///  1. Aarav Sharma ✅
///  2. Meera Patel ❌
/// [open]
/// ```
pub fn render_marking(session: &AttendanceSession) -> String {
    let mut output = String::new();
    for (i, (name, status)) in session.statuses().enumerate() {
        output.push_str(&format!("{:>2}. {} {}\n", i + 1, name, status_symbol(status)));
    }
    let state = if session.is_submitted() {
        "submitted"
    } else if session.is_locked() {
        "locked"
    } else {
        "open"
    };
    output.push_str(&format!("[{}]\n", state));
    output
}

/// Per-status head counts shown after a submission.
pub fn render_submission(record: &AttendanceRecord) -> String {
    let counts = record.counts();
    format!(
        "Attendance Submitted\nPresent: {}\nLate: {}\nEarly Leave: {}\nAbsent: {}\n",
        counts.present, counts.late, counts.early_leave, counts.absent
    )
}

/// One record with every status list, `None` for empty lists.
pub fn render_record(record: &AttendanceRecord) -> String {
    let mut output = format!("Date: {}\n", record.date);
    for status in [
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::EarlyLeave,
        AttendanceStatus::Absent,
    ] {
        output.push_str(&format!("{}:\n", status.label()));
        let names = record.list(status);
        if names.is_empty() {
            output.push_str("  None\n");
        }
        for name in names {
            output.push_str(&format!("  {} {}\n", status_symbol(status), name));
        }
    }
    output
}

/// Every record, latest date first.
pub fn render_history(records: &[AttendanceRecord]) -> String {
    if records.is_empty() {
        return "No previous attendance records found.\n".to_string();
    }
    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    sorted
        .into_iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Total sessions and each student's rate to one decimal place.
pub fn render_dashboard(summary: &Summary) -> String {
    let width = summary
        .students
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = format!("Total Classes Held: {}\n", summary.total_sessions);
    for student in &summary.students {
        output.push_str(&format!(
            "{:<width$}  {:>5.1}%\n",
            student.name,
            student.percent(),
            width = width
        ));
    }
    output
}

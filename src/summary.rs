//! Attendance-rate aggregation over stored records.

use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, AttendanceStatus, Roster};

/// Per-student totals across every stored session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    pub name: String,
    /// Sessions where the student was present or late.
    pub attended: usize,
    pub present: usize,
    pub late: usize,
    pub early_leave: usize,
    pub absent: usize,
    /// `attended / total_sessions`, 0.0 when there are no sessions.
    pub rate: f64,
}

impl StudentAttendance {
    pub fn percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Derived statistics over all stored records. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_sessions: usize,
    /// One entry per roster student, in roster order.
    pub students: Vec<StudentAttendance>,
}

impl Summary {
    pub fn student(&self, name: &str) -> Option<&StudentAttendance> {
        self.students.iter().find(|s| s.name == name)
    }

    pub fn attendance_count_of(&self, name: &str) -> usize {
        self.student(name).map(|s| s.attended).unwrap_or(0)
    }

    pub fn rate_of(&self, name: &str) -> f64 {
        self.student(name).map(|s| s.rate).unwrap_or(0.0)
    }
}

/// Count each roster student's attendance across `records`.
///
/// Names in a record that are not on the roster are ignored; a roster student
/// missing from a record simply did not attend that session. A session counts
/// as attended whenever the student is in its present or late list, even if
/// the same name also shows up under another status; the per-status tally
/// takes the first list the name is found in.
pub fn summarize(records: &[AttendanceRecord], roster: &Roster) -> Summary {
    let total_sessions = records.len();

    let students = roster
        .names()
        .iter()
        .map(|name| {
            let mut entry = StudentAttendance {
                name: name.clone(),
                attended: 0,
                present: 0,
                late: 0,
                early_leave: 0,
                absent: 0,
                rate: 0.0,
            };

            for record in records {
                if record.attended(name) {
                    entry.attended += 1;
                }
                match record.status_of(name) {
                    Some(AttendanceStatus::Present) => entry.present += 1,
                    Some(AttendanceStatus::Late) => entry.late += 1,
                    Some(AttendanceStatus::EarlyLeave) => entry.early_leave += 1,
                    Some(AttendanceStatus::Absent) => entry.absent += 1,
                    None => {}
                }
            }

            if total_sessions > 0 {
                entry.rate = entry.attended as f64 / total_sessions as f64;
            }
            entry
        })
        .collect();

    Summary {
        total_sessions,
        students,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn record(d: u32, entries: &[(&str, AttendanceStatus)]) -> AttendanceRecord {
        let mut r = AttendanceRecord::new(day(d));
        for (name, status) in entries {
            r.push(*name, *status);
        }
        r
    }

    #[test]
    fn no_records_gives_zero_rates() {
        let roster = Roster::new(["A", "B"]).unwrap();
        let summary = summarize(&[], &roster);

        assert_eq!(summary.total_sessions, 0);
        assert_eq!(summary.students.len(), 2);
        for s in &summary.students {
            assert_eq!(s.attended, 0);
            assert_eq!(s.rate, 0.0);
            assert!(!s.rate.is_nan());
        }
    }

    #[test]
    fn present_and_late_both_count() {
        let roster = Roster::new(["A", "B"]).unwrap();
        let records = vec![record(
            1,
            &[("A", AttendanceStatus::Present), ("B", AttendanceStatus::Late)],
        )];

        let summary = summarize(&records, &roster);
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.attendance_count_of("A"), 1);
        assert_eq!(summary.attendance_count_of("B"), 1);
        assert_eq!(summary.rate_of("A"), 1.0);
        assert_eq!(summary.student("B").unwrap().percent(), 100.0);
    }

    #[test]
    fn early_leave_and_absent_do_not_count() {
        let roster = Roster::new(["A"]).unwrap();
        let records = vec![
            record(1, &[("A", AttendanceStatus::EarlyLeave)]),
            record(2, &[("A", AttendanceStatus::Absent)]),
            record(3, &[("A", AttendanceStatus::Present)]),
            record(4, &[("A", AttendanceStatus::Late)]),
        ];

        let s = summarize(&records, &roster);
        let a = s.student("A").unwrap();
        assert_eq!(a.attended, 2);
        assert_eq!(a.early_leave, 1);
        assert_eq!(a.absent, 1);
        assert_eq!(a.rate, 0.5);
    }

    #[test]
    fn ignores_names_off_the_roster_and_tolerates_gaps() {
        let roster = Roster::new(["A", "New"]).unwrap();
        let records = vec![
            record(1, &[("A", AttendanceStatus::Present), ("Gone", AttendanceStatus::Present)]),
            record(2, &[("A", AttendanceStatus::Absent), ("New", AttendanceStatus::Present)]),
        ];

        let s = summarize(&records, &roster);
        assert!(s.student("Gone").is_none());
        assert_eq!(s.attendance_count_of("A"), 1);
        assert_eq!(s.attendance_count_of("New"), 1);
        assert_eq!(s.rate_of("New"), 0.5);
        assert_eq!(
            s.students.iter().map(|x| x.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "New"]
        );
    }

    #[test]
    fn overlapping_lists_still_count_as_attended() {
        let mut both = record(1, &[("A", AttendanceStatus::Present)]);
        both.push("A", AttendanceStatus::Absent);
        let roster = Roster::new(["A"]).unwrap();

        let summary = summarize(&[both], &roster);
        assert_eq!(summary.attendance_count_of("A"), 1);
        assert_eq!(summary.rate_of("A"), 1.0);
    }
}

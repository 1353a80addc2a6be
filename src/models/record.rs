use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::roster::Roster;
use super::status::{AttendanceStatus, StatusCounts};

/// The finalized outcome of one submitted session.
///
/// Records are keyed by `date`: the store keeps at most one per day and a
/// later submission for the same day replaces the earlier one. The four name
/// lists partition the roster the session was started with, each list in
/// roster order.
///
/// Serialized as `{ "date": "YYYY-MM-DD", "present": [..], "late": [..],
/// "earlyLeave": [..], "absent": [..] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub present: Vec<String>,
    #[serde(default)]
    pub late: Vec<String>,
    #[serde(default)]
    pub early_leave: Vec<String>,
    #[serde(default)]
    pub absent: Vec<String>,
}

impl AttendanceRecord {
    /// An empty record for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            present: Vec::new(),
            late: Vec::new(),
            early_leave: Vec::new(),
            absent: Vec::new(),
        }
    }

    /// Append a student to the list for `status`.
    pub fn push(&mut self, name: impl Into<String>, status: AttendanceStatus) {
        self.list_mut(status).push(name.into());
    }

    pub fn list(&self, status: AttendanceStatus) -> &[String] {
        match status {
            AttendanceStatus::Present => &self.present,
            AttendanceStatus::Late => &self.late,
            AttendanceStatus::EarlyLeave => &self.early_leave,
            AttendanceStatus::Absent => &self.absent,
        }
    }

    fn list_mut(&mut self, status: AttendanceStatus) -> &mut Vec<String> {
        match status {
            AttendanceStatus::Present => &mut self.present,
            AttendanceStatus::Late => &mut self.late,
            AttendanceStatus::EarlyLeave => &mut self.early_leave,
            AttendanceStatus::Absent => &mut self.absent,
        }
    }

    /// The status a student was recorded with, if they appear at all.
    pub fn status_of(&self, name: &str) -> Option<AttendanceStatus> {
        AttendanceStatus::ALL
            .into_iter()
            .find(|status| self.list(*status).iter().any(|n| n == name))
    }

    /// Whether the student counts as attending this session.
    pub fn attended(&self, name: &str) -> bool {
        self.present.iter().any(|n| n == name) || self.late.iter().any(|n| n == name)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            present: self.present.len(),
            late: self.late.len(),
            early_leave: self.early_leave.len(),
            absent: self.absent.len(),
        }
    }

    /// Total number of names across the four lists.
    pub fn len(&self) -> usize {
        self.counts().total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that no student appears more than once across the four lists.
    pub fn check_disjoint(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for status in AttendanceStatus::ALL {
            for name in self.list(status) {
                if !seen.insert(name.as_str()) {
                    return Err(format!("{} is listed more than once", name));
                }
            }
        }
        Ok(())
    }

    /// Check that the four lists are disjoint and together name exactly the
    /// students of `roster`.
    pub fn check_partition(&self, roster: &Roster) -> Result<(), String> {
        self.check_disjoint()?;
        let listed: HashSet<&str> = AttendanceStatus::ALL
            .into_iter()
            .flat_map(|status| self.list(status))
            .map(String::as_str)
            .collect();
        if let Some(stranger) = listed.iter().find(|n| !roster.contains(n)) {
            return Err(format!("{} is not on the roster", stranger));
        }
        if let Some(missing) = roster.names().iter().find(|n| !listed.contains(n.as_str())) {
            return Err(format!("{} is missing from the record", missing));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let mut record = AttendanceRecord::new(may_first());
        record.push("A", AttendanceStatus::Present);
        record.push("B", AttendanceStatus::EarlyLeave);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "date": "2024-05-01",
                "present": ["A"],
                "late": [],
                "earlyLeave": ["B"],
                "absent": []
            })
        );
    }

    #[test]
    fn status_lookup() {
        let mut record = AttendanceRecord::new(may_first());
        record.push("A", AttendanceStatus::Late);
        record.push("B", AttendanceStatus::Absent);

        assert_eq!(record.status_of("A"), Some(AttendanceStatus::Late));
        assert_eq!(record.status_of("B"), Some(AttendanceStatus::Absent));
        assert_eq!(record.status_of("C"), None);
        assert!(record.attended("A"));
        assert!(!record.attended("B"));
    }

    #[test]
    fn partition_check_catches_overlap_and_gaps() {
        let roster = Roster::new(["A", "B"]).unwrap();

        let mut ok = AttendanceRecord::new(may_first());
        ok.push("A", AttendanceStatus::Present);
        ok.push("B", AttendanceStatus::Absent);
        assert!(ok.check_partition(&roster).is_ok());

        let mut twice = ok.clone();
        twice.push("A", AttendanceStatus::Late);
        assert!(twice.check_partition(&roster).is_err());

        let mut missing = AttendanceRecord::new(may_first());
        missing.push("A", AttendanceStatus::Present);
        assert!(missing.check_partition(&roster).is_err());

        let mut stranger = ok.clone();
        stranger.push("Z", AttendanceStatus::Absent);
        assert!(stranger.check_partition(&roster).is_err());
    }

    #[test]
    fn disjoint_check_ignores_roster() {
        let mut record = AttendanceRecord::new(may_first());
        record.push("A", AttendanceStatus::Present);
        record.push("Z", AttendanceStatus::Late);
        assert!(record.check_disjoint().is_ok());

        record.push("A", AttendanceStatus::Absent);
        assert_eq!(
            record.check_disjoint(),
            Err("A is listed more than once".to_string())
        );
    }
}

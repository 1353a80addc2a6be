use serde::{Deserialize, Serialize};

/// The mark a student carries in one session.
///
/// Statuses form a fixed cycle driven by [`AttendanceStatus::next`]:
/// `Absent → Present → Late → EarlyLeave → Absent`. Every student starts a
/// session as `Absent`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceStatus {
    #[default]
    Absent,
    Present,
    Late,
    EarlyLeave,
}

impl AttendanceStatus {
    /// All statuses in cycle order.
    pub const ALL: [AttendanceStatus; 4] =
        [Self::Absent, Self::Present, Self::Late, Self::EarlyLeave];

    /// The successor in the marking cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Absent => Self::Present,
            Self::Present => Self::Late,
            Self::Late => Self::EarlyLeave,
            Self::EarlyLeave => Self::Absent,
        }
    }

    /// Present and late students count towards the attendance rate.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Late => "late",
            Self::EarlyLeave => "earlyLeave",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "absent" => Some(Self::Absent),
            "present" => Some(Self::Present),
            "late" => Some(Self::Late),
            "earlyLeave" => Some(Self::EarlyLeave),
            _ => None,
        }
    }

    /// Human label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "Absent",
            Self::Present => "Present",
            Self::Late => "Late",
            Self::EarlyLeave => "Early Leave",
        }
    }
}

/// Number of students per status in one session or record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub present: usize,
    pub late: usize,
    pub early_leave: usize,
    pub absent: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::EarlyLeave => self.early_leave += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.present + self.late + self.early_leave + self.absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_absent() {
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Absent);
    }

    #[test]
    fn every_status_returns_after_four_steps() {
        for status in AttendanceStatus::ALL {
            let mut s = status;
            for _ in 0..4 {
                s = s.next();
            }
            assert_eq!(s, status);
        }
    }

    #[test]
    fn cycle_order() {
        let mut s = AttendanceStatus::Absent;
        let mut seen = Vec::new();
        for _ in 0..4 {
            s = s.next();
            seen.push(s);
        }
        assert_eq!(
            seen,
            vec![
                AttendanceStatus::Present,
                AttendanceStatus::Late,
                AttendanceStatus::EarlyLeave,
                AttendanceStatus::Absent,
            ]
        );
    }

    #[test]
    fn str_names_match_stored_spelling() {
        for status in AttendanceStatus::ALL {
            assert_eq!(AttendanceStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::EarlyLeave).unwrap(),
            "\"earlyLeave\""
        );
        assert_eq!(AttendanceStatus::from_str("early_leave"), None);
    }

    #[test]
    fn only_present_and_late_attend() {
        assert!(AttendanceStatus::Present.counts_as_attended());
        assert!(AttendanceStatus::Late.counts_as_attended());
        assert!(!AttendanceStatus::EarlyLeave.counts_as_attended());
        assert!(!AttendanceStatus::Absent.counts_as_attended());
    }
}

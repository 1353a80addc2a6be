use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Position of a student in the roster it was taken from.
///
/// Ids are only meaningful against that roster; sessions use them to index
/// their status array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StudentId(pub(crate) usize);

impl StudentId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The fixed, ordered list of students eligible for a session.
///
/// Names are unique and non-blank. Order is the declaration order supplied by
/// the caller and drives the order of names in submitted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Build a roster, keeping declaration order.
    ///
    /// Leading and trailing whitespace is trimmed from every name before the
    /// blank and duplicate checks, so `" Ann "` is stored as `"Ann"` and
    /// collides with a plain `"Ann"`.
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::BlankStudent);
            }
            if !seen.insert(trimmed.to_string()) {
                return Err(ValidationError::DuplicateStudent(trimmed.to_string()));
            }
            out.push(trimmed.to_string());
        }
        Ok(Self { names: out })
    }

    /// Build from a list already known to be unique and non-blank.
    pub(crate) fn from_known(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up a student by exact name.
    /// Look up a student by name, trimmed the same way `new` trims.
    pub fn id_of(&self, name: &str) -> Option<StudentId> {
        let name = name.trim();
        self.names.iter().position(|n| n == name).map(StudentId)
    }

    /// Look up a student by 1-based position, as shown in numbered listings.
    pub fn id_at(&self, position: usize) -> Option<StudentId> {
        (1..=self.names.len())
            .contains(&position)
            .then(|| StudentId(position - 1))
    }

    pub fn name(&self, id: StudentId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.id_of(name).is_some()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (StudentId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (StudentId(i), n.as_str()))
    }
}

impl TryFrom<Vec<String>> for Roster {
    type Error = ValidationError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.names
    }
}

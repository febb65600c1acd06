//! Teacher model.

use serde::{Deserialize, Serialize};

/// A teacher and the set of subjects they are qualified to teach.
///
/// A teacher with an empty qualification set can be assigned no
/// workload: allocation creation requires a matching qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Subject IDs this teacher is qualified to teach.
    pub subject_ids: Vec<String>,
}

impl Teacher {
    /// Creates a new teacher with the given ID and no qualifications.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subject_ids: Vec::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a subject qualification.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        let subject_id = subject_id.into();
        if !self.subject_ids.contains(&subject_id) {
            self.subject_ids.push(subject_id);
        }
        self
    }

    /// Whether this teacher is qualified to teach the given subject.
    pub fn is_qualified_for(&self, subject_id: &str) -> bool {
        self.subject_ids.iter().any(|s| s == subject_id)
    }

    /// Grants a qualification. Returns `false` if already present.
    pub fn grant_subject(&mut self, subject_id: impl Into<String>) -> bool {
        let subject_id = subject_id.into();
        if self.is_qualified_for(&subject_id) {
            return false;
        }
        self.subject_ids.push(subject_id);
        true
    }

    /// Retracts a qualification. Returns `false` if it was not present.
    pub fn retract_subject(&mut self, subject_id: &str) -> bool {
        let before = self.subject_ids.len();
        self.subject_ids.retain(|s| s != subject_id);
        self.subject_ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new("t-1")
            .with_name("Mr. Smith")
            .with_subject("sub-1")
            .with_subject("sub-2")
            .with_subject("sub-1"); // duplicate ignored
        assert_eq!(t.id, "t-1");
        assert_eq!(t.subject_ids, vec!["sub-1", "sub-2"]);
        assert!(t.is_qualified_for("sub-1"));
        assert!(!t.is_qualified_for("sub-3"));
    }

    #[test]
    fn test_grant_and_retract() {
        let mut t = Teacher::new("t-1");
        assert!(t.grant_subject("sub-1"));
        assert!(!t.grant_subject("sub-1"));
        assert!(t.retract_subject("sub-1"));
        assert!(!t.retract_subject("sub-1"));
        assert!(t.subject_ids.is_empty());
    }

    #[test]
    fn test_teacher_serde_camel_case() {
        let t = Teacher::new("t-1").with_subject("sub-1");
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("subjectIds").is_some());
        assert!(json.get("subject_ids").is_none());
    }
}

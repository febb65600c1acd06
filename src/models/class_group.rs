//! Class group model.

use serde::{Deserialize, Serialize};

/// A single cohort of students sharing one timetable (e.g., "Grade 10 A").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup {
    /// Unique class identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl ClassGroup {
    /// Creates a new class group with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    /// Sets the class name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_group_builder() {
        let c = ClassGroup::new("c-1").with_name("Grade 10 A");
        assert_eq!(c.id, "c-1");
        assert_eq!(c.name, "Grade 10 A");
    }
}

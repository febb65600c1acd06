//! Generation request (solver input) model.

use serde::{Deserialize, Serialize};

use super::{Allocation, ClassGroup, SchoolConfig, Subject, Teacher};

/// An immutable snapshot of everything a generation run needs: the grid
/// shape plus the full entity lists.
///
/// Produced by `store::EntityStore::snapshot` at generation time so a
/// long-running search never observes concurrent edits. Also the
/// payload handed to an external generation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Grid shape and day labels.
    pub config: SchoolConfig,
    /// All subjects.
    pub subjects: Vec<Subject>,
    /// All teachers.
    pub teachers: Vec<Teacher>,
    /// All class groups.
    pub classes: Vec<ClassGroup>,
    /// All active workload allocations, in insertion order.
    pub allocations: Vec<Allocation>,
}

impl GenerationRequest {
    /// Creates an empty request with the given config.
    pub fn new(config: SchoolConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a class group.
    pub fn with_class(mut self, class: ClassGroup) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds an allocation.
    pub fn with_allocation(mut self, allocation: Allocation) -> Self {
        self.allocations.push(allocation);
        self
    }

    /// Looks up a subject by ID.
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Looks up a teacher by ID.
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Looks up a class group by ID.
    pub fn class_group(&self, id: &str) -> Option<&ClassGroup> {
        self.classes.iter().find(|c| c.id == id)
    }

    /// Looks up an allocation by ID.
    pub fn allocation(&self, id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// Total requested periods across all allocations.
    pub fn total_demand(&self) -> u32 {
        self.allocations.iter().map(|a| a.periods_per_week).sum()
    }
}

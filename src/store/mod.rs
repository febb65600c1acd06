//! Single-writer entity store.
//!
//! Owns the scheduling inputs (config, subjects, teachers, classes,
//! allocations) and enforces integrity at every mutation boundary:
//!
//! - Generated identities never collide; inserted identities must be unique.
//! - An allocation can only be created for a teacher qualified in its subject.
//! - Deleting a subject, teacher, or class cascades: referencing
//!   allocations are pruned and reported back to the caller.
//! - Retracting a qualification flags (does not silently keep) the
//!   allocations it orphans; flagged allocations are excluded from
//!   snapshots until removed or repaired.
//!
//! The store is the only mutator. Generation runs operate on an owned
//! [`GenerationRequest`] snapshot taken via [`EntityStore::snapshot`],
//! so edits during a long-running search cannot corrupt results.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{
    Allocation, ClassGroup, ConfigError, GenerationRequest, SchoolConfig, Subject, Teacher,
};

/// Display colors cycled for newly added subjects.
const SUBJECT_COLORS: &[&str] = &[
    "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#10b981", "#06b6d4", "#3b82f6", "#6366f1",
    "#8b5cf6", "#d946ef", "#f43f5e",
];

/// Entity kind, used in error diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Subject,
    Teacher,
    ClassGroup,
    Allocation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Subject => "subject",
            EntityKind::Teacher => "teacher",
            EntityKind::ClassGroup => "class",
            EntityKind::Allocation => "allocation",
        };
        f.write_str(name)
    }
}

/// Mutation-boundary error. Surfaced synchronously to the caller;
/// the store is left unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An entity with this identity already exists.
    #[error("duplicate {kind} identity `{id}`")]
    DuplicateId { kind: EntityKind, id: String },
    /// A referenced entity does not exist.
    #[error("unknown {kind} `{id}`")]
    UnknownEntity { kind: EntityKind, id: String },
    /// The teacher is not qualified for the allocation's subject.
    #[error("teacher `{teacher_id}` is not qualified to teach subject `{subject_id}`")]
    QualificationMismatch {
        teacher_id: String,
        subject_id: String,
    },
    /// Weekly period count outside the grid capacity.
    #[error("periods per week must be between 1 and {max}, got {got}")]
    PeriodsOutOfRange { got: u32, max: u32 },
    /// Rejected school configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The owned, single-writer container for all scheduling inputs.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    config: SchoolConfig,
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
    classes: Vec<ClassGroup>,
    allocations: Vec<Allocation>,
    /// Allocation IDs invalidated by qualification retraction.
    flagged: HashSet<String>,
    next_id: u64,
}

impl EntityStore {
    /// Creates an empty store with the default school config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the school config after validating it.
    pub fn set_config(&mut self, config: SchoolConfig) -> Result<(), StoreError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Current school config.
    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    /// All subjects, in insertion order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// All teachers, in insertion order.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// All class groups, in insertion order.
    pub fn classes(&self) -> &[ClassGroup] {
        &self.classes
    }

    /// All allocations, in insertion order, flagged ones included.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Allocations invalidated by qualification retraction.
    pub fn flagged_allocations(&self) -> Vec<&Allocation> {
        self.allocations
            .iter()
            .filter(|a| self.flagged.contains(&a.id))
            .collect()
    }

    /// Whether an allocation is currently flagged.
    pub fn is_flagged(&self, allocation_id: &str) -> bool {
        self.flagged.contains(allocation_id)
    }

    // --- Subjects ---

    /// Adds a subject with a generated identity and cycled color.
    /// Returns the new ID.
    pub fn add_subject(&mut self, name: impl Into<String>) -> String {
        let id = self.fresh_id("sub");
        let color = SUBJECT_COLORS[self.subjects.len() % SUBJECT_COLORS.len()];
        self.subjects
            .push(Subject::new(&id).with_name(name).with_color(color));
        id
    }

    /// Inserts a caller-built subject, enforcing identity uniqueness.
    pub fn insert_subject(&mut self, subject: Subject) -> Result<(), StoreError> {
        if self.subjects.iter().any(|s| s.id == subject.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Subject,
                id: subject.id,
            });
        }
        self.subjects.push(subject);
        Ok(())
    }

    /// Updates a subject's name and color.
    pub fn update_subject(
        &mut self,
        id: &str,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<(), StoreError> {
        let subject = self
            .subjects
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind: EntityKind::Subject,
                id: id.to_string(),
            })?;
        subject.name = name.into();
        subject.color = color.into();
        Ok(())
    }

    /// Removes a subject. Cascades: the subject disappears from every
    /// teacher's qualification set and every allocation referencing it
    /// is pruned. Returns the pruned allocation IDs.
    pub fn remove_subject(&mut self, id: &str) -> Result<Vec<String>, StoreError> {
        if !self.subjects.iter().any(|s| s.id == id) {
            return Err(StoreError::UnknownEntity {
                kind: EntityKind::Subject,
                id: id.to_string(),
            });
        }
        self.subjects.retain(|s| s.id != id);
        for teacher in &mut self.teachers {
            teacher.retract_subject(id);
        }
        Ok(self.prune_allocations_referencing(id))
    }

    // --- Teachers ---

    /// Adds a teacher with a generated identity. Returns the new ID.
    pub fn add_teacher(&mut self, name: impl Into<String>) -> String {
        let id = self.fresh_id("t");
        self.teachers.push(Teacher::new(&id).with_name(name));
        id
    }

    /// Inserts a caller-built teacher, enforcing identity uniqueness
    /// and existence of every referenced subject.
    pub fn insert_teacher(&mut self, teacher: Teacher) -> Result<(), StoreError> {
        if self.teachers.iter().any(|t| t.id == teacher.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Teacher,
                id: teacher.id,
            });
        }
        for subject_id in &teacher.subject_ids {
            self.require_subject(subject_id)?;
        }
        self.teachers.push(teacher);
        Ok(())
    }

    /// Renames a teacher.
    pub fn rename_teacher(&mut self, id: &str, name: impl Into<String>) -> Result<(), StoreError> {
        let teacher = self.teacher_mut(id)?;
        teacher.name = name.into();
        Ok(())
    }

    /// Grants a qualification. Returns `false` if it was already held.
    ///
    /// Granting repairs allocations previously flagged by retracting
    /// this same qualification: they become active again.
    pub fn grant_teacher_subject(
        &mut self,
        teacher_id: &str,
        subject_id: &str,
    ) -> Result<bool, StoreError> {
        self.require_subject(subject_id)?;
        let teacher = self.teacher_mut(teacher_id)?;
        let granted = teacher.grant_subject(subject_id);

        for allocation in &self.allocations {
            if allocation.teacher_id == teacher_id && allocation.subject_id == subject_id {
                self.flagged.remove(&allocation.id);
            }
        }
        Ok(granted)
    }

    /// Retracts a qualification and flags every allocation pairing this
    /// teacher with this subject. Returns the flagged allocation IDs.
    pub fn retract_teacher_subject(
        &mut self,
        teacher_id: &str,
        subject_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let teacher = self.teacher_mut(teacher_id)?;
        teacher.retract_subject(subject_id);

        let mut newly_flagged = Vec::new();
        for allocation in &self.allocations {
            if allocation.teacher_id == teacher_id && allocation.subject_id == subject_id {
                self.flagged.insert(allocation.id.clone());
                newly_flagged.push(allocation.id.clone());
            }
        }
        Ok(newly_flagged)
    }

    /// Removes a teacher, pruning allocations that reference them.
    /// Returns the pruned allocation IDs.
    pub fn remove_teacher(&mut self, id: &str) -> Result<Vec<String>, StoreError> {
        if !self.teachers.iter().any(|t| t.id == id) {
            return Err(StoreError::UnknownEntity {
                kind: EntityKind::Teacher,
                id: id.to_string(),
            });
        }
        self.teachers.retain(|t| t.id != id);
        Ok(self.prune_allocations_referencing(id))
    }

    // --- Classes ---

    /// Adds a class group with a generated identity. Returns the new ID.
    pub fn add_class(&mut self, name: impl Into<String>) -> String {
        let id = self.fresh_id("c");
        self.classes.push(ClassGroup::new(&id).with_name(name));
        id
    }

    /// Inserts a caller-built class group, enforcing identity uniqueness.
    pub fn insert_class(&mut self, class: ClassGroup) -> Result<(), StoreError> {
        if self.classes.iter().any(|c| c.id == class.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::ClassGroup,
                id: class.id,
            });
        }
        self.classes.push(class);
        Ok(())
    }

    /// Renames a class group.
    pub fn rename_class(&mut self, id: &str, name: impl Into<String>) -> Result<(), StoreError> {
        let class = self
            .classes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind: EntityKind::ClassGroup,
                id: id.to_string(),
            })?;
        class.name = name.into();
        Ok(())
    }

    /// Removes a class group, pruning allocations that reference it.
    /// Returns the pruned allocation IDs.
    pub fn remove_class(&mut self, id: &str) -> Result<Vec<String>, StoreError> {
        if !self.classes.iter().any(|c| c.id == id) {
            return Err(StoreError::UnknownEntity {
                kind: EntityKind::ClassGroup,
                id: id.to_string(),
            });
        }
        self.classes.retain(|c| c.id != id);
        Ok(self.prune_allocations_referencing(id))
    }

    // --- Allocations ---

    /// Creates an allocation with a generated identity. All three
    /// references must resolve, the teacher must be qualified for the
    /// subject, and the weekly count must fit the grid. Returns the
    /// new ID.
    pub fn add_allocation(
        &mut self,
        class_id: &str,
        teacher_id: &str,
        subject_id: &str,
        periods_per_week: u32,
    ) -> Result<String, StoreError> {
        let mut allocation =
            Allocation::new("", class_id, teacher_id, subject_id, periods_per_week);
        self.check_allocation(&allocation)?;
        let id = self.fresh_id("al");
        allocation.id = id.clone();
        self.allocations.push(allocation);
        Ok(id)
    }

    /// Inserts a caller-built allocation under the same checks as
    /// [`EntityStore::add_allocation`], plus identity uniqueness.
    pub fn insert_allocation(&mut self, allocation: Allocation) -> Result<(), StoreError> {
        if self.allocations.iter().any(|a| a.id == allocation.id) {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Allocation,
                id: allocation.id,
            });
        }
        self.check_allocation(&allocation)?;
        self.allocations.push(allocation);
        Ok(())
    }

    /// Updates an allocation's weekly period count.
    pub fn update_allocation_periods(
        &mut self,
        id: &str,
        periods_per_week: u32,
    ) -> Result<(), StoreError> {
        let max = self.config.cells_per_week();
        if periods_per_week == 0 || periods_per_week > max {
            return Err(StoreError::PeriodsOutOfRange {
                got: periods_per_week,
                max,
            });
        }
        let allocation = self
            .allocations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind: EntityKind::Allocation,
                id: id.to_string(),
            })?;
        allocation.periods_per_week = periods_per_week;
        Ok(())
    }

    /// Removes an allocation (and clears any flag on it).
    pub fn remove_allocation(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.allocations.iter().any(|a| a.id == id) {
            return Err(StoreError::UnknownEntity {
                kind: EntityKind::Allocation,
                id: id.to_string(),
            });
        }
        self.allocations.retain(|a| a.id != id);
        self.flagged.remove(id);
        Ok(())
    }

    // --- Snapshot ---

    /// Takes an immutable deep-copy snapshot for a generation run.
    ///
    /// Flagged allocations are excluded: a stale or invalidated
    /// reference must never reach the constraint model.
    pub fn snapshot(&self) -> GenerationRequest {
        GenerationRequest {
            config: self.config.clone(),
            subjects: self.subjects.clone(),
            teachers: self.teachers.clone(),
            classes: self.classes.clone(),
            allocations: self
                .allocations
                .iter()
                .filter(|a| !self.flagged.contains(&a.id))
                .cloned()
                .collect(),
        }
    }

    // --- Internals ---

    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}-{}", self.next_id);
            if !self.id_in_use(&id) {
                return id;
            }
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.subjects.iter().any(|s| s.id == id)
            || self.teachers.iter().any(|t| t.id == id)
            || self.classes.iter().any(|c| c.id == id)
            || self.allocations.iter().any(|a| a.id == id)
    }

    fn require_subject(&self, id: &str) -> Result<(), StoreError> {
        if self.subjects.iter().any(|s| s.id == id) {
            Ok(())
        } else {
            Err(StoreError::UnknownEntity {
                kind: EntityKind::Subject,
                id: id.to_string(),
            })
        }
    }

    fn teacher_mut(&mut self, id: &str) -> Result<&mut Teacher, StoreError> {
        self.teachers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind: EntityKind::Teacher,
                id: id.to_string(),
            })
    }

    fn check_allocation(&self, allocation: &Allocation) -> Result<(), StoreError> {
        if !self.classes.iter().any(|c| c.id == allocation.class_id) {
            return Err(StoreError::UnknownEntity {
                kind: EntityKind::ClassGroup,
                id: allocation.class_id.clone(),
            });
        }
        let teacher = self
            .teachers
            .iter()
            .find(|t| t.id == allocation.teacher_id)
            .ok_or_else(|| StoreError::UnknownEntity {
                kind: EntityKind::Teacher,
                id: allocation.teacher_id.clone(),
            })?;
        self.require_subject(&allocation.subject_id)?;
        if !teacher.is_qualified_for(&allocation.subject_id) {
            return Err(StoreError::QualificationMismatch {
                teacher_id: allocation.teacher_id.clone(),
                subject_id: allocation.subject_id.clone(),
            });
        }
        let max = self.config.cells_per_week();
        if allocation.periods_per_week == 0 || allocation.periods_per_week > max {
            return Err(StoreError::PeriodsOutOfRange {
                got: allocation.periods_per_week,
                max,
            });
        }
        Ok(())
    }

    fn prune_allocations_referencing(&mut self, entity_id: &str) -> Vec<String> {
        let pruned: Vec<String> = self
            .allocations
            .iter()
            .filter(|a| a.references(entity_id))
            .map(|a| a.id.clone())
            .collect();
        self.allocations.retain(|a| !a.references(entity_id));
        for id in &pruned {
            self.flagged.remove(id);
        }
        pruned
    }
}

//! Allocation (workload) model.

use serde::{Deserialize, Serialize};

use super::ScheduleSlot;

/// A weekly workload declaration: this teacher delivers this subject to
/// this class exactly `periods_per_week` times in the cycle.
///
/// Invariant: the referenced teacher must be qualified for the
/// referenced subject. The store enforces this at creation time only;
/// later qualification edits flag the allocation instead of deleting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Unique allocation identifier.
    pub id: String,
    /// Receiving class group.
    pub class_id: String,
    /// Delivering teacher.
    pub teacher_id: String,
    /// Subject taught.
    pub subject_id: String,
    /// Required number of periods per weekly cycle.
    pub periods_per_week: u32,
}

impl Allocation {
    /// Creates a new allocation.
    pub fn new(
        id: impl Into<String>,
        class_id: impl Into<String>,
        teacher_id: impl Into<String>,
        subject_id: impl Into<String>,
        periods_per_week: u32,
    ) -> Self {
        Self {
            id: id.into(),
            class_id: class_id.into(),
            teacher_id: teacher_id.into(),
            subject_id: subject_id.into(),
            periods_per_week,
        }
    }

    /// Whether a slot delivers this allocation's (class, teacher,
    /// subject) triple.
    pub fn matches_slot(&self, slot: &ScheduleSlot) -> bool {
        slot.class_id == self.class_id
            && slot.teacher_id == self.teacher_id
            && slot.subject_id == self.subject_id
    }

    /// Whether this allocation references the given entity ID in any
    /// of its three foreign-key positions.
    pub fn references(&self, entity_id: &str) -> bool {
        self.class_id == entity_id
            || self.teacher_id == entity_id
            || self.subject_id == entity_id
    }
}

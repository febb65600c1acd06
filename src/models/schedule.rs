//! Generated schedule (solution) model.
//!
//! A schedule is a flat list of occupied grid cells. Hard invariants
//! (checked by `validation`, not by construction): no two slots share
//! (day, period, teacher), and no two slots share (day, period, class).
//! A schedule is produced whole and replaced whole on regeneration; it
//! is never partially mutated.

use serde::{Deserialize, Serialize};

use super::Allocation;

/// One atomic occupied cell: this class meets this teacher for this
/// subject at (day, period).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    /// 0-based day index within the configured week.
    pub day_index: u32,
    /// 0-based period index within the day.
    pub period_index: u32,
    /// Occupying class group.
    pub class_id: String,
    /// Occupying teacher.
    pub teacher_id: String,
    /// Subject delivered in this cell.
    pub subject_id: String,
}

impl ScheduleSlot {
    /// Creates a new slot.
    pub fn new(
        day_index: u32,
        period_index: u32,
        class_id: impl Into<String>,
        teacher_id: impl Into<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self {
            day_index,
            period_index,
            class_id: class_id.into(),
            teacher_id: teacher_id.into(),
            subject_id: subject_id.into(),
        }
    }

    /// The (day, period) cell this slot occupies.
    #[inline]
    pub fn cell(&self) -> (u32, u32) {
        (self.day_index, self.period_index)
    }
}

/// A complete weekly timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    /// All occupied cells, in generation order.
    pub slots: Vec<ScheduleSlot>,
}

impl GeneratedSchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot.
    pub fn add_slot(&mut self, slot: ScheduleSlot) {
        self.slots.push(slot);
    }

    /// Number of occupied cells.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schedule has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots occupied by a class.
    pub fn slots_for_class(&self, class_id: &str) -> Vec<&ScheduleSlot> {
        self.slots
            .iter()
            .filter(|s| s.class_id == class_id)
            .collect()
    }

    /// All slots occupied by a teacher.
    pub fn slots_for_teacher(&self, teacher_id: &str) -> Vec<&ScheduleSlot> {
        self.slots
            .iter()
            .filter(|s| s.teacher_id == teacher_id)
            .collect()
    }

    /// Number of slots delivering the given allocation's triple.
    pub fn count_for_allocation(&self, allocation: &Allocation) -> u32 {
        self.slots
            .iter()
            .filter(|s| allocation.matches_slot(s))
            .count() as u32
    }

    /// Distinct days on which the given allocation's triple appears.
    pub fn days_for_allocation(&self, allocation: &Allocation) -> u32 {
        let mut days: Vec<u32> = self
            .slots
            .iter()
            .filter(|s| allocation.matches_slot(s))
            .map(|s| s.day_index)
            .collect();
        days.sort_unstable();
        days.dedup();
        days.len() as u32
    }
}

//! Conflict validation for candidate schedules.
//!
//! Checks a [`GeneratedSchedule`] against the hard invariants before it
//! may be accepted or displayed:
//! - No two slots share (day, period, teacher).
//! - No two slots share (day, period, class).
//! - Every slot references entities present in the request.
//! - Every slot's cell lies inside the configured grid.
//!
//! Runs in time proportional to the slot count: occupancy is tracked
//! with hash maps keyed on (day, period, entity), never a pairwise
//! scan. Mandatory for externally sourced schedules, which are
//! untrusted input; engine-built schedules pass it too, as a
//! round-trip check.

use std::collections::{HashMap, HashSet};

use crate::models::{GeneratedSchedule, GenerationRequest};
use crate::store::EntityKind;

/// Validation result: `Ok(())` or every conflict found.
pub type ConflictReport = Result<(), Vec<Conflict>>;

/// A single hard-invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Violation category.
    pub kind: ConflictKind,
    /// Day of the offending cell.
    pub day_index: u32,
    /// Period of the offending cell.
    pub period_index: u32,
    /// The colliding entity (teacher/class), or the foreign identifier.
    pub entity_id: String,
    /// Human-readable diagnostic.
    pub message: String,
}

/// Categories of hard-invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// A teacher occupies two slots in the same cell.
    TeacherDoubleBooked,
    /// A class occupies two slots in the same cell.
    ClassDoubleBooked,
    /// A slot references an entity absent from the request.
    UnknownReference,
    /// A slot's cell lies outside the configured grid.
    CellOutOfRange,
}

impl Conflict {
    fn new(
        kind: ConflictKind,
        day_index: u32,
        period_index: u32,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            day_index,
            period_index,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Validator behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorOptions {
    /// Stop at the first violation instead of collecting all of them.
    pub first_only: bool,
}

impl ValidatorOptions {
    /// Collect every violation (the default).
    pub fn all() -> Self {
        Self { first_only: false }
    }

    /// Stop at the first violation.
    pub fn first_only() -> Self {
        Self { first_only: true }
    }
}

/// Validates a candidate schedule against the hard invariants.
///
/// Violations are reported in slot order, so the "first" violation is
/// deterministic for a given schedule.
pub fn validate_schedule(
    schedule: &GeneratedSchedule,
    request: &GenerationRequest,
    options: ValidatorOptions,
) -> ConflictReport {
    let mut conflicts = Vec::new();
    let config = &request.config;

    let known_classes: HashSet<&str> = request.classes.iter().map(|c| c.id.as_str()).collect();
    let known_teachers: HashSet<&str> = request.teachers.iter().map(|t| t.id.as_str()).collect();
    let known_subjects: HashSet<&str> = request.subjects.iter().map(|s| s.id.as_str()).collect();

    // First slot seen per (day, period, teacher) and (day, period, class).
    let mut teacher_seen: HashMap<(u32, u32, &str), &str> = HashMap::new();
    let mut class_seen: HashMap<(u32, u32, &str), &str> = HashMap::new();

    for slot in &schedule.slots {
        let (day, period) = slot.cell();

        if !config.contains_cell(day, period) {
            conflicts.push(Conflict::new(
                ConflictKind::CellOutOfRange,
                day,
                period,
                slot.class_id.clone(),
                format!(
                    "slot at day {day}, period {period} lies outside the {}x{} grid",
                    config.days_per_week, config.periods_per_day
                ),
            ));
            if options.first_only {
                return Err(conflicts);
            }
        }

        for (kind, id, present) in [
            (
                EntityKind::ClassGroup,
                slot.class_id.as_str(),
                known_classes.contains(slot.class_id.as_str()),
            ),
            (
                EntityKind::Teacher,
                slot.teacher_id.as_str(),
                known_teachers.contains(slot.teacher_id.as_str()),
            ),
            (
                EntityKind::Subject,
                slot.subject_id.as_str(),
                known_subjects.contains(slot.subject_id.as_str()),
            ),
        ] {
            if !present {
                conflicts.push(Conflict::new(
                    ConflictKind::UnknownReference,
                    day,
                    period,
                    id,
                    format!("slot references unknown {kind} `{id}`"),
                ));
                if options.first_only {
                    return Err(conflicts);
                }
            }
        }

        if let Some(prior_class) =
            teacher_seen.insert((day, period, slot.teacher_id.as_str()), slot.class_id.as_str())
        {
            conflicts.push(Conflict::new(
                ConflictKind::TeacherDoubleBooked,
                day,
                period,
                slot.teacher_id.clone(),
                format!(
                    "teacher `{}` double-booked at day {day}, period {period} (classes `{prior_class}` and `{}`)",
                    slot.teacher_id, slot.class_id
                ),
            ));
            if options.first_only {
                return Err(conflicts);
            }
        }

        if let Some(prior_teacher) =
            class_seen.insert((day, period, slot.class_id.as_str()), slot.teacher_id.as_str())
        {
            conflicts.push(Conflict::new(
                ConflictKind::ClassDoubleBooked,
                day,
                period,
                slot.class_id.clone(),
                format!(
                    "class `{}` double-booked at day {day}, period {period} (teachers `{prior_teacher}` and `{}`)",
                    slot.class_id, slot.teacher_id
                ),
            ));
            if options.first_only {
                return Err(conflicts);
            }
        }
    }

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Allocation, ClassGroup, SchoolConfig, ScheduleSlot, Subject, Teacher,
    };
    use crate::solver::Solver;

    fn sample_request() -> GenerationRequest {
        GenerationRequest::new(SchoolConfig::default())
            .with_subject(Subject::new("sub-1").with_name("Math"))
            .with_subject(Subject::new("sub-2").with_name("Science"))
            .with_teacher(Teacher::new("t-1").with_subject("sub-1"))
            .with_teacher(Teacher::new("t-2").with_subject("sub-2"))
            .with_class(ClassGroup::new("c-1"))
            .with_class(ClassGroup::new("c-2"))
            .with_allocation(Allocation::new("al-1", "c-1", "t-1", "sub-1", 4))
            .with_allocation(Allocation::new("al-2", "c-2", "t-1", "sub-1", 4))
            .with_allocation(Allocation::new("al-3", "c-1", "t-2", "sub-2", 3))
    }

    #[test]
    fn test_engine_output_round_trips() {
        let request = sample_request();
        let outcome = Solver::new().solve(&request).unwrap();
        let schedule = outcome.schedule().expect("satisfiable instance");
        assert!(validate_schedule(schedule, &request, ValidatorOptions::all()).is_ok());
    }

    #[test]
    fn test_empty_schedule_is_valid() {
        let request = sample_request();
        let schedule = GeneratedSchedule::new();
        assert!(validate_schedule(&schedule, &request, ValidatorOptions::all()).is_ok());
    }

    #[test]
    fn test_teacher_double_booking_rejected() {
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-1", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-2", "t-1", "sub-1"));

        let conflicts =
            validate_schedule(&schedule, &request, ValidatorOptions::all()).unwrap_err();
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.kind, ConflictKind::TeacherDoubleBooked);
        assert_eq!(c.entity_id, "t-1");
        assert_eq!((c.day_index, c.period_index), (0, 0));
        assert!(c.message.contains("c-1") && c.message.contains("c-2"));
    }

    #[test]
    fn test_class_double_booking_rejected() {
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(1, 2, "c-1", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(1, 2, "c-1", "t-2", "sub-2"));

        let conflicts =
            validate_schedule(&schedule, &request, ValidatorOptions::all()).unwrap_err();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ClassDoubleBooked);
        assert_eq!(conflicts[0].entity_id, "c-1");
    }

    #[test]
    fn test_foreign_reference_rejected() {
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-1", "t-ghost", "sub-1"));

        let conflicts =
            validate_schedule(&schedule, &request, ValidatorOptions::all()).unwrap_err();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::UnknownReference);
        assert_eq!(conflicts[0].entity_id, "t-ghost");
    }

    #[test]
    fn test_cell_out_of_range_rejected() {
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(5, 0, "c-1", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(0, 8, "c-1", "t-1", "sub-1"));

        let conflicts =
            validate_schedule(&schedule, &request, ValidatorOptions::all()).unwrap_err();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .all(|c| c.kind == ConflictKind::CellOutOfRange));
    }

    #[test]
    fn test_first_only_stops_early() {
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-1", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-2", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(1, 1, "c-1", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(1, 1, "c-1", "t-2", "sub-2"));

        let all = validate_schedule(&schedule, &request, ValidatorOptions::all()).unwrap_err();
        assert_eq!(all.len(), 2);

        let first =
            validate_schedule(&schedule, &request, ValidatorOptions::first_only()).unwrap_err();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, ConflictKind::TeacherDoubleBooked);
    }

    #[test]
    fn test_same_cell_different_entities_is_fine() {
        // Two disjoint (class, teacher) pairs may share a cell.
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-1", "t-1", "sub-1"));
        schedule.add_slot(ScheduleSlot::new(0, 0, "c-2", "t-2", "sub-2"));
        assert!(validate_schedule(&schedule, &request, ValidatorOptions::all()).is_ok());
    }
}

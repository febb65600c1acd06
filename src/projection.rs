//! Timetable grid projection.
//!
//! Re-indexes a validated schedule's flat slot list into a
//! (day × period) lookup for one entity: either a class's week (cells
//! name the subject and the teacher) or a teacher's week (cells name
//! the subject and the class). Pure function of its inputs; unoccupied
//! cells are simply absent.

use serde::Serialize;
use thiserror::Error;

use crate::models::{GeneratedSchedule, GenerationRequest};

/// Which entity's week the grid describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GridView {
    /// One class's week; counterpart cells are teachers.
    ByClass,
    /// One teacher's week; counterpart cells are classes.
    ByTeacher,
}

/// Projection failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The requested entity is not present in the request.
    #[error("no {view:?} entity `{id}` in the request")]
    UnknownEntity { view: GridView, id: String },
    /// A slot for the requested entity lies outside the grid. The
    /// schedule skipped validation.
    #[error("slot at day {day_index}, period {period_index} lies outside the grid")]
    SlotOutOfRange { day_index: u32, period_index: u32 },
}

/// One occupied grid cell, resolved for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Subject delivered in this cell.
    pub subject_id: String,
    /// Subject display name.
    pub subject_name: String,
    /// Subject display color.
    pub subject_color: String,
    /// The other entity in the slot (teacher for a class view, class
    /// for a teacher view).
    pub counterpart_id: String,
    /// Counterpart display name.
    pub counterpart_name: String,
}

/// A (day × period) lookup for one entity's week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableGrid {
    /// Entity the grid belongs to.
    pub entity_id: String,
    /// Entity display name.
    pub entity_name: String,
    /// View the grid was built for.
    pub view: GridView,
    /// Ordered day names.
    pub day_names: Vec<String>,
    /// Periods per day.
    pub periods_per_day: u32,
    /// Cosmetic break marker, passed through for presentation.
    pub break_after_period: u32,
    /// Day-major cell storage.
    cells: Vec<Option<GridCell>>,
}

impl TimetableGrid {
    /// The occupying cell at (day, period), or `None` when free or out
    /// of range.
    pub fn cell(&self, day_index: u32, period_index: u32) -> Option<&GridCell> {
        if day_index as usize >= self.day_names.len() || period_index >= self.periods_per_day {
            return None;
        }
        self.cells[(day_index * self.periods_per_day + period_index) as usize].as_ref()
    }

    /// Whether the cell at (day, period) is unoccupied.
    pub fn is_free(&self, day_index: u32, period_index: u32) -> bool {
        self.cell(day_index, period_index).is_none()
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Projects a validated schedule onto one entity's weekly grid.
///
/// Slots belonging to other entities are ignored. The schedule is
/// assumed validated; a slot for this entity outside the grid is
/// reported as an error rather than silently dropped.
pub fn project(
    schedule: &GeneratedSchedule,
    request: &GenerationRequest,
    view: GridView,
    entity_id: &str,
) -> Result<TimetableGrid, ProjectionError> {
    let entity_name = match view {
        GridView::ByClass => request.class_group(entity_id).map(|c| c.name.clone()),
        GridView::ByTeacher => request.teacher(entity_id).map(|t| t.name.clone()),
    }
    .ok_or_else(|| ProjectionError::UnknownEntity {
        view,
        id: entity_id.to_string(),
    })?;

    let config = &request.config;
    let mut cells: Vec<Option<GridCell>> = vec![None; config.cells_per_week() as usize];

    for slot in &schedule.slots {
        let occupies = match view {
            GridView::ByClass => slot.class_id == entity_id,
            GridView::ByTeacher => slot.teacher_id == entity_id,
        };
        if !occupies {
            continue;
        }
        let (day, period) = slot.cell();
        if !config.contains_cell(day, period) {
            return Err(ProjectionError::SlotOutOfRange {
                day_index: day,
                period_index: period,
            });
        }

        let subject = request.subject(&slot.subject_id);
        let counterpart_id = match view {
            GridView::ByClass => slot.teacher_id.clone(),
            GridView::ByTeacher => slot.class_id.clone(),
        };
        let counterpart_name = match view {
            GridView::ByClass => request
                .teacher(&slot.teacher_id)
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            GridView::ByTeacher => request
                .class_group(&slot.class_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
        };

        cells[(day * config.periods_per_day + period) as usize] = Some(GridCell {
            subject_id: slot.subject_id.clone(),
            subject_name: subject.map(|s| s.name.clone()).unwrap_or_default(),
            subject_color: subject.map(|s| s.color.clone()).unwrap_or_default(),
            counterpart_id,
            counterpart_name,
        });
    }

    Ok(TimetableGrid {
        entity_id: entity_id.to_string(),
        entity_name,
        view,
        day_names: config.days.clone(),
        periods_per_day: config.periods_per_day,
        break_after_period: config.break_after_period,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Allocation, ClassGroup, SchoolConfig, ScheduleSlot, Subject, Teacher,
    };

    fn sample_request() -> GenerationRequest {
        GenerationRequest::new(SchoolConfig::default())
            .with_subject(Subject::new("sub-1").with_name("Math").with_color("#3b82f6"))
            .with_teacher(Teacher::new("t-1").with_name("Mr. Smith").with_subject("sub-1"))
            .with_class(ClassGroup::new("c-1").with_name("Grade 10 A"))
            .with_class(ClassGroup::new("c-2").with_name("Grade 10 B"))
            .with_allocation(Allocation::new("al-1", "c-1", "t-1", "sub-1", 2))
    }

    fn sample_schedule() -> GeneratedSchedule {
        let mut s = GeneratedSchedule::new();
        s.add_slot(ScheduleSlot::new(0, 0, "c-1", "t-1", "sub-1"));
        s.add_slot(ScheduleSlot::new(2, 5, "c-1", "t-1", "sub-1"));
        s.add_slot(ScheduleSlot::new(0, 1, "c-2", "t-1", "sub-1"));
        s
    }

    #[test]
    fn test_class_view() {
        let request = sample_request();
        let grid = project(&sample_schedule(), &request, GridView::ByClass, "c-1").unwrap();

        assert_eq!(grid.entity_name, "Grade 10 A");
        assert_eq!(grid.occupied_count(), 2);

        let cell = grid.cell(0, 0).unwrap();
        assert_eq!(cell.subject_name, "Math");
        assert_eq!(cell.counterpart_id, "t-1");
        assert_eq!(cell.counterpart_name, "Mr. Smith");

        assert!(grid.is_free(0, 1)); // c-2's slot is not ours
        assert!(grid.cell(2, 5).is_some());
        assert!(grid.is_free(4, 7));
    }

    #[test]
    fn test_teacher_view() {
        let request = sample_request();
        let grid = project(&sample_schedule(), &request, GridView::ByTeacher, "t-1").unwrap();

        assert_eq!(grid.occupied_count(), 3);
        let cell = grid.cell(0, 1).unwrap();
        assert_eq!(cell.counterpart_id, "c-2");
        assert_eq!(cell.counterpart_name, "Grade 10 B");
    }

    #[test]
    fn test_unknown_entity_rejected() {
        let request = sample_request();
        let err = project(&sample_schedule(), &request, GridView::ByClass, "c-9").unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownEntity { .. }));

        // A class ID is not a teacher ID.
        let err = project(&sample_schedule(), &request, GridView::ByTeacher, "c-1").unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownEntity { .. }));
    }

    #[test]
    fn test_out_of_range_slot_rejected() {
        let request = sample_request();
        let mut schedule = GeneratedSchedule::new();
        schedule.add_slot(ScheduleSlot::new(9, 0, "c-1", "t-1", "sub-1"));
        let err = project(&schedule, &request, GridView::ByClass, "c-1").unwrap_err();
        assert!(matches!(err, ProjectionError::SlotOutOfRange { .. }));
    }

    #[test]
    fn test_break_marker_passthrough() {
        let request = sample_request();
        let grid = project(&sample_schedule(), &request, GridView::ByClass, "c-1").unwrap();
        assert_eq!(grid.break_after_period, 4);
        assert_eq!(grid.day_names.len(), 5);
        assert_eq!(grid.day_names[0], "Monday");
    }

    #[test]
    fn test_cell_out_of_bounds_lookup_is_free() {
        let request = sample_request();
        let grid = project(&sample_schedule(), &request, GridView::ByClass, "c-1").unwrap();
        assert!(grid.cell(99, 0).is_none());
        assert!(grid.cell(0, 99).is_none());
    }
}

//! Timetabling domain models.
//!
//! Core data types for describing a school's scheduling inputs and the
//! resulting weekly timetable. All identifiers are opaque strings; all
//! grid coordinates are 0-indexed (day, period) pairs inside the
//! `SchoolConfig` grid.
//!
//! Serialized field names follow the external wire contract
//! (`camelCase`), so the same types decode requests and encode accepted
//! schedules without translation layers.

mod allocation;
mod class_group;
mod config;
mod request;
mod schedule;
mod subject;
mod teacher;

pub use allocation::Allocation;
pub use class_group::ClassGroup;
pub use config::{ConfigError, SchoolConfig};
pub use request::GenerationRequest;
pub use schedule::{GeneratedSchedule, ScheduleSlot};
pub use subject::Subject;
pub use teacher::Teacher;

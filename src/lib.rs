//! School timetabling engine.
//!
//! Provides the domain models, entity store, constraint model, search
//! engine, and validation needed to build weekly class timetables:
//! assigning (class, teacher, subject) workloads to (day, period) cells
//! such that no teacher or class is double-booked and every workload's
//! weekly period quota is met.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Subject`, `Teacher`, `ClassGroup`,
//!   `Allocation`, `SchoolConfig`, `ScheduleSlot`, `GeneratedSchedule`,
//!   `GenerationRequest`
//! - **`store`**: Single-writer entity store with referential-integrity
//!   enforcement, cascade deletion, and immutable snapshots
//! - **`csp`**: Translation of a snapshot into a CSP instance with a
//!   stable, reproducible variable order
//! - **`solver`**: Backtracking search (MRV + forward checking) with a
//!   node budget, seeded restarts, and schedule quality metrics
//! - **`validation`**: Conflict detection over candidate schedules,
//!   including ones from untrusted external sources
//! - **`projection`**: Per-class and per-teacher timetable grids
//! - **`external`**: Schema-strict decoding and acceptance of schedules
//!   returned by an external generation service
//!
//! # Pipeline
//!
//! `EntityStore` → snapshot → `CspInstance` → `Solver` → `validation`
//! → `projection`. Externally sourced schedules enter through
//! `external::accept_schedule` and pass the same validation before they
//! can be projected.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Russell & Norvig (2020), "Artificial Intelligence", Ch. 6 (CSPs)
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"

pub mod csp;
pub mod external;
pub mod models;
pub mod projection;
pub mod solver;
pub mod store;
pub mod validation;

//! Timetable search engine and quality metrics.
//!
//! # Algorithm
//!
//! `Solver` runs constraint-propagation-backed backtracking over the
//! CSP instance: minimum-remaining-values variable ordering, forward
//! checking on per-teacher and per-class busy grids, and a fairness
//! value ordering that spreads an allocation's periods across distinct
//! days before reusing one. Tie-breaks are deterministic (lowest day,
//! then lowest period), so a fixed input and seed always reproduce the
//! same timetable.
//!
//! Search effort is bounded by a node-expansion budget. Past the
//! budget the engine returns the best partial assignment found plus
//! per-allocation shortfalls; provably impossible instances are
//! reported as infeasible without searching.
//!
//! # KPI
//!
//! `TimetableKpi` computes quality metrics over an accepted timetable:
//! fill rate, allocation satisfaction, day spread, per-teacher load.
//! Metrics are advisory and never gate acceptance.
//!
//! # References
//!
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod engine;
mod kpi;

pub use engine::{Shortfall, SolveOutcome, Solver, SolverConfig};
pub use kpi::TimetableKpi;

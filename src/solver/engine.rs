//! Backtracking timetable search.
//!
//! # Algorithm
//!
//! 1. Build the CSP instance (stable variable order).
//! 2. Prove aggregate infeasibility cheaply: walk allocations in
//!    insertion order crediting each with the periods its teacher and
//!    class can still absorb; any uncredited remainder is a shortfall
//!    and the instance is rejected without search.
//! 3. Depth-first search: pick the unsatisfied allocation with the
//!    fewest legal cells (ties → lowest insertion index), order its
//!    candidate cells by (occurrences already placed on that day,
//!    day, period), place, forward-check every unsatisfied allocation,
//!    backtrack on failure.
//! 4. Stop at the node budget and fall back to the deepest assignment
//!    seen. Optional restarts re-run the search with seeded jitter in
//!    the cell ordering; the seed is explicit config, so reruns with
//!    the same seed return the same timetable slot for slot.
//!
//! # Complexity
//! Worst case exponential (the problem is NP-hard); the budget bounds
//! effort. Per node: O(A × C) for A allocations over C grid cells.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::csp::{CspInstance, ModelError};
use crate::models::{GeneratedSchedule, GenerationRequest, ScheduleSlot};

/// Search effort and reproducibility knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum node expansions per search attempt.
    pub node_budget: u64,
    /// Additional jittered attempts after the canonical first one.
    pub restarts: u32,
    /// Seed for restart jitter. Recorded input: identical seed and
    /// instance reproduce identical output.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            node_budget: 100_000,
            restarts: 0,
            seed: 0,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node budget.
    pub fn with_node_budget(mut self, node_budget: u64) -> Self {
        self.node_budget = node_budget;
        self
    }

    /// Sets the number of jittered restarts.
    pub fn with_restarts(mut self, restarts: u32) -> Self {
        self.restarts = restarts;
        self
    }

    /// Sets the jitter seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Unmet demand for one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    /// Allocation that could not be (fully) placed.
    pub allocation_id: String,
    /// Periods the allocation requires.
    pub required: u32,
    /// Periods that could not be placed.
    pub missing: u32,
}

/// Structured result of a generation run. Infeasibility is a value,
/// not an error: the caller decides whether to relax allocations and
/// retry.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Every allocation fully placed; both hard invariants hold.
    Solved(GeneratedSchedule),
    /// Node budget exhausted: deepest assignment found, with
    /// per-allocation shortfalls.
    Partial {
        schedule: GeneratedSchedule,
        unsatisfied: Vec<Shortfall>,
    },
    /// No assignment satisfies the hard constraints.
    Infeasible { unsatisfied: Vec<Shortfall> },
}

impl SolveOutcome {
    /// Whether the outcome is a complete schedule.
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    /// The schedule carried by this outcome, if any.
    pub fn schedule(&self) -> Option<&GeneratedSchedule> {
        match self {
            SolveOutcome::Solved(schedule) => Some(schedule),
            SolveOutcome::Partial { schedule, .. } => Some(schedule),
            SolveOutcome::Infeasible { .. } => None,
        }
    }
}

/// Deterministic backtracking timetable solver.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Creates a solver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solves a generation request.
    ///
    /// Returns `Err` only for snapshot translation failures (stale
    /// references, rejected config); scheduling failures are expressed
    /// through [`SolveOutcome`].
    pub fn solve(&self, request: &GenerationRequest) -> Result<SolveOutcome, ModelError> {
        let csp = CspInstance::build(request)?;

        if csp.variables.is_empty() {
            return Ok(SolveOutcome::Solved(GeneratedSchedule::new()));
        }

        if let Some(unsatisfied) = capacity_shortfalls(&csp) {
            debug!(
                "instance infeasible by capacity: {} allocation(s) short",
                unsatisfied.len()
            );
            return Ok(SolveOutcome::Infeasible { unsatisfied });
        }

        let mut best: Vec<Placement> = Vec::new();
        let mut any_exhausted = false;

        for attempt in 0..=self.config.restarts {
            let jitter = attempt_jitter(&csp, self.config.seed, attempt);
            let mut search = Search::new(&csp, self.config.node_budget, jitter);

            if search.run() {
                debug!(
                    "solved {} periods in {} nodes (attempt {attempt})",
                    csp.variable_count(),
                    search.nodes
                );
                return Ok(SolveOutcome::Solved(build_schedule(&csp, &search.placements)));
            }

            if search.best.len() > best.len() {
                best = search.best.clone();
            }
            if search.exhausted {
                any_exhausted = true;
            } else {
                // A completed (non-truncated) search saw the whole
                // space: the instance is proven infeasible and further
                // restarts cannot change that.
                debug!("search exhausted the space in {} nodes: infeasible", search.nodes);
                return Ok(SolveOutcome::Infeasible {
                    unsatisfied: shortfalls_from(&csp, &best),
                });
            }
        }

        debug!(
            "node budget spent after {} attempt(s); best partial places {}/{}",
            self.config.restarts + 1,
            best.len(),
            csp.variable_count()
        );
        debug_assert!(any_exhausted);
        Ok(SolveOutcome::Partial {
            schedule: build_schedule(&csp, &best),
            unsatisfied: shortfalls_from(&csp, &best),
        })
    }
}

/// One placed period: (allocation index, flat cell index).
type Placement = (usize, usize);

/// Aggregate overload proof. Walks allocations in insertion order
/// crediting each with what its teacher and class can still absorb;
/// returns the per-allocation shortfalls if any demand is uncoverable.
fn capacity_shortfalls(csp: &CspInstance) -> Option<Vec<Shortfall>> {
    let cells = csp.cell_count();
    let mut teacher_remaining = vec![cells; csp.teacher_ids.len()];
    let mut class_remaining = vec![cells; csp.class_ids.len()];
    let mut shortfalls = Vec::new();

    for (alloc_idx, allocation) in csp.allocations.iter().enumerate() {
        let var = csp
            .variables
            .iter()
            .find(|v| v.allocation == alloc_idx)
            .copied();
        let Some(var) = var else {
            continue; // zero-demand allocation
        };
        let credit = allocation
            .periods_per_week
            .min(teacher_remaining[var.teacher])
            .min(class_remaining[var.class]);
        teacher_remaining[var.teacher] -= credit;
        class_remaining[var.class] -= credit;
        if credit < allocation.periods_per_week {
            shortfalls.push(Shortfall {
                allocation_id: allocation.id.clone(),
                required: allocation.periods_per_week,
                missing: allocation.periods_per_week - credit,
            });
        }
    }

    if shortfalls.is_empty() {
        None
    } else {
        Some(shortfalls)
    }
}

/// Per-cell jitter for a restart attempt. Attempt 0 is the canonical
/// (unjittered) ordering.
fn attempt_jitter(csp: &CspInstance, seed: u64, attempt: u32) -> Vec<u32> {
    let cells = csp.cell_count() as usize;
    if attempt == 0 {
        return vec![0; cells];
    }
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(attempt as u64));
    (0..cells).map(|_| rng.random::<u32>()).collect()
}

fn build_schedule(csp: &CspInstance, placements: &[Placement]) -> GeneratedSchedule {
    let mut ordered: Vec<Placement> = placements.to_vec();
    ordered.sort_unstable_by_key(|&(alloc, cell)| (cell, alloc));

    let mut schedule = GeneratedSchedule::new();
    for (alloc, cell) in ordered {
        let (day, period) = csp.cell_of(cell);
        let allocation = &csp.allocations[alloc];
        schedule.add_slot(ScheduleSlot::new(
            day,
            period,
            allocation.class_id.clone(),
            allocation.teacher_id.clone(),
            allocation.subject_id.clone(),
        ));
    }
    schedule
}

fn shortfalls_from(csp: &CspInstance, placements: &[Placement]) -> Vec<Shortfall> {
    let mut placed = vec![0u32; csp.allocations.len()];
    for &(alloc, _) in placements {
        placed[alloc] += 1;
    }
    csp.allocations
        .iter()
        .enumerate()
        .filter(|(i, a)| placed[*i] < a.periods_per_week)
        .map(|(i, a)| Shortfall {
            allocation_id: a.id.clone(),
            required: a.periods_per_week,
            missing: a.periods_per_week - placed[i],
        })
        .collect()
}

enum Pick {
    /// Every allocation fully placed.
    Done,
    /// Some unsatisfied allocation cannot reach its quota.
    DeadEnd,
    /// Most-constrained allocation and its legal cells (ascending index).
    Var(usize, Vec<usize>),
}

/// One depth-first attempt over the instance.
struct Search<'a> {
    csp: &'a CspInstance,
    /// Periods still to place, per allocation.
    remaining: Vec<u32>,
    /// Teacher busy grid: [teacher][cell].
    teacher_busy: Vec<Vec<bool>>,
    /// Class busy grid: [class][cell].
    class_busy: Vec<Vec<bool>>,
    /// Occurrences placed per (allocation, day), for the fairness order.
    day_count: Vec<Vec<u32>>,
    /// (teacher index, class index) per allocation, precomputed.
    alloc_refs: Vec<(usize, usize)>,
    placements: Vec<Placement>,
    best: Vec<Placement>,
    jitter: Vec<u32>,
    nodes: u64,
    budget: u64,
    exhausted: bool,
}

impl<'a> Search<'a> {
    fn new(csp: &'a CspInstance, budget: u64, jitter: Vec<u32>) -> Self {
        let cells = csp.cell_count() as usize;
        let mut remaining = vec![0u32; csp.allocations.len()];
        let mut alloc_refs = vec![(usize::MAX, usize::MAX); csp.allocations.len()];
        for var in &csp.variables {
            remaining[var.allocation] += 1;
            alloc_refs[var.allocation] = (var.teacher, var.class);
        }
        Self {
            csp,
            remaining,
            teacher_busy: vec![vec![false; cells]; csp.teacher_ids.len()],
            class_busy: vec![vec![false; cells]; csp.class_ids.len()],
            day_count: vec![vec![0u32; csp.days as usize]; csp.allocations.len()],
            alloc_refs,
            placements: Vec::with_capacity(csp.variable_count()),
            best: Vec::new(),
            jitter,
            nodes: 0,
            budget,
            exhausted: false,
        }
    }

    fn run(&mut self) -> bool {
        self.search()
    }

    fn search(&mut self) -> bool {
        match self.pick() {
            Pick::Done => true,
            Pick::DeadEnd => false,
            Pick::Var(alloc, mut cells) => {
                self.order_cells(alloc, &mut cells);
                for cell in cells {
                    if self.exhausted {
                        return false;
                    }
                    self.nodes += 1;
                    if self.nodes > self.budget {
                        self.exhausted = true;
                        return false;
                    }
                    self.place(alloc, cell);
                    if self.placements.len() > self.best.len() {
                        self.best = self.placements.clone();
                    }
                    if self.search() {
                        return true;
                    }
                    self.unplace(alloc, cell);
                }
                false
            }
        }
    }

    /// MRV selection with integrated forward checking: every
    /// unsatisfied allocation must retain at least `remaining` legal
    /// cells, and the one with the fewest is expanded next.
    fn pick(&self) -> Pick {
        let mut best: Option<(usize, Vec<usize>)> = None;
        for alloc in 0..self.remaining.len() {
            if self.remaining[alloc] == 0 {
                continue;
            }
            let cells = self.legal_cells(alloc);
            if (cells.len() as u32) < self.remaining[alloc] {
                return Pick::DeadEnd;
            }
            let tighter = match &best {
                None => true,
                Some((_, current)) => cells.len() < current.len(),
            };
            if tighter {
                best = Some((alloc, cells));
            }
        }
        match best {
            None => Pick::Done,
            Some((alloc, cells)) => Pick::Var(alloc, cells),
        }
    }

    /// Cells free for both the allocation's teacher and class,
    /// ascending flat index (lowest day, then lowest period).
    fn legal_cells(&self, alloc: usize) -> Vec<usize> {
        let (teacher, class) = self.alloc_refs[alloc];
        let teacher_busy = &self.teacher_busy[teacher];
        let class_busy = &self.class_busy[class];
        (0..teacher_busy.len())
            .filter(|&cell| !teacher_busy[cell] && !class_busy[cell])
            .collect()
    }

    /// Fairness ordering: fewest same-allocation occurrences on the
    /// day first, then jitter (zero on the canonical attempt), then
    /// lowest cell index.
    fn order_cells(&self, alloc: usize, cells: &mut [usize]) {
        let day_count = &self.day_count[alloc];
        let periods = self.csp.periods as usize;
        cells.sort_by_key(|&cell| (day_count[cell / periods], self.jitter[cell], cell));
    }

    fn place(&mut self, alloc: usize, cell: usize) {
        let (teacher, class) = self.alloc_refs[alloc];
        self.teacher_busy[teacher][cell] = true;
        self.class_busy[class][cell] = true;
        self.remaining[alloc] -= 1;
        self.day_count[alloc][cell / self.csp.periods as usize] += 1;
        self.placements.push((alloc, cell));
    }

    fn unplace(&mut self, alloc: usize, cell: usize) {
        let (teacher, class) = self.alloc_refs[alloc];
        self.teacher_busy[teacher][cell] = false;
        self.class_busy[class][cell] = false;
        self.remaining[alloc] += 1;
        self.day_count[alloc][cell / self.csp.periods as usize] -= 1;
        self.placements.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allocation, ClassGroup, SchoolConfig, Subject, Teacher};

    fn single_allocation_request(periods_per_week: u32) -> GenerationRequest {
        GenerationRequest::new(SchoolConfig::default())
            .with_subject(Subject::new("sub-1").with_name("Math"))
            .with_teacher(Teacher::new("t-1").with_subject("sub-1"))
            .with_class(ClassGroup::new("c-1"))
            .with_allocation(Allocation::new("al-1", "c-1", "t-1", "sub-1", periods_per_week))
    }

    /// Two classes, two teachers, interleaved workloads.
    fn two_class_request() -> GenerationRequest {
        GenerationRequest::new(SchoolConfig::default())
            .with_subject(Subject::new("sub-1").with_name("Math"))
            .with_subject(Subject::new("sub-2").with_name("Science"))
            .with_teacher(Teacher::new("t-1").with_subject("sub-1"))
            .with_teacher(Teacher::new("t-2").with_subject("sub-2"))
            .with_class(ClassGroup::new("c-1"))
            .with_class(ClassGroup::new("c-2"))
            .with_allocation(Allocation::new("al-1", "c-1", "t-1", "sub-1", 5))
            .with_allocation(Allocation::new("al-2", "c-2", "t-1", "sub-1", 5))
            .with_allocation(Allocation::new("al-3", "c-1", "t-2", "sub-2", 4))
            .with_allocation(Allocation::new("al-4", "c-2", "t-2", "sub-2", 4))
    }

    #[test]
    fn test_single_allocation_three_periods() {
        let request = single_allocation_request(3);
        let outcome = Solver::new().solve(&request).unwrap();

        let SolveOutcome::Solved(schedule) = outcome else {
            panic!("expected solved outcome");
        };
        assert_eq!(schedule.slot_count(), 3);

        let mut cells: Vec<(u32, u32)> = schedule.slots.iter().map(|s| s.cell()).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 3, "cells must be pairwise distinct");

        for slot in &schedule.slots {
            assert_eq!(slot.class_id, "c-1");
            assert_eq!(slot.teacher_id, "t-1");
            assert_eq!(slot.subject_id, "sub-1");
        }
    }

    #[test]
    fn test_fairness_spreads_across_days() {
        let request = single_allocation_request(3);
        let outcome = Solver::new().solve(&request).unwrap();
        let schedule = outcome.schedule().unwrap();
        let allocation = request.allocation("al-1").unwrap();
        assert_eq!(schedule.days_for_allocation(allocation), 3);
    }

    #[test]
    fn test_quotas_met_on_solved() {
        let request = two_class_request();
        let outcome = Solver::new().solve(&request).unwrap();
        let schedule = outcome.schedule().expect("instance is satisfiable");
        assert!(outcome.is_solved());
        for allocation in &request.allocations {
            assert_eq!(
                schedule.count_for_allocation(allocation),
                allocation.periods_per_week,
                "allocation {} quota",
                allocation.id
            );
        }
    }

    #[test]
    fn test_no_double_booking() {
        let request = two_class_request();
        let outcome = Solver::new().solve(&request).unwrap();
        let schedule = outcome.schedule().unwrap();

        let mut teacher_cells: Vec<(u32, u32, &str)> = schedule
            .slots
            .iter()
            .map(|s| (s.day_index, s.period_index, s.teacher_id.as_str()))
            .collect();
        let before = teacher_cells.len();
        teacher_cells.sort_unstable();
        teacher_cells.dedup();
        assert_eq!(teacher_cells.len(), before);

        let mut class_cells: Vec<(u32, u32, &str)> = schedule
            .slots
            .iter()
            .map(|s| (s.day_index, s.period_index, s.class_id.as_str()))
            .collect();
        let before = class_cells.len();
        class_cells.sort_unstable();
        class_cells.dedup();
        assert_eq!(class_cells.len(), before);
    }

    #[test]
    fn test_overloaded_teacher_infeasible() {
        // One teacher, two classes of 30 periods each on a 40-cell grid.
        let request = GenerationRequest::new(SchoolConfig::default())
            .with_subject(Subject::new("sub-1").with_name("Math"))
            .with_teacher(Teacher::new("t-1").with_subject("sub-1"))
            .with_class(ClassGroup::new("c-1"))
            .with_class(ClassGroup::new("c-2"))
            .with_allocation(Allocation::new("al-1", "c-1", "t-1", "sub-1", 30))
            .with_allocation(Allocation::new("al-2", "c-2", "t-1", "sub-1", 30));

        let outcome = Solver::new().solve(&request).unwrap();
        let SolveOutcome::Infeasible { unsatisfied } = outcome else {
            panic!("expected infeasible outcome");
        };
        // Demand 60 over capacity 40: 20 periods are uncoverable.
        let total_missing: u32 = unsatisfied.iter().map(|s| s.missing).sum();
        assert_eq!(total_missing, 20);
        assert!(unsatisfied.iter().all(|s| s.required == 30));
        assert_eq!(unsatisfied[0].allocation_id, "al-2");
    }

    #[test]
    fn test_budget_exhaustion_returns_partial() {
        let request = single_allocation_request(3);
        let solver = Solver::with_config(SolverConfig::new().with_node_budget(1));
        let outcome = solver.solve(&request).unwrap();

        let SolveOutcome::Partial {
            schedule,
            unsatisfied,
        } = outcome
        else {
            panic!("expected partial outcome");
        };
        assert_eq!(schedule.slot_count(), 1);
        assert_eq!(unsatisfied.len(), 1);
        assert_eq!(unsatisfied[0].missing, 2);
        assert_eq!(unsatisfied[0].required, 3);
    }

    #[test]
    fn test_deterministic_output() {
        let request = two_class_request();
        let solver = Solver::with_config(SolverConfig::new().with_seed(7).with_restarts(2));
        let first = solver.solve(&request).unwrap();
        let second = solver.solve(&request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_request_solves_trivially() {
        let request = GenerationRequest::new(SchoolConfig::default());
        let outcome = Solver::new().solve(&request).unwrap();
        assert!(outcome.is_solved());
        assert!(outcome.schedule().unwrap().is_empty());
    }

    #[test]
    fn test_full_grid_saturation() {
        // 40 periods for one class exactly fill the 5x8 grid.
        let request = single_allocation_request(40);
        let outcome = Solver::new().solve(&request).unwrap();
        let schedule = outcome.schedule().unwrap();
        assert!(outcome.is_solved());
        assert_eq!(schedule.slot_count(), 40);
    }

    #[test]
    fn test_stale_reference_is_hard_error() {
        let request = GenerationRequest::new(SchoolConfig::default())
            .with_allocation(Allocation::new("al-1", "c-ghost", "t-ghost", "sub-ghost", 2));
        assert!(Solver::new().solve(&request).is_err());
    }
}

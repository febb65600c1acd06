//! CSP construction.
//!
//! Translates a [`GenerationRequest`] snapshot into a constraint
//! satisfaction instance the search engine can solve:
//!
//! - Each allocation of weekly count `k` yields `k` unit-demand
//!   variables.
//! - Every variable's domain is the full (day × period) grid.
//! - Two hard constraint families: variables sharing a teacher must
//!   take pairwise-distinct cells, and variables sharing a class must
//!   take pairwise-distinct cells.
//!
//! Construction is deterministic: variables are emitted in allocation
//! insertion order, occurrence by occurrence, and entity indices follow
//! list order in the request. Identical input produces a structurally
//! identical instance, which keeps engine output reproducible.
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence", Ch. 6.1

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{Allocation, ConfigError, GenerationRequest};
use crate::store::EntityKind;

/// One unit-demand variable: a single period that must be placed on a
/// grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotVar {
    /// Index of the owning allocation in [`CspInstance::allocations`].
    pub allocation: usize,
    /// 0-based occurrence within the allocation (0..periods_per_week).
    pub occurrence: u32,
    /// Interned class index.
    pub class: usize,
    /// Interned teacher index.
    pub teacher: usize,
    /// Interned subject index.
    pub subject: usize,
}

/// Constraint-model error: the snapshot could not be translated.
///
/// A stale or foreign reference here means the entity store invariants
/// were bypassed upstream; it is a hard error, never repaired silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An allocation references an entity absent from the snapshot.
    #[error("allocation `{allocation_id}` references unknown {kind} `{id}`")]
    UnknownReference {
        allocation_id: String,
        kind: EntityKind,
        id: String,
    },
    /// The snapshot carries a rejected school configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A fully translated CSP instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CspInstance {
    /// Grid days.
    pub days: u32,
    /// Grid periods per day.
    pub periods: u32,
    /// Unit-demand variables in stable emission order.
    pub variables: Vec<SlotVar>,
    /// Source allocations, insertion order preserved.
    pub allocations: Vec<Allocation>,
    /// Interned subject IDs (index → ID).
    pub subject_ids: Vec<String>,
    /// Interned teacher IDs (index → ID).
    pub teacher_ids: Vec<String>,
    /// Interned class IDs (index → ID).
    pub class_ids: Vec<String>,
    /// Total demanded periods per teacher index.
    pub teacher_demand: Vec<u32>,
    /// Total demanded periods per class index.
    pub class_demand: Vec<u32>,
}

impl CspInstance {
    /// Builds an instance from a snapshot.
    pub fn build(request: &GenerationRequest) -> Result<Self, ModelError> {
        request.config.validate()?;

        let subject_ids: Vec<String> = request.subjects.iter().map(|s| s.id.clone()).collect();
        let teacher_ids: Vec<String> = request.teachers.iter().map(|t| t.id.clone()).collect();
        let class_ids: Vec<String> = request.classes.iter().map(|c| c.id.clone()).collect();

        let subject_index: HashMap<&str, usize> = subject_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let teacher_index: HashMap<&str, usize> = teacher_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let class_index: HashMap<&str, usize> = class_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut variables = Vec::with_capacity(request.total_demand() as usize);
        let mut teacher_demand = vec![0u32; teacher_ids.len()];
        let mut class_demand = vec![0u32; class_ids.len()];

        for (alloc_idx, allocation) in request.allocations.iter().enumerate() {
            let class = *class_index.get(allocation.class_id.as_str()).ok_or_else(|| {
                ModelError::UnknownReference {
                    allocation_id: allocation.id.clone(),
                    kind: EntityKind::ClassGroup,
                    id: allocation.class_id.clone(),
                }
            })?;
            let teacher = *teacher_index
                .get(allocation.teacher_id.as_str())
                .ok_or_else(|| ModelError::UnknownReference {
                    allocation_id: allocation.id.clone(),
                    kind: EntityKind::Teacher,
                    id: allocation.teacher_id.clone(),
                })?;
            let subject = *subject_index
                .get(allocation.subject_id.as_str())
                .ok_or_else(|| ModelError::UnknownReference {
                    allocation_id: allocation.id.clone(),
                    kind: EntityKind::Subject,
                    id: allocation.subject_id.clone(),
                })?;

            teacher_demand[teacher] += allocation.periods_per_week;
            class_demand[class] += allocation.periods_per_week;

            for occurrence in 0..allocation.periods_per_week {
                variables.push(SlotVar {
                    allocation: alloc_idx,
                    occurrence,
                    class,
                    teacher,
                    subject,
                });
            }
        }

        Ok(Self {
            days: request.config.days_per_week,
            periods: request.config.periods_per_day,
            variables,
            allocations: request.allocations.clone(),
            subject_ids,
            teacher_ids,
            class_ids,
            teacher_demand,
            class_demand,
        })
    }

    /// Number of cells in the (day × period) grid.
    pub fn cell_count(&self) -> u32 {
        self.days * self.periods
    }

    /// Number of unit-demand variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Flat index for a (day, period) cell.
    #[inline]
    pub fn cell_index(&self, day: u32, period: u32) -> usize {
        (day * self.periods + period) as usize
    }

    /// (day, period) pair for a flat cell index.
    #[inline]
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index / self.periods, index % self.periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allocation, ClassGroup, SchoolConfig, Subject, Teacher};

    fn sample_request() -> GenerationRequest {
        GenerationRequest::new(SchoolConfig::default())
            .with_subject(Subject::new("sub-1").with_name("Math"))
            .with_subject(Subject::new("sub-2").with_name("Science"))
            .with_teacher(Teacher::new("t-1").with_subject("sub-1"))
            .with_teacher(Teacher::new("t-2").with_subject("sub-2"))
            .with_class(ClassGroup::new("c-1"))
            .with_allocation(Allocation::new("al-1", "c-1", "t-1", "sub-1", 3))
            .with_allocation(Allocation::new("al-2", "c-1", "t-2", "sub-2", 2))
    }

    #[test]
    fn test_variable_expansion_and_order() {
        let csp = CspInstance::build(&sample_request()).unwrap();
        assert_eq!(csp.variable_count(), 5);

        // Variables follow allocation insertion order, occurrence-major.
        let owners: Vec<(usize, u32)> = csp
            .variables
            .iter()
            .map(|v| (v.allocation, v.occurrence))
            .collect();
        assert_eq!(owners, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_structural_determinism() {
        let request = sample_request();
        let a = CspInstance::build(&request).unwrap();
        let b = CspInstance::build(&request).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_demand_accounting() {
        let csp = CspInstance::build(&sample_request()).unwrap();
        assert_eq!(csp.teacher_demand, vec![3, 2]);
        assert_eq!(csp.class_demand, vec![5]);
    }

    #[test]
    fn test_stale_reference_rejected() {
        let request = sample_request()
            .with_allocation(Allocation::new("al-3", "c-1", "t-missing", "sub-1", 1));
        let err = CspInstance::build(&request).unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnknownReference {
                kind: EntityKind::Teacher,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut request = sample_request();
        request.config.days_per_week = 9; // day names no longer match
        assert!(matches!(
            CspInstance::build(&request),
            Err(ModelError::Config(_))
        ));
    }

    #[test]
    fn test_cell_index_round_trip() {
        let csp = CspInstance::build(&sample_request()).unwrap();
        assert_eq!(csp.cell_count(), 40);
        let idx = csp.cell_index(3, 5);
        assert_eq!(csp.cell_of(idx), (3, 5));
        assert_eq!(csp.cell_of(0), (0, 0));
    }
}

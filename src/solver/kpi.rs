//! Timetable quality metrics.
//!
//! Computes advisory indicators over an accepted schedule and the
//! request it was generated from. These measure the soft objective
//! (even distribution) and overall load; they never decide whether a
//! schedule is accepted — that is the validator's job.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill rate | placed periods / requested periods |
//! | Satisfied allocations | allocations whose quota is fully met |
//! | Avg day spread | mean of distinct-days / ideal-days per allocation |
//! | Teacher load | placed periods per teacher |

use std::collections::HashMap;

use crate::models::{GeneratedSchedule, GenerationRequest};

/// Quality indicators for one timetable.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Placed periods over requested periods (0.0..1.0).
    pub fill_rate: f64,
    /// Allocations whose weekly quota is fully met.
    pub satisfied_allocations: usize,
    /// Total allocations in the request.
    pub allocation_count: usize,
    /// Mean day-spread score across allocations (0.0..1.0, higher is
    /// more evenly spread). An allocation's ideal is one period per
    /// day until days run out.
    pub avg_day_spread: f64,
    /// Placed periods per teacher ID.
    pub teacher_load: HashMap<String, u32>,
}

impl TimetableKpi {
    /// Computes KPIs for a schedule against its request.
    pub fn calculate(schedule: &GeneratedSchedule, request: &GenerationRequest) -> Self {
        let requested = request.total_demand();
        let placed: u32 = request
            .allocations
            .iter()
            .map(|a| schedule.count_for_allocation(a))
            .sum();

        let fill_rate = if requested == 0 {
            1.0
        } else {
            placed as f64 / requested as f64
        };

        let satisfied_allocations = request
            .allocations
            .iter()
            .filter(|a| schedule.count_for_allocation(a) == a.periods_per_week)
            .count();

        let days = request.config.days_per_week;
        let mut spread_sum = 0.0;
        let mut spread_count = 0usize;
        for allocation in &request.allocations {
            let occurrences = schedule.count_for_allocation(allocation);
            if occurrences == 0 {
                continue;
            }
            let ideal = occurrences.min(days);
            spread_sum += schedule.days_for_allocation(allocation) as f64 / ideal as f64;
            spread_count += 1;
        }
        let avg_day_spread = if spread_count == 0 {
            1.0
        } else {
            spread_sum / spread_count as f64
        };

        let mut teacher_load: HashMap<String, u32> = HashMap::new();
        for slot in &schedule.slots {
            *teacher_load.entry(slot.teacher_id.clone()).or_insert(0) += 1;
        }

        Self {
            fill_rate,
            satisfied_allocations,
            allocation_count: request.allocations.len(),
            avg_day_spread,
            teacher_load,
        }
    }
}

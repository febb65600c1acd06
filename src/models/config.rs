//! School configuration model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid shape and labeling for the weekly timetable.
///
/// Defines a `days_per_week` × `periods_per_day` cell grid. The break
/// marker is cosmetic: it tells the presentation layer where to draw a
/// break column and never removes a period from the assignable grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConfig {
    /// Number of teaching days in the weekly cycle.
    pub days_per_week: u32,
    /// Number of periods in each day.
    pub periods_per_day: u32,
    /// Break is drawn after this many periods (cosmetic only).
    pub break_after_period: u32,
    /// Ordered day names; length must equal `days_per_week`.
    pub days: Vec<String>,
}

/// Configuration integrity error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Zero-sized grid dimension.
    #[error("grid must have at least one day and one period")]
    EmptyGrid,
    /// Day-name list does not match `days_per_week`.
    #[error("expected {expected} day names, got {got}")]
    DayNameMismatch { expected: u32, got: usize },
    /// Break marker points past the end of the day.
    #[error("break after period {break_after} exceeds {periods} periods per day")]
    BreakOutOfRange { break_after: u32, periods: u32 },
}

impl Default for SchoolConfig {
    /// Five-day Monday–Friday week, eight periods, break after period 4.
    fn default() -> Self {
        Self {
            days_per_week: 5,
            periods_per_day: 8,
            break_after_period: 4,
            days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SchoolConfig {
    /// Creates a config with the default week shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the day names; `days_per_week` follows the list length.
    pub fn with_days<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.days = days.into_iter().map(Into::into).collect();
        self.days_per_week = self.days.len() as u32;
        self
    }

    /// Sets the number of periods per day.
    pub fn with_periods_per_day(mut self, periods: u32) -> Self {
        self.periods_per_day = periods;
        self
    }

    /// Sets the cosmetic break marker.
    pub fn with_break_after(mut self, period: u32) -> Self {
        self.break_after_period = period;
        self
    }

    /// Checks structural integrity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days_per_week == 0 || self.periods_per_day == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.days.len() != self.days_per_week as usize {
            return Err(ConfigError::DayNameMismatch {
                expected: self.days_per_week,
                got: self.days.len(),
            });
        }
        if self.break_after_period > self.periods_per_day {
            return Err(ConfigError::BreakOutOfRange {
                break_after: self.break_after_period,
                periods: self.periods_per_day,
            });
        }
        Ok(())
    }

    /// Total assignable cells per entity in one weekly cycle.
    pub fn cells_per_week(&self) -> u32 {
        self.days_per_week * self.periods_per_day
    }

    /// Day name for a 0-based day index.
    pub fn day_name(&self, day_index: u32) -> Option<&str> {
        self.days.get(day_index as usize).map(String::as_str)
    }

    /// Whether a (day, period) pair lies inside the grid.
    pub fn contains_cell(&self, day_index: u32, period_index: u32) -> bool {
        day_index < self.days_per_week && period_index < self.periods_per_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = SchoolConfig::default();
        assert_eq!(c.days_per_week, 5);
        assert_eq!(c.periods_per_day, 8);
        assert_eq!(c.days.len(), 5);
        assert_eq!(c.cells_per_week(), 40);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_with_days_updates_count() {
        let c = SchoolConfig::new().with_days(["Monday", "Wednesday", "Friday"]);
        assert_eq!(c.days_per_week, 3);
        assert_eq!(c.day_name(2), Some("Friday"));
        assert_eq!(c.day_name(3), None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_day_name_mismatch_rejected() {
        let mut c = SchoolConfig::default();
        c.days_per_week = 6;
        assert_eq!(
            c.validate(),
            Err(ConfigError::DayNameMismatch {
                expected: 6,
                got: 5
            })
        );
    }

    #[test]
    fn test_empty_grid_rejected() {
        let mut c = SchoolConfig::default();
        c.periods_per_day = 0;
        assert_eq!(c.validate(), Err(ConfigError::EmptyGrid));
    }

    #[test]
    fn test_break_out_of_range_rejected() {
        let c = SchoolConfig::new()
            .with_periods_per_day(6)
            .with_break_after(7);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::BreakOutOfRange { .. })
        ));
    }

    #[test]
    fn test_contains_cell() {
        let c = SchoolConfig::default();
        assert!(c.contains_cell(0, 0));
        assert!(c.contains_cell(4, 7));
        assert!(!c.contains_cell(5, 0));
        assert!(!c.contains_cell(0, 8));
    }

    #[test]
    fn test_config_serde_camel_case() {
        let c = SchoolConfig::default();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["daysPerWeek"], 5);
        assert_eq!(json["breakAfterPeriod"], 4);
    }
}

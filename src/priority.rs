//! Hooks for the external priority and allocation steps.

use serde::{Deserialize, Serialize};

use crate::adaptive::AdaptiveParameters;

/// Share of priority that full mastery removes.
pub const MASTERY_DAMPING: f64 = 0.5;

/// `base × (1 − mastery × 0.5) × interest / fatigue`.
pub fn scale_priority(base_priority: f64, mastery: f64, params: &AdaptiveParameters) -> f64 {
    let mastery_adjustment = 1.0 - mastery * MASTERY_DAMPING;
    base_priority * mastery_adjustment * params.interest_factor / params.fatigue_factor
}

/// One topic of an allocator's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTopic {
    pub name: String,
    pub allocated_hours: f64,
}

impl PlannedTopic {
    pub fn new(name: impl Into<String>, allocated_hours: f64) -> Self {
        Self {
            name: name.into(),
            allocated_hours,
        }
    }

    /// Whole minutes, truncated.
    pub fn allocated_minutes(&self) -> i64 {
        (self.allocated_hours * 60.0).trunc() as i64
    }
}

use serde::{Deserialize, Serialize};

pub const FACTOR_MIN: f64 = 0.1;
pub const FACTOR_MAX: f64 = 2.0;
pub const RETENTION_MIN: f64 = 0.0;
pub const RETENTION_MAX: f64 = 1.0;

pub const BASE_BREAK_MINUTES: f64 = 5.0;
const BREAK_MINUTES_PER_HOUR: f64 = 10.0;

/// Learner-wide knobs biasing priority scoring and break length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveParameters {
    pub fatigue_factor: f64,
    pub interest_factor: f64,
    pub retention_rate: f64,
}

impl Default for AdaptiveParameters {
    fn default() -> Self {
        Self {
            fatigue_factor: 1.0,
            interest_factor: 1.0,
            retention_rate: 0.8,
        }
    }
}

/// Partial update; `None` leaves the parameter untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdaptiveUpdate {
    pub fatigue_factor: Option<f64>,
    pub interest_factor: Option<f64>,
    pub retention_rate: Option<f64>,
}

impl AdaptiveUpdate {
    pub fn fatigue(mut self, value: f64) -> Self {
        self.fatigue_factor = Some(value);
        self
    }

    pub fn interest(mut self, value: f64) -> Self {
        self.interest_factor = Some(value);
        self
    }

    pub fn retention(mut self, value: f64) -> Self {
        self.retention_rate = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fatigue_factor.is_none() && self.interest_factor.is_none() && self.retention_rate.is_none()
    }
}

impl AdaptiveParameters {
    pub fn apply(&mut self, update: AdaptiveUpdate) {
        if let Some(value) = accept("fatigue_factor", update.fatigue_factor) {
            self.fatigue_factor = value.clamp(FACTOR_MIN, FACTOR_MAX);
        }
        if let Some(value) = accept("interest_factor", update.interest_factor) {
            self.interest_factor = value.clamp(FACTOR_MIN, FACTOR_MAX);
        }
        if let Some(value) = accept("retention_rate", update.retention_rate) {
            self.retention_rate = value.clamp(RETENTION_MIN, RETENTION_MAX);
        }
    }

    /// Brings values read from disk back inside their bounds.
    pub fn sanitized(self) -> Self {
        let mut params = Self::default();
        params.apply(AdaptiveUpdate {
            fatigue_factor: Some(self.fatigue_factor),
            interest_factor: Some(self.interest_factor),
            retention_rate: Some(self.retention_rate),
        });
        params
    }

    /// Break length in whole minutes after studying for `study_duration_hours`.
    pub fn recommended_break(&self, study_duration_hours: f64) -> i64 {
        let minutes =
            BASE_BREAK_MINUTES + study_duration_hours * BREAK_MINUTES_PER_HOUR * self.fatigue_factor;
        minutes.trunc() as i64
    }
}

fn accept(name: &'static str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            tracing::warn!(parameter = name, value = %v, "ignoring non-finite adaptive parameter");
            None
        }
        None => None,
    }
}

//! Records kept for one learner.
//!
//! Instants are serialized as RFC 3339 strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::AdaptiveParameters;
use crate::ledger::PerformanceLedger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStudyEntry {
    pub topic: String,
    pub duration_minutes: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Intended 0-100; not enforced.
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub topics_studied: Vec<TopicStudyEntry>,
    #[serde(default)]
    pub performance_metrics: BTreeMap<String, Vec<PerformanceRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
}

impl Session {
    pub fn begin(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            end_time: None,
            topics_studied: Vec::new(),
            performance_metrics: BTreeMap::new(),
            duration_hours: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn has_activity(&self) -> bool {
        !self.topics_studied.is_empty() || !self.performance_metrics.is_empty()
    }

    pub fn minutes_on(&self, topic: &str) -> i64 {
        self.topics_studied
            .iter()
            .filter(|entry| entry.topic == topic)
            .fold(0i64, |total, entry| total.saturating_add(entry.duration_minutes))
    }

    /// Closes the session at `now` and returns the archived copy.
    pub(crate) fn close(mut self, now: DateTime<Utc>) -> Self {
        let elapsed = now - self.start_time;
        self.end_time = Some(now);
        self.duration_hours = Some(elapsed.num_milliseconds() as f64 / 3_600_000.0);
        self
    }
}

/// Exactly the payload written to the persisted resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    #[serde(default)]
    pub session_history: Vec<Session>,
    #[serde(default)]
    pub performance_history: PerformanceLedger,
    #[serde(default)]
    pub adaptive_parameters: AdaptiveParameters,
}

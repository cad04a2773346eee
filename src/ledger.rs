//! Append-only per-topic score history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PerformanceRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceLedger {
    topics: BTreeMap<String, Vec<PerformanceRecord>>,
}

impl PerformanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, topic: &str, score: f64, timestamp: DateTime<Utc>) -> PerformanceRecord {
        let record = PerformanceRecord { score, timestamp };
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Records in insertion order; empty for an unknown topic.
    pub fn records(&self, topic: &str) -> &[PerformanceRecord] {
        self.topics.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records ordered by timestamp, ties kept in insertion order.
    pub fn trend(&self, topic: &str) -> Vec<PerformanceRecord> {
        let mut trend = self.records(topic).to_vec();
        trend.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        trend
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    pub fn record_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

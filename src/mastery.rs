//! Recency-weighted mastery.
//!
//! The i-th record of a topic's trend (oldest first) carries weight `i + 1`,
//! so the latest score counts the most. Scores are trusted: values above 100
//! lift the raw average past 100 and only the final result is capped at 1.0.

use crate::ledger::PerformanceLedger;
use crate::models::PerformanceRecord;

pub const MASTERY_CAP: f64 = 1.0;

/// Mastery of a trend already ordered oldest to newest.
pub fn mastery_from_trend(trend: &[PerformanceRecord]) -> f64 {
    if trend.is_empty() {
        return 0.0;
    }

    let (weighted_sum, weight_sum) = trend
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(weighted, weights), (i, record)| {
            let weight = (i + 1) as f64;
            (weighted + record.score * weight, weights + weight)
        });

    (weighted_sum / weight_sum / 100.0).min(MASTERY_CAP)
}

pub fn estimate_mastery(ledger: &PerformanceLedger, topic: &str) -> f64 {
    mastery_from_trend(&ledger.trend(topic))
}

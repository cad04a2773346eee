use serde::Serialize;

use crate::ledger::PerformanceLedger;
use crate::mastery::mastery_from_trend;
use crate::session::SessionTracker;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicInsight {
    pub topic: String,
    pub study_hours: f64,
    pub record_count: usize,
    pub latest_score: Option<f64>,
    /// Latest minus earliest score; needs at least two records.
    pub improvement: Option<f64>,
    pub mastery: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub session_count: usize,
    pub performance_records: usize,
    pub topics_tracked: usize,
}

pub fn topic_insight(ledger: &PerformanceLedger, sessions: &SessionTracker, topic: &str) -> TopicInsight {
    let trend = ledger.trend(topic);
    let latest_score = trend.last().map(|r| r.score);
    let improvement = match (trend.first(), trend.last()) {
        (Some(first), Some(last)) if trend.len() >= 2 => Some(last.score - first.score),
        _ => None,
    };

    TopicInsight {
        topic: topic.to_string(),
        study_hours: sessions.study_time_hours(topic),
        record_count: trend.len(),
        latest_score,
        improvement,
        mastery: mastery_from_trend(&trend),
    }
}

/// Topics with scores plus those studied in the current session, sorted.
pub fn known_topics(ledger: &PerformanceLedger, sessions: &SessionTracker) -> Vec<String> {
    let mut topics: Vec<String> = ledger.topics().map(str::to_string).collect();
    if let Some(active) = sessions.active() {
        topics.extend(active.topics_studied.iter().map(|e| e.topic.clone()));
    }
    topics.sort();
    topics.dedup();
    topics
}

pub fn memory_stats(ledger: &PerformanceLedger, sessions: &SessionTracker) -> MemoryStats {
    MemoryStats {
        session_count: sessions.history().len(),
        performance_records: ledger.record_count(),
        topics_tracked: known_topics(ledger, sessions).len(),
    }
}

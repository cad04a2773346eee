//! Per-learner handle over sessions, scores, and adaptive parameters.
//!
//! Persistence is best-effort. Construction falls back to fresh state when
//! the stored document is missing or unreadable, and a failed save never
//! blocks tracking: it is logged, kept in `last_save_error`, and the
//! in-memory state stays authoritative.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::adaptive::{AdaptiveParameters, AdaptiveUpdate};
use crate::analytics::{self, MemoryStats, TopicInsight};
use crate::config::TrackerConfig;
use crate::error::{StoreError, StoreResult};
use crate::ledger::PerformanceLedger;
use crate::mastery::estimate_mastery;
use crate::models::{PerformanceRecord, Session, TopicStudyEntry, TrackerState};
use crate::persistence::JsonFileStore;
use crate::priority::{scale_priority, PlannedTopic};
use crate::session::SessionTracker;

/// How the persisted state was obtained at construction.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    Fresh,
    Recovered(StoreError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

#[derive(Debug)]
pub struct StudyTracker {
    learner_id: String,
    store: JsonFileStore,
    sessions: SessionTracker,
    performance_history: PerformanceLedger,
    adaptive_parameters: AdaptiveParameters,
    load_outcome: LoadOutcome,
    last_save_error: Option<StoreError>,
}

impl StudyTracker {
    pub fn new(learner_id: &str, config: &TrackerConfig) -> Self {
        Self::open(learner_id, config.memory_file(learner_id))
    }

    pub fn open(learner_id: &str, path: impl Into<PathBuf>) -> Self {
        let store = JsonFileStore::new(path);
        let (state, load_outcome) = match store.load() {
            Ok(Some(state)) => (state, LoadOutcome::Loaded),
            Ok(None) => (TrackerState::default(), LoadOutcome::Fresh),
            Err(err) => {
                tracing::warn!(
                    learner_id,
                    path = %store.path().display(),
                    error = %err,
                    "failed to load learner state, starting fresh"
                );
                (TrackerState::default(), LoadOutcome::Recovered(err))
            }
        };

        Self {
            learner_id: learner_id.to_string(),
            store,
            sessions: SessionTracker::new(state.session_history, Utc::now()),
            performance_history: state.performance_history,
            adaptive_parameters: state.adaptive_parameters,
            load_outcome,
            last_save_error: None,
        }
    }

    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    pub fn memory_file(&self) -> &Path {
        self.store.path()
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    // ========== Sessions ==========

    /// Returns the session that was auto-archived, if any.
    pub fn start_study_session(&mut self) -> Option<Session> {
        let archived = self.sessions.start(Utc::now());
        if archived.is_some() {
            self.persist();
        }
        archived
    }

    /// `None` when there was nothing to end; nothing is saved then.
    pub fn end_study_session(&mut self) -> Option<Session> {
        let archived = self.sessions.end(Utc::now())?;
        tracing::debug!(
            learner_id = %self.learner_id,
            duration_hours = archived.duration_hours.unwrap_or_default(),
            topics = archived.topics_studied.len(),
            "study session archived"
        );
        self.persist();
        Some(archived)
    }

    pub fn record_topic_study(&mut self, topic: &str, duration_minutes: i64) -> TopicStudyEntry {
        self.sessions.record_topic(topic, duration_minutes, Utc::now())
    }

    /// Records each planned topic's allocation, in order.
    pub fn record_allocation(&mut self, planned: &[PlannedTopic]) {
        for topic in planned {
            self.record_topic_study(&topic.name, topic.allocated_minutes());
        }
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.sessions.active()
    }

    pub fn session_history(&self) -> &[Session] {
        self.sessions.history()
    }

    pub fn last_session(&self) -> Option<&Session> {
        self.sessions.last_archived()
    }

    // ========== Performance ==========

    /// `None` for a non-finite score, which is dropped: JSON cannot hold it
    /// and the saved document would no longer load.
    pub fn record_performance(&mut self, topic: &str, score: f64) -> Option<PerformanceRecord> {
        if !score.is_finite() {
            tracing::warn!(
                learner_id = %self.learner_id,
                topic,
                score = %score,
                "ignoring non-finite score"
            );
            return None;
        }

        let record = self.performance_history.record(topic, score, Utc::now());
        self.sessions.mirror_performance(topic, record.clone());
        self.persist();
        Some(record)
    }

    pub fn get_performance_trend(&self, topic: &str) -> Vec<PerformanceRecord> {
        self.performance_history.trend(topic)
    }

    pub fn get_study_time_for_topic(&self, topic: &str) -> f64 {
        self.sessions.study_time_hours(topic)
    }

    pub fn estimate_mastery(&self, topic: &str) -> f64 {
        estimate_mastery(&self.performance_history, topic)
    }

    pub fn performance_history(&self) -> &PerformanceLedger {
        &self.performance_history
    }

    // ========== Adaptive parameters ==========

    /// Saves whenever at least one parameter was supplied.
    pub fn update_adaptive_parameters(&mut self, update: AdaptiveUpdate) -> AdaptiveParameters {
        if !update.is_empty() {
            self.adaptive_parameters.apply(update);
            self.persist();
        }
        self.adaptive_parameters
    }

    pub fn get_recommended_break(&self, study_duration_hours: f64) -> i64 {
        self.adaptive_parameters.recommended_break(study_duration_hours)
    }

    pub fn adaptive_parameters(&self) -> &AdaptiveParameters {
        &self.adaptive_parameters
    }

    /// Base priority scaled by this learner's mastery, interest and fatigue.
    pub fn scaled_priority(&self, topic: &str, base_priority: f64) -> f64 {
        scale_priority(
            base_priority,
            self.estimate_mastery(topic),
            &self.adaptive_parameters,
        )
    }

    // ========== Reporting ==========

    pub fn known_topics(&self) -> Vec<String> {
        analytics::known_topics(&self.performance_history, &self.sessions)
    }

    pub fn topic_insight(&self, topic: &str) -> TopicInsight {
        analytics::topic_insight(&self.performance_history, &self.sessions, topic)
    }

    pub fn memory_stats(&self) -> MemoryStats {
        analytics::memory_stats(&self.performance_history, &self.sessions)
    }

    // ========== Persistence ==========

    /// Snapshot of everything that is persisted. The active session is not.
    pub fn state(&self) -> TrackerState {
        TrackerState {
            session_history: self.sessions.history().to_vec(),
            performance_history: self.performance_history.clone(),
            adaptive_parameters: self.adaptive_parameters,
        }
    }

    pub fn save(&mut self) -> StoreResult<()> {
        let result = self.store.save(&self.state());
        self.last_save_error = result.as_ref().err().cloned();
        result
    }

    /// Reloads the learner from the persisted document. The active session
    /// and anything that never reached disk are discarded; saved history is
    /// kept.
    pub fn reset(&mut self) {
        let path = self.store.path().to_path_buf();
        *self = Self::open(&self.learner_id, path);
        tracing::info!(
            learner_id = %self.learner_id,
            loaded = self.load_outcome.is_loaded(),
            "learner state reloaded"
        );
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.state()) {
            tracing::warn!(
                learner_id = %self.learner_id,
                path = %self.store.path().display(),
                error = %err,
                "failed to save learner state"
            );
            self.last_save_error = Some(err);
        } else {
            self.last_save_error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracker_in(dir: &TempDir) -> StudyTracker {
        StudyTracker::new("12345", &TrackerConfig::with_data_dir(dir.path()))
    }

    #[test]
    fn test_fresh_tracker_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        assert!(matches!(tracker.load_outcome(), LoadOutcome::Fresh));
        assert!(tracker.session_history().is_empty());
        assert!(tracker.performance_history().is_empty());
        assert_eq!(*tracker.adaptive_parameters(), AdaptiveParameters::default());
        assert!(tracker.active_session().is_some());
        assert!(!tracker.memory_file().exists());
    }

    #[test]
    fn test_end_without_start_saves_nothing() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);

        assert!(tracker.end_study_session().is_none());
        assert!(tracker.session_history().is_empty());
        assert!(!tracker.memory_file().exists());
    }

    #[test]
    fn test_record_performance_is_mirrored_and_saved() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.start_study_session();

        let record = tracker.record_performance("AI Basics", 65.0).unwrap();

        let active = tracker.active_session().unwrap();
        assert_eq!(active.performance_metrics["AI Basics"], vec![record.clone()]);
        assert_eq!(tracker.get_performance_trend("AI Basics"), vec![record]);
        assert!(tracker.memory_file().exists());
    }

    #[test]
    fn test_record_allocation_converts_hours() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.start_study_session();

        tracker.record_allocation(&[
            PlannedTopic::new("AI Basics", 2.25),
            PlannedTopic::new("Search Algorithms", 1.0),
        ]);

        let topics: Vec<(String, i64)> = tracker
            .active_session()
            .unwrap()
            .topics_studied
            .iter()
            .map(|e| (e.topic.clone(), e.duration_minutes))
            .collect();
        assert_eq!(
            topics,
            vec![
                ("AI Basics".to_string(), 135),
                ("Search Algorithms".to_string(), 60)
            ]
        );
        assert_eq!(tracker.get_study_time_for_topic("AI Basics"), 2.25);
    }

    #[test]
    fn test_scaled_priority_uses_mastery_and_factors() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.record_performance("AI", 100.0);
        tracker.update_adaptive_parameters(AdaptiveUpdate::default().interest(2.0));

        // 6 * (1 - 0.5) * 2.0 / 1.0
        assert_eq!(tracker.scaled_priority("AI", 6.0), 6.0);
        assert_eq!(tracker.scaled_priority("Unseen", 6.0), 12.0);
    }

    #[test]
    fn test_save_failure_does_not_block_tracking() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut tracker = StudyTracker::open("12345", blocker.join("state.json"));

        tracker.record_topic_study("AI", 30);
        tracker.record_performance("AI", 70.0);
        assert!(tracker.last_save_error().is_some());

        let archived = tracker.end_study_session().unwrap();
        assert_eq!(archived.topics_studied.len(), 1);
        assert_eq!(tracker.session_history().len(), 1);
        assert!(tracker.save().is_err());
    }

    #[test]
    fn test_empty_update_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);

        let params = tracker.update_adaptive_parameters(AdaptiveUpdate::default());

        assert_eq!(params, AdaptiveParameters::default());
        assert!(!tracker.memory_file().exists());
    }

    #[test]
    fn test_reset_reloads_saved_history_and_drops_active_session() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.record_topic_study("AI", 30);
        tracker.record_performance("AI", 70.0);
        tracker.end_study_session();
        tracker.record_topic_study("Search", 45);

        tracker.reset();

        assert!(tracker.load_outcome().is_loaded());
        assert_eq!(tracker.session_history().len(), 1);
        assert_eq!(tracker.get_performance_trend("AI").len(), 1);
        let active = tracker.active_session().unwrap();
        assert!(active.topics_studied.is_empty());
        assert_eq!(tracker.get_study_time_for_topic("Search"), 0.0);
    }

    #[test]
    fn test_reset_without_saved_state_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.record_topic_study("AI", 30);

        tracker.reset();

        assert!(matches!(tracker.load_outcome(), LoadOutcome::Fresh));
        assert!(tracker.session_history().is_empty());
        assert_eq!(tracker.get_study_time_for_topic("AI"), 0.0);
        assert!(!tracker.memory_file().exists());
    }

    #[test]
    fn test_non_finite_scores_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.record_topic_study("AI", 30);
        tracker.record_performance("AI", 80.0);
        tracker.end_study_session();
        tracker.start_study_session();

        assert!(tracker.record_performance("AI", f64::NAN).is_none());
        assert!(tracker.record_performance("AI", f64::INFINITY).is_none());
        assert!(tracker.record_performance("AI", f64::NEG_INFINITY).is_none());

        assert_eq!(tracker.get_performance_trend("AI").len(), 1);
        assert!(tracker.active_session().unwrap().performance_metrics.is_empty());
        assert!(tracker.last_save_error().is_none());

        let reopened = tracker_in(&dir);
        assert!(reopened.load_outcome().is_loaded());
        assert_eq!(reopened.session_history().len(), 1);
        assert_eq!(reopened.get_performance_trend("AI").len(), 1);
    }

    #[test]
    fn test_failed_explicit_save_is_remembered() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut tracker = StudyTracker::open("12345", blocker.join("state.json"));
        assert!(tracker.last_save_error().is_none());

        let err = tracker.save().unwrap_err();

        assert!(err.is_save_failure());
        assert!(matches!(
            tracker.last_save_error(),
            Some(StoreError::CreateDir { .. })
        ));
    }

    #[test]
    fn test_score_only_implicit_session_is_archived_on_end() {
        let dir = TempDir::new().unwrap();
        let mut tracker = tracker_in(&dir);
        tracker.record_performance("AI", 60.0);

        let archived = tracker.end_study_session().unwrap();

        assert!(archived.topics_studied.is_empty());
        assert_eq!(archived.performance_metrics["AI"].len(), 1);
        assert_eq!(tracker.session_history().len(), 1);
    }
}

//! Lifecycle of the current study session.
//!
//! States:
//! - `Pending`: the implicit session every tracker starts with. It becomes
//!   meaningful once it receives a topic entry or a score.
//! - `Active`: explicitly started, or auto-started by `record_topic`.
//! - `Idle`: the last session was ended and nothing has started since.
//!
//! Archived sessions are closed copies and are never mutated again.

use chrono::{DateTime, Utc};

use crate::models::{PerformanceRecord, Session, TopicStudyEntry};

#[derive(Debug, Clone, PartialEq)]
enum Current {
    Pending(Session),
    Active(Session),
    Idle,
}

#[derive(Debug, Clone)]
pub struct SessionTracker {
    history: Vec<Session>,
    current: Current,
}

impl SessionTracker {
    pub fn new(history: Vec<Session>, now: DateTime<Utc>) -> Self {
        Self {
            history,
            current: Current::Pending(Session::begin(now)),
        }
    }

    pub fn history(&self) -> &[Session] {
        &self.history
    }

    pub fn last_archived(&self) -> Option<&Session> {
        self.history.last()
    }

    pub fn active(&self) -> Option<&Session> {
        match &self.current {
            Current::Pending(session) | Current::Active(session) => Some(session),
            Current::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current == Current::Idle
    }

    /// Opens a fresh session. A current session with topic entries is ended
    /// first and its archived copy returned; one without is discarded.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Session> {
        let has_topics = self
            .active()
            .map(|session| !session.topics_studied.is_empty())
            .unwrap_or(false);
        let archived = if has_topics { self.end(now) } else { None };

        self.current = Current::Active(Session::begin(now));
        archived
    }

    /// Appends a topic entry, auto-starting a session when idle.
    pub fn record_topic(&mut self, topic: &str, duration_minutes: i64, now: DateTime<Utc>) -> TopicStudyEntry {
        let entry = TopicStudyEntry {
            topic: topic.to_string(),
            duration_minutes,
            timestamp: now,
        };

        match &mut self.current {
            Current::Pending(session) | Current::Active(session) => {
                session.topics_studied.push(entry.clone());
            }
            Current::Idle => {
                let mut session = Session::begin(now);
                session.topics_studied.push(entry.clone());
                self.current = Current::Active(session);
            }
        }
        entry
    }

    /// Copies a score into the current session; returns false when idle.
    pub fn mirror_performance(&mut self, topic: &str, record: PerformanceRecord) -> bool {
        match &mut self.current {
            Current::Pending(session) | Current::Active(session) => {
                session
                    .performance_metrics
                    .entry(topic.to_string())
                    .or_default()
                    .push(record);
                true
            }
            Current::Idle => false,
        }
    }

    /// Closes and archives the current session. `None` when idle or when the
    /// implicit session never received anything; no state changes then.
    pub fn end(&mut self, now: DateTime<Utc>) -> Option<Session> {
        let meaningful = match &self.current {
            Current::Active(_) => true,
            Current::Pending(session) => session.has_activity(),
            Current::Idle => false,
        };
        if !meaningful {
            return None;
        }

        let session = match std::mem::replace(&mut self.current, Current::Idle) {
            Current::Pending(session) | Current::Active(session) => session,
            Current::Idle => return None,
        };
        let archived = session.close(now);
        self.history.push(archived.clone());
        Some(archived)
    }

    /// Hours spent on `topic` across archived sessions and the current one.
    pub fn study_time_hours(&self, topic: &str) -> f64 {
        let archived = self
            .history
            .iter()
            .fold(0i64, |total, s| total.saturating_add(s.minutes_on(topic)));
        let current = self.active().map(|s| s.minutes_on(topic)).unwrap_or(0);
        archived.saturating_add(current) as f64 / 60.0
    }
}

//! JSON snapshot of a learner's tracker state.
//!
//! Every save rewrites the whole document: it is written to a sibling
//! `.tmp` file first and then renamed over the target, so a crash mid-write
//! leaves the previous snapshot intact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::models::TrackerState;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> StoreResult<Option<TrackerState>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: Arc::new(source),
                })
            }
        };

        let mut state: TrackerState =
            serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source: Arc::new(source),
            })?;

        let archived = state.session_history.len();
        state.session_history.retain(|session| session.is_ended());
        let dropped = archived - state.session_history.len();
        if dropped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                dropped,
                "dropped archived sessions without end_time"
            );
        }
        state.adaptive_parameters = state.adaptive_parameters.sanitized();

        tracing::debug!(
            path = %self.path.display(),
            sessions = state.session_history.len(),
            records = state.performance_history.record_count(),
            "loaded tracker state"
        );
        Ok(Some(state))
    }

    pub fn save(&self, state: &TrackerState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: Arc::new(source),
            })?;
        }

        let payload = serde_json::to_string_pretty(state)
            .map_err(|err| StoreError::Serialize(Arc::new(err)))?;

        let temp_path = self.temp_path();
        std::fs::write(&temp_path, payload).map_err(|source| StoreError::Write {
            path: temp_path.clone(),
            source: Arc::new(source),
        })?;

        if let Err(source) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StoreError::Replace {
                path: self.path.clone(),
                source: Arc::new(source),
            });
        }

        tracing::debug!(path = %self.path.display(), "saved tracker state");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::AdaptiveUpdate;
    use crate::models::Session;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn sample_state() -> TrackerState {
        let now = Utc::now();
        let mut state = TrackerState::default();
        state.performance_history.record("AI Basics", 65.0, now);
        state
            .session_history
            .push(Session::begin(now - Duration::hours(1)).close(now));
        state
            .adaptive_parameters
            .apply(AdaptiveUpdate::default().fatigue(1.3));
        state
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("state.json");
        let store = JsonFileStore::new(&path);

        store.save(&sample_state()).unwrap();

        assert!(path.exists());
        assert!(!path.with_file_name("state.json.tmp").exists());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        let state = sample_state();

        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_malformed_document_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_open_sessions_and_out_of_range_params_are_repaired() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{
                "session_history": [
                    {"start_time": "2025-05-02T09:00:00Z"},
                    {"start_time": "2025-05-02T09:00:00Z", "end_time": "2025-05-02T10:00:00Z", "duration_hours": 1.0}
                ],
                "adaptive_parameters": {"fatigue_factor": 7.5, "interest_factor": 1.0, "retention_rate": 0.8}
            }"#,
        )
        .unwrap();

        let state = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(state.session_history.len(), 1);
        assert_eq!(state.session_history[0].duration_hours, Some(1.0));
        assert_eq!(state.adaptive_parameters.fatigue_factor, 2.0);
        assert!(state.performance_history.is_empty());
    }

    #[test]
    fn test_unwritable_location_is_a_save_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let store = JsonFileStore::new(blocker.join("state.json"));
        let err = store.save(&TrackerState::default()).unwrap_err();

        assert!(matches!(err, StoreError::CreateDir { .. }));
        assert!(err.is_save_failure());
    }
}

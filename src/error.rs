use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failures of the persisted learner state.
///
/// None of these are fatal to the tracker: loads degrade to fresh state and
/// saves leave the in-memory state authoritative.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("malformed state in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("serialize state: {0}")]
    Serialize(#[source] Arc<serde_json::Error>),

    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("replace {}: {source}", path.display())]
    Replace {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl StoreError {
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Malformed { .. })
    }

    pub fn is_save_failure(&self) -> bool {
        !self.is_load_failure()
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

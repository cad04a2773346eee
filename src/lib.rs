pub mod adaptive;
pub mod analytics;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod mastery;
pub mod models;
pub mod persistence;
pub mod priority;
pub mod session;
pub mod tracker;

pub use adaptive::{AdaptiveParameters, AdaptiveUpdate};
pub use config::TrackerConfig;
pub use error::{StoreError, StoreResult};
pub use ledger::PerformanceLedger;
pub use models::{PerformanceRecord, Session, TopicStudyEntry, TrackerState};
pub use priority::{scale_priority, PlannedTopic};
pub use tracker::{LoadOutcome, StudyTracker};

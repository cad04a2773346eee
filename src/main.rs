use serde::Serialize;

use study_tracker::analytics::{MemoryStats, TopicInsight};
use study_tracker::logging::init_tracing;
use study_tracker::{AdaptiveParameters, StudyTracker, TrackerConfig};

#[derive(Debug, Serialize)]
struct LearnerReport {
    learner_id: String,
    memory_file: String,
    stats: MemoryStats,
    adaptive_parameters: AdaptiveParameters,
    topics: Vec<TopicInsight>,
    last_session_hours: Option<f64>,
    recommended_break_minutes: Option<i64>,
}

fn main() {
    let _ = dotenvy::dotenv();
    let config = TrackerConfig::from_env();
    let _log_guard = init_tracing(&config.log_level);

    let Some(learner_id) = std::env::args().nth(1) else {
        eprintln!("usage: study-tracker <learner-id>");
        std::process::exit(2);
    };

    let tracker = StudyTracker::new(&learner_id, &config);
    tracing::info!(
        learner_id = %learner_id,
        path = %tracker.memory_file().display(),
        loaded = tracker.load_outcome().is_loaded(),
        "opened learner state"
    );

    let last_session_hours = tracker.last_session().and_then(|s| s.duration_hours);
    let report = LearnerReport {
        learner_id: tracker.learner_id().to_string(),
        memory_file: tracker.memory_file().display().to_string(),
        stats: tracker.memory_stats(),
        adaptive_parameters: *tracker.adaptive_parameters(),
        topics: tracker
            .known_topics()
            .iter()
            .map(|topic| tracker.topic_insight(topic))
            .collect(),
        last_session_hours,
        recommended_break_minutes: last_session_hours.map(|h| tracker.get_recommended_break(h)),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            tracing::error!(error = %err, "failed to render report");
            std::process::exit(1);
        }
    }
}

use thiserror::Error;

use crate::classroom::{AssignmentEvent, AssignmentStatus};

pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{student} has no assignment named {assignment}")]
    AssignmentNotFound { student: String, assignment: String },

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Score {0} is outside the 0-100 range")]
    ScoreOutOfRange(f64),

    #[error("{assignment}: cannot apply {event:?} while {from}")]
    InvalidTransition {
        assignment: String,
        from: AssignmentStatus,
        event: AssignmentEvent,
    },

    #[error("Timers need a running tokio runtime")]
    NoRuntime,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = RosterError::InvalidTransition {
            assignment: "A1".into(),
            from: AssignmentStatus::Passed,
            event: AssignmentEvent::Start,
        };
        assert_eq!(err.to_string(), "A1: cannot apply Start while passed");
    }

    #[test]
    fn not_found_display() {
        let err = RosterError::AssignmentNotFound {
            student: "Alice Smith".into(),
            assignment: "A9".into(),
        };
        assert_eq!(err.to_string(), "Alice Smith has no assignment named A9");
        assert_eq!(
            RosterError::StudentNotFound("Carol King".into()).to_string(),
            "Student not found: Carol King"
        );
    }

    #[test]
    fn score_out_of_range_display() {
        assert_eq!(
            RosterError::ScoreOutOfRange(101.0).to_string(),
            "Score 101 is outside the 0-100 range"
        );
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};
use crate::grading::{Verdict, validate_score};

/// Lifecycle of one assignment for one student.
///
/// `Released → Working → Submitted → Passed | Failed`, with `FinalReminder`
/// reachable from `Released` or `Working` and always followed by a forced
/// submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Released,
    Working,
    Submitted,
    FinalReminder,
    Passed,
    Failed,
}

impl AssignmentStatus {
    /// Token used in notifications and status queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Released => "released",
            AssignmentStatus::Working => "working",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::FinalReminder => "final reminder",
            AssignmentStatus::Passed => "passed",
            AssignmentStatus::Failed => "failed",
        }
    }

    /// Submitted or graded. Completed assignments are not outstanding and
    /// ignore further submissions.
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Submitted | AssignmentStatus::Passed | AssignmentStatus::Failed
        )
    }

    pub fn is_graded(&self) -> bool {
        matches!(self, AssignmentStatus::Passed | AssignmentStatus::Failed)
    }

    /// Status reached by applying `event`, or `None` when the lifecycle does
    /// not allow it. Grading is allowed from every status.
    pub fn next(self, event: AssignmentEvent) -> Option<AssignmentStatus> {
        use AssignmentStatus::*;
        match (self, event) {
            (_, AssignmentEvent::Grade(Verdict::Pass)) => Some(Passed),
            (_, AssignmentEvent::Grade(Verdict::Fail)) => Some(Failed),
            (Released | Working, AssignmentEvent::Start) => Some(Working),
            (Released | Working | FinalReminder, AssignmentEvent::Remind) => Some(FinalReminder),
            (Released | Working | FinalReminder, AssignmentEvent::Submit) => Some(Submitted),
            _ => None,
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happens to an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentEvent {
    Start,
    Remind,
    Submit,
    Grade(Verdict),
}

/// A named assignment, its status, and its score once graded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRecord {
    pub name: String,
    pub status: AssignmentStatus,
    pub score: Option<f64>,
    /// Every status this record has left, oldest first.
    pub status_history: Vec<AssignmentStatus>,
}

impl AssignmentRecord {
    pub fn new(name: impl Into<String>, status: AssignmentStatus) -> Self {
        Self {
            name: name.into(),
            status,
            score: None,
            status_history: Vec::new(),
        }
    }

    /// Apply a lifecycle event, recording the previous status.
    pub fn apply(&mut self, event: AssignmentEvent) -> Result<AssignmentStatus> {
        let next = self
            .status
            .next(event)
            .ok_or_else(|| RosterError::InvalidTransition {
                assignment: self.name.clone(),
                from: self.status,
                event,
            })?;
        self.status_history.push(self.status);
        self.status = next;
        Ok(next)
    }

    /// Record a score and derive `Passed`/`Failed` from it. Out-of-range
    /// scores leave the record untouched.
    pub fn set_grade(&mut self, score: f64) -> Result<AssignmentStatus> {
        let score = validate_score(score)?;
        let status = self.apply(AssignmentEvent::Grade(Verdict::from_score(score)))?;
        self.score = Some(score);
        Ok(status)
    }

    /// `Pass`/`Fail` for graded records.
    pub fn verdict(&self) -> Option<Verdict> {
        self.score.map(Verdict::from_score)
    }
}

/// Answer to "what is the status of this assignment?".
///
/// Graded assignments report `Pass`/`Fail` rather than the `passed`/`failed`
/// tokens used in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReport {
    NotAssigned,
    Graded(Verdict),
    InProgress(AssignmentStatus),
}

impl StatusReport {
    pub fn of(record: Option<&AssignmentRecord>) -> Self {
        match record {
            None => StatusReport::NotAssigned,
            Some(r) => match r.verdict() {
                Some(verdict) => StatusReport::Graded(verdict),
                None => StatusReport::InProgress(r.status),
            },
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusReport::NotAssigned => write!(f, "Hasn't been assigned"),
            StatusReport::Graded(verdict) => write!(f, "{verdict}"),
            StatusReport::InProgress(status) => write!(f, "{status}"),
        }
    }
}

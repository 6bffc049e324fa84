use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::assignment::{AssignmentRecord, AssignmentStatus, StatusReport};
use super::student::Student;
use crate::error::Result;

/// One assignment as seen in a report.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentSummary {
    pub name: String,
    pub status: AssignmentStatus,
    /// `Pass`/`Fail` once graded, otherwise the status token.
    pub label: String,
    pub score: Option<f64>,
    pub status_history: Vec<AssignmentStatus>,
}

impl AssignmentSummary {
    pub fn from_record(record: &AssignmentRecord) -> Self {
        Self {
            name: record.name.clone(),
            status: record.status,
            label: StatusReport::of(Some(record)).to_string(),
            score: record.score,
            status_history: record.status_history.clone(),
        }
    }
}

/// Snapshot of one student.
#[derive(Debug, Clone, Serialize)]
pub struct StudentReport {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub assignments: Vec<AssignmentSummary>,
    pub overall_grade: Option<f64>,
    /// Assignments not yet submitted.
    pub outstanding: Vec<String>,
}

impl StudentReport {
    pub fn from_student(student: &Student) -> Self {
        let records = student.assignments();
        Self {
            id: student.id(),
            full_name: student.full_name(),
            email: student.email(),
            outstanding: records
                .iter()
                .filter(|a| !a.status.is_completed())
                .map(|a| a.name.clone())
                .collect(),
            assignments: records.iter().map(AssignmentSummary::from_record).collect(),
            overall_grade: student.get_grade(),
        }
    }
}

/// Snapshot of a whole roster.
#[derive(Debug, Clone, Serialize)]
pub struct RosterReport {
    pub generated_at: DateTime<Utc>,
    pub students: Vec<StudentReport>,
}

impl RosterReport {
    pub fn new(students: Vec<StudentReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            students,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

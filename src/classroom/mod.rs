mod assignment;
mod report;
mod roster;
mod student;

pub use assignment::{AssignmentEvent, AssignmentRecord, AssignmentStatus, StatusReport};
pub use report::{AssignmentSummary, RosterReport, StudentReport};
pub use roster::Roster;
pub use student::{Student, StudentContext, Submission, Timing};

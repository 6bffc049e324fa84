//! Classroom roster with a per-assignment lifecycle.
//!
//! Each [`Student`] tracks assignments through
//! `released → working → submitted → passed | failed`, announcing every
//! change through a [`Notifier`]. Working and submitted assignments advance
//! on timers driven by a [`Scheduler`]. A [`Roster`] fans operations out to
//! all of its students.

pub mod classroom;
pub mod config;
pub mod error;
pub mod grading;
pub mod notifier;
pub mod scheduler;

pub use classroom::{
    AssignmentEvent, AssignmentRecord, AssignmentStatus, Roster, RosterReport, StatusReport,
    Student, StudentContext, StudentReport, Submission, Timing,
};
pub use config::RosterConfig;
pub use error::{Result, RosterError};
pub use grading::{RandomScores, ScoreSource, ScriptedScores, SeededScores, Verdict};
pub use notifier::{ConsoleNotifier, MemoryNotifier, Notifier};
pub use scheduler::{Scheduler, TimerHandle, TokioScheduler};

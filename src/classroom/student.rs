use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::assignment::{AssignmentEvent, AssignmentRecord, AssignmentStatus, StatusReport};
use crate::error::{Result, RosterError};
use crate::grading::{RandomScores, ScoreSource};
use crate::notifier::{Notifier, render_status};
use crate::scheduler::{Scheduler, TimerHandle, TokioScheduler};

/// Delays for the two timed steps of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// From starting work to automatic submission.
    pub work_delay: Duration,
    /// From submission to grading.
    pub grading_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            work_delay: Duration::from_millis(500),
            grading_delay: Duration::from_millis(500),
        }
    }
}

/// Collaborators handed to every student.
#[derive(Clone)]
pub struct StudentContext {
    pub notifier: Option<Arc<dyn Notifier>>,
    pub scheduler: Arc<dyn Scheduler>,
    pub scores: Arc<dyn ScoreSource>,
    pub timing: Timing,
}

impl StudentContext {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            notifier: None,
            scheduler,
            scores: Arc::new(RandomScores),
            timing: Timing::default(),
        }
    }

    /// Context bound to the current tokio runtime, with random scores and
    /// no notifier.
    pub fn tokio() -> Result<Self> {
        Ok(Self::new(Arc::new(TokioScheduler::current()?)))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_scores(mut self, scores: Arc<dyn ScoreSource>) -> Self {
        self.scores = scores;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

impl fmt::Debug for StudentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentContext")
            .field("notifier", &self.notifier.is_some())
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

/// Result of asking a student to submit an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The assignment is now submitted and a grading timer is running.
    Submitted,
    /// Nothing happened: the assignment was already in this status.
    AlreadyCompleted(AssignmentStatus),
}

struct PendingWork {
    id: u64,
    handle: TimerHandle,
}

struct StudentState {
    full_name: String,
    email: String,
    assignments: Vec<AssignmentRecord>,
    overall_grade: Option<f64>,
    work_timers: HashMap<String, PendingWork>,
    next_timer_id: u64,
}

impl StudentState {
    fn position(&self, name: &str) -> Option<usize> {
        self.assignments.iter().position(|a| a.name == name)
    }

    fn announce(&self, outbox: &mut Vec<String>, assignment: &str, status: AssignmentStatus) {
        outbox.push(render_status(&self.full_name, assignment, status.as_str()));
    }

    /// Index of the named assignment, creating it with `initial` status (and
    /// announcing that status) when it does not exist yet.
    fn ensure(&mut self, name: &str, initial: AssignmentStatus, outbox: &mut Vec<String>) -> usize {
        if let Some(idx) = self.position(name) {
            return idx;
        }
        debug!(student = %self.full_name, assignment = name, status = %initial, "assignment created");
        self.assignments.push(AssignmentRecord::new(name, initial));
        self.announce(outbox, name, initial);
        self.assignments.len() - 1
    }

    fn cancel_work(&mut self, name: &str) -> bool {
        match self.work_timers.remove(name) {
            Some(pending) => {
                pending.handle.cancel();
                debug!(student = %self.full_name, assignment = name, "work timer cancelled");
                true
            }
            None => false,
        }
    }

    fn recompute_grade(&mut self) -> Option<f64> {
        let scores: Vec<f64> = self.assignments.iter().filter_map(|a| a.score).collect();
        self.overall_grade = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
        self.overall_grade
    }
}

struct StudentInner {
    id: Uuid,
    ctx: StudentContext,
    state: Mutex<StudentState>,
}

/// One student and their assignments.
///
/// `Student` is a shared handle: clones refer to the same record. Timed
/// steps run on the context's scheduler and hold a clone until they fire.
#[derive(Clone)]
pub struct Student {
    inner: Arc<StudentInner>,
}

impl Student {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>, ctx: StudentContext) -> Self {
        Self {
            inner: Arc::new(StudentInner {
                id: Uuid::new_v4(),
                ctx,
                state: Mutex::new(StudentState {
                    full_name: full_name.into(),
                    email: email.into(),
                    assignments: Vec::new(),
                    overall_grade: None,
                    work_timers: HashMap::new(),
                    next_timer_id: 0,
                }),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn full_name(&self) -> String {
        self.inner.state.lock().full_name.clone()
    }

    pub fn email(&self) -> String {
        self.inner.state.lock().email.clone()
    }

    pub fn set_full_name(&self, full_name: impl Into<String>) {
        self.inner.state.lock().full_name = full_name.into();
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.inner.state.lock().email = email.into();
    }

    pub fn find_assignment(&self, name: &str) -> Option<AssignmentRecord> {
        let state = self.inner.state.lock();
        state.position(name).map(|idx| state.assignments[idx].clone())
    }

    /// Like [`Student::find_assignment`], but a missing assignment is an error.
    pub fn assignment(&self, name: &str) -> Result<AssignmentRecord> {
        let state = self.inner.state.lock();
        state
            .position(name)
            .map(|idx| state.assignments[idx].clone())
            .ok_or_else(|| RosterError::AssignmentNotFound {
                student: state.full_name.clone(),
                assignment: name.to_string(),
            })
    }

    pub fn assignments(&self) -> Vec<AssignmentRecord> {
        self.inner.state.lock().assignments.clone()
    }

    /// Number of assignments with a running work timer.
    pub fn pending_work(&self) -> usize {
        self.inner.state.lock().work_timers.len()
    }

    /// Release the assignment if it is new, then record `grade` if given.
    ///
    /// An out-of-range grade is rejected without touching the assignment;
    /// the release (and its notification) still happens.
    pub fn update_assignment_status(&self, name: &str, grade: Option<f64>) -> Result<AssignmentStatus> {
        let mut outbox = Vec::new();
        let result = {
            let mut state = self.inner.state.lock();
            let idx = state.ensure(name, AssignmentStatus::Released, &mut outbox);
            match grade {
                None => Ok(state.assignments[idx].status),
                Some(score) => match state.assignments[idx].set_grade(score) {
                    Ok(status) => {
                        state.announce(&mut outbox, name, status);
                        state.recompute_grade();
                        Ok(status)
                    }
                    Err(e) => {
                        warn!(student = %state.full_name, assignment = name, "grade ignored: {e}");
                        Err(e)
                    }
                },
            }
        };
        self.emit(outbox);
        result
    }

    pub fn get_assignment_status(&self, name: &str) -> StatusReport {
        let state = self.inner.state.lock();
        StatusReport::of(state.position(name).map(|idx| &state.assignments[idx]))
    }

    /// Move the assignment to `working` and (re)start the countdown to
    /// automatic submission. A second call before the timer fires replaces
    /// the running timer.
    pub fn start_working(&self, name: &str) -> Result<()> {
        let mut outbox = Vec::new();
        let result = {
            let mut state = self.inner.state.lock();
            let idx = state.ensure(name, AssignmentStatus::Released, &mut outbox);
            match state.assignments[idx].apply(AssignmentEvent::Start) {
                Ok(status) => {
                    state.announce(&mut outbox, name, status);
                    state.cancel_work(name);
                    self.schedule_work(&mut state, name);
                    Ok(())
                }
                Err(e) => {
                    warn!(student = %state.full_name, "{e}");
                    Err(e)
                }
            }
        };
        self.emit(outbox);
        result
    }

    /// Submit the assignment and start the grading timer. Submitting an
    /// assignment that is already submitted or graded does nothing.
    pub fn submit_assignment(&self, name: &str) -> Result<Submission> {
        let mut outbox = Vec::new();
        let result = {
            let mut state = self.inner.state.lock();
            self.submit_locked(&mut state, name, &mut outbox)
        };
        self.emit(outbox);
        result
    }

    /// Put the assignment on final reminder and force its submission.
    ///
    /// Submitted or graded assignments keep their status: the reminder is
    /// still announced but nothing is resubmitted.
    pub fn receive_reminder(&self, name: &str) -> Result<Submission> {
        let mut outbox = Vec::new();
        let result = {
            let mut state = self.inner.state.lock();
            let existed = state.position(name).is_some();
            let idx = state.ensure(name, AssignmentStatus::FinalReminder, &mut outbox);
            if existed {
                if let Err(e) = state.assignments[idx].apply(AssignmentEvent::Remind) {
                    debug!(student = %state.full_name, "reminder does not change status: {e}");
                }
                state.announce(&mut outbox, name, AssignmentStatus::FinalReminder);
            }
            self.submit_locked(&mut state, name, &mut outbox)
        };
        self.emit(outbox);
        result
    }

    /// Mean of every graded assignment, or `None` when nothing is graded.
    /// Recomputed on every call.
    pub fn get_grade(&self) -> Option<f64> {
        self.inner.state.lock().recompute_grade()
    }

    /// Overall grade as of the last recomputation.
    pub fn overall_grade(&self) -> Option<f64> {
        self.inner.state.lock().overall_grade
    }

    /// Cancel every running work timer. Grading timers are not affected.
    pub fn cancel_pending(&self) -> usize {
        let mut state = self.inner.state.lock();
        let names: Vec<String> = state.work_timers.keys().cloned().collect();
        names.iter().filter(|name| state.cancel_work(name)).count()
    }

    fn schedule_work(&self, state: &mut StudentState, name: &str) {
        let id = state.next_timer_id;
        state.next_timer_id += 1;

        let student = self.clone();
        let assignment = name.to_string();
        let handle = self.inner.ctx.scheduler.schedule(
            self.inner.ctx.timing.work_delay,
            Box::new(move || student.finish_work(&assignment, id)),
        );
        state.work_timers.insert(name.to_string(), PendingWork { id, handle });
    }

    /// Work timer callback. Ignored unless the timer is still the current
    /// one for this assignment.
    fn finish_work(&self, name: &str, id: u64) {
        let mut outbox = Vec::new();
        {
            let mut state = self.inner.state.lock();
            if state.work_timers.get(name).map(|pending| pending.id) != Some(id) {
                debug!(student = %state.full_name, assignment = name, "stale work timer ignored");
                return;
            }
            state.work_timers.remove(name);
            if let Err(e) = self.submit_locked(&mut state, name, &mut outbox) {
                warn!(student = %state.full_name, "automatic submission failed: {e}");
            }
        }
        self.emit(outbox);
    }

    fn submit_locked(
        &self,
        state: &mut StudentState,
        name: &str,
        outbox: &mut Vec<String>,
    ) -> Result<Submission> {
        let idx = state.ensure(name, AssignmentStatus::Released, outbox);
        state.cancel_work(name);

        let current = state.assignments[idx].status;
        if current.is_completed() {
            debug!(student = %state.full_name, assignment = name, status = %current, "already submitted");
            return Ok(Submission::AlreadyCompleted(current));
        }

        let status = state.assignments[idx].apply(AssignmentEvent::Submit)?;
        state.announce(outbox, name, status);

        let student = self.clone();
        let assignment = name.to_string();
        // Grading is not tracked: once submitted, it always completes.
        let _ = self.inner.ctx.scheduler.schedule(
            self.inner.ctx.timing.grading_delay,
            Box::new(move || student.grade_submission(&assignment)),
        );
        Ok(Submission::Submitted)
    }

    /// Grading timer callback.
    fn grade_submission(&self, name: &str) {
        let score = f64::from(self.inner.ctx.scores.next_score());
        let mut outbox = Vec::new();
        {
            let mut state = self.inner.state.lock();
            let Some(idx) = state.position(name) else {
                warn!(student = %state.full_name, assignment = name, "graded assignment vanished");
                return;
            };
            match state.assignments[idx].set_grade(score) {
                Ok(status) => {
                    state.announce(&mut outbox, name, status);
                    let overall = state.recompute_grade();
                    info!(student = %state.full_name, assignment = name, score, ?overall, "graded");
                }
                Err(e) => warn!(student = %state.full_name, assignment = name, "grading failed: {e}"),
            }
        }
        self.emit(outbox);
    }

    fn emit(&self, outbox: Vec<String>) {
        let Some(notifier) = &self.inner.ctx.notifier else {
            return;
        };
        for message in outbox {
            notifier.notify(&message);
        }
    }
}

impl fmt::Debug for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Student")
            .field("id", &self.inner.id)
            .field("full_name", &state.full_name)
            .field("email", &state.email)
            .field("assignments", &state.assignments)
            .field("overall_grade", &state.overall_grade)
            .finish()
    }
}

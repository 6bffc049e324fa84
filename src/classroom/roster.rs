use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::report::{RosterReport, StudentReport};
use super::student::{Student, StudentContext};
use crate::error::{Result, RosterError};

/// The students of one class and the operations that fan out to all of them.
///
/// Lookups and removal by name match every student with that name; use the
/// id-based variants when names may repeat.
#[derive(Debug)]
pub struct Roster {
    ctx: StudentContext,
    students: Vec<Student>,
}

impl Roster {
    pub fn new(ctx: StudentContext) -> Self {
        Self {
            ctx,
            students: Vec::new(),
        }
    }

    /// Collaborators given to students created through [`Roster::enroll`].
    pub fn context(&self) -> &StudentContext {
        &self.ctx
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Create a student wired to this roster's collaborators and add it.
    pub fn enroll(&mut self, full_name: impl Into<String>, email: impl Into<String>) -> Student {
        let student = Student::new(full_name, email, self.ctx.clone());
        self.add_student(student.clone());
        student
    }

    pub fn add_student(&mut self, student: Student) {
        info!(id = %student.id(), "{} has been added to the classlist.", student.full_name());
        self.students.push(student);
    }

    /// Remove every student named `full_name`, returning them.
    pub fn remove_student(&mut self, full_name: &str) -> Vec<Student> {
        let (removed, kept): (Vec<Student>, Vec<Student>) = self
            .students
            .drain(..)
            .partition(|s| s.full_name() == full_name);
        self.students = kept;
        if !removed.is_empty() {
            info!(count = removed.len(), "{full_name} has been removed from the classlist.");
        }
        removed
    }

    pub fn remove_student_by_id(&mut self, id: Uuid) -> Option<Student> {
        let idx = self.students.iter().position(|s| s.id() == id)?;
        let student = self.students.remove(idx);
        info!(%id, "{} has been removed from the classlist.", student.full_name());
        Some(student)
    }

    /// First student named `full_name`, in insertion order.
    pub fn find_student_by_name(&self, full_name: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.full_name() == full_name)
    }

    /// Like [`Roster::find_student_by_name`], but a missing student is an error.
    pub fn student(&self, full_name: &str) -> Result<&Student> {
        self.find_student_by_name(full_name)
            .ok_or_else(|| RosterError::StudentNotFound(full_name.to_string()))
    }

    pub fn find_student(&self, id: Uuid) -> Option<&Student> {
        self.students.iter().find(|s| s.id() == id)
    }

    /// Names of students with outstanding work.
    ///
    /// With an assignment name, a student is outstanding when that assignment
    /// is missing or not yet submitted. Without one, a student is outstanding
    /// when any assignment they have is not yet submitted; students with no
    /// assignments at all are not reported.
    pub fn find_outstanding_assignments(&self, assignment: Option<&str>) -> Vec<String> {
        self.students
            .iter()
            .filter(|student| match assignment {
                Some(name) => is_outstanding(student, name),
                None => student.assignments().iter().any(|a| !a.status.is_completed()),
            })
            .map(Student::full_name)
            .collect()
    }

    /// Release every named assignment to every student concurrently.
    ///
    /// Resolves once every release has happened and returns how many
    /// (student, assignment) releases ran.
    pub async fn release_assignments_parallel<S: AsRef<str>>(&self, names: &[S]) -> usize {
        let mut handles = Vec::with_capacity(names.len() * self.students.len());
        for name in names {
            for student in &self.students {
                let student = student.clone();
                let name = name.as_ref().to_string();
                handles.push(tokio::spawn(async move {
                    student.update_assignment_status(&name, None)
                }));
            }
        }

        let results = join_all(handles).await;
        let mut released = 0;
        for result in results {
            match result {
                Ok(Ok(_)) => released += 1,
                Ok(Err(e)) => warn!("release failed: {e}"),
                Err(e) => warn!("release task did not complete: {e}"),
            }
        }
        debug!(released, "parallel release finished");
        released
    }

    /// Remind every student whose assignment is missing or unsubmitted,
    /// forcing its submission. Returns the names of reminded students.
    pub fn send_reminder(&self, assignment: &str) -> Vec<String> {
        let mut reminded = Vec::new();
        for student in self.students.iter().filter(|s| is_outstanding(s, assignment)) {
            if let Err(e) = student.receive_reminder(assignment) {
                warn!(student = %student.full_name(), "reminder failed: {e}");
                continue;
            }
            reminded.push(student.full_name());
        }
        info!(assignment, count = reminded.len(), "reminders sent");
        reminded
    }

    pub fn report(&self) -> RosterReport {
        RosterReport::new(self.students.iter().map(StudentReport::from_student).collect())
    }
}

fn is_outstanding(student: &Student, assignment: &str) -> bool {
    student
        .find_assignment(assignment)
        .is_none_or(|a| !a.status.is_completed())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::classroom::AssignmentStatus;
    use crate::grading::ScriptedScores;
    use crate::notifier::MemoryNotifier;

    fn roster(notes: &Arc<MemoryNotifier>, scores: &[u8]) -> Roster {
        let ctx = StudentContext::tokio()
            .unwrap()
            .with_notifier(notes.clone())
            .with_scores(Arc::new(ScriptedScores::new(scores.to_vec())));
        Roster::new(ctx)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test]
    async fn add_find_and_remove() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[]);

        let alice = roster.enroll("Alice Smith", "alice@example.com");
        let bob = roster.enroll("Bob Jones", "bob@example.com");
        assert_eq!(roster.len(), 2);

        assert_eq!(roster.find_student_by_name("Bob Jones").unwrap().id(), bob.id());
        assert_eq!(roster.find_student(alice.id()).unwrap().email(), "alice@example.com");
        assert!(roster.find_student_by_name("Carol King").is_none());
        assert!(matches!(
            roster.student("Carol King"),
            Err(RosterError::StudentNotFound(_))
        ));
        assert_eq!(roster.student("Alice Smith").unwrap().id(), alice.id());

        let removed = roster.remove_student("Alice Smith");
        assert_eq!(removed.len(), 1);
        assert_eq!(roster.len(), 1);
        assert!(roster.find_student_by_name("Alice Smith").is_none());
        assert!(roster.remove_student("Alice Smith").is_empty());

        assert!(roster.remove_student_by_id(bob.id()).is_some());
        assert!(roster.is_empty());
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn removal_by_name_takes_every_match() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[]);

        let first = roster.enroll("Sam Lee", "sam1@example.com");
        let second = roster.enroll("Sam Lee", "sam2@example.com");
        roster.enroll("Bob Jones", "bob@example.com");

        assert_eq!(roster.find_student_by_name("Sam Lee").unwrap().id(), first.id());
        assert_eq!(roster.remove_student_by_id(first.id()).unwrap().id(), first.id());
        assert_eq!(roster.find_student_by_name("Sam Lee").unwrap().id(), second.id());

        roster.enroll("Sam Lee", "sam3@example.com");
        assert_eq!(roster.remove_student("Sam Lee").len(), 2);
        assert_eq!(roster.len(), 1);
    }

    #[tokio::test]
    async fn outstanding_for_named_assignment_counts_missing() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[]);
        roster.enroll("Xavier Diaz", "x@example.com");
        let yara = roster.enroll("Yara Khan", "y@example.com");

        yara.submit_assignment("A1").unwrap();

        assert_eq!(roster.find_outstanding_assignments(Some("A1")), vec!["Xavier Diaz"]);
    }

    #[tokio::test]
    async fn outstanding_without_name_skips_students_with_nothing() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[]);
        roster.enroll("Xavier Diaz", "x@example.com");
        let yara = roster.enroll("Yara Khan", "y@example.com");

        yara.start_working("A1").unwrap();

        assert_eq!(roster.find_outstanding_assignments(None), vec!["Yara Khan"]);
        assert_eq!(
            roster.find_outstanding_assignments(Some("A1")),
            vec!["Xavier Diaz", "Yara Khan"]
        );
    }

    #[tokio::test]
    async fn parallel_release_reaches_everyone() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[]);
        let alice = roster.enroll("Alice Smith", "alice@example.com");
        let bob = roster.enroll("Bob Jones", "bob@example.com");

        let released = roster.release_assignments_parallel(&["A1", "A2"]).await;
        assert_eq!(released, 4);
        assert_eq!(notes.len(), 4);
        for message in [
            "Alice Smith, A1 has been released.",
            "Alice Smith, A2 has been released.",
            "Bob Jones, A1 has been released.",
            "Bob Jones, A2 has been released.",
        ] {
            assert_eq!(notes.count(message), 1, "{message}");
        }

        for student in [&alice, &bob] {
            assert_eq!(student.assignments().len(), 2);
            assert_eq!(student.get_assignment_status("A2").to_string(), "released");
        }

        assert_eq!(roster.release_assignments_parallel(&["A1"]).await, 2);
        assert_eq!(notes.len(), 4);
    }

    #[tokio::test]
    async fn parallel_release_on_empty_roster() {
        let notes = Arc::new(MemoryNotifier::new());
        let roster = roster(&notes, &[]);
        assert_eq!(roster.release_assignments_parallel(&["A1"]).await, 0);
        let none: [&str; 0] = [];
        assert_eq!(roster.release_assignments_parallel(&none).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reminder_sweep_skips_completed() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[70, 30]);
        let alice = roster.enroll("Alice Smith", "alice@example.com");
        let bob = roster.enroll("Bob Jones", "bob@example.com");
        let carol = roster.enroll("Carol King", "carol@example.com");

        alice.update_assignment_status("A1", Some(95.0)).unwrap();
        bob.start_working("A1").unwrap();

        let reminded = roster.send_reminder("A1");
        assert_eq!(reminded, vec!["Bob Jones", "Carol King"]);
        assert_eq!(notes.count("Alice Smith, final reminder for A1."), 0);
        assert_eq!(bob.pending_work(), 0);
        assert_eq!(carol.get_assignment_status("A1").to_string(), "submitted");

        advance(600).await;
        let mut scores: Vec<f64> = [&bob, &carol]
            .iter()
            .filter_map(|s| s.find_assignment("A1").and_then(|a| a.score))
            .collect();
        scores.sort_by(f64::total_cmp);
        assert_eq!(scores, vec![30.0, 70.0]);
        assert_eq!(alice.find_assignment("A1").unwrap().status, AssignmentStatus::Passed);
        assert!(roster.find_outstanding_assignments(Some("A1")).is_empty());
        assert!(roster.send_reminder("A1").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn classroom_session_end_to_end() {
        let notes = Arc::new(MemoryNotifier::new());
        let mut roster = roster(&notes, &[81, 42, 66, 12]);
        let alice = roster.enroll("Alice Smith", "alice@example.com");
        let bob = roster.enroll("Bob Jones", "bob@example.com");

        roster.release_assignments_parallel(&["A1", "A2"]).await;
        alice.start_working("A1").unwrap();
        bob.start_working("A2").unwrap();

        advance(200).await;
        let reminded = roster.send_reminder("A1");
        assert_eq!(reminded, vec!["Alice Smith", "Bob Jones"]);

        advance(2_000).await;
        assert!(roster.find_outstanding_assignments(Some("A1")).is_empty());
        assert_eq!(roster.find_outstanding_assignments(None), vec!["Alice Smith"]);
        assert_eq!(alice.get_assignment_status("A2").to_string(), "released");

        let report = roster.report();
        assert_eq!(report.students.len(), 2);
        assert!(report.students.iter().all(|s| s.overall_grade.is_some()));
        assert_eq!(bob.assignments().iter().filter(|a| a.score.is_some()).count(), 2);
        assert_eq!(alice.assignments().iter().filter(|a| a.score.is_some()).count(), 1);
    }
}

//! Status-change notifications.
//!
//! Students render one sentence per status change and hand it to a
//! [`Notifier`]. Delivery is fire-and-forget; a notifier cannot report
//! failure back to the student.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Sink for rendered status messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Prints every message to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("Observer --> {message}");
    }
}

/// A message captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Keeps every message in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.message.clone()).collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Number of recorded messages equal to `message`.
    pub fn count(&self, message: &str) -> usize {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.message == message)
            .count()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.notices.lock().push(Notice {
            at: Utc::now(),
            message: message.to_string(),
        });
    }
}

/// Render the sentence announcing that `assignment` moved to the status
/// named by `token`. Unknown tokens get a generic sentence.
pub fn render_status(student: &str, assignment: &str, token: &str) -> String {
    match token {
        "released" => format!("{student}, {assignment} has been released."),
        "working" => format!("{student} is working on {assignment}."),
        "submitted" => format!("{student} has submitted {assignment}."),
        "passed" => format!("{student} has passed {assignment}"),
        "failed" => format!("{student} has failed {assignment}"),
        "final reminder" => format!("{student}, final reminder for {assignment}."),
        other => format!("{student}, {assignment} status is now {other}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_known_tokens() {
        assert_eq!(
            render_status("Alice Smith", "A1", "released"),
            "Alice Smith, A1 has been released."
        );
        assert_eq!(
            render_status("Alice Smith", "A1", "working"),
            "Alice Smith is working on A1."
        );
        assert_eq!(
            render_status("Alice Smith", "A1", "submitted"),
            "Alice Smith has submitted A1."
        );
        assert_eq!(
            render_status("Alice Smith", "A1", "passed"),
            "Alice Smith has passed A1"
        );
        assert_eq!(
            render_status("Alice Smith", "A1", "failed"),
            "Alice Smith has failed A1"
        );
        assert_eq!(
            render_status("Alice Smith", "A1", "final reminder"),
            "Alice Smith, final reminder for A1."
        );
    }

    #[test]
    fn unknown_token_falls_back() {
        assert_eq!(
            render_status("Bob Jones", "A2", "archived"),
            "Bob Jones, A2 status is now archived."
        );
    }

    #[test]
    fn memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        assert!(notifier.is_empty());

        notifier.notify("first");
        notifier.notify("second");
        notifier.notify("first");

        assert_eq!(notifier.len(), 3);
        assert_eq!(notifier.messages(), vec!["first", "second", "first"]);
        assert_eq!(notifier.count("first"), 2);

        let notices = notifier.notices();
        assert!(notices[0].at <= notices[2].at);

        notifier.clear();
        assert!(notifier.is_empty());
    }
}

mod cli;
mod ui;

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, StudentArg};
use roster::{RandomScores, Roster, RosterConfig, ScoreSource, SeededScores, StudentContext};
use ui::SessionProgress;

/// Who starts which assignment once everything is released.
enum WorkPlan {
    /// The n-th student works on the n-th assignment (wrapping around).
    RoundRobin,
    /// Every student works on every assignment.
    Everything,
}

struct Session {
    students: Vec<StudentArg>,
    assignments: Vec<String>,
    plan: WorkPlan,
    /// Assignments swept for reminders.
    remind: Vec<String>,
}

impl Session {
    fn demo() -> Self {
        Self {
            students: vec![
                StudentArg {
                    full_name: "Alice Smith".into(),
                    email: "alice@example.com".into(),
                },
                StudentArg {
                    full_name: "Bob Jones".into(),
                    email: "bob@example.com".into(),
                },
            ],
            assignments: vec!["A1".into(), "A2".into()],
            plan: WorkPlan::RoundRobin,
            remind: vec!["A1".into()],
        }
    }

    fn custom(students: Vec<StudentArg>, assignments: Vec<String>) -> Self {
        Self {
            remind: assignments.clone(),
            students,
            assignments,
            plan: WorkPlan::Everything,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = RosterConfig::load()?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(ms) = cli.work_delay_ms {
        config.work_delay_ms = ms;
    }
    config.validate()?;

    let session = match cli.command {
        Command::Demo => Session::demo(),
        Command::Run {
            students,
            assignments,
        } => Session::custom(students, assignments),
    };

    run_session(session, &config, cli.json).await
}

async fn run_session(session: Session, config: &RosterConfig, json: bool) -> Result<()> {
    if session.assignments.is_empty() {
        bail!("No assignments to release");
    }

    let progress = Arc::new(SessionProgress::new());
    let scores: Arc<dyn ScoreSource> = match config.seed {
        Some(seed) => Arc::new(SeededScores::new(seed)),
        None => Arc::new(RandomScores),
    };
    let ctx = StudentContext::tokio()?
        .with_notifier(progress.clone())
        .with_scores(scores)
        .with_timing(config.timing());

    let mut roster = Roster::new(ctx);
    for student in session.students {
        roster.enroll(student.full_name, student.email);
    }

    roster
        .release_assignments_parallel(session.assignments.as_slice())
        .await;

    for (i, student) in roster.students().iter().enumerate() {
        let picks: Vec<&String> = match session.plan {
            WorkPlan::RoundRobin => vec![&session.assignments[i % session.assignments.len()]],
            WorkPlan::Everything => session.assignments.iter().collect(),
        };
        for assignment in picks {
            student.start_working(assignment)?;
        }
    }

    sleep(std::time::Duration::from_millis(config.reminder_after_ms)).await;
    for assignment in &session.remind {
        roster.send_reminder(assignment);
    }

    progress.waiting("Waiting for grading...");
    sleep(config.settle_time()).await;
    progress.finish();

    let outstanding = roster.find_outstanding_assignments(None);
    if !outstanding.is_empty() {
        tracing::info!("Students with outstanding work: {}", outstanding.join(", "));
    }

    let report = roster.report();
    if json {
        ui::print_json(&report)?;
    } else {
        ui::print_report(&report);
    }
    Ok(())
}

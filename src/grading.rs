//! Score sources and the pass/fail rule.
//!
//! Grading is a placeholder: a submitted assignment receives a uniformly
//! random whole score in `0..=100`. The [`ScoreSource`] trait lets callers
//! swap in a seeded or scripted source when they need reproducible runs.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

/// Scores strictly above this value pass.
pub const PASS_THRESHOLD: f64 = 50.0;

/// Highest score a source may produce or a caller may record.
pub const MAX_SCORE: f64 = 100.0;

/// Outcome of applying the pass/fail rule to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score > PASS_THRESHOLD {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Pass"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

/// Reject scores that are not finite or fall outside `0..=100`.
pub fn validate_score(score: f64) -> Result<f64> {
    if score.is_finite() && (0.0..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(RosterError::ScoreOutOfRange(score))
    }
}

/// Produces whole scores in `0..=100`, both ends inclusive.
pub trait ScoreSource: Send + Sync {
    fn next_score(&self) -> u8;
}

/// Uniform scores from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomScores;

impl ScoreSource for RandomScores {
    fn next_score(&self) -> u8 {
        rand::thread_rng().gen_range(0..=100)
    }
}

/// Uniform scores from a seeded generator, reproducible across runs.
pub struct SeededScores {
    rng: Mutex<StdRng>,
}

impl SeededScores {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ScoreSource for SeededScores {
    fn next_score(&self) -> u8 {
        self.rng.lock().gen_range(0..=100)
    }
}

/// Replays a fixed list of scores, starting over once it runs out.
pub struct ScriptedScores {
    queue: Mutex<VecDeque<u8>>,
}

impl ScriptedScores {
    /// Values above 100 are clamped. An empty script always yields 0.
    pub fn new(scores: impl IntoIterator<Item = u8>) -> Self {
        Self {
            queue: Mutex::new(scores.into_iter().map(|s| s.min(100)).collect()),
        }
    }
}

impl ScoreSource for ScriptedScores {
    fn next_score(&self) -> u8 {
        let mut queue = self.queue.lock();
        match queue.pop_front() {
            Some(score) => {
                queue.push_back(score);
                score
            }
            None => 0,
        }
    }
}

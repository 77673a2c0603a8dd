use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::quiz::QuizSummary;

/// Quizzes answered correctly in one browser session's random play.
///
/// The score is always the number of answered ids; it only goes down through
/// [`RandomPlaySession::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomPlaySession {
    #[serde(default)]
    answered_ids: BTreeSet<String>,
}

impl RandomPlaySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> usize {
        self.answered_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answered_ids.is_empty()
    }

    pub fn answered_ids(&self) -> &BTreeSet<String> {
        &self.answered_ids
    }

    /// Returns false when the quiz had already been answered.
    pub fn record_correct(&mut self, quiz_id: &str) -> bool {
        self.answered_ids.insert(quiz_id.to_string())
    }

    pub fn reset(&mut self) {
        self.answered_ids.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub correct: bool,
    pub score: usize,
}

#[derive(Debug, Serialize)]
pub struct RandomPlayView {
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizSummary>,
    pub score: usize,
}

#[derive(Debug, Serialize)]
pub struct RandomCheckView {
    pub result: bool,
    pub answer: String,
    pub score: usize,
}

use rand::Rng;
use std::sync::Arc;

use crate::metrics::{record_answer_checked, RANDOM_PLAY_FINISHED_TOTAL};
use crate::models::{
    quiz::QuizSummary,
    random_play::{RandomCheckView, RandomPlayView, SubmitOutcome},
    Quiz, RandomPlaySession,
};
use crate::services::{AppState, ServiceError, ServiceResult};
use crate::storage::{PlaySessionStore, QuizStore, StoreError, StoreResult};

/// Source of the random offset into the remaining quizzes.
pub trait OffsetPicker: Send + Sync {
    /// Returns an offset in `[0, count)`. Only called with `count > 0`.
    fn pick(&self, count: u64) -> u64;
}

pub struct ThreadRngOffsetPicker;

impl OffsetPicker for ThreadRngOffsetPicker {
    fn pick(&self, count: u64) -> u64 {
        rand::rng().random_range(0..count)
    }
}

/// Picks a quiz the session has not answered yet, or `None` once every quiz
/// has been answered.
pub async fn next_quiz(
    session: &RandomPlaySession,
    store: &dyn QuizStore,
    offsets: &dyn OffsetPicker,
) -> StoreResult<Option<Quiz>> {
    let exclude = session.answered_ids();
    let remaining = store.count_excluding(exclude).await?;
    if remaining == 0 {
        return Ok(None);
    }

    // A picker returning an out-of-range offset still lands on the last quiz
    let offset = offsets.pick(remaining).min(remaining - 1);
    match store.sample_excluding(exclude, offset).await? {
        Some(quiz) => Ok(Some(quiz)),
        // Quizzes were deleted between count and sample
        None => Err(StoreError::Inconsistent(format!(
            "no quiz at offset {} of {} remaining",
            offset, remaining
        ))),
    }
}

/// Checks `provided` against the quiz. A correct answer records the quiz,
/// a wrong one wipes the whole session.
pub fn submit_answer(session: &mut RandomPlaySession, quiz: &Quiz, provided: &str) -> SubmitOutcome {
    if quiz.accepts(provided) {
        // Answering the same quiz twice leaves the score unchanged
        session.record_correct(&quiz.id);
        SubmitOutcome {
            correct: true,
            score: session.score(),
        }
    } else {
        session.reset();
        SubmitOutcome {
            correct: false,
            score: 0,
        }
    }
}

pub struct RandomPlayService {
    quizzes: Arc<dyn QuizStore>,
    sessions: Arc<dyn PlaySessionStore>,
    offsets: Arc<dyn OffsetPicker>,
}

impl RandomPlayService {
    pub fn new(state: &AppState) -> Self {
        Self {
            quizzes: state.quizzes.clone(),
            sessions: state.play_sessions.clone(),
            offsets: state.offsets.clone(),
        }
    }

    pub async fn play(&self, session_key: &str) -> ServiceResult<RandomPlayView> {
        let session = self.sessions.load(session_key).await?;

        match next_quiz(&session, self.quizzes.as_ref(), self.offsets.as_ref()).await? {
            Some(quiz) => {
                // Persist so a fresh cookie has a session behind it.
                self.sessions.save(session_key, &session).await?;
                Ok(RandomPlayView {
                    finished: false,
                    quiz: Some(QuizSummary::from_quiz(&quiz, None)),
                    score: session.score(),
                })
            }
            None => {
                let score = session.score();
                self.sessions.clear(session_key).await?;
                RANDOM_PLAY_FINISHED_TOTAL
                    .with_label_values(&["exhausted"])
                    .inc();
                tracing::info!(score, "Random play finished: no quizzes left");
                Ok(RandomPlayView {
                    finished: true,
                    quiz: None,
                    score,
                })
            }
        }
    }

    pub async fn check(
        &self,
        session_key: &str,
        quiz_id: &str,
        answer: &str,
    ) -> ServiceResult<RandomCheckView> {
        let quiz = self
            .quizzes
            .find(quiz_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("There is no quiz with id={}.", quiz_id)))?;

        let mut session = self.sessions.load(session_key).await?;
        let outcome = submit_answer(&mut session, &quiz, answer);
        record_answer_checked("random", outcome.correct);

        if outcome.correct {
            self.sessions.save(session_key, &session).await?;
        } else {
            self.sessions.clear(session_key).await?;
            RANDOM_PLAY_FINISHED_TOTAL
                .with_label_values(&["wrong_answer"])
                .inc();
            tracing::debug!(quiz_id = %quiz.id, "Wrong answer, random play session reset");
        }

        Ok(RandomCheckView {
            result: outcome.correct,
            answer: answer.to_string(),
            score: outcome.score,
        })
    }
}

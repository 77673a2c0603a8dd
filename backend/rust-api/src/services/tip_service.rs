use std::sync::Arc;
use validator::Validate;

use crate::metrics::TIPS_CREATED_TOTAL;
use crate::middlewares::auth::JwtClaims;
use crate::models::{
    field_errors,
    quiz::QuizSummary,
    tip::{EditableTip, TipView},
    Quiz, Tip, TipForm,
};
use crate::services::{authorization::ensure_admin_or_author, AppState, ServiceError, ServiceResult};
use crate::storage::{QuizStore, TipStore};

pub struct TipService {
    quizzes: Arc<dyn QuizStore>,
    tips: Arc<dyn TipStore>,
}

impl TipService {
    pub fn new(state: &AppState) -> Self {
        Self {
            quizzes: state.quizzes.clone(),
            tips: state.tips.clone(),
        }
    }

    pub async fn create(
        &self,
        claims: &JwtClaims,
        quiz_id: &str,
        form: &TipForm,
    ) -> ServiceResult<Tip> {
        let quiz = self.load_quiz(quiz_id).await?;
        let form = validated(form)?;

        let tip = Tip::new(quiz.id, claims.sub.clone(), form.text);
        self.tips.insert(&tip).await?;

        TIPS_CREATED_TOTAL.with_label_values(&["api"]).inc();
        tracing::info!(tip_id = %tip.id, quiz_id = %tip.quiz_id, "Tip created");
        Ok(tip)
    }

    /// Edit form for a tip; only its author or an admin may open it.
    pub async fn edit(
        &self,
        claims: &JwtClaims,
        quiz_id: &str,
        tip_id: &str,
    ) -> ServiceResult<EditableTip> {
        let (quiz, tip) = self.load_pair(quiz_id, tip_id).await?;
        ensure_admin_or_author(claims, &tip.author_id, "tip")?;

        Ok(EditableTip {
            tip: TipView::from_tip(&tip, None),
            quiz: QuizSummary::from_quiz(&quiz, None),
        })
    }

    /// Replaces the text. An edited tip has to be accepted again.
    pub async fn update(
        &self,
        claims: &JwtClaims,
        quiz_id: &str,
        tip_id: &str,
        form: &TipForm,
    ) -> ServiceResult<Tip> {
        let (_, mut tip) = self.load_pair(quiz_id, tip_id).await?;
        ensure_admin_or_author(claims, &tip.author_id, "tip")?;
        let form = validated(form)?;

        tip.text = form.text;
        tip.accepted = false;
        tip.updated_at = chrono::Utc::now();
        self.save(&tip).await?;

        tracing::info!(tip_id = %tip.id, editor = %claims.sub, "Tip edited");
        Ok(tip)
    }

    /// Accepting is up to the quiz author, not the tip author.
    pub async fn accept(&self, claims: &JwtClaims, quiz_id: &str, tip_id: &str) -> ServiceResult<Tip> {
        let (quiz, mut tip) = self.load_pair(quiz_id, tip_id).await?;
        ensure_admin_or_author(claims, &quiz.author_id, "quiz")?;

        tip.accepted = true;
        tip.updated_at = chrono::Utc::now();
        self.save(&tip).await?;

        tracing::info!(tip_id = %tip.id, quiz_id = %quiz.id, "Tip accepted");
        Ok(tip)
    }

    pub async fn delete(&self, claims: &JwtClaims, quiz_id: &str, tip_id: &str) -> ServiceResult<()> {
        let (quiz, tip) = self.load_pair(quiz_id, tip_id).await?;
        ensure_admin_or_author(claims, &quiz.author_id, "quiz")?;

        self.tips.delete(&tip.id).await?;
        tracing::info!(tip_id = %tip.id, quiz_id = %quiz.id, "Tip deleted");
        Ok(())
    }

    async fn load_quiz(&self, quiz_id: &str) -> ServiceResult<Quiz> {
        self.quizzes
            .find(quiz_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("There is no quiz with id={}.", quiz_id)))
    }

    /// A tip is only addressable through the quiz it belongs to.
    async fn load_pair(&self, quiz_id: &str, tip_id: &str) -> ServiceResult<(Quiz, Tip)> {
        let quiz = self.load_quiz(quiz_id).await?;
        let tip = self
            .tips
            .find(tip_id)
            .await?
            .filter(|tip| tip.quiz_id == quiz.id)
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "There is no tip with id={} for quiz id={}.",
                    tip_id, quiz_id
                ))
            })?;
        Ok((quiz, tip))
    }

    async fn save(&self, tip: &Tip) -> ServiceResult<()> {
        if self.tips.update(tip).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(format!("There is no tip with id={}.", tip.id)))
        }
    }
}

fn validated(form: &TipForm) -> ServiceResult<TipForm> {
    let form = form.trimmed();
    form.validate()
        .map_err(|errors| ServiceError::Validation(field_errors(&errors)))?;
    Ok(form)
}

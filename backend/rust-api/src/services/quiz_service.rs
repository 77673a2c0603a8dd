use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use validator::Validate;

use crate::metrics::{record_answer_checked, QUIZZES_CREATED_TOTAL};
use crate::middlewares::auth::JwtClaims;
use crate::models::{
    field_errors,
    pagination::parse_page_number,
    quiz::{CheckView, EditableQuiz, PlayView, QuizDetail, QuizIndex, QuizSummary},
    tip::TipView,
    AuthorView, Page, Quiz, QuizFilter, QuizForm,
};
use crate::services::{authorization::ensure_admin_or_author, AppState, ServiceError, ServiceResult};
use crate::storage::{QuizStore, TipStore, UserStore};

pub struct QuizService {
    quizzes: Arc<dyn QuizStore>,
    tips: Arc<dyn TipStore>,
    users: Arc<dyn UserStore>,
    per_page: u64,
}

impl QuizService {
    pub fn new(state: &AppState) -> Self {
        Self {
            quizzes: state.quizzes.clone(),
            tips: state.tips.clone(),
            users: state.users.clone(),
            per_page: state.config.quizzes_per_page,
        }
    }

    /// All quizzes, optionally filtered by `search`.
    pub async fn index(&self, search: Option<String>, pageno: Option<&str>) -> ServiceResult<QuizIndex> {
        let filter = QuizFilter {
            search,
            author_id: None,
        };
        self.paginate("Questions".to_string(), filter, pageno).await
    }

    /// Quizzes written by one user. Unknown users are a 404.
    pub async fn index_for_user(
        &self,
        user_id: &str,
        search: Option<String>,
        pageno: Option<&str>,
    ) -> ServiceResult<QuizIndex> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("There is no user with id={}.", user_id)))?;

        let filter = QuizFilter {
            search,
            author_id: Some(user.id.clone()),
        };
        self.paginate(format!("Questions of {}", user.username), filter, pageno)
            .await
    }

    async fn paginate(
        &self,
        title: String,
        filter: QuizFilter,
        pageno: Option<&str>,
    ) -> ServiceResult<QuizIndex> {
        let total = self.quizzes.count(&filter).await?;
        let page = Page::new(parse_page_number(pageno), self.per_page, total);
        let quizzes = self
            .quizzes
            .list(&filter, page.offset(), page.per_page)
            .await?;

        let authors = self
            .authors(quizzes.iter().map(|quiz| quiz.author_id.as_str()))
            .await?;
        let quizzes = quizzes
            .iter()
            .map(|quiz| QuizSummary::from_quiz(quiz, authors.get(&quiz.author_id).cloned()))
            .collect();

        Ok(QuizIndex {
            title,
            search: filter.search.unwrap_or_default(),
            quizzes,
            pagination: page,
        })
    }

    pub async fn show(&self, quiz_id: &str) -> ServiceResult<QuizDetail> {
        let quiz = self.load(quiz_id).await?;
        let tips = self.tips.list_for_quiz(&quiz.id).await?;

        let authors = self
            .authors(
                std::iter::once(quiz.author_id.as_str())
                    .chain(tips.iter().map(|tip| tip.author_id.as_str())),
            )
            .await?;

        let tips = tips
            .iter()
            .map(|tip| TipView::from_tip(tip, authors.get(&tip.author_id).cloned()))
            .collect();

        Ok(QuizDetail {
            id: quiz.id.clone(),
            question: quiz.question.clone(),
            author: authors.get(&quiz.author_id).cloned(),
            tips,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        })
    }

    /// Loads a quiz or fails with a 404.
    pub async fn load(&self, quiz_id: &str) -> ServiceResult<Quiz> {
        self.quizzes
            .find(quiz_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("There is no quiz with id={}.", quiz_id)))
    }

    pub fn new_form(&self) -> QuizForm {
        QuizForm::default()
    }

    pub async fn create(&self, claims: &JwtClaims, form: &QuizForm) -> ServiceResult<Quiz> {
        let form = validated(form)?;
        let quiz = Quiz::new(form.question, form.answer, claims.sub.clone());
        self.quizzes.insert(&quiz).await?;

        QUIZZES_CREATED_TOTAL.with_label_values(&["api"]).inc();
        tracing::info!(quiz_id = %quiz.id, author_id = %quiz.author_id, "Quiz created");
        Ok(quiz)
    }

    pub async fn edit(&self, claims: &JwtClaims, quiz_id: &str) -> ServiceResult<EditableQuiz> {
        let quiz = self.load(quiz_id).await?;
        ensure_admin_or_author(claims, &quiz.author_id, "quiz")?;
        Ok(EditableQuiz::from(&quiz))
    }

    pub async fn update(
        &self,
        claims: &JwtClaims,
        quiz_id: &str,
        form: &QuizForm,
    ) -> ServiceResult<Quiz> {
        let mut quiz = self.load(quiz_id).await?;
        ensure_admin_or_author(claims, &quiz.author_id, "quiz")?;
        let form = validated(form)?;

        quiz.question = form.question;
        quiz.answer = form.answer;
        quiz.updated_at = chrono::Utc::now();

        if !self.quizzes.update(&quiz).await? {
            return Err(ServiceError::not_found(format!(
                "There is no quiz with id={}.",
                quiz_id
            )));
        }
        tracing::info!(quiz_id = %quiz.id, editor = %claims.sub, "Quiz edited");
        Ok(quiz)
    }

    /// Deletes the quiz together with its tips.
    pub async fn delete(&self, claims: &JwtClaims, quiz_id: &str) -> ServiceResult<()> {
        let quiz = self.load(quiz_id).await?;
        ensure_admin_or_author(claims, &quiz.author_id, "quiz")?;

        let removed_tips = self.tips.delete_for_quiz(&quiz.id).await?;
        self.quizzes.delete(&quiz.id).await?;

        tracing::info!(quiz_id = %quiz.id, removed_tips, "Quiz deleted");
        Ok(())
    }

    pub async fn play(&self, quiz_id: &str, answer: Option<String>) -> ServiceResult<PlayView> {
        let quiz = self.load(quiz_id).await?;
        Ok(PlayView {
            quiz: QuizSummary::from_quiz(&quiz, None),
            answer: answer.unwrap_or_default(),
        })
    }

    pub async fn check(&self, quiz_id: &str, answer: Option<String>) -> ServiceResult<CheckView> {
        let quiz = self.load(quiz_id).await?;
        let answer = answer.unwrap_or_default();
        let result = quiz.accepts(&answer);
        record_answer_checked("direct", result);

        Ok(CheckView {
            quiz: QuizSummary::from_quiz(&quiz, None),
            result,
            answer,
        })
    }

    async fn authors<'a>(
        &self,
        ids: impl Iterator<Item = &'a str>,
    ) -> ServiceResult<HashMap<String, AuthorView>> {
        let ids: Vec<String> = ids
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.users.find_users(&ids).await?;
        Ok(users
            .iter()
            .map(|user| (user.id.clone(), AuthorView::from(user)))
            .collect())
    }
}

fn validated(form: &QuizForm) -> ServiceResult<QuizForm> {
    let form = form.trimmed();
    form.validate()
        .map_err(|errors| ServiceError::Validation(field_errors(&errors)))?;
    Ok(form)
}

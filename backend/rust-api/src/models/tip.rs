use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{bson_datetime_as_chrono, quiz::QuizSummary, AuthorView};

/// Hint attached to a quiz, stored in the "tips" collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tip {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub text: String,
    /// Set by the quiz author; any edit of the text clears it again.
    #[serde(default)]
    pub accepted: bool,
    #[serde(rename = "createdAt", with = "bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
}

impl Tip {
    pub fn new(quiz_id: String, author_id: String, text: String) -> Self {
        let now = Utc::now();
        Tip {
            id: super::new_id(),
            quiz_id,
            author_id,
            text,
            accepted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TipForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Tip text must not be empty."))]
    pub text: String,
}

impl TipForm {
    pub fn trimmed(&self) -> TipForm {
        TipForm {
            text: self.text.trim().to_string(),
        }
    }
}

/// Tip edit form together with the quiz it belongs to.
#[derive(Debug, Serialize)]
pub struct EditableTip {
    pub tip: TipView,
    pub quiz: QuizSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TipView {
    pub id: String,
    pub quiz_id: String,
    pub text: String,
    pub accepted: bool,
    pub author: Option<AuthorView>,
}

impl TipView {
    pub fn from_tip(tip: &Tip, author: Option<AuthorView>) -> Self {
        TipView {
            id: tip.id.clone(),
            quiz_id: tip.quiz_id.clone(),
            text: tip.text.clone(),
            accepted: tip.accepted,
            author,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{bson_datetime_as_chrono, tip::TipView, AuthorView};

/// Quiz stored in the "quizzes" collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quiz {
    #[serde(rename = "_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    #[serde(rename = "createdAt", with = "bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(question: String, answer: String, author_id: String) -> Self {
        let now = Utc::now();
        Quiz {
            id: super::new_id(),
            question,
            answer,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case and surrounding-whitespace insensitive answer check.
    pub fn accepts(&self, provided: &str) -> bool {
        normalize_answer(provided) == normalize_answer(&self.answer)
    }
}

pub fn normalize_answer(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Body of create/update requests; also echoed back when validation fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuizForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Question must not be empty."))]
    pub question: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Answer must not be empty."))]
    pub answer: String,
}

impl QuizForm {
    pub fn trimmed(&self) -> QuizForm {
        QuizForm {
            question: self.question.trim().to_string(),
            answer: self.answer.trim().to_string(),
        }
    }
}

/// Filter shared by the quiz index and the per-author index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizFilter {
    pub search: Option<String>,
    pub author_id: Option<String>,
}

impl QuizFilter {
    /// Case-insensitive regex equivalent of `LIKE '%word1%word2%'`: runs of
    /// spaces in the search text become wildcards.
    pub fn search_pattern(&self) -> Option<String> {
        let search = self.search.as_deref()?;
        let words: Vec<String> = search
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(regex::escape)
            .collect();
        if words.is_empty() {
            return None;
        }
        Some(words.join(".*"))
    }

    pub fn matches(&self, quiz: &Quiz) -> bool {
        if let Some(author_id) = &self.author_id {
            if &quiz.author_id != author_id {
                return false;
            }
        }
        match self.search_pattern() {
            Some(pattern) => regex::RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(&quiz.question))
                .unwrap_or(false),
            None => true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizIndexQuery {
    pub search: Option<String>,
    pub pageno: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnswerQuery {
    pub answer: Option<String>,
}

/// Quiz as listed and played: never carries the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorView>,
}

impl QuizSummary {
    pub fn from_quiz(quiz: &Quiz, author: Option<AuthorView>) -> Self {
        QuizSummary {
            id: quiz.id.clone(),
            question: quiz.question.clone(),
            author,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuizDetail {
    pub id: String,
    pub question: String,
    pub author: Option<AuthorView>,
    pub tips: Vec<TipView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quiz as shown to its author or an admin for editing.
#[derive(Debug, Serialize)]
pub struct EditableQuiz {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub author_id: String,
}

impl From<&Quiz> for EditableQuiz {
    fn from(quiz: &Quiz) -> Self {
        EditableQuiz {
            id: quiz.id.clone(),
            question: quiz.question.clone(),
            answer: quiz.answer.clone(),
            author_id: quiz.author_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayView {
    pub quiz: QuizSummary,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct CheckView {
    pub quiz: QuizSummary,
    pub result: bool,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct QuizIndex {
    pub title: String,
    pub search: String,
    pub quizzes: Vec<QuizSummary>,
    pub pagination: super::Page,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(question: &str, answer: &str, author: &str) -> Quiz {
        Quiz::new(question.to_string(), answer.to_string(), author.to_string())
    }

    #[test]
    fn answers_compare_trimmed_and_lowercased() {
        let paris = quiz("Capital of France", "Paris", "u1");
        assert!(paris.accepts(" paris "));
        assert!(paris.accepts("PARIS"));
        assert!(!paris.accepts("Lyon"));
        assert!(!paris.accepts(""));
    }

    #[test]
    fn stored_answer_whitespace_is_ignored() {
        let four = quiz("2+2", "  4\n", "u1");
        assert!(four.accepts("4"));
    }

    #[test]
    fn search_pattern_turns_spaces_into_wildcards() {
        let filter = QuizFilter {
            search: Some("capital  of".to_string()),
            author_id: None,
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("capital.*of"));
        assert!(filter.matches(&quiz("Capital city of Italy", "Rome", "u1")));
        assert!(!filter.matches(&quiz("Of capital importance", "x", "u1")));
    }

    #[test]
    fn search_escapes_regex_metacharacters() {
        let filter = QuizFilter {
            search: Some("2+2".to_string()),
            author_id: None,
        };
        assert!(filter.matches(&quiz("What is 2+2?", "4", "u1")));
        assert!(!filter.matches(&quiz("What is 22?", "22", "u1")));
    }

    #[test]
    fn blank_search_matches_everything() {
        let filter = QuizFilter {
            search: Some("   ".to_string()),
            author_id: None,
        };
        assert_eq!(filter.search_pattern(), None);
        assert!(filter.matches(&quiz("Anything", "x", "u1")));
    }

    #[test]
    fn author_filter_excludes_other_authors() {
        let filter = QuizFilter {
            search: None,
            author_id: Some("u1".to_string()),
        };
        assert!(filter.matches(&quiz("Mine", "x", "u1")));
        assert!(!filter.matches(&quiz("Theirs", "x", "u2")));
    }

    #[test]
    fn form_is_trimmed_before_validation() {
        let form = QuizForm {
            question: "  ".to_string(),
            answer: " 4 ".to_string(),
        }
        .trimmed();
        assert_eq!(form.answer, "4");
        assert!(form.validate().is_err());
    }
}

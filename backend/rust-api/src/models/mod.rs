use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod pagination;
pub mod quiz;
pub mod random_play;
pub mod tip;
pub mod user;

pub use pagination::Page;
pub use quiz::{Quiz, QuizFilter, QuizForm};
pub use random_play::RandomPlaySession;
pub use tip::{Tip, TipForm};
pub use user::User;

/// Field name -> validation messages, in the order the client should show them.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, list)| {
            let messages = list
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Public author information attached to quizzes and tips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorView {
    pub id: String,
    pub username: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        AuthorView {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

/// Identifiers are ObjectId hex strings so that ordering by `_id` follows
/// creation order in every backend.
pub fn new_id() -> String {
    mongodb::bson::oid::ObjectId::new().to_hex()
}

// Serde converters for chrono::DateTime <-> mongodb::bson::DateTime
pub(crate) mod bson_datetime_as_chrono {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        bson::DateTime::from_millis(date.timestamp_millis()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bson_dt = bson::DateTime::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(bson_dt.timestamp_millis())
            .ok_or_else(|| D::Error::custom("timestamp out of range"))
    }
}

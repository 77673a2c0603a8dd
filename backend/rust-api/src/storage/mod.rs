//! Persistence seams.
//!
//! Services talk to these traits only. MongoDB/Redis back them in production,
//! [`memory::MemoryStore`] backs them in tests and local runs.

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::{Quiz, QuizFilter, RandomPlaySession, Tip, User};

pub mod memory;
pub mod mongo;
pub mod redis_sessions;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store changed between two calls that had to agree.
    #[error("inconsistent store state: {0}")]
    Inconsistent(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Quiz persistence. Listings and samples are ordered by quiz id so that an
/// offset into a given exclusion set always names the same quiz.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    /// Number of quizzes whose id is not in `exclude_ids`.
    async fn count_excluding(&self, exclude_ids: &BTreeSet<String>) -> StoreResult<u64>;

    /// The quiz at `offset` among quizzes whose id is not in `exclude_ids`.
    async fn sample_excluding(
        &self,
        exclude_ids: &BTreeSet<String>,
        offset: u64,
    ) -> StoreResult<Option<Quiz>>;

    async fn count(&self, filter: &QuizFilter) -> StoreResult<u64>;

    async fn list(&self, filter: &QuizFilter, offset: u64, limit: u64) -> StoreResult<Vec<Quiz>>;

    async fn find(&self, id: &str) -> StoreResult<Option<Quiz>>;

    async fn insert(&self, quiz: &Quiz) -> StoreResult<()>;

    /// Returns false when no quiz with that id exists.
    async fn update(&self, quiz: &Quiz) -> StoreResult<bool>;

    /// Returns false when no quiz with that id exists.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait TipStore: Send + Sync {
    async fn find(&self, id: &str) -> StoreResult<Option<Tip>>;

    /// Tips of one quiz, oldest first.
    async fn list_for_quiz(&self, quiz_id: &str) -> StoreResult<Vec<Tip>>;

    async fn insert(&self, tip: &Tip) -> StoreResult<()>;

    async fn update(&self, tip: &Tip) -> StoreResult<bool>;

    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Returns the number of removed tips.
    async fn delete_for_quiz(&self, quiz_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Unknown ids are skipped.
    async fn find_users(&self, ids: &[String]) -> StoreResult<Vec<User>>;
}

/// Session transport for random play, keyed by the browser session key.
#[async_trait]
pub trait PlaySessionStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    /// Missing sessions load as empty.
    async fn load(&self, session_key: &str) -> StoreResult<RandomPlaySession>;

    async fn save(&self, session_key: &str, session: &RandomPlaySession) -> StoreResult<()>;

    async fn clear(&self, session_key: &str) -> StoreResult<()>;
}

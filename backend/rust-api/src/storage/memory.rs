use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

use super::{PlaySessionStore, QuizStore, StoreResult, TipStore, UserStore};
use crate::models::{Quiz, QuizFilter, RandomPlaySession, Tip, User};

/// In-process implementation of every store trait.
///
/// `BTreeMap`s keyed by id give the same id ordering MongoDB uses with
/// `sort({_id: 1})`.
#[derive(Default)]
pub struct MemoryStore {
    quizzes: RwLock<BTreeMap<String, Quiz>>,
    tips: RwLock<BTreeMap<String, Tip>>,
    users: RwLock<HashMap<String, User>>,
    play_sessions: RwLock<HashMap<String, RandomPlaySession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users come from the identity provider; this is how they get here
    /// in local runs and tests.
    pub async fn put_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn play_session_count(&self) -> usize {
        self.play_sessions.read().await.len()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn count_excluding(&self, exclude_ids: &BTreeSet<String>) -> StoreResult<u64> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .keys()
            .filter(|id| !exclude_ids.contains(*id))
            .count() as u64)
    }

    async fn sample_excluding(
        &self,
        exclude_ids: &BTreeSet<String>,
        offset: u64,
    ) -> StoreResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .values()
            .filter(|quiz| !exclude_ids.contains(&quiz.id))
            .nth(offset as usize)
            .cloned())
    }

    async fn count(&self, filter: &QuizFilter) -> StoreResult<u64> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.values().filter(|quiz| filter.matches(quiz)).count() as u64)
    }

    async fn list(&self, filter: &QuizFilter, offset: u64, limit: u64) -> StoreResult<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .values()
            .filter(|quiz| filter.matches(quiz))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }

    async fn insert(&self, quiz: &Quiz) -> StoreResult<()> {
        self.quizzes
            .write()
            .await
            .insert(quiz.id.clone(), quiz.clone());
        Ok(())
    }

    async fn update(&self, quiz: &Quiz) -> StoreResult<bool> {
        let mut quizzes = self.quizzes.write().await;
        match quizzes.get_mut(&quiz.id) {
            Some(existing) => {
                *existing = quiz.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.quizzes.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl TipStore for MemoryStore {
    async fn find(&self, id: &str) -> StoreResult<Option<Tip>> {
        Ok(self.tips.read().await.get(id).cloned())
    }

    async fn list_for_quiz(&self, quiz_id: &str) -> StoreResult<Vec<Tip>> {
        let tips = self.tips.read().await;
        Ok(tips
            .values()
            .filter(|tip| tip.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, tip: &Tip) -> StoreResult<()> {
        self.tips.write().await.insert(tip.id.clone(), tip.clone());
        Ok(())
    }

    async fn update(&self, tip: &Tip) -> StoreResult<bool> {
        let mut tips = self.tips.write().await;
        match tips.get_mut(&tip.id) {
            Some(existing) => {
                *existing = tip.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.tips.write().await.remove(id).is_some())
    }

    async fn delete_for_quiz(&self, quiz_id: &str) -> StoreResult<u64> {
        let mut tips = self.tips.write().await;
        let before = tips.len();
        tips.retain(|_, tip| tip.quiz_id != quiz_id);
        Ok((before - tips.len()) as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_users(&self, ids: &[String]) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

#[async_trait]
impl PlaySessionStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn load(&self, session_key: &str) -> StoreResult<RandomPlaySession> {
        Ok(self
            .play_sessions
            .read()
            .await
            .get(session_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, session_key: &str, session: &RandomPlaySession) -> StoreResult<()> {
        self.play_sessions
            .write()
            .await
            .insert(session_key.to_string(), session.clone());
        Ok(())
    }

    async fn clear(&self, session_key: &str) -> StoreResult<()> {
        self.play_sessions.write().await.remove(session_key);
        Ok(())
    }
}

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document, Regex};
use mongodb::{Collection, Database};
use std::collections::BTreeSet;

use super::{QuizStore, StoreError, StoreResult, TipStore, UserStore};
use crate::metrics::track_store_operation;
use crate::models::{Quiz, QuizFilter, Tip, User};

const QUIZZES: &str = "quizzes";
const TIPS: &str = "tips";
const USERS: &str = "users";

pub struct MongoQuizStore {
    db: Database,
    quizzes: Collection<Quiz>,
}

impl MongoQuizStore {
    pub fn new(db: Database) -> Self {
        let quizzes = db.collection(QUIZZES);
        Self { db, quizzes }
    }
}

fn exclusion_filter(exclude_ids: &BTreeSet<String>) -> Document {
    let ids: Vec<String> = exclude_ids.iter().cloned().collect();
    doc! { "_id": { "$nin": ids } }
}

fn quiz_filter_document(filter: &QuizFilter) -> Document {
    let mut document = Document::new();
    if let Some(author_id) = &filter.author_id {
        document.insert("authorId", author_id.clone());
    }
    if let Some(pattern) = filter.search_pattern() {
        document.insert(
            "question",
            Regex {
                pattern,
                options: "i".to_string(),
            },
        );
    }
    document
}

#[async_trait]
impl QuizStore for MongoQuizStore {
    async fn ping(&self) -> StoreResult<()> {
        track_store_operation("mongo", "ping", async {
            self.db.run_command(doc! { "ping": 1 }).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn count_excluding(&self, exclude_ids: &BTreeSet<String>) -> StoreResult<u64> {
        track_store_operation("mongo", "quizzes.count_excluding", async {
            self.quizzes
                .count_documents(exclusion_filter(exclude_ids))
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn sample_excluding(
        &self,
        exclude_ids: &BTreeSet<String>,
        offset: u64,
    ) -> StoreResult<Option<Quiz>> {
        track_store_operation("mongo", "quizzes.sample_excluding", async {
            let mut cursor = self
                .quizzes
                .find(exclusion_filter(exclude_ids))
                .sort(doc! { "_id": 1 })
                .skip(offset)
                .limit(1)
                .await?;
            Ok::<_, StoreError>(cursor.try_next().await?)
        })
        .await
    }

    async fn count(&self, filter: &QuizFilter) -> StoreResult<u64> {
        track_store_operation("mongo", "quizzes.count", async {
            self.quizzes
                .count_documents(quiz_filter_document(filter))
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn list(&self, filter: &QuizFilter, offset: u64, limit: u64) -> StoreResult<Vec<Quiz>> {
        track_store_operation("mongo", "quizzes.list", async {
            let cursor = self
                .quizzes
                .find(quiz_filter_document(filter))
                .sort(doc! { "_id": 1 })
                .skip(offset)
                .limit(limit as i64)
                .await?;
            let items: Vec<_> = cursor.try_collect().await?;
            Ok::<_, StoreError>(items)
        })
        .await
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Quiz>> {
        track_store_operation("mongo", "quizzes.find", async {
            self.quizzes
                .find_one(doc! { "_id": id })
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn insert(&self, quiz: &Quiz) -> StoreResult<()> {
        track_store_operation("mongo", "quizzes.insert", async {
            self.quizzes.insert_one(quiz).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn update(&self, quiz: &Quiz) -> StoreResult<bool> {
        track_store_operation("mongo", "quizzes.update", async {
            let result = self
                .quizzes
                .replace_one(doc! { "_id": quiz.id.as_str() }, quiz)
                .await?;
            Ok::<_, StoreError>(result.matched_count > 0)
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        track_store_operation("mongo", "quizzes.delete", async {
            let result = self.quizzes.delete_one(doc! { "_id": id }).await?;
            Ok::<_, StoreError>(result.deleted_count > 0)
        })
        .await
    }
}

pub struct MongoTipStore {
    tips: Collection<Tip>,
}

impl MongoTipStore {
    pub fn new(db: &Database) -> Self {
        Self {
            tips: db.collection(TIPS),
        }
    }
}

#[async_trait]
impl TipStore for MongoTipStore {
    async fn find(&self, id: &str) -> StoreResult<Option<Tip>> {
        track_store_operation("mongo", "tips.find", async {
            self.tips
                .find_one(doc! { "_id": id })
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn list_for_quiz(&self, quiz_id: &str) -> StoreResult<Vec<Tip>> {
        track_store_operation("mongo", "tips.list_for_quiz", async {
            let cursor = self
                .tips
                .find(doc! { "quizId": quiz_id })
                .sort(doc! { "_id": 1 })
                .await?;
            let items: Vec<_> = cursor.try_collect().await?;
            Ok::<_, StoreError>(items)
        })
        .await
    }

    async fn insert(&self, tip: &Tip) -> StoreResult<()> {
        track_store_operation("mongo", "tips.insert", async {
            self.tips.insert_one(tip).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn update(&self, tip: &Tip) -> StoreResult<bool> {
        track_store_operation("mongo", "tips.update", async {
            let result = self
                .tips
                .replace_one(doc! { "_id": tip.id.as_str() }, tip)
                .await?;
            Ok::<_, StoreError>(result.matched_count > 0)
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        track_store_operation("mongo", "tips.delete", async {
            let result = self.tips.delete_one(doc! { "_id": id }).await?;
            Ok::<_, StoreError>(result.deleted_count > 0)
        })
        .await
    }

    async fn delete_for_quiz(&self, quiz_id: &str) -> StoreResult<u64> {
        track_store_operation("mongo", "tips.delete_for_quiz", async {
            let result = self.tips.delete_many(doc! { "quizId": quiz_id }).await?;
            Ok::<_, StoreError>(result.deleted_count)
        })
        .await
    }
}

pub struct MongoUserStore {
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        track_store_operation("mongo", "users.find", async {
            self.users
                .find_one(doc! { "_id": id })
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn find_users(&self, ids: &[String]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        track_store_operation("mongo", "users.find_many", async {
            let cursor = self
                .users
                .find(doc! { "_id": { "$in": ids.to_vec() } })
                .await?;
            let items: Vec<_> = cursor.try_collect().await?;
            Ok::<_, StoreError>(items)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(quiz_filter_document(&QuizFilter::default()).is_empty());
    }

    #[test]
    fn filter_document_combines_author_and_search() {
        let document = quiz_filter_document(&QuizFilter {
            search: Some("capital of".to_string()),
            author_id: Some("u1".to_string()),
        });
        assert_eq!(document.get_str("authorId").unwrap(), "u1");
        match document.get("question") {
            Some(Bson::RegularExpression(regex)) => {
                assert_eq!(regex.pattern, "capital.*of");
                assert_eq!(regex.options, "i");
            }
            other => panic!("expected regex filter, got {:?}", other),
        }
    }

    #[test]
    fn exclusion_filter_lists_answered_ids() {
        let ids: BTreeSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        let document = exclusion_filter(&ids);
        let nin = document
            .get_document("_id")
            .unwrap()
            .get_array("$nin")
            .unwrap();
        assert_eq!(nin.len(), 2);
    }
}

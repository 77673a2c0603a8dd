use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, StorageBackend};
use crate::storage::{
    memory::MemoryStore,
    mongo::{MongoQuizStore, MongoTipStore, MongoUserStore},
    redis_sessions::RedisPlaySessionStore,
    PlaySessionStore, QuizStore, TipStore, UserStore,
};
use random_play_service::{OffsetPicker, ThreadRngOffsetPicker};
use redis::aio::ConnectionManager;

pub struct AppState {
    pub config: Config,
    pub quizzes: Arc<dyn QuizStore>,
    pub tips: Arc<dyn TipStore>,
    pub users: Arc<dyn UserStore>,
    pub play_sessions: Arc<dyn PlaySessionStore>,
    pub offsets: Arc<dyn OffsetPicker>,
}

impl AppState {
    /// Builds the state for the configured backend, connecting to MongoDB and
    /// Redis when needed.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        match config.storage_backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                // Accounts live with the identity provider, so nothing fills this store.
                tracing::warn!(
                    "In-memory storage has no user accounts; quiz and tip views carry no author"
                );
                Ok(Self::in_memory(config, Arc::new(MemoryStore::new())))
            }
            StorageBackend::Mongo => Self::connect_mongo_redis(config).await,
        }
    }

    async fn connect_mongo_redis(config: Config) -> anyhow::Result<Self> {
        let mongo_client = mongodb::Client::with_uri_str(&config.mongo_uri).await?;
        let mongo = mongo_client.database(&config.mongo_database);
        tracing::info!("MongoDB client ready for database {}", config.mongo_database);

        tracing::info!("Attempting to connect to Redis...");
        let redis_client = redis::Client::open(config.redis_uri.clone())?;

        let redis = tokio::time::timeout(
            Duration::from_secs(30),
            ConnectionManager::new(redis_client),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis connection timeout after 30s"))??;

        let mut conn = redis.clone();
        tokio::time::timeout(
            Duration::from_secs(5),
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Redis PING timeout after 5s"))??;

        tracing::info!("Redis connection established successfully");

        let ttl = config.play_session_ttl_seconds;
        Ok(Self {
            quizzes: Arc::new(MongoQuizStore::new(mongo.clone())),
            tips: Arc::new(MongoTipStore::new(&mongo)),
            users: Arc::new(MongoUserStore::new(&mongo)),
            play_sessions: Arc::new(RedisPlaySessionStore::new(redis, ttl)),
            offsets: Arc::new(ThreadRngOffsetPicker),
            config,
        })
    }

    /// Every store backed by one shared [`MemoryStore`].
    pub fn in_memory(config: Config, store: Arc<MemoryStore>) -> Self {
        Self {
            config,
            quizzes: store.clone(),
            tips: store.clone(),
            users: store.clone(),
            play_sessions: store,
            offsets: Arc::new(ThreadRngOffsetPicker),
        }
    }

    pub fn with_offset_picker(mut self, offsets: Arc<dyn OffsetPicker>) -> Self {
        self.offsets = offsets;
        self
    }
}

pub mod authorization;
pub mod error;
pub mod quiz_service;
pub mod random_play_service;
pub mod tip_service;

pub use error::{ServiceError, ServiceResult};

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::{PlaySessionStore, StoreError, StoreResult};
use crate::metrics::track_store_operation;
use crate::models::RandomPlaySession;

/// Random-play sessions kept in Redis as JSON with a sliding TTL.
pub struct RedisPlaySessionStore {
    redis: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisPlaySessionStore {
    pub fn new(redis: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }
}

pub(crate) fn redis_key(session_key: &str) -> String {
    format!("randomplay:{}", session_key)
}

#[async_trait]
impl PlaySessionStore for RedisPlaySessionStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        track_store_operation("redis", "ping", async {
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map(|_| ())
                .map_err(StoreError::from)
        })
        .await
    }

    async fn load(&self, session_key: &str) -> StoreResult<RandomPlaySession> {
        let mut conn = self.redis.clone();
        let key = redis_key(session_key);

        let raw: Option<String> = track_store_operation("redis", "play_session.get", async {
            redis::cmd("GET")
                .arg(&key)
                .query_async::<Option<String>>(&mut conn)
                .await
                .map_err(StoreError::from)
        })
        .await?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(RandomPlaySession::default()),
        }
    }

    async fn save(&self, session_key: &str, session: &RandomPlaySession) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        let key = redis_key(session_key);
        let json = serde_json::to_string(session)?;

        track_store_operation("redis", "play_session.setex", async {
            redis::cmd("SETEX")
                .arg(&key)
                .arg(self.ttl_seconds)
                .arg(json)
                .query_async::<()>(&mut conn)
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn clear(&self, session_key: &str) -> StoreResult<()> {
        let mut conn = self.redis.clone();
        let key = redis_key(session_key);

        track_store_operation("redis", "play_session.del", async {
            redis::cmd("DEL")
                .arg(&key)
                .query_async::<()>(&mut conn)
                .await
                .map_err(StoreError::from)
        })
        .await
    }
}

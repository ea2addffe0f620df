use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;

use super::{EphemeralStore, LinkStoreError};

/// Redis-backed ephemeral store. Expiry is delegated to `SETEX`.
///
/// One managed multiplexed connection is shared by every clone and
/// reconnects on its own after a dropped link.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Open the shared connection. Fails if the endpoint is unreachable.
    pub async fn connect(redis_url: &str) -> Result<Self, LinkStoreError> {
        let client = Client::open(redis_url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<(), LinkStoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

fn unavailable(e: redis::RedisError) -> LinkStoreError {
    LinkStoreError::Unavailable(e.to_string())
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), LinkStoreError> {
        if ttl_seconds == 0 {
            // SETEX rejects a zero expiry
            tracing::debug!(key = %key, "Skipping write of zero-TTL entry");
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, LinkStoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(unavailable)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_unavailable() {
        let result = RedisStore::connect("not-a-redis-url").await;
        assert!(matches!(result, Err(LinkStoreError::Unavailable(_))));
    }
}

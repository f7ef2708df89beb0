use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::AttemptStore;

/// Redis-backed [`AttemptStore`]. TTLs live in Redis so lockout state is
/// shared across all process instances; nothing is cached locally.
#[derive(Clone)]
pub struct RedisAttemptStore {
    pub pool: Pool,
}

impl AttemptStore for RedisAttemptStore {
    async fn increment(&self, key: &str) -> Result<i64, anyhow::Error> {
        let mut conn = self.pool.get().await?;
        let count: i64 = conn.incr(key, 1i64).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), anyhow::Error> {
        let mut conn = self.pool.get().await?;
        let _: bool = conn.expire(key, ttl_secs as i64).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, ttl_secs: u64) -> Result<bool, anyhow::Error> {
        let mut conn = self.pool.get().await?;
        // SET NX EX: the flag and its TTL are written in one round trip, and
        // an existing flag (with its original TTL) is left untouched.
        let reply: Option<String> = deadpool_redis::redis::cmd("SET")
            .arg(key)
            .arg("locked")
            .arg("EX")
            .arg(ttl_secs)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, anyhow::Error> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ttl_secs(&self, key: &str) -> Result<i64, anyhow::Error> {
        let mut conn = self.pool.get().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(ttl)
    }

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.pool.get().await?;
        let _: i64 = conn.del(key).await?;
        Ok(())
    }
}

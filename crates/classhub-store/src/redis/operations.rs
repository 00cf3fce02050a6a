//! Redis session store implementation.
//!
//! Atomicity comes from Redis itself: batches run as MULTI/EXEC pipelines
//! and the windowed increment is a Lua script, so concurrent callers in any
//! process observe each mutation all-or-nothing.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use classhub_core::error::{AppError, ErrorKind};
use classhub_core::result::AppResult;
use classhub_core::traits::store::{SessionStore, StoreOp};

use super::client::RedisClient;

/// Lua script for the atomic windowed increment.
///
/// KEYS[1] = counter key
/// ARGV[1] = window in milliseconds
///
/// Sets the TTL only when the increment creates the key, so the window is
/// never extended by later increments. Returns the post-increment count.
const INCR_WITH_EXPIRE_SCRIPT: &str = r#"
    local count = redis.call('INCR', KEYS[1])
    if count == 1 then
        redis.call('PEXPIRE', KEYS[1], ARGV[1])
    end
    return count
"#;

/// Redis-backed session store.
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisSessionStore {
    /// Create a new Redis session store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .set_ex(&full_key, value, ttl.as_secs().max(1))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_add(&self, set_key: &str, member: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(set_key);
        let mut conn = self.client.conn_mut();

        // SADD and EXPIRE as one atomic pipeline so the set can never be
        // left without a TTL.
        let _: () = redis::pipe()
            .atomic()
            .sadd(&full_key, member)
            .ignore()
            .expire(&full_key, ttl.as_secs().max(1) as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_remove(&self, set_key: &str, member: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(set_key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.srem(&full_key, member).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_members(&self, set_key: &str) -> AppResult<Vec<String>> {
        let full_key = self.client.prefixed_key(set_key);
        let mut conn = self.client.conn_mut();
        let members: Vec<String> = conn.smembers(&full_key).await.map_err(Self::map_err)?;
        Ok(members)
    }

    async fn incr_with_expire(&self, key: &str, window: Duration) -> AppResult<i64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let count: i64 = redis::Script::new(INCR_WITH_EXPIRE_SCRIPT)
            .key(&full_key)
            .arg(window.as_millis() as u64)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(count)
    }

    async fn transaction(&self, ops: Vec<StoreOp>) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let mut pipe = redis::pipe();
        pipe.atomic();

        for op in &ops {
            match op {
                StoreOp::Put { key, value, ttl } => {
                    pipe.cmd("SET")
                        .arg(self.client.prefixed_key(key))
                        .arg(value)
                        .arg("EX")
                        .arg(ttl.as_secs().max(1))
                        .ignore();
                }
                StoreOp::Delete { key } => {
                    pipe.del(self.client.prefixed_key(key)).ignore();
                }
                StoreOp::SetAdd {
                    set_key,
                    member,
                    ttl,
                } => {
                    let full_key = self.client.prefixed_key(set_key);
                    pipe.sadd(&full_key, member).ignore();
                    pipe.expire(&full_key, ttl.as_secs().max(1) as i64).ignore();
                }
                StoreOp::SetRemove { set_key, member } => {
                    pipe.srem(self.client.prefixed_key(set_key), member).ignore();
                }
                StoreOp::Incr { key, ttl } => {
                    let full_key = self.client.prefixed_key(key);
                    pipe.incr(&full_key, 1i64).ignore();
                    pipe.expire(&full_key, ttl.as_secs().max(1) as i64).ignore();
                }
            }
        }

        let _: () = pipe.query_async(&mut conn).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

//! Store manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use classhub_core::config::store::StoreConfig;
use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::traits::store::{SessionStore, StoreOp};

/// Store manager that wraps the configured session store backend.
///
/// The backend is selected at construction time based on configuration and
/// the manager is passed by reference (cheap clone) to every component that
/// needs storage.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store backend.
    inner: Arc<dyn SessionStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn SessionStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis session store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisSessionStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory session store (single-process only)");
                Arc::new(crate::memory::MemorySessionStore::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_backend(backend: Arc<dyn SessionStore>) -> Self {
        Self { inner: backend }
    }

    /// Get a reference to the inner backend.
    pub fn backend(&self) -> &dyn SessionStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl SessionStore for StoreManager {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn set_add(&self, set_key: &str, member: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set_add(set_key, member, ttl).await
    }

    async fn set_remove(&self, set_key: &str, member: &str) -> AppResult<()> {
        self.inner.set_remove(set_key, member).await
    }

    async fn set_members(&self, set_key: &str) -> AppResult<Vec<String>> {
        self.inner.set_members(set_key).await
    }

    async fn incr_with_expire(&self, key: &str, window: Duration) -> AppResult<i64> {
        self.inner.incr_with_expire(key, window).await
    }

    async fn transaction(&self, ops: Vec<StoreOp>) -> AppResult<()> {
        self.inner.transaction(ops).await
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        self.inner.sweep_expired().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

//! Session store trait for pluggable storage backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A single mutation inside an atomic batch.
///
/// Batches are applied all-or-nothing by [`SessionStore::transaction`] so a
/// partial failure can never leave the record store and the per-user index
/// inconsistent.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Store a value under a key with a TTL.
    Put {
        /// The key to write.
        key: String,
        /// The serialized value.
        value: String,
        /// Time to live for the entry.
        ttl: Duration,
    },
    /// Remove a key.
    Delete {
        /// The key to remove.
        key: String,
    },
    /// Add a member to a set, refreshing the set's TTL.
    SetAdd {
        /// The set key.
        set_key: String,
        /// The member to add.
        member: String,
        /// Time to live for the whole set.
        ttl: Duration,
    },
    /// Remove a member from a set.
    SetRemove {
        /// The set key.
        set_key: String,
        /// The member to remove.
        member: String,
    },
    /// Increment an integer value by 1, creating it at 1 if absent.
    /// The TTL is refreshed on every application.
    Incr {
        /// The counter key.
        key: String,
        /// Time to live, refreshed by each increment.
        ttl: Duration,
    },
}

/// Trait for session storage backends (Redis or in-memory).
///
/// All values are serialized as strings (JSON). Both backends must honor the
/// same TTL expiry semantics so the rest of the system stays
/// backend-agnostic. The backend's atomic primitives — [`transaction`] and
/// [`incr_with_expire`] — are the sole synchronization mechanism; no caller
/// relies on in-process locks.
///
/// [`transaction`]: SessionStore::transaction
/// [`incr_with_expire`]: SessionStore::incr_with_expire
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Store a value with a TTL.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Add a member to a set, refreshing the set's TTL.
    async fn set_add(&self, set_key: &str, member: &str, ttl: Duration) -> AppResult<()>;

    /// Remove a member from a set.
    async fn set_remove(&self, set_key: &str, member: &str) -> AppResult<()>;

    /// Return all members of a set. An absent or expired set yields an empty list.
    async fn set_members(&self, set_key: &str) -> AppResult<Vec<String>>;

    /// Atomically increment an integer value by 1 and return the new value.
    ///
    /// When the increment creates the key, `window` is applied as its TTL;
    /// subsequent increments within the window must not extend it. This is a
    /// single atomic round trip so concurrent callers can never both observe
    /// the pre-increment count.
    async fn incr_with_expire(&self, key: &str, window: Duration) -> AppResult<i64>;

    /// Apply a batch of mutations atomically (all-or-nothing).
    async fn transaction(&self, ops: Vec<StoreOp>) -> AppResult<()>;

    /// Actively remove expired entries.
    ///
    /// Backends with native TTL expiry return 0 without doing any work; the
    /// in-memory backend sweeps its maps. Returns the number of entries
    /// removed.
    async fn sweep_expired(&self) -> AppResult<u64> {
        Ok(0)
    }

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn put_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.put(key, &json, ttl).await
    }

    /// Check that the storage backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

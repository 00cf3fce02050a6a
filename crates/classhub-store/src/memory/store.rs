//! In-memory session store using dashmap.
//!
//! Single-process only: there is no cross-process consistency guarantee, so
//! this backend must not be used when more than one process serves the same
//! identity population. Intended for development and testing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use classhub_core::config::store::MemoryStoreConfig;
use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::traits::store::{SessionStore, StoreOp};

/// What an entry holds. Plain values and sets live in the same namespace,
/// matching Redis semantics where a key has exactly one type.
#[derive(Debug, Clone)]
enum Stored {
    Value(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    stored: Stored,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// In-memory session store provider.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    entries: Arc<DashMap<String, Entry>>,
    /// Serializes multi-step mutations so a transaction is observed
    /// all-or-nothing within this process.
    write_lock: Arc<Mutex<()>>,
}

impl MemorySessionStore {
    /// Create a new in-memory store from configuration.
    pub fn new(_config: &MemoryStoreConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Fetch an entry, removing it lazily when its TTL has passed.
    fn live_entry(&self, key: &str) -> Option<Entry> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => return Some(entry.clone()),
            None => return None,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Reject ops whose target key holds the wrong type, or a counter that
    /// does not parse, before applying anything. Keeps transactions
    /// all-or-nothing.
    fn check_op(&self, op: &StoreOp) -> AppResult<()> {
        match op {
            StoreOp::Put { .. } | StoreOp::Delete { .. } => Ok(()),
            StoreOp::SetAdd { set_key, .. } | StoreOp::SetRemove { set_key, .. } => {
                match self.live_entry(set_key) {
                    Some(Entry {
                        stored: Stored::Value(_),
                        ..
                    }) => Err(AppError::store(format!("Key {set_key} holds a value"))),
                    _ => Ok(()),
                }
            }
            StoreOp::Incr { key, .. } => match self.live_entry(key) {
                Some(Entry {
                    stored: Stored::Set(_),
                    ..
                }) => Err(AppError::store(format!("Key {key} holds a set"))),
                Some(Entry {
                    stored: Stored::Value(v),
                    ..
                }) => match v.parse::<i64>() {
                    Ok(_) => Ok(()),
                    Err(e) => Err(AppError::store(format!(
                        "Counter {key} is not an integer: {e}"
                    ))),
                },
                None => Ok(()),
            },
        }
    }

    fn apply_op(&self, op: StoreOp) {
        match op {
            StoreOp::Put { key, value, ttl } => {
                self.entries.insert(
                    key,
                    Entry {
                        stored: Stored::Value(value),
                        expires_at: Some(Instant::now() + ttl),
                    },
                );
            }
            StoreOp::Delete { key } => {
                self.entries.remove(&key);
            }
            StoreOp::SetAdd {
                set_key,
                member,
                ttl,
            } => {
                let mut entry = match self.live_entry(&set_key) {
                    Some(entry) => entry,
                    None => Entry {
                        stored: Stored::Set(HashSet::new()),
                        expires_at: None,
                    },
                };
                if let Stored::Set(members) = &mut entry.stored {
                    members.insert(member);
                }
                entry.expires_at = Some(Instant::now() + ttl);
                self.entries.insert(set_key, entry);
            }
            StoreOp::SetRemove { set_key, member } => {
                let Some(mut entry) = self.live_entry(&set_key) else {
                    return;
                };
                if let Stored::Set(members) = &mut entry.stored {
                    members.remove(&member);
                    if members.is_empty() {
                        self.entries.remove(&set_key);
                        return;
                    }
                }
                self.entries.insert(set_key, entry);
            }
            StoreOp::Incr { key, ttl } => {
                // check_op has already rejected non-integer counters.
                let current = match self.live_entry(&key) {
                    Some(Entry {
                        stored: Stored::Value(v),
                        ..
                    }) => v.parse::<i64>().unwrap_or(0),
                    _ => 0,
                };
                self.entries.insert(
                    key,
                    Entry {
                        stored: Stored::Value((current + 1).to_string()),
                        expires_at: Some(Instant::now() + ttl),
                    },
                );
            }
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                stored: Stored::Value(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match self.live_entry(key) {
            Some(Entry {
                stored: Stored::Value(value),
                ..
            }) => Ok(Some(value)),
            Some(_) => Err(AppError::store(format!("Key {key} holds a set"))),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn set_add(&self, set_key: &str, member: &str, ttl: Duration) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        self.check_op(&StoreOp::SetAdd {
            set_key: set_key.to_string(),
            member: member.to_string(),
            ttl,
        })?;
        self.apply_op(StoreOp::SetAdd {
            set_key: set_key.to_string(),
            member: member.to_string(),
            ttl,
        });
        Ok(())
    }

    async fn set_remove(&self, set_key: &str, member: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        self.apply_op(StoreOp::SetRemove {
            set_key: set_key.to_string(),
            member: member.to_string(),
        });
        Ok(())
    }

    async fn set_members(&self, set_key: &str) -> AppResult<Vec<String>> {
        match self.live_entry(set_key) {
            Some(Entry {
                stored: Stored::Set(members),
                ..
            }) => Ok(members.into_iter().collect()),
            Some(_) => Err(AppError::store(format!("Key {set_key} holds a value"))),
            None => Ok(Vec::new()),
        }
    }

    async fn incr_with_expire(&self, key: &str, window: Duration) -> AppResult<i64> {
        let _guard = self.write_lock.lock().await;
        match self.live_entry(key) {
            Some(Entry {
                stored: Stored::Value(v),
                expires_at,
            }) => {
                let current = v
                    .parse::<i64>()
                    .map_err(|e| AppError::store(format!("Counter {key} is not an integer: {e}")))?;
                let next = current + 1;
                // Window already open: the TTL is not extended.
                self.entries.insert(
                    key.to_string(),
                    Entry {
                        stored: Stored::Value(next.to_string()),
                        expires_at,
                    },
                );
                Ok(next)
            }
            Some(_) => Err(AppError::store(format!("Key {key} holds a set"))),
            None => {
                self.entries.insert(
                    key.to_string(),
                    Entry {
                        stored: Stored::Value("1".to_string()),
                        expires_at: Some(Instant::now() + window),
                    },
                );
                Ok(1)
            }
        }
    }

    async fn transaction(&self, ops: Vec<StoreOp>) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        for op in &ops {
            self.check_op(op)?;
        }
        for op in ops {
            self.apply_op(op);
        }
        Ok(())
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .collect();

        let count = expired.len() as u64;
        for key in expired {
            self.entries.remove(&key);
        }

        if count > 0 {
            debug!(count, "Swept expired entries");
        }
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> MemorySessionStore {
        MemorySessionStore::new(&MemoryStoreConfig::default())
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = make_store();
        store
            .put("k1", "v1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some("v1".to_string()));
        store.delete("k1").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = make_store();
        store
            .put("short", "v", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get("short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_operations() {
        let store = make_store();
        store
            .set_add("s", "a", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_add("s", "b", Duration::from_secs(60))
            .await
            .unwrap();
        let mut members = store.set_members("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b"]);

        store.set_remove("s", "a").await.unwrap();
        assert_eq!(store.set_members("s").await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_incr_window_not_extended() {
        let store = make_store();
        assert_eq!(
            store
                .incr_with_expire("c", Duration::from_millis(60))
                .await
                .unwrap(),
            1
        );
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(
            store
                .incr_with_expire("c", Duration::from_millis(60))
                .await
                .unwrap(),
            2
        );
        // The second increment must not have pushed the expiry out.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(
            store
                .incr_with_expire("c", Duration::from_millis(60))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_transaction_applies_batch() {
        let store = make_store();
        store
            .transaction(vec![
                StoreOp::Put {
                    key: "t1".into(),
                    value: "v1".into(),
                    ttl: Duration::from_secs(60),
                },
                StoreOp::SetAdd {
                    set_key: "ts".into(),
                    member: "m".into(),
                    ttl: Duration::from_secs(60),
                },
                StoreOp::Incr {
                    key: "tc".into(),
                    ttl: Duration::from_secs(60),
                },
            ])
            .await
            .unwrap();

        assert_eq!(store.get("t1").await.unwrap(), Some("v1".to_string()));
        assert_eq!(store.set_members("ts").await.unwrap(), vec!["m"]);
        assert_eq!(store.get("tc").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_transaction_type_conflict_applies_nothing() {
        let store = make_store();
        store
            .put("plain", "v", Duration::from_secs(60))
            .await
            .unwrap();

        let result = store
            .transaction(vec![
                StoreOp::Put {
                    key: "other".into(),
                    value: "v".into(),
                    ttl: Duration::from_secs(60),
                },
                StoreOp::SetAdd {
                    set_key: "plain".into(),
                    member: "m".into(),
                    ttl: Duration::from_secs(60),
                },
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transaction_incr_on_non_integer_applies_nothing() {
        let store = make_store();
        store
            .put("txt", "not-a-number", Duration::from_secs(60))
            .await
            .unwrap();

        let result = store
            .transaction(vec![
                StoreOp::Put {
                    key: "other".into(),
                    value: "v".into(),
                    ttl: Duration::from_secs(60),
                },
                StoreOp::Incr {
                    key: "txt".into(),
                    ttl: Duration::from_secs(60),
                },
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(store.get("other").await.unwrap(), None);
        assert_eq!(
            store.get("txt").await.unwrap(),
            Some("not-a-number".to_string())
        );
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = make_store();
        store
            .put("gone", "v", Duration::from_millis(10))
            .await
            .unwrap();
        store
            .put("kept", "v", Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.sweep_expired().await.unwrap(), 1);
        assert_eq!(store.get("kept").await.unwrap(), Some("v".to_string()));
    }
}

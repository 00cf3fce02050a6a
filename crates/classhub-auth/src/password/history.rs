//! Capped per-user password reuse history.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use classhub_core::config::password::PasswordPolicyConfig;
use classhub_core::result::AppResult;
use classhub_core::traits::store::SessionStore;
use classhub_entity::PasswordHistoryEntry;
use classhub_store::{StoreManager, keys};

use super::hasher::PasswordHasher;

/// Stores and checks the capped, newest-first list of prior credential
/// hashes per user. The list persists independently of session state.
#[derive(Debug, Clone)]
pub struct PasswordHistoryManager {
    store: StoreManager,
    hasher: PasswordHasher,
    depth: usize,
    ttl: Duration,
}

impl PasswordHistoryManager {
    /// Creates a new history manager from the password policy.
    pub fn new(store: StoreManager, hasher: PasswordHasher, policy: &PasswordPolicyConfig) -> Self {
        Self {
            store,
            hasher,
            depth: policy.history_depth,
            ttl: Duration::from_secs(policy.history_ttl_days * 24 * 60 * 60),
        }
    }

    /// Record a new credential hash, truncating to the configured depth and
    /// refreshing the list's TTL.
    ///
    /// Idempotent enough to retry: a duplicate append still truncates to the
    /// cap.
    pub async fn add(&self, user_id: Uuid, hash: &str) -> AppResult<()> {
        let mut entries = self.load(user_id).await?;
        entries.insert(
            0,
            PasswordHistoryEntry {
                hash: hash.to_string(),
                recorded_at: Utc::now(),
            },
        );
        entries.truncate(self.depth);

        let json = serde_json::to_string(&entries)?;
        self.store
            .put(&keys::password_history(user_id), &json, self.ttl)
            .await
    }

    /// Check whether the candidate password verifies against any retained
    /// hash.
    pub async fn is_reused(&self, user_id: Uuid, candidate: &str) -> AppResult<bool> {
        for entry in self.load(user_id).await? {
            let Some(phc) = normalize_hash(&entry.hash) else {
                warn!(user_id = %user_id, "Skipping unreadable password history entry");
                continue;
            };
            if self.hasher.verify(candidate, &phc)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn load(&self, user_id: Uuid) -> AppResult<Vec<PasswordHistoryEntry>> {
        match self.store.get(&keys::password_history(user_id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Accept hashes both raw and base64-wrapped, as some storage backends
/// return binary-safe encodings.
fn normalize_hash(raw: &str) -> Option<String> {
    if raw.starts_with("$argon2") {
        return Some(raw.to_string());
    }
    let decoded = STANDARD.decode(raw).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    decoded.starts_with("$argon2").then_some(decoded)
}

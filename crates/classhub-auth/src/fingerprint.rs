//! Client fingerprint derivation and comparison.
//!
//! A fingerprint binds a session to the client's network address and agent
//! string so token theft from a different client can be detected. Binding
//! is opt-in: it is checked for sensitive operations, not on every lookup,
//! because legitimate IP or agent changes would otherwise log users out.

use sha2::{Digest, Sha256};
use tracing::debug;

use classhub_core::result::AppResult;
use classhub_core::traits::store::SessionStore;
use classhub_store::{StoreManager, keys};

use classhub_entity::SessionRecord;

/// Derive the fingerprint hash for a client.
///
/// Deterministic: identical inputs always yield identical output, and any
/// difference in either input changes the result.
pub fn fingerprint(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Compares a caller's current fingerprint against the one captured at
/// session creation.
#[derive(Debug, Clone)]
pub struct FingerprintValidator {
    store: StoreManager,
}

impl FingerprintValidator {
    /// Creates a new fingerprint validator.
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    /// Check whether the caller's fingerprint matches the session's.
    ///
    /// Returns `false` when the session is absent or was created without
    /// client information — an unbound session cannot be confirmed, so
    /// sensitive operations treat it as a mismatch.
    pub async fn validate(&self, session_id: &str, ip: &str, user_agent: &str) -> AppResult<bool> {
        let Some(record) = self
            .store
            .get_json::<SessionRecord>(&keys::session(session_id))
            .await?
        else {
            return Ok(false);
        };

        match record.fingerprint {
            Some(stored) => {
                let matches = stored == fingerprint(ip, user_agent);
                if !matches {
                    debug!(session_id = %session_id, "Fingerprint mismatch");
                }
                Ok(matches)
            }
            None => Ok(false),
        }
    }
}

//! Store key builders for all auth core entries.
//!
//! Centralising key construction prevents typos and makes it easy to find
//! every key the auth core uses.

use uuid::Uuid;

/// Prefix applied to all auth core keys.
const PREFIX: &str = "classhub:auth";

/// Key for a session record by ID.
pub fn session(session_id: &str) -> String {
    format!("{PREFIX}:session:{session_id}")
}

/// Key for the set of a user's active session IDs.
pub fn user_sessions(user_id: Uuid) -> String {
    format!("{PREFIX}:session:user:{user_id}")
}

/// Key for the per-user session version counter.
///
/// The counter is bumped by every invalidation cascade; any token minted
/// under an older version is detectably stale even if its record briefly
/// outlives the cascade.
pub fn session_version(user_id: Uuid) -> String {
    format!("{PREFIX}:session:ver:{user_id}")
}

/// Key for the per-user password history list.
pub fn password_history(user_id: Uuid) -> String {
    format!("{PREFIX}:pwd:history:{user_id}")
}

/// Key for the per-user password change rate counter.
pub fn password_change_rate(user_id: Uuid) -> String {
    format!("{PREFIX}:pwd:rate:{user_id}")
}

//! Session record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-tracked session record.
///
/// Records are created by the session manager on behalf of an upstream
/// authentication step and mutated only by it. Once a record transitions to
/// invalid it is never reactivated; a new record is minted instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier (random, URL-safe base64).
    pub session_id: String,
    /// Single-use secret allowing rotation without re-presenting credentials.
    pub refresh_token: String,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// The username at session creation time.
    pub username: String,
    /// The resolved role at session creation time.
    pub role: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last successful lookup or refresh.
    pub last_activity: DateTime<Utc>,
    /// Absolute expiry; strictly greater than `created_at`.
    pub expires_at: DateTime<Utc>,
    /// IP address the session was created from.
    pub ip_address: Option<String>,
    /// User-Agent header value at creation.
    pub user_agent: Option<String>,
    /// Caller-supplied device identifier.
    pub device_id: Option<String>,
    /// Client fingerprint captured at creation (hash of IP + User-Agent).
    pub fingerprint: Option<String>,
    /// Whether the session is active.
    pub is_active: bool,
}

impl SessionRecord {
    /// Check whether the session's absolute expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Remaining lifetime, zero when already expired.
    pub fn remaining_ttl(&self) -> std::time::Duration {
        (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }
}

//! Credential-change audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted by the credential change pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CredentialEvent {
    /// A user changed their own password.
    PasswordChanged {
        /// The user ID.
        user_id: Uuid,
        /// The username.
        username: String,
        /// IP address of the request, when known.
        ip_address: Option<String>,
        /// User-Agent of the request, when known.
        user_agent: Option<String>,
        /// How many sessions the cascade removed.
        sessions_invalidated: u64,
        /// When the change happened.
        occurred_at: DateTime<Utc>,
    },
    /// An administrator reset a user's password.
    PasswordReset {
        /// The administrator who performed the reset.
        admin_id: Uuid,
        /// The user whose password was reset.
        target_user_id: Uuid,
        /// The stated reason for the reset.
        reason: String,
        /// How many sessions the cascade removed (0 when logout was skipped).
        sessions_invalidated: u64,
        /// When the reset happened.
        occurred_at: DateTime<Utc>,
    },
}

//! Session-related audit events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A session was created.
    Created {
        /// The session ID.
        session_id: String,
        /// The user ID.
        user_id: Uuid,
        /// IP address the session was created from, when known.
        ip_address: Option<String>,
    },
    /// A session was explicitly invalidated (logout, admin action, cap eviction).
    Invalidated {
        /// The session ID.
        session_id: String,
        /// The user ID.
        user_id: Uuid,
    },
    /// A session was removed after its expiry passed.
    Expired {
        /// The session ID.
        session_id: String,
        /// The user ID.
        user_id: Uuid,
    },
    /// A session was superseded by a refresh.
    Rotated {
        /// The old session ID.
        old_session_id: String,
        /// The replacement session ID.
        new_session_id: String,
        /// The user ID.
        user_id: Uuid,
    },
    /// Every session of a user was invalidated in one cascade.
    AllInvalidated {
        /// The user ID.
        user_id: Uuid,
        /// Why the cascade was triggered.
        reason: String,
        /// How many sessions were removed.
        count: u64,
    },
    /// A refresh was attempted with a mismatched token.
    SuspiciousActivity {
        /// The targeted session ID.
        session_id: String,
        /// The user ID, when the session record was found.
        user_id: Option<Uuid>,
        /// What was observed.
        detail: String,
    },
    /// The per-user session cap was enforced by evicting surplus sessions.
    LimitEnforced {
        /// The user ID.
        user_id: Uuid,
        /// The session IDs that were evicted, oldest first.
        evicted: Vec<String>,
    },
}

//! Credential pipeline value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One retained prior credential hash.
///
/// Stored newest-first as a capped JSON list per user; the list persists
/// independently of session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHistoryEntry {
    /// The Argon2id hash in PHC string format.
    pub hash: String,
    /// When the hash was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of a strength validation. Pure function output, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no issues were found. The score is informational and does
    /// not feed into this flag.
    pub is_valid: bool,
    /// Strength score in `[0, 100]`.
    pub score: u8,
    /// Rule violations found.
    pub issues: Vec<String>,
    /// Actionable remediation text mirroring `issues`.
    pub suggestions: Vec<String>,
}

/// Result of a successful self-service password change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeOutcome {
    /// Whether the change completed.
    pub success: bool,
    /// How many sessions the invalidation cascade removed.
    pub sessions_invalidated: u64,
    /// Changes still allowed in the current 24-hour window.
    pub remaining_changes_today: u32,
    /// Strength score of the accepted password.
    pub password_strength_score: u8,
    /// What the caller must do next (always `"re-authenticate"`).
    pub action_required: String,
}

/// Result of a successful administrative password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOutcome {
    /// Whether the reset completed.
    pub success: bool,
    /// How many sessions were invalidated (0 when logout was skipped).
    pub sessions_invalidated: u64,
    /// The administrator who performed the reset.
    pub reset_by: Uuid,
    /// The stated reason for the reset.
    pub reset_reason: String,
    /// The new credential hash, returned so the caller's credential table
    /// can persist it — the auth core does not own that table.
    pub password_hash: String,
}

/// The active password policy, exposed for client display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,
    /// Maximum password length.
    pub max_length: usize,
    /// Character classes a password must contain.
    pub required_classes: Vec<String>,
    /// Number of prior hashes checked for reuse.
    pub history_depth: usize,
    /// Maximum self-service changes per 24-hour window.
    pub max_changes_per_day: u32,
}

//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in minutes.
    #[serde(default = "default_timeout")]
    pub timeout_minutes: u64,
    /// Maximum concurrent active sessions per user. Creating a session past
    /// the cap evicts the surplus oldest sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions_per_user: usize,
    /// Interval for expired session cleanup in minutes (in-memory backend only).
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
    /// TTL in days for long-lived per-user bookkeeping (version counters).
    #[serde(default = "default_bookkeeping_ttl_days")]
    pub bookkeeping_ttl_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: default_timeout(),
            max_sessions_per_user: default_max_sessions(),
            cleanup_interval_minutes: default_cleanup_interval(),
            bookkeeping_ttl_days: default_bookkeeping_ttl_days(),
        }
    }
}

fn default_timeout() -> u64 {
    720
}

fn default_max_sessions() -> usize {
    5
}

fn default_cleanup_interval() -> u64 {
    15
}

fn default_bookkeeping_ttl_days() -> u64 {
    365
}

//! Password policy configuration.

use serde::{Deserialize, Serialize};

/// Password strength and change-pipeline policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Minimum password length.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Characters counted as special for the complexity requirement.
    #[serde(default = "default_special_chars")]
    pub special_chars: String,
    /// Passwords rejected outright when matched case-insensitively.
    #[serde(default = "default_common_passwords")]
    pub common_passwords: Vec<String>,
    /// Keyboard-walk substrings penalized as predictable patterns.
    #[serde(default = "default_keyboard_walks")]
    pub keyboard_walks: Vec<String>,
    /// Number of prior password hashes retained per user.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// TTL in days for the per-user password history list.
    #[serde(default = "default_history_ttl_days")]
    pub history_ttl_days: u64,
    /// Maximum self-service password changes per user per 24-hour window.
    #[serde(default = "default_max_changes")]
    pub max_changes_per_day: u32,
    /// Minimum score accepted on the privileged admin-reset path.
    #[serde(default = "default_admin_min_score")]
    pub admin_min_score: u8,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            special_chars: default_special_chars(),
            common_passwords: default_common_passwords(),
            keyboard_walks: default_keyboard_walks(),
            history_depth: default_history_depth(),
            history_ttl_days: default_history_ttl_days(),
            max_changes_per_day: default_max_changes(),
            admin_min_score: default_admin_min_score(),
        }
    }
}

fn default_min_length() -> usize {
    8
}

fn default_max_length() -> usize {
    128
}

fn default_special_chars() -> String {
    "!@#$%^&*()_+-=[]{}|;:,.<>?".to_string()
}

fn default_common_passwords() -> Vec<String> {
    [
        "password",
        "password1",
        "123456",
        "12345678",
        "123456789",
        "qwerty",
        "abc123",
        "letmein",
        "admin",
        "welcome",
        "monkey",
        "dragon",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_keyboard_walks() -> Vec<String> {
    [
        "qwer", "wert", "erty", "rtyu", "tyui", "yuio", "uiop", "asdf", "sdfg", "dfgh", "fghj",
        "ghjk", "hjkl", "zxcv", "xcvb", "cvbn", "vbnm", "1q2w", "2w3e", "3e4r", "qaz", "wsx",
        "edc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_history_depth() -> usize {
    5
}

fn default_history_ttl_days() -> u64 {
    365
}

fn default_max_changes() -> u32 {
    5
}

fn default_admin_min_score() -> u8 {
    50
}

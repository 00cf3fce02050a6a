//! Password strength scoring and rule checking.
//!
//! Deterministic and side-effect-free. Scoring starts at 100 and each rule
//! is penalized independently; `is_valid` depends only on the issue list,
//! never on the score. The score is informational, used by policy gates
//! such as the relaxed admin-reset bar.

use classhub_core::config::password::PasswordPolicyConfig;
use classhub_entity::ValidationResult;

/// Validates password strength against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    policy: PasswordPolicyConfig,
}

impl PasswordValidator {
    /// Creates a new validator from the password policy.
    pub fn new(policy: PasswordPolicyConfig) -> Self {
        Self { policy }
    }

    /// Validates a password, optionally checking it against the username.
    pub fn validate(&self, password: &str, username: Option<&str>) -> ValidationResult {
        let mut score: i32 = 100;
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        let length = password.chars().count();
        let folded = password.to_lowercase();

        if length < self.policy.min_length {
            score -= 30;
            issues.push(format!(
                "Password is too short (minimum {} characters)",
                self.policy.min_length
            ));
            suggestions.push(format!(
                "Use at least {} characters",
                self.policy.min_length
            ));
        }

        if length > self.policy.max_length {
            score -= 10;
            issues.push(format!(
                "Password is too long (maximum {} characters)",
                self.policy.max_length
            ));
            suggestions.push(format!(
                "Use at most {} characters",
                self.policy.max_length
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            score -= 15;
            issues.push("Password must contain at least one uppercase letter".to_string());
            suggestions.push("Add an uppercase letter".to_string());
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            score -= 15;
            issues.push("Password must contain at least one lowercase letter".to_string());
            suggestions.push("Add a lowercase letter".to_string());
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            score -= 15;
            issues.push("Password must contain at least one digit".to_string());
            suggestions.push("Add a digit".to_string());
        }

        if !password
            .chars()
            .any(|c| self.policy.special_chars.contains(c))
        {
            score -= 15;
            issues.push("Password must contain at least one special character".to_string());
            suggestions.push(format!(
                "Add a special character such as {}",
                self.policy.special_chars.chars().take(4).collect::<String>()
            ));
        }

        if self
            .policy
            .common_passwords
            .iter()
            .any(|common| common.to_lowercase() == folded)
        {
            score -= 50;
            issues.push("Password is too common".to_string());
            suggestions.push("Choose a password that is not on common-password lists".to_string());
        }

        if let Some(username) = username {
            if !username.is_empty() && folded.contains(&username.to_lowercase()) {
                score -= 20;
                issues.push("Password contains the username".to_string());
                suggestions.push("Do not include your username in the password".to_string());
            }
        }

        // Forbidden patterns are penalized once even when several match.
        if self.has_forbidden_pattern(&folded) {
            score -= 10;
            issues.push("Password contains a predictable pattern".to_string());
            suggestions
                .push("Avoid repeated characters, sequences, and keyboard rows".to_string());
        }

        if length > 12 {
            score += (((length - 12) * 2) as i32).min(20);
        }

        ValidationResult {
            is_valid: issues.is_empty(),
            score: score.clamp(0, 100) as u8,
            issues,
            suggestions,
        }
    }

    fn has_forbidden_pattern(&self, folded: &str) -> bool {
        has_repeated_run(folded)
            || has_ascending_run(folded)
            || self
                .policy
                .keyboard_walks
                .iter()
                .any(|walk| folded.contains(walk.as_str()))
    }
}

/// A character repeated 3+ times consecutively.
fn has_repeated_run(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// An ascending run of 3+ consecutive digits or letters ("123", "abc").
fn has_ascending_run(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(3).any(|w| {
        w.iter().all(|c| c.is_ascii_alphanumeric())
            && w[1] as u32 == w[0] as u32 + 1
            && w[2] as u32 == w[1] as u32 + 1
            && (w.iter().all(|c| c.is_ascii_digit()) || w.iter().all(|c| c.is_ascii_lowercase()))
    })
}

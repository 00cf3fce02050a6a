//! Credential pipeline error taxonomy.

use classhub_core::error::AppError;
use classhub_entity::ValidationResult;

/// Failures the change/reset pipeline can report to callers.
///
/// Each gate maps to one variant so API layers can translate them into
/// distinct status codes without string matching.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The per-user daily change quota is exhausted.
    #[error("Too many password changes; try again later")]
    RateLimited,

    /// The supplied current password did not verify.
    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    /// The new password failed strength validation. Carries the full
    /// result so callers can surface the issues and suggestions.
    #[error("New password does not meet the password policy")]
    WeakPassword(ValidationResult),

    /// The new password matches the current one or a retained prior one.
    #[error("New password was used recently; choose a different one")]
    PasswordReused,

    /// The session or credential store failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(err.into())
    }
}

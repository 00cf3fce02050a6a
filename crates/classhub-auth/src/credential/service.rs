//! The credential change and reset pipeline.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use classhub_core::config::password::PasswordPolicyConfig;
use classhub_core::events::{AuditSink, CredentialEvent};
use classhub_entity::{ChangeOutcome, PasswordPolicy, ResetOutcome, ValidationResult};
use classhub_store::StoreManager;

use super::errors::CredentialError;
use super::rate_limit::ChangeRateLimiter;
use super::store::CredentialStore;
use crate::password::{PasswordHasher, PasswordHistoryManager, PasswordValidator};
use crate::session::SessionManager;

/// Orchestrates password changes and administrative resets.
///
/// Gate order for a self-service change is fixed: rate limit, current
/// password, strength, reuse, then the write and the session cascade.
/// The cascade is not optional; a change that commits a new hash always
/// invalidates every session the user holds.
#[derive(Debug, Clone)]
pub struct CredentialChangeService {
    sessions: SessionManager,
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    history: PasswordHistoryManager,
    rate_limiter: ChangeRateLimiter,
    audit: Arc<dyn AuditSink>,
    policy: PasswordPolicyConfig,
}

impl CredentialChangeService {
    /// Creates the pipeline, wiring the hasher, validator, history, and
    /// rate limiter onto the shared store.
    pub fn new(
        sessions: SessionManager,
        credentials: Arc<dyn CredentialStore>,
        store: StoreManager,
        audit: Arc<dyn AuditSink>,
        policy: PasswordPolicyConfig,
    ) -> Self {
        let hasher = PasswordHasher::new();
        Self {
            sessions,
            credentials,
            hasher: hasher.clone(),
            validator: PasswordValidator::new(policy.clone()),
            history: PasswordHistoryManager::new(store.clone(), hasher, &policy),
            rate_limiter: ChangeRateLimiter::new(store, &policy),
            audit,
            policy,
        }
    }

    /// Self-service password change.
    ///
    /// On success the user's sessions are all gone and the outcome tells
    /// the caller to re-authenticate. The returned hash has already been
    /// persisted through the credential store.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        username: &str,
        current_password: &str,
        new_password: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<ChangeOutcome, CredentialError> {
        let Some(remaining) = self.rate_limiter.try_acquire(user_id).await? else {
            warn!(user_id = %user_id, "Password change rejected: rate limited");
            return Err(CredentialError::RateLimited);
        };

        let Some(current_hash) = self.credentials.load_hash(user_id).await? else {
            warn!(user_id = %user_id, "Password change rejected: no stored credential");
            return Err(CredentialError::InvalidCurrentPassword);
        };
        if !self.hasher.verify(current_password, &current_hash)? {
            warn!(user_id = %user_id, "Password change rejected: current password mismatch");
            return Err(CredentialError::InvalidCurrentPassword);
        }

        let validation = self.validator.validate(new_password, Some(username));
        if !validation.is_valid {
            return Err(CredentialError::WeakPassword(validation));
        }

        if self.hasher.verify(new_password, &current_hash)?
            || self.history.is_reused(user_id, new_password).await?
        {
            return Err(CredentialError::PasswordReused);
        }

        // History records each accepted hash, so the window is exactly the
        // configured depth including the current credential. The direct
        // current-hash check above covers credentials seeded outside this
        // pipeline, which never enter history.
        let new_hash = self.hasher.hash(new_password)?;
        self.credentials.store_hash(user_id, &new_hash).await?;
        self.history.add(user_id, &new_hash).await?;

        let sessions_invalidated = self
            .sessions
            .invalidate_all_sessions(user_id, "password_change")
            .await?;

        info!(
            user_id = %user_id,
            sessions_invalidated = sessions_invalidated,
            "Password changed"
        );
        self.audit.emit(
            CredentialEvent::PasswordChanged {
                user_id,
                username: username.to_string(),
                ip_address: ip_address.map(str::to_string),
                user_agent: user_agent.map(str::to_string),
                sessions_invalidated,
                occurred_at: Utc::now(),
            }
            .into(),
        );

        Ok(ChangeOutcome {
            success: true,
            sessions_invalidated,
            remaining_changes_today: remaining,
            password_strength_score: validation.score,
            action_required: "re-authenticate".to_string(),
        })
    }

    /// Administrative password reset.
    ///
    /// Skips the rate limit and the current-password gate; the strength
    /// gate is relaxed to a minimum score so administrators can hand out
    /// provisional passwords that miss a character class. The reuse gate
    /// does not apply. `force_logout` controls the session cascade.
    pub async fn reset_password(
        &self,
        admin_id: Uuid,
        target_user_id: Uuid,
        new_password: &str,
        reason: &str,
        force_logout: bool,
    ) -> Result<ResetOutcome, CredentialError> {
        let validation = self.validator.validate(new_password, None);
        if validation.score < self.policy.admin_min_score {
            return Err(CredentialError::WeakPassword(validation));
        }

        let new_hash = self.hasher.hash(new_password)?;
        self.credentials.store_hash(target_user_id, &new_hash).await?;
        self.history.add(target_user_id, &new_hash).await?;

        let sessions_invalidated = if force_logout {
            self.sessions
                .invalidate_all_sessions(target_user_id, "admin_password_reset")
                .await?
        } else {
            0
        };

        info!(
            admin_id = %admin_id,
            target_user_id = %target_user_id,
            force_logout = force_logout,
            "Password reset by administrator"
        );
        self.audit.emit(
            CredentialEvent::PasswordReset {
                admin_id,
                target_user_id,
                reason: reason.to_string(),
                sessions_invalidated,
                occurred_at: Utc::now(),
            }
            .into(),
        );

        Ok(ResetOutcome {
            success: true,
            sessions_invalidated,
            reset_by: admin_id,
            reset_reason: reason.to_string(),
            password_hash: new_hash,
        })
    }

    /// Runs strength validation without touching any state.
    pub fn validate_password(&self, password: &str, username: Option<&str>) -> ValidationResult {
        self.validator.validate(password, username)
    }

    /// The active policy in client-displayable form.
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.policy.min_length,
            max_length: self.policy.max_length,
            required_classes: vec![
                "uppercase".to_string(),
                "lowercase".to_string(),
                "digit".to_string(),
                "special".to_string(),
            ],
            history_depth: self.policy.history_depth,
            max_changes_per_day: self.policy.max_changes_per_day,
        }
    }
}

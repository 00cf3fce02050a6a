//! Per-user daily change-attempt quota.

use std::time::Duration;

use uuid::Uuid;

use classhub_core::config::password::PasswordPolicyConfig;
use classhub_core::result::AppResult;
use classhub_core::traits::store::SessionStore;
use classhub_store::{StoreManager, keys};

const WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed-window counter over the shared store.
///
/// The counter and its 24-hour window are created atomically in a single
/// round trip, so concurrent first attempts cannot race the expiry.
#[derive(Debug, Clone)]
pub struct ChangeRateLimiter {
    store: StoreManager,
    max_per_day: u32,
}

impl ChangeRateLimiter {
    /// Creates a new rate limiter from the password policy.
    pub fn new(store: StoreManager, policy: &PasswordPolicyConfig) -> Self {
        Self {
            store,
            max_per_day: policy.max_changes_per_day,
        }
    }

    /// Consumes one change attempt. Returns the remaining quota after this
    /// attempt, or `None` when the window is exhausted.
    ///
    /// An attempt is consumed even when a later pipeline gate rejects the
    /// change; the quota bounds attempts, not successes.
    pub async fn try_acquire(&self, user_id: Uuid) -> AppResult<Option<u32>> {
        let count = self
            .store
            .incr_with_expire(&keys::password_change_rate(user_id), WINDOW)
            .await?;

        if count > i64::from(self.max_per_day) {
            return Ok(None);
        }
        Ok(Some(self.max_per_day - count as u32))
    }

    /// Reads the remaining quota without consuming an attempt.
    pub async fn remaining(&self, user_id: Uuid) -> AppResult<u32> {
        let used = match self
            .store
            .get(&keys::password_change_rate(user_id))
            .await?
        {
            Some(raw) => raw.parse::<u32>().unwrap_or(self.max_per_day),
            None => 0,
        };
        Ok(self.max_per_day.saturating_sub(used))
    }
}

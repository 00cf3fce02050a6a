//! Seam to the platform's credential table.

use async_trait::async_trait;
use uuid::Uuid;

use classhub_core::result::AppResult;

/// Access to the user credential table.
///
/// The auth core does not own user accounts; the embedding application
/// implements this against its own persistence and injects it into the
/// change pipeline.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Load the current credential hash for a user, `None` when the user
    /// has no stored credential.
    async fn load_hash(&self, user_id: Uuid) -> AppResult<Option<String>>;

    /// Persist a new credential hash for a user.
    async fn store_hash(&self, user_id: Uuid, hash: &str) -> AppResult<()>;
}

//! Shared fixtures for the auth integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use classhub_auth::{CredentialChangeService, CredentialStore, SessionManager};
use classhub_core::config::password::PasswordPolicyConfig;
use classhub_core::config::session::SessionConfig;
use classhub_core::config::store::MemoryStoreConfig;
use classhub_core::events::{AuditEvent, AuditSink};
use classhub_core::result::AppResult;
use classhub_store::StoreManager;
use classhub_store::memory::MemorySessionStore;

/// Credential table backed by a plain map.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    hashes: Mutex<HashMap<Uuid, String>>,
}

impl MemoryCredentialStore {
    pub fn seed(&self, user_id: Uuid, hash: &str) {
        self.hashes.lock().unwrap().insert(user_id, hash.to_string());
    }

    pub fn current_hash(&self, user_id: Uuid) -> Option<String> {
        self.hashes.lock().unwrap().get(&user_id).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load_hash(&self, user_id: Uuid) -> AppResult<Option<String>> {
        Ok(self.hashes.lock().unwrap().get(&user_id).cloned())
    }

    async fn store_hash(&self, user_id: Uuid, hash: &str) -> AppResult<()> {
        self.hashes.lock().unwrap().insert(user_id, hash.to_string());
        Ok(())
    }
}

/// Audit sink that records every event for assertions.
#[derive(Debug, Default)]
pub struct CapturingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl CapturingAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for CapturingAuditSink {
    fn emit(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A fully wired auth core over a fresh in-memory store.
pub struct TestHarness {
    pub store: StoreManager,
    pub sessions: SessionManager,
    pub credentials: Arc<MemoryCredentialStore>,
    pub service: CredentialChangeService,
    pub audit: Arc<CapturingAuditSink>,
}

pub fn harness() -> TestHarness {
    harness_with_policy(PasswordPolicyConfig::default())
}

pub fn harness_with_policy(policy: PasswordPolicyConfig) -> TestHarness {
    let store = StoreManager::from_backend(Arc::new(MemorySessionStore::new(
        &MemoryStoreConfig::default(),
    )));
    let audit = Arc::new(CapturingAuditSink::default());
    let credentials = Arc::new(MemoryCredentialStore::default());

    let sessions = SessionManager::new(
        store.clone(),
        audit.clone(),
        SessionConfig::default(),
    );
    let service = CredentialChangeService::new(
        sessions.clone(),
        credentials.clone(),
        store.clone(),
        audit.clone(),
        policy,
    );

    TestHarness {
        store,
        sessions,
        credentials,
        service,
        audit,
    }
}

//! Session lifecycle manager — creation, lookup, rotation, invalidation.
//!
//! The manager owns every mutation of session records. Multi-key writes
//! (record + per-user index + version counter) go through the store's
//! atomic batch so the index and the record store can never diverge.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;

use classhub_core::config::session::SessionConfig;
use classhub_core::error::AppError;
use classhub_core::events::{AuditSink, SessionEvent};
use classhub_core::result::AppResult;
use classhub_core::traits::store::{SessionStore, StoreOp};
use classhub_entity::SessionRecord;
use classhub_store::{StoreManager, keys};

use crate::fingerprint;

/// Manages the complete session record lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// Session persistence.
    store: StoreManager,
    /// Audit sink for lifecycle events.
    audit: Arc<dyn AuditSink>,
    /// Session configuration.
    config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(store: StoreManager, audit: Arc<dyn AuditSink>, config: SessionConfig) -> Self {
        Self {
            store,
            audit,
            config,
        }
    }

    /// Creates a session for an already-authenticated identity.
    ///
    /// Generates the session ID and refresh token, stores the record, adds
    /// it to the user's session index, initializes the per-user version
    /// counter if absent, then enforces the per-user session cap.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        username: &str,
        role: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        device_id: Option<&str>,
    ) -> AppResult<SessionRecord> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.config.timeout_minutes as i64);

        let client_fingerprint = match (ip_address, user_agent) {
            (None, None) => None,
            _ => Some(fingerprint::fingerprint(
                ip_address.unwrap_or(""),
                user_agent.unwrap_or(""),
            )),
        };

        let record = SessionRecord {
            session_id: generate_token(),
            refresh_token: generate_token(),
            user_id,
            username: username.to_string(),
            role: role.to_string(),
            created_at: now,
            last_activity: now,
            expires_at,
            ip_address: ip_address.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            device_id: device_id.map(str::to_string),
            fingerprint: client_fingerprint,
            is_active: true,
        };

        let ttl = record.remaining_ttl();
        let mut ops = vec![
            StoreOp::Put {
                key: keys::session(&record.session_id),
                value: serde_json::to_string(&record)?,
                ttl,
            },
            StoreOp::SetAdd {
                set_key: keys::user_sessions(user_id),
                member: record.session_id.clone(),
                ttl,
            },
        ];

        let version_key = keys::session_version(user_id);
        if self.store.get(&version_key).await?.is_none() {
            ops.push(StoreOp::Put {
                key: version_key,
                value: "1".to_string(),
                ttl: self.bookkeeping_ttl(),
            });
        }

        self.store.transaction(ops).await?;
        self.enforce_session_limit(user_id).await?;

        info!(
            user_id = %user_id,
            session_id = %record.session_id,
            "Session created"
        );
        self.audit.emit(
            SessionEvent::Created {
                session_id: record.session_id.clone(),
                user_id,
                ip_address: record.ip_address.clone(),
            }
            .into(),
        );

        Ok(record)
    }

    /// Fetches a session, lazily removing it when its expiry has passed.
    ///
    /// A successful lookup bumps `last_activity`.
    pub async fn get_session(&self, session_id: &str) -> AppResult<Option<SessionRecord>> {
        let Some(raw) = self.store.get(&keys::session(session_id)).await? else {
            return Ok(None);
        };
        let mut record: SessionRecord = serde_json::from_str(&raw)?;

        if record.is_expired() {
            self.remove_expired(&record).await?;
            return Ok(None);
        }

        record.last_activity = Utc::now();
        self.store
            .put(
                &keys::session(session_id),
                &serde_json::to_string(&record)?,
                record.remaining_ttl(),
            )
            .await?;

        Ok(Some(record))
    }

    /// Invalidates a single session. Idempotent: returns `false` when no
    /// record was found.
    pub async fn invalidate_session(&self, session_id: &str) -> AppResult<bool> {
        let Some(raw) = self.store.get(&keys::session(session_id)).await? else {
            return Ok(false);
        };
        let record: SessionRecord = serde_json::from_str(&raw)?;

        self.store
            .transaction(vec![
                StoreOp::Delete {
                    key: keys::session(session_id),
                },
                StoreOp::SetRemove {
                    set_key: keys::user_sessions(record.user_id),
                    member: session_id.to_string(),
                },
            ])
            .await?;

        info!(
            user_id = %record.user_id,
            session_id = %session_id,
            "Session invalidated"
        );
        self.audit.emit(
            SessionEvent::Invalidated {
                session_id: session_id.to_string(),
                user_id: record.user_id,
            }
            .into(),
        );

        Ok(true)
    }

    /// Invalidates every session of a user in one atomic cascade.
    ///
    /// Deletes all records in the user's session index, clears the index,
    /// and bumps the per-user version counter — a floor that marks any
    /// token minted before this point as stale even if a record briefly
    /// outlives the cascade. Returns the number of records removed.
    ///
    /// This is invoked unconditionally after every successful credential
    /// change or forced admin reset.
    pub async fn invalidate_all_sessions(&self, user_id: Uuid, reason: &str) -> AppResult<u64> {
        let set_key = keys::user_sessions(user_id);
        let members = self.store.set_members(&set_key).await?;

        let mut count = 0u64;
        let mut ops = Vec::with_capacity(members.len() + 2);
        for session_id in &members {
            if self.store.get(&keys::session(session_id)).await?.is_some() {
                count += 1;
            }
            ops.push(StoreOp::Delete {
                key: keys::session(session_id),
            });
        }
        ops.push(StoreOp::Delete { key: set_key });
        ops.push(StoreOp::Incr {
            key: keys::session_version(user_id),
            ttl: self.bookkeeping_ttl(),
        });

        self.store.transaction(ops).await?;

        info!(
            user_id = %user_id,
            reason = %reason,
            count = count,
            "All sessions invalidated"
        );
        self.audit.emit(
            SessionEvent::AllInvalidated {
                user_id,
                reason: reason.to_string(),
                count,
            }
            .into(),
        );

        Ok(count)
    }

    /// Rotates a session: a matching refresh token yields a brand-new
    /// record and the old identifier is never revivable.
    ///
    /// A mismatched token is reported to the audit sink as suspicious
    /// activity but returned to the caller exactly like a missing session,
    /// so an attacker cannot distinguish "wrong token" from "no such
    /// session". Nothing is mutated on a mismatch.
    pub async fn refresh_session(
        &self,
        session_id: &str,
        refresh_token: &str,
    ) -> AppResult<Option<SessionRecord>> {
        let Some(raw) = self.store.get(&keys::session(session_id)).await? else {
            return Ok(None);
        };
        let old: SessionRecord = serde_json::from_str(&raw)?;

        if old.is_expired() {
            self.remove_expired(&old).await?;
            return Ok(None);
        }

        if old.refresh_token != refresh_token {
            warn!(session_id = %session_id, "Refresh attempted with mismatched token");
            self.audit.emit(
                SessionEvent::SuspiciousActivity {
                    session_id: session_id.to_string(),
                    user_id: Some(old.user_id),
                    detail: "refresh token mismatch".to_string(),
                }
                .into(),
            );
            return Ok(None);
        }

        let now = Utc::now();
        let record = SessionRecord {
            session_id: generate_token(),
            refresh_token: generate_token(),
            created_at: now,
            last_activity: now,
            expires_at: now + chrono::Duration::minutes(self.config.timeout_minutes as i64),
            is_active: true,
            ..old.clone()
        };

        let ttl = record.remaining_ttl();
        self.store
            .transaction(vec![
                StoreOp::Put {
                    key: keys::session(&record.session_id),
                    value: serde_json::to_string(&record)?,
                    ttl,
                },
                StoreOp::SetAdd {
                    set_key: keys::user_sessions(record.user_id),
                    member: record.session_id.clone(),
                    ttl,
                },
                StoreOp::Delete {
                    key: keys::session(session_id),
                },
                StoreOp::SetRemove {
                    set_key: keys::user_sessions(record.user_id),
                    member: session_id.to_string(),
                },
            ])
            .await?;

        info!(
            user_id = %record.user_id,
            old_session_id = %session_id,
            new_session_id = %record.session_id,
            "Session rotated"
        );
        self.audit.emit(
            SessionEvent::Rotated {
                old_session_id: session_id.to_string(),
                new_session_id: record.session_id.clone(),
                user_id: record.user_id,
            }
            .into(),
        );

        Ok(Some(record))
    }

    /// Returns all currently-active sessions for a user, oldest first,
    /// lazily pruning expired records and stale index entries.
    pub async fn get_user_sessions(&self, user_id: Uuid) -> AppResult<Vec<SessionRecord>> {
        let set_key = keys::user_sessions(user_id);
        let members = self.store.set_members(&set_key).await?;

        let mut active = Vec::new();
        let mut prune = Vec::new();
        let mut expired = Vec::new();

        for session_id in members {
            match self.store.get(&keys::session(&session_id)).await? {
                Some(raw) => {
                    let record: SessionRecord = serde_json::from_str(&raw)?;
                    if record.is_expired() {
                        prune.push(StoreOp::Delete {
                            key: keys::session(&session_id),
                        });
                        prune.push(StoreOp::SetRemove {
                            set_key: set_key.clone(),
                            member: session_id,
                        });
                        expired.push(record);
                    } else {
                        active.push(record);
                    }
                }
                None => {
                    // Record expired out from under the index.
                    prune.push(StoreOp::SetRemove {
                        set_key: set_key.clone(),
                        member: session_id,
                    });
                }
            }
        }

        if !prune.is_empty() {
            self.store.transaction(prune).await?;
        }
        for record in expired {
            self.audit.emit(
                SessionEvent::Expired {
                    session_id: record.session_id,
                    user_id: record.user_id,
                }
                .into(),
            );
        }

        active.sort_by_key(|record| record.created_at);
        Ok(active)
    }

    /// Reads the per-user session version counter (0 when never set).
    pub async fn session_version(&self, user_id: Uuid) -> AppResult<i64> {
        match self.store.get(&keys::session_version(user_id)).await? {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|e| AppError::store(format!("Corrupt session version counter: {e}"))),
            None => Ok(0),
        }
    }

    /// Actively removes expired entries on backends without native TTL
    /// expiry. A no-op (0) on Redis.
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        self.store.sweep_expired().await
    }

    /// Evicts the surplus oldest sessions when a user exceeds the cap.
    async fn enforce_session_limit(&self, user_id: Uuid) -> AppResult<()> {
        let sessions = self.get_user_sessions(user_id).await?;
        let max = self.config.max_sessions_per_user;
        if sessions.len() <= max {
            return Ok(());
        }

        let surplus = sessions.len() - max;
        let mut evicted = Vec::with_capacity(surplus);
        for record in sessions.iter().take(surplus) {
            self.invalidate_session(&record.session_id).await?;
            evicted.push(record.session_id.clone());
        }

        warn!(
            user_id = %user_id,
            evicted = evicted.len(),
            max_sessions = max,
            "Session cap enforced"
        );
        self.audit
            .emit(SessionEvent::LimitEnforced { user_id, evicted }.into());

        Ok(())
    }

    /// Removes an expired record and its index entry, emitting the event.
    async fn remove_expired(&self, record: &SessionRecord) -> AppResult<()> {
        self.store
            .transaction(vec![
                StoreOp::Delete {
                    key: keys::session(&record.session_id),
                },
                StoreOp::SetRemove {
                    set_key: keys::user_sessions(record.user_id),
                    member: record.session_id.clone(),
                },
            ])
            .await?;

        self.audit.emit(
            SessionEvent::Expired {
                session_id: record.session_id.clone(),
                user_id: record.user_id,
            }
            .into(),
        );
        Ok(())
    }

    fn bookkeeping_ttl(&self) -> Duration {
        Duration::from_secs(self.config.bookkeeping_ttl_days * 24 * 60 * 60)
    }
}

/// Generates a 256-bit random token, URL-safe base64 without padding.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

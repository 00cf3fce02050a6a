//! Audit sink trait and the tracing-backed default implementation.

use tracing::{info, warn};

use super::{AuditEvent, CredentialEvent, SessionEvent};

/// Structured audit sink.
///
/// The sink is injected at construction; suspicious-activity and
/// mass-invalidation events are emitted regardless of whether the triggering
/// call ultimately succeeds.
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    /// Emit one audit event.
    fn emit(&self, event: AuditEvent);
}

/// Default sink that writes audit events as structured tracing records
/// under the `audit` target.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        match &event {
            AuditEvent::Session(SessionEvent::SuspiciousActivity {
                session_id,
                user_id,
                detail,
            }) => {
                warn!(
                    target: "audit",
                    session_id = %session_id,
                    user_id = ?user_id,
                    detail = %detail,
                    "Suspicious activity"
                );
            }
            AuditEvent::Session(SessionEvent::AllInvalidated {
                user_id,
                reason,
                count,
            }) => {
                info!(
                    target: "audit",
                    user_id = %user_id,
                    reason = %reason,
                    count = count,
                    "All sessions invalidated"
                );
            }
            other => {
                info!(target: "audit", event = ?other, "Audit event");
            }
        }
    }
}

//! Audit event types and the audit sink trait.

pub mod credential;
pub mod session;
pub mod sink;

pub use credential::CredentialEvent;
pub use session::SessionEvent;
pub use sink::{AuditSink, TracingAuditSink};

use serde::{Deserialize, Serialize};

/// Any event the auth core emits to the audit sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditEvent {
    /// A session lifecycle event.
    Session(SessionEvent),
    /// A credential change or reset event.
    Credential(CredentialEvent),
}

impl From<SessionEvent> for AuditEvent {
    fn from(event: SessionEvent) -> Self {
        Self::Session(event)
    }
}

impl From<CredentialEvent> for AuditEvent {
    fn from(event: CredentialEvent) -> Self {
        Self::Credential(event)
    }
}

//! # classhub-auth
//!
//! Session lifecycle management and the credential-change pipeline for the
//! ClassHub platform. This crate guarantees the core security contract:
//! changing or resetting a credential invalidates every existing session
//! for that identity.
//!
//! ## Modules
//!
//! - `session` — Session record lifecycle (create, lookup, refresh, invalidate)
//! - `password` — Argon2id hashing, strength scoring, and reuse history
//! - `credential` — The change/reset pipeline with rate limiting and the
//!   invalidation cascade
//! - `fingerprint` — Client fingerprint derivation and comparison

pub mod credential;
pub mod fingerprint;
pub mod password;
pub mod session;

pub use credential::{ChangeRateLimiter, CredentialChangeService, CredentialError, CredentialStore};
pub use fingerprint::FingerprintValidator;
pub use password::{PasswordHasher, PasswordHistoryManager, PasswordValidator};
pub use session::SessionManager;

//! The credential change/reset pipeline.
//!
//! Every successful credential mutation ends in a full session
//! invalidation cascade for the affected user (the admin reset can skip
//! it explicitly). The pipeline gates run in a fixed order so the
//! cheapest checks reject first and no Argon2 work happens for
//! rate-limited callers.

pub mod errors;
pub mod rate_limit;
pub mod service;
pub mod store;

pub use errors::CredentialError;
pub use rate_limit::ChangeRateLimiter;
pub use service::CredentialChangeService;
pub use store::CredentialStore;

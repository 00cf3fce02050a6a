//! # classhub-core
//!
//! Core crate for the ClassHub auth core. Contains the session store
//! capability trait, configuration schemas, audit event types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other ClassHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

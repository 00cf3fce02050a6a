//! # classhub-entity
//!
//! Domain value objects for the ClassHub auth core. Every struct in this
//! crate crosses the storage boundary through an explicit serde step; all
//! entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod credential;
pub mod session;

pub use credential::{
    ChangeOutcome, PasswordHistoryEntry, PasswordPolicy, ResetOutcome, ValidationResult,
};
pub use session::SessionRecord;

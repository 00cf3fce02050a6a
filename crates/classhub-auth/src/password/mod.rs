//! Password hashing, strength validation, and reuse history.

pub mod hasher;
pub mod history;
pub mod validator;

pub use hasher::PasswordHasher;
pub use history::PasswordHistoryManager;
pub use validator::PasswordValidator;

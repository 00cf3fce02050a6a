//! Session record lifecycle.

pub mod manager;

pub use manager::SessionManager;

//! Traits implemented at the seams of the auth core.

pub mod store;

pub use store::{SessionStore, StoreOp};

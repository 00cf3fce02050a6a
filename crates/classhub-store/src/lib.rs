//! # classhub-store
//!
//! Session store implementations for the ClassHub auth core. Supports two
//! backends:
//!
//! - **memory**: In-process store using [dashmap](https://crates.io/crates/dashmap),
//!   single-process only — development and testing
//! - **redis**: Shared store using the [redis](https://crates.io/crates/redis) crate,
//!   safe across processes and instances
//!
//! The backend is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;

//! In-process session store backend.

pub mod store;

pub use store::MemorySessionStore;

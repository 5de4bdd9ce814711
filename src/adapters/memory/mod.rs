//! In-memory storage adapter.
//!
//! Implements every repository port over a single lock-protected set of
//! tables. Used by tests and by local runs with `database.url = "memory://"`.

mod store;

pub use store::InMemoryStore;

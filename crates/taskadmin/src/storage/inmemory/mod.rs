//! In-memory storage backend.
//!
//! Stores tasks, runs and artifacts in maps wrapped in `Arc<RwLock<_>>`.
//! Data is lost when the process exits. Used by default and in tests.

mod repository;

pub use repository::InMemoryRepository;

//! In-memory cache backend implementation.
//!
//! Single-instance deployments and tests use this backend.

mod cache;

pub use cache::MemoryCache;

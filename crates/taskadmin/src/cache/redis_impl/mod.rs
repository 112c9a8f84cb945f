//! Redis cache backend implementation.
//!
//! Provides a cache shared by every instance of the service.

mod cache;
mod error;

pub use cache::RedisCache;

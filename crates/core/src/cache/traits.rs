use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key-value store with per-key expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. A miss is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL, replacing any existing value.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

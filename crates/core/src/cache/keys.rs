//! Cache key templates.
//!
//! These strings are shared with every other process that reads or fills
//! the cache, so they must not change.

use std::time::Duration;

/// Expiry applied to every cache entry.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Returns the cache key for a task.
pub fn task_key(task_id: u64) -> String {
    format!("task:{}", task_id)
}

/// Returns the cache key for a user.
pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// Returns the cache key for a user's role list.
pub fn user_roles_key(user_id: &str) -> String {
    format!("user-roles:{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_key() {
        assert_eq!(task_key(42), "task:42");
    }

    #[test]
    fn test_user_key() {
        assert_eq!(user_key("auth0|abc"), "user:auth0|abc");
    }

    #[test]
    fn test_user_roles_key() {
        assert_eq!(user_roles_key("u1"), "user-roles:u1");
    }

    #[test]
    fn test_ttl_is_one_hour() {
        assert_eq!(CACHE_TTL.as_secs(), 3600);
    }
}

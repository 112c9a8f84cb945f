//! Cached role lookup shared by user reads and the user-list fan-out.

use std::sync::Arc;

use tracing::warn;

use taskadmin_core::cache::{Cache, UserRolesCache};
use taskadmin_core::identity::IdentityProvider;
use taskadmin_core::user::{User, UserRole};

use super::error::{Result, ServiceError};

/// Resolves a user's roles through `user-roles:<id>`, falling back to the
/// identity service on a miss.
#[derive(Clone)]
pub struct RoleResolver {
    identity: Arc<dyn IdentityProvider>,
    cache: UserRolesCache,
}

impl RoleResolver {
    pub fn new(identity: Arc<dyn IdentityProvider>, cache: Arc<dyn Cache>) -> Self {
        Self {
            identity,
            cache: UserRolesCache::new(cache),
        }
    }

    /// Returns the roles of `user_id`.
    ///
    /// A failure to populate the cache after a miss is logged and ignored.
    pub async fn roles_for(&self, user_id: &str) -> Result<Vec<UserRole>> {
        if let Some(roles) = self.cache.get(user_id).await? {
            return Ok(roles);
        }

        let roles = self.identity.list_user_roles(user_id).await?;
        if let Err(err) = self.cache.set_for(user_id, &roles).await {
            warn!(user_id, error = %err, "Failed to cache user roles");
        }
        Ok(roles)
    }

    /// Attaches the user's roles. A user without an id is an error.
    pub async fn attach(&self, mut user: User) -> Result<User> {
        let user_id = user.id.clone().ok_or(ServiceError::MissingUserId)?;
        user.roles = Some(self.roles_for(&user_id).await?);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskadmin_core::cache::serialize_user_roles;
    use taskadmin_core::user::IdentityRole;

    use crate::services::testing::{CacheOp, CountingIdentity, RecordingCache};

    fn setup() -> (RoleResolver, Arc<CountingIdentity>, Arc<RecordingCache>) {
        let identity = Arc::new(CountingIdentity::with_users([(
            User::with_id("u1"),
            vec![IdentityRole::Member],
        )]));
        let cache = Arc::new(RecordingCache::new());
        let resolver = RoleResolver::new(identity.clone(), cache.clone());
        (resolver, identity, cache)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates() {
        let (resolver, identity, cache) = setup();

        let roles = resolver.roles_for("u1").await.unwrap();

        assert_eq!(roles, vec![UserRole::Member]);
        assert_eq!(identity.role_calls(), 1);
        assert_eq!(
            cache.ops(),
            vec![
                CacheOp::Get("user-roles:u1".to_string()),
                CacheOp::Set("user-roles:u1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_hit_skips_identity_service() {
        let (resolver, identity, cache) = setup();
        let bytes = serialize_user_roles(&[UserRole::Admin]).unwrap();
        cache.put_raw("user-roles:u1", &bytes).await;

        let roles = resolver.roles_for("u1").await.unwrap();

        assert_eq!(roles, vec![UserRole::Admin]);
        assert_eq!(identity.role_calls(), 0);
    }

    #[tokio::test]
    async fn test_population_failure_is_not_fatal() {
        let (resolver, _, cache) = setup();
        cache.fail_sets();

        let roles = resolver.roles_for("u1").await.unwrap();

        assert_eq!(roles, vec![UserRole::Member]);
    }

    #[tokio::test]
    async fn test_cache_read_failure_propagates() {
        let (resolver, identity, cache) = setup();
        cache.fail_gets();

        let result = resolver.roles_for("u1").await;

        assert!(matches!(result, Err(ServiceError::Cache(_))));
        assert_eq!(identity.role_calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_an_error() {
        let (resolver, _, cache) = setup();
        cache.put_raw("user-roles:u1", b"not json").await;

        let result = resolver.roles_for("u1").await;

        assert!(matches!(result, Err(ServiceError::Cache(_))));
    }

    #[tokio::test]
    async fn test_attach_requires_id() {
        let (resolver, _, _) = setup();

        let result = resolver.attach(User::default()).await;

        assert!(matches!(result, Err(ServiceError::MissingUserId)));
    }
}

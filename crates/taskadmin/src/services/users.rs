//! User operations proxied to the identity service.

use std::sync::Arc;

use tracing::{debug, error};

use taskadmin_core::cache::{Cache, UserCache, UserRolesCache};
use taskadmin_core::identity::IdentityProvider;
use taskadmin_core::storage::Pagination;
use taskadmin_core::user::{IdentityRole, User, UserError, UserPage, UserRole};

use super::error::Result;
use super::fan_out::try_fan_out;
use super::roles::RoleResolver;

/// Owns the user and user-roles cache policies.
pub struct UserService {
    identity: Arc<dyn IdentityProvider>,
    users: UserCache,
    user_roles: UserRolesCache,
    resolver: RoleResolver,
}

fn require_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(UserError::EmptyUserId.into());
    }
    Ok(())
}

impl UserService {
    pub fn new(identity: Arc<dyn IdentityProvider>, cache: Arc<dyn Cache>) -> Self {
        Self {
            resolver: RoleResolver::new(identity.clone(), cache.clone()),
            users: UserCache::new(cache.clone()),
            user_roles: UserRolesCache::new(cache),
            identity,
        }
    }

    /// Lists one page of users with their roles attached.
    ///
    /// Roles are looked up concurrently, one unit per user. Any failed
    /// lookup fails the whole page.
    pub async fn list_users(&self, pagination: Pagination) -> Result<UserPage> {
        let page = self
            .identity
            .list_users(pagination.zero_based_page(), pagination.limit())
            .await?;
        debug!(
            page = pagination.page,
            count = page.data.len(),
            total = page.total,
            "Enriching user page with roles"
        );

        let resolver = self.resolver.clone();
        let data = try_fan_out(page.data, move |user| {
            let resolver = resolver.clone();
            async move { resolver.attach(user).await }
        })
        .await
        .inspect_err(|err| error!(error = %err, "Failed to enrich user page"))?;

        Ok(UserPage {
            total: page.total,
            data,
        })
    }

    /// Gets a user with roles attached, cached under `user:<id>`.
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        require_id(user_id)?;
        if let Some(user) = self.users.get(user_id).await? {
            return Ok(user);
        }

        let mut user = self.identity.get_user(user_id).await?;
        user.id.get_or_insert_with(|| user_id.to_string());
        let user = self.resolver.attach(user).await?;
        self.users.set_for(user_id, &user).await?;
        Ok(user)
    }

    /// Updates a user's profile. The id in the path wins over any id in the body.
    pub async fn update_user(&self, user_id: &str, mut update: User) -> Result<User> {
        require_id(user_id)?;
        update.id = Some(user_id.to_string());
        let updated = self.identity.update_user(user_id, &update).await?;
        self.users.invalidate(user_id).await?;
        Ok(updated)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        require_id(user_id)?;
        self.identity.delete_user(user_id).await?;
        self.users.invalidate(user_id).await?;
        self.user_roles.invalidate(user_id).await?;
        Ok(())
    }

    /// Reads a user's roles straight from the identity service.
    pub async fn list_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>> {
        require_id(user_id)?;
        Ok(self.identity.list_user_roles(user_id).await?)
    }

    pub async fn assign_role(&self, user_id: &str, role: UserRole) -> Result<()> {
        require_id(user_id)?;
        let role = IdentityRole::try_from(role)?;
        self.identity.assign_role(user_id, role).await?;
        self.invalidate_user(user_id).await
    }

    pub async fn remove_role(&self, user_id: &str, role: UserRole) -> Result<()> {
        require_id(user_id)?;
        let role = IdentityRole::try_from(role)?;
        self.identity.remove_role(user_id, role).await?;
        self.invalidate_user(user_id).await
    }

    async fn invalidate_user(&self, user_id: &str) -> Result<()> {
        self.users.invalidate(user_id).await?;
        self.user_roles.invalidate(user_id).await?;
        Ok(())
    }
}

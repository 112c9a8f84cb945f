use async_trait::async_trait;

use crate::user::{IdentityRole, User, UserPage, UserRole};

use super::Result;

/// The external identity service that owns users and their roles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Lists one page of users. `page` is 0-based.
    async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage>;

    /// Gets a user by id. Fails with `NotFound` if it does not exist.
    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// Updates the profile fields present in `update` and returns the stored user.
    async fn update_user(&self, user_id: &str, update: &User) -> Result<User>;

    /// Deletes a user.
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// Lists every role assigned to a user.
    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>>;

    /// Assigns a role to a user. Assigning a held role is a no-op.
    async fn assign_role(&self, user_id: &str, role: IdentityRole) -> Result<()>;

    /// Removes a role from a user. Removing a role the user lacks is a no-op.
    async fn remove_role(&self, user_id: &str, role: IdentityRole) -> Result<()>;
}

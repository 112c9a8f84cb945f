//! In-memory identity directory.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use taskadmin_core::identity::{IdentityError, IdentityProvider, Result};
use taskadmin_core::user::{IdentityRole, User, UserPage, UserRole};

/// Identity directory held in process memory.
///
/// Users are listed in id order. Roles are stored per user in assignment
/// order and are never embedded in the stored user record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    users: Arc<RwLock<BTreeMap<String, User>>>,
    roles: Arc<RwLock<HashMap<String, Vec<IdentityRole>>>>,
}

impl InMemoryIdentityProvider {
    /// Creates a directory holding the given users and their roles.
    ///
    /// Users without an id are skipped.
    pub fn with_users(entries: impl IntoIterator<Item = (User, Vec<IdentityRole>)>) -> Self {
        let mut users = BTreeMap::new();
        let mut roles = HashMap::new();
        for (mut user, assigned) in entries {
            let Some(id) = user.id.clone() else {
                continue;
            };
            user.roles = None;
            users.insert(id.clone(), user);
            roles.insert(id, assigned);
        }
        Self {
            users: Arc::new(RwLock::new(users)),
            roles: Arc::new(RwLock::new(roles)),
        }
    }

    /// Creates a directory with a few demo accounts.
    pub fn seeded() -> Self {
        Self::with_users([
            (
                User::with_id("local|admin")
                    .with_email("admin@example.com")
                    .with_name("Ada Admin"),
                vec![IdentityRole::Admin, IdentityRole::User],
            ),
            (
                User::with_id("local|member")
                    .with_email("member@example.com")
                    .with_name("Mo Member"),
                vec![IdentityRole::Member],
            ),
            (
                User::with_id("local|user")
                    .with_email("user@example.com")
                    .with_name("Uma User"),
                vec![IdentityRole::User],
            ),
        ])
    }

    async fn require_user(&self, user_id: &str) -> Result<()> {
        if self.users.read().await.contains_key(user_id) {
            Ok(())
        } else {
            Err(not_found(user_id))
        }
    }
}

fn not_found(user_id: &str) -> IdentityError {
    IdentityError::NotFound {
        user_id: user_id.to_string(),
    }
}

/// Copies every field present in `update` onto `user`, except the id and roles.
fn merge_profile(user: &mut User, update: &User) {
    macro_rules! merge {
        ($($field:ident),+) => {
            $(if let Some(value) = &update.$field {
                user.$field = Some(value.clone());
            })+
        };
    }
    merge!(
        connection,
        email,
        name,
        given_name,
        family_name,
        username,
        nickname,
        screen_name,
        location,
        last_login,
        picture
    );
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage> {
        let users = self.users.read().await;
        let skip = (page as usize).saturating_mul(per_page as usize);
        Ok(UserPage {
            total: users.len() as u64,
            data: users
                .values()
                .skip(skip)
                .take(per_page as usize)
                .cloned()
                .collect(),
        })
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        self.users
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| not_found(user_id))
    }

    async fn update_user(&self, user_id: &str, update: &User) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(|| not_found(user_id))?;
        merge_profile(user, update);
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.users
            .write()
            .await
            .remove(user_id)
            .ok_or_else(|| not_found(user_id))?;
        self.roles.write().await.remove(user_id);
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>> {
        self.require_user(user_id).await?;
        let roles = self.roles.read().await;
        Ok(roles
            .get(user_id)
            .map(|assigned| assigned.iter().copied().map(UserRole::from).collect())
            .unwrap_or_default())
    }

    async fn assign_role(&self, user_id: &str, role: IdentityRole) -> Result<()> {
        self.require_user(user_id).await?;
        let mut roles = self.roles.write().await;
        let assigned = roles.entry(user_id.to_string()).or_default();
        if !assigned.contains(&role) {
            assigned.push(role);
        }
        Ok(())
    }

    async fn remove_role(&self, user_id: &str, role: IdentityRole) -> Result<()> {
        self.require_user(user_id).await?;
        if let Some(assigned) = self.roles.write().await.get_mut(user_id) {
            assigned.retain(|r| *r != role);
        }
        Ok(())
    }
}

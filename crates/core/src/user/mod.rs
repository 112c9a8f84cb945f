mod error;
mod role;
mod types;

pub use error::UserError;
pub use role::{role_from_identity_name, IdentityRole, UserRole};
pub use types::{RoleRequest, User, UserPage};

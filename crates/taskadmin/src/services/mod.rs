//! Service layer. Owns the cache policy and composes stores with the
//! identity provider.

mod error;
mod fan_out;
mod roles;
mod tasks;
mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, ServiceError};
pub use tasks::TaskService;
pub use users::UserService;

mod accessor;
mod error;
mod keys;
mod serialization;
mod traits;

pub use accessor::{
    CacheAccessor, CacheKind, TaskCache, TaskEntry, UserCache, UserEntry, UserRolesCache,
    UserRolesEntry,
};
pub use error::{CacheError, Result};
pub use keys::{task_key, user_key, user_roles_key, CACHE_TTL};
pub use serialization::{
    deserialize_task, deserialize_user, deserialize_user_roles, serialize_task, serialize_user,
    serialize_user_roles, SerializationError,
};
pub use traits::Cache;

//! Cache-aside accessors.
//!
//! One [`CacheAccessor`] per entity kind owns key formatting, serialization
//! and the TTL for that kind. Callers only see typed values:
//!
//! - `get` returns `Ok(None)` on a miss and an error on a corrupt entry or a
//!   cache failure. A bad entry is never reported as a miss.
//! - `set` overwrites unconditionally with [`CACHE_TTL`].
//! - `invalidate` deletes the key; a missing key is not an error.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::serialization::{
    deserialize_task, deserialize_user, deserialize_user_roles, serialize_task, serialize_user,
    serialize_user_roles, SerializationError,
};
use super::{task_key, user_key, user_roles_key, Cache, CacheError, Result, CACHE_TTL};
use crate::task::TaskDto;
use crate::user::{User, UserRole};

/// Describes how one entity kind is stored in the cache.
pub trait CacheKind: Send + Sync + 'static {
    /// Identifier the key is derived from.
    type Id: ?Sized + Sync;
    /// The cached representation.
    type Value: Send + Sync;

    /// Short name used in logs.
    const NAME: &'static str;

    fn key(id: &Self::Id) -> String;

    /// Derives the key from the value's own identifier, if it carries one.
    fn key_of(value: &Self::Value) -> Option<String>;

    fn encode(value: &Self::Value) -> std::result::Result<Vec<u8>, SerializationError>;

    fn decode(bytes: &[u8]) -> std::result::Result<Self::Value, SerializationError>;
}

/// Tasks, cached in their external shape under `task:<id>`.
pub struct TaskEntry;

impl CacheKind for TaskEntry {
    type Id = u64;
    type Value = TaskDto;

    const NAME: &'static str = "task";

    fn key(id: &u64) -> String {
        task_key(*id)
    }

    fn key_of(value: &TaskDto) -> Option<String> {
        value.id.parse::<u64>().ok().map(task_key)
    }

    fn encode(value: &TaskDto) -> std::result::Result<Vec<u8>, SerializationError> {
        serialize_task(value)
    }

    fn decode(bytes: &[u8]) -> std::result::Result<TaskDto, SerializationError> {
        deserialize_task(bytes)
    }
}

/// Users under `user:<id>`.
pub struct UserEntry;

impl CacheKind for UserEntry {
    type Id = str;
    type Value = User;

    const NAME: &'static str = "user";

    fn key(id: &str) -> String {
        user_key(id)
    }

    fn key_of(value: &User) -> Option<String> {
        value.id.as_deref().map(user_key)
    }

    fn encode(value: &User) -> std::result::Result<Vec<u8>, SerializationError> {
        serialize_user(value)
    }

    fn decode(bytes: &[u8]) -> std::result::Result<User, SerializationError> {
        deserialize_user(bytes)
    }
}

/// A user's role list under `user-roles:<id>`.
pub struct UserRolesEntry;

impl CacheKind for UserRolesEntry {
    type Id = str;
    type Value = Vec<UserRole>;

    const NAME: &'static str = "user-roles";

    fn key(id: &str) -> String {
        user_roles_key(id)
    }

    fn key_of(_value: &Vec<UserRole>) -> Option<String> {
        None
    }

    fn encode(value: &Vec<UserRole>) -> std::result::Result<Vec<u8>, SerializationError> {
        serialize_user_roles(value)
    }

    fn decode(bytes: &[u8]) -> std::result::Result<Vec<UserRole>, SerializationError> {
        deserialize_user_roles(bytes)
    }
}

/// Typed get/set/invalidate for one entity kind over a shared [`Cache`].
pub struct CacheAccessor<K: CacheKind> {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    kind: PhantomData<K>,
}

pub type TaskCache = CacheAccessor<TaskEntry>;
pub type UserCache = CacheAccessor<UserEntry>;
pub type UserRolesCache = CacheAccessor<UserRolesEntry>;

impl<K: CacheKind> Clone for CacheAccessor<K> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
            kind: PhantomData,
        }
    }
}

impl<K: CacheKind> CacheAccessor<K> {
    /// Creates an accessor that writes entries with [`CACHE_TTL`].
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            ttl: CACHE_TTL,
            kind: PhantomData,
        }
    }

    /// Reads the cached value for `id`.
    pub async fn get(&self, id: &K::Id) -> Result<Option<K::Value>> {
        let key = K::key(id);
        match self.cache.get(&key).await? {
            Some(bytes) => {
                let value = K::decode(&bytes)?;
                tracing::trace!(kind = K::NAME, cache_key = %key, "Cache hit");
                Ok(Some(value))
            }
            None => {
                tracing::trace!(kind = K::NAME, cache_key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Stores `value` under the key derived from its own identifier.
    pub async fn set(&self, value: &K::Value) -> Result<()> {
        let key = K::key_of(value).ok_or_else(|| {
            CacheError::OperationFailed(format!("{} value has no usable identifier", K::NAME))
        })?;
        self.write(&key, value).await
    }

    /// Stores `value` under the key for `id`.
    pub async fn set_for(&self, id: &K::Id, value: &K::Value) -> Result<()> {
        self.write(&K::key(id), value).await
    }

    /// Deletes the entry for `id`.
    pub async fn invalidate(&self, id: &K::Id) -> Result<()> {
        let key = K::key(id);
        self.cache.delete(&key).await?;
        tracing::trace!(kind = K::NAME, cache_key = %key, "Cache entry invalidated");
        Ok(())
    }

    async fn write(&self, key: &str, value: &K::Value) -> Result<()> {
        let bytes = K::encode(value)?;
        self.cache.set(key, &bytes, Some(self.ttl)).await?;
        tracing::trace!(kind = K::NAME, cache_key = %key, "Cache entry stored");
        Ok(())
    }
}

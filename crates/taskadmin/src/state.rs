//! Application state.
//!
//! Handlers only see the two services. The concrete stores, cache and
//! identity backend behind them are picked at compile time via feature flags.

use std::sync::Arc;

use taskadmin_core::cache::Cache;
use taskadmin_core::identity::IdentityProvider;
use taskadmin_core::storage::{ArtifactRepository, TaskRepository, TaskRunRepository};

#[cfg(feature = "auth0")]
use taskadmin_auth::JwtValidator;

use crate::config::Config;
use crate::services::{TaskService, UserService};

/// Shared application state, cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskService>,
    pub users: Arc<UserService>,
    /// Validates bearer tokens on `/api`.
    #[cfg(feature = "auth0")]
    pub jwt: Arc<JwtValidator>,
}

struct Stores {
    tasks: Arc<dyn TaskRepository>,
    runs: Arc<dyn TaskRunRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
}

impl AppState {
    /// Connects every backend selected by the enabled features.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let stores = build_stores(config).await?;
        let cache = build_cache(config).await?;
        let identity = build_identity(config)?;

        tracing::info!(environment = %config.environment, "Backends initialized");

        Ok(Self {
            tasks: Arc::new(TaskService::new(
                stores.tasks,
                stores.runs,
                stores.artifacts,
                cache.clone(),
            )),
            users: Arc::new(UserService::new(identity, cache)),
            #[cfg(feature = "auth0")]
            jwt: Arc::new(build_validator(config)?),
        })
    }
}

// ============================================================================
// Factory functions for the feature-selected backends
// ============================================================================

#[cfg_attr(
    all(feature = "inmemory", not(feature = "dynamodb")),
    allow(unused_variables)
)]
async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    #[cfg(feature = "inmemory")]
    let relational = Arc::new(crate::storage::InMemoryRepository::new());

    #[cfg(feature = "sqlite")]
    let relational = Arc::new(crate::storage::SqliteRepository::new(&config.sqlite_path).await?);

    #[cfg(feature = "dynamodb")]
    let artifacts: Arc<dyn ArtifactRepository> = Arc::new(
        crate::storage::DynamoDbArtifactRepository::from_region(
            &config.region,
            config.dynamodb_table.clone(),
        )
        .await,
    );

    #[cfg(not(feature = "dynamodb"))]
    let artifacts: Arc<dyn ArtifactRepository> = relational.clone();

    Ok(Stores {
        tasks: relational.clone(),
        runs: relational,
        artifacts,
    })
}

#[cfg(feature = "memory")]
async fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    Ok(Arc::new(crate::cache::MemoryCache::new(
        config.cache_max_entries,
    )))
}

#[cfg(feature = "redis")]
async fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    Ok(Arc::new(
        crate::cache::RedisCache::new(&config.redis_url).await?,
    ))
}

#[cfg(feature = "auth0")]
fn auth0_config(config: &Config) -> anyhow::Result<&crate::config::Auth0Config> {
    use anyhow::Context;

    config.auth0.as_ref().context(
        "AUTH0_DOMAIN, AUTH0_AUDIENCE, AUTH0_CLIENT_ID and AUTH0_CLIENT_SECRET must be set",
    )
}

#[cfg(feature = "auth0")]
fn build_identity(config: &Config) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    let auth0 = auth0_config(config)?;
    Ok(Arc::new(crate::identity::Auth0IdentityProvider::new(auth0)))
}

#[cfg(not(feature = "auth0"))]
fn build_identity(_config: &Config) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    tracing::warn!("auth0 feature disabled, serving users from the seeded in-memory directory");
    Ok(Arc::new(crate::identity::InMemoryIdentityProvider::seeded()))
}

#[cfg(feature = "auth0")]
fn build_validator(config: &Config) -> anyhow::Result<JwtValidator> {
    let auth0 = auth0_config(config)?;
    Ok(JwtValidator::from_jwks(taskadmin_auth::JwtConfig::for_auth0(
        &auth0.domain,
        auth0.audience.clone(),
    )))
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    use crate::cache::MemoryCache;
    use crate::identity::InMemoryIdentityProvider;
    use crate::storage::InMemoryRepository;

    /// JWT secret accepted by [`AppState::for_tests`] with `auth0`.
    #[cfg(feature = "auth0")]
    pub const TEST_JWT_SECRET: &[u8] = b"taskadmin-test-secret";

    impl AppState {
        /// State over in-memory stores, cache and the seeded directory.
        pub fn for_tests() -> Self {
            let repo = Arc::new(InMemoryRepository::new());
            let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(1_000));

            Self {
                tasks: Arc::new(TaskService::new(
                    repo.clone(),
                    repo.clone(),
                    repo,
                    cache.clone(),
                )),
                users: Arc::new(UserService::new(
                    Arc::new(InMemoryIdentityProvider::seeded()),
                    cache,
                )),
                #[cfg(feature = "auth0")]
                jwt: Arc::new(JwtValidator::new(
                    Arc::new(taskadmin_auth::StaticKeySource::hmac(TEST_JWT_SECRET)),
                    taskadmin_auth::JwtConfig::for_auth0("tenant.example.com", "taskadmin"),
                )),
            }
        }
    }
}

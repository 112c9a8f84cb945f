use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment name (default: "development")
    pub environment: String,
    /// AWS region for DynamoDB (default: "us-east-1")
    #[cfg_attr(not(feature = "dynamodb"), allow(dead_code))]
    pub region: String,
    /// Path to SQLite database file (default: "taskadmin.db")
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    pub sqlite_path: String,
    /// DynamoDB table holding task run artifacts (default: "task_run_artifacts")
    #[cfg_attr(not(feature = "dynamodb"), allow(dead_code))]
    pub dynamodb_table: String,
    /// Redis connection URL (default: "redis://127.0.0.1:6379")
    #[cfg_attr(not(feature = "redis"), allow(dead_code))]
    pub redis_url: String,
    /// Maximum number of in-process cache entries (default: 10,000)
    #[cfg_attr(not(feature = "memory"), allow(dead_code))]
    pub cache_max_entries: usize,
    /// Auth0 tenant settings. Required with the `auth0` feature.
    #[cfg_attr(not(feature = "auth0"), allow(dead_code))]
    pub auth0: Option<Auth0Config>,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_allow_origins: Vec<String>,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
}

/// Auth0 tenant and machine-to-machine application settings.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "auth0"), allow(dead_code))]
pub struct Auth0Config {
    pub domain: String,
    pub audience: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `APP_ENV` - Environment name (default: "development")
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `SQLITE_PATH` - SQLite database path (default: "taskadmin.db")
    /// - `DYNAMODB_TABLE` - Artifact table name (default: "task_run_artifacts")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://127.0.0.1:6379")
    /// - `CACHE_MAX_ENTRIES` - Maximum in-process cache entries (default: 10,000)
    /// - `AUTH0_DOMAIN`, `AUTH0_AUDIENCE`, `AUTH0_CLIENT_ID`, `AUTH0_CLIENT_SECRET`
    /// - `CORS_ALLOW_ORIGINS` - Comma-separated origins (default: any)
    /// - `REQUEST_TIMEOUT_SECS` - Request timeout (default: 10)
    pub fn from_env() -> Self {
        Self {
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "taskadmin.db".to_string()),
            dynamodb_table: env::var("DYNAMODB_TABLE")
                .unwrap_or_else(|_| "task_run_artifacts".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(10_000),
            auth0: Auth0Config::from_env(),
            cors_allow_origins: env::var("CORS_ALLOW_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Auth0Config {
    /// Returns `None` unless every Auth0 variable is set.
    fn from_env() -> Option<Self> {
        Some(Self {
            domain: env::var("AUTH0_DOMAIN").ok()?,
            audience: env::var("AUTH0_AUDIENCE").ok()?,
            client_id: env::var("AUTH0_CLIENT_ID").ok()?,
            client_secret: env::var("AUTH0_CLIENT_SECRET").ok()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "test".to_string(),
            region: "us-east-1".to_string(),
            sqlite_path: "taskadmin.db".to_string(),
            dynamodb_table: "task_run_artifacts".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_max_entries: 10_000,
            auth0: None,
            cors_allow_origins: Vec::new(),
            request_timeout_secs: 10,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

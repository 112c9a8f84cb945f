//! Signing-key sources for token validation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use crate::AuthError;

/// Supplies the key used to verify a token's signature.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// The only algorithm tokens from this source may use.
    fn algorithm(&self) -> Algorithm;

    /// Returns the verification key for the token's `kid` header.
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError>;
}

/// A single fixed key, regardless of `kid`.
pub struct StaticKeySource {
    key: DecodingKey,
    algorithm: Algorithm,
}

impl StaticKeySource {
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self { key, algorithm }
    }

    /// HMAC-SHA256 shared secret.
    pub fn hmac(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    async fn decoding_key(&self, _kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        Ok(self.key.clone())
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Keys published at a JWKS endpoint.
///
/// The key set is cached for `ttl`. A `kid` missing from a fresh cache
/// triggers one refetch, which picks up rotated keys.
pub struct JwksKeySource {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    algorithm: Algorithm,
    cached: RwLock<Option<CachedKeys>>,
}

impl JwksKeySource {
    /// Creates an RS256 key source for the given JWKS URL.
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self::with_algorithm(url, ttl, Algorithm::RS256)
    }

    pub fn with_algorithm(url: impl Into<String>, ttl: Duration, algorithm: Algorithm) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            ttl,
            algorithm,
            cached: RwLock::new(None),
        }
    }

    async fn cached_key(&self, kid: &str) -> Option<Jwk> {
        let guard = self.cached.read().await;
        let cached = guard.as_ref()?;
        if cached.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        cached.keys.find(kid).cloned()
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.url, "Fetching JWKS");

        let keys: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        *self.cached.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }
}

#[async_trait]
impl KeySource for JwksKeySource {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        let kid = kid.ok_or_else(|| AuthError::InvalidToken("token has no kid".to_string()))?;

        let jwk = match self.cached_key(kid).await {
            Some(jwk) => jwk,
            None => self
                .fetch()
                .await?
                .find(kid)
                .cloned()
                .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?,
        };

        DecodingKey::from_jwk(&jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

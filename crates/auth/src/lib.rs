//! Bearer token validation for the taskadmin API.
//!
//! This crate provides:
//! - A JWT validator with pluggable signing-key sources (remote JWKS or a static key)
//! - An axum middleware that rejects requests without a valid token
//! - The [`Claims`] it places in request extensions

mod claims;
mod config;
mod error;
mod keys;
mod middleware;
mod validator;

pub use claims::Claims;
pub use config::JwtConfig;
pub use error::AuthError;
pub use keys::{JwksKeySource, KeySource, StaticKeySource};
pub use middleware::require_jwt;
pub use validator::JwtValidator;

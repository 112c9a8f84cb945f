//! Identity service backends.
//!
//! - `InMemoryIdentityProvider`: seeded directory used without `auth0` and in tests
//! - `Auth0IdentityProvider` (`auth0` feature): Auth0 management API client

#[cfg(feature = "auth0")]
mod auth0;
#[cfg(any(not(feature = "auth0"), test))]
mod inmemory;

#[cfg(feature = "auth0")]
pub use auth0::Auth0IdentityProvider;
#[cfg(any(not(feature = "auth0"), test))]
pub use inmemory::InMemoryIdentityProvider;

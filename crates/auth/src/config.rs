use std::time::Duration;

/// Settings for validating access tokens issued by an OIDC provider.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Expected `iss` claim, with trailing slash (e.g. `https://tenant.auth0.com/`).
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Allowed clock skew for `exp` and `nbf`.
    pub leeway: Duration,
    /// How long a fetched key set is trusted before it is fetched again.
    pub jwks_ttl: Duration,
}

impl JwtConfig {
    /// Configuration for an Auth0 tenant.
    pub fn for_auth0(domain: &str, audience: impl Into<String>) -> Self {
        let domain = domain.trim_start_matches("https://").trim_end_matches('/');
        Self {
            issuer: format!("https://{}/", domain),
            audience: audience.into(),
            leeway: Duration::from_secs(30),
            jwks_ttl: Duration::from_secs(5 * 60),
        }
    }

    /// Location of the issuer's published key set.
    pub fn jwks_url(&self) -> String {
        format!("{}.well-known/jwks.json", self.issuer)
    }
}

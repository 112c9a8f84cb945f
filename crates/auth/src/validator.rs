use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Validation};

use crate::{AuthError, Claims, JwksKeySource, JwtConfig, KeySource};

/// Validates bearer tokens against an issuer, an audience and a key source.
pub struct JwtValidator {
    source: Arc<dyn KeySource>,
    config: JwtConfig,
}

impl JwtValidator {
    pub fn new(source: Arc<dyn KeySource>, config: JwtConfig) -> Self {
        Self { source, config }
    }

    /// Validator backed by the issuer's published JWKS.
    pub fn from_jwks(config: JwtConfig) -> Self {
        let source = JwksKeySource::new(config.jwks_url(), config.jwks_ttl);
        Self::new(Arc::new(source), config)
    }

    /// Verifies the signature and the registered claims, returning the claims.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let algorithm = self.source.algorithm();
        if header.alg != algorithm {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let key = self.source.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = self.config.leeway.as_secs();
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.should_reject {
            return Err(AuthError::Rejected);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
    use serde_json::json;

    use crate::StaticKeySource;

    pub(crate) const SECRET: &[u8] = b"validator-test-secret";
    pub(crate) const ISSUER: &str = "https://tenant.auth0.com/";
    pub(crate) const AUDIENCE: &str = "https://api.taskadmin.test";

    pub(crate) fn test_validator() -> JwtValidator {
        let config = JwtConfig {
            issuer: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
            leeway: Duration::from_secs(30),
            jwks_ttl: Duration::from_secs(300),
        };
        JwtValidator::new(Arc::new(StaticKeySource::hmac(SECRET)), config)
    }

    pub(crate) fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    pub(crate) fn valid_claims() -> serde_json::Value {
        json!({
            "sub": "auth0|123",
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": get_current_timestamp() + 3600,
        })
    }

    #[tokio::test]
    async fn test_accepts_valid_token() {
        let claims = test_validator().validate(&sign(valid_claims())).await.unwrap();
        assert_eq!(claims.sub, "auth0|123");
        assert!(!claims.should_reject);
    }

    #[tokio::test]
    async fn test_rejects_expired_token() {
        let mut claims = valid_claims();
        claims["exp"] = json!(get_current_timestamp() - 120);
        let result = test_validator().validate(&sign(claims)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_allows_clock_skew_within_leeway() {
        let mut claims = valid_claims();
        claims["exp"] = json!(get_current_timestamp() - 10);
        assert!(test_validator().validate(&sign(claims)).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_wrong_audience() {
        let mut claims = valid_claims();
        claims["aud"] = json!("https://other.example.com");
        assert!(test_validator().validate(&sign(claims)).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_wrong_issuer() {
        let mut claims = valid_claims();
        claims["iss"] = json!("https://evil.example.com/");
        assert!(test_validator().validate(&sign(claims)).await.is_err());
    }

    #[tokio::test]
    async fn test_should_reject_claim() {
        let mut claims = valid_claims();
        claims["shouldReject"] = json!(true);
        let result = test_validator().validate(&sign(claims)).await;
        assert!(matches!(result, Err(AuthError::Rejected)));
    }

    #[tokio::test]
    async fn test_rejects_bad_signature() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &valid_claims(),
            &EncodingKey::from_secret(b"someone-else"),
        )
        .unwrap();
        assert!(test_validator().validate(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let result = test_validator().validate("not.a.jwt").await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }
}

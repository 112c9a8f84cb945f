//! Management API access token.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Tokens are refreshed this long before the reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
pub(super) struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub audience: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// A bearer token and the instant after which it must be refreshed.
#[derive(Debug, Clone)]
pub(super) struct CachedToken {
    pub value: String,
    refresh_at: Instant,
}

impl CachedToken {
    pub fn new(response: TokenResponse, now: Instant) -> Self {
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(REFRESH_MARGIN);
        Self {
            value: response.access_token,
            refresh_at: now + lifetime,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

use serde::{Deserialize, Serialize};

/// Validated access token claims.
///
/// Inserted into request extensions by [`require_jwt`](crate::require_jwt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Forces rejection of an otherwise valid token.
    #[serde(rename = "shouldReject", default)]
    pub should_reject: bool,
}

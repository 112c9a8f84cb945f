//! Auth0 management API client.
//!
//! Authenticates with the client-credentials grant and keeps the resulting
//! token until shortly before it expires. Role ids are looked up by name
//! once and memoized.

mod token;

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use taskadmin_core::identity::{IdentityError, IdentityProvider, Result};
use taskadmin_core::user::{role_from_identity_name, IdentityRole, User, UserPage, UserRole};

use crate::config::Auth0Config;

use token::{CachedToken, TokenRequest, TokenResponse};

/// Page size used when walking a user's role assignments.
const ROLES_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct UsersPage {
    users: Vec<User>,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct RolesPage {
    roles: Vec<RoleRecord>,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct RoleRecord {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct RoleIds<'a> {
    roles: [&'a str; 1],
}

/// Identity provider backed by the Auth0 management API.
pub struct Auth0IdentityProvider {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    audience: String,
    token: Mutex<Option<CachedToken>>,
    role_ids: RwLock<HashMap<IdentityRole, String>>,
}

impl Auth0IdentityProvider {
    /// Creates a client for the tenant named in the configuration.
    pub fn new(config: &Auth0Config) -> Self {
        Self::with_base_url(config, format!("https://{}", config.domain))
    }

    fn with_base_url(config: &Auth0Config, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            audience: format!("https://{}/api/v2/", config.domain),
            base_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
            role_ids: RwLock::new(HashMap::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_path(user_id: &str) -> String {
        format!("/api/v2/users/{}", urlencoding::encode(user_id))
    }

    /// Returns a valid management API token, requesting a new one if needed.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        debug!("Requesting Auth0 management API token");
        let response = self
            .http
            .post(self.url("/oauth/token"))
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                audience: &self.audience,
            })
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;
        let response = check_status(response, None).await?;
        let body: TokenResponse = decode(response).await?;

        let token = CachedToken::new(body, Instant::now());
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Sends an authenticated request and rejects non-success statuses.
    async fn send(&self, request: RequestBuilder, user_id: Option<&str>) -> Result<Response> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(e.to_string()))?;
        check_status(response, user_id).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Resolves the Auth0 role id for a role name.
    async fn role_id(&self, role: IdentityRole) -> Result<String> {
        if let Some(id) = self.role_ids.read().await.get(&role) {
            return Ok(id.clone());
        }

        let request = self
            .request(Method::GET, "/api/v2/roles")
            .query(&[("name_filter", role.name())]);
        let roles: Vec<RoleRecord> = decode(self.send(request, None).await?).await?;
        let id = roles
            .into_iter()
            .find(|r| r.name == role.name())
            .map(|r| r.id)
            .ok_or_else(|| IdentityError::RoleNotDefined(role.name().to_string()))?;

        debug!(role = role.name(), role_id = %id, "Resolved Auth0 role id");
        self.role_ids.write().await.insert(role, id.clone());
        Ok(id)
    }

    async fn change_role(&self, method: Method, user_id: &str, role: IdentityRole) -> Result<()> {
        let role_id = self.role_id(role).await?;
        let request = self
            .request(method, &format!("{}/roles", Self::user_path(user_id)))
            .json(&RoleIds {
                roles: [role_id.as_str()],
            });
        self.send(request, Some(user_id)).await?;
        Ok(())
    }
}

/// Maps a non-success management API status to an identity error.
fn status_error(status: StatusCode, body: &str, user_id: Option<&str>) -> IdentityError {
    match (status, user_id) {
        (StatusCode::NOT_FOUND, Some(user_id)) => IdentityError::NotFound {
            user_id: user_id.to_string(),
        },
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            IdentityError::Unauthorized(format!("{status}: {body}"))
        }
        _ => IdentityError::RequestFailed(format!("{status}: {body}")),
    }
}

async fn check_status(response: Response, user_id: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(status_error(status, &body, user_id))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
}

/// Profile fields sent on update. Ids, roles and login times are not writable.
fn update_payload(update: &User) -> User {
    User {
        id: None,
        roles: None,
        last_login: None,
        ..update.clone()
    }
}

#[async_trait]
impl IdentityProvider for Auth0IdentityProvider {
    async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage> {
        let request = self.request(Method::GET, "/api/v2/users").query(&[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("include_totals", "true".to_string()),
        ]);
        let body: UsersPage = decode(self.send(request, None).await?).await?;
        Ok(UserPage {
            total: body.total,
            data: body.users,
        })
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let request = self.request(Method::GET, &Self::user_path(user_id));
        decode(self.send(request, Some(user_id)).await?).await
    }

    async fn update_user(&self, user_id: &str, update: &User) -> Result<User> {
        let request = self
            .request(Method::PATCH, &Self::user_path(user_id))
            .json(&update_payload(update));
        decode(self.send(request, Some(user_id)).await?).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &Self::user_path(user_id));
        self.send(request, Some(user_id)).await?;
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<UserRole>> {
        let path = format!("{}/roles", Self::user_path(user_id));
        let mut roles = Vec::new();
        let mut page = 0u32;

        loop {
            let request = self.request(Method::GET, &path).query(&[
                ("page", page.to_string()),
                ("per_page", ROLES_PER_PAGE.to_string()),
                ("include_totals", "true".to_string()),
            ]);
            let body: RolesPage = decode(self.send(request, Some(user_id)).await?).await?;
            let fetched = body.roles.len();
            roles.extend(body.roles.iter().map(|r| role_from_identity_name(&r.name)));

            if fetched == 0 || roles.len() as u64 >= body.total {
                break;
            }
            page += 1;
        }

        Ok(roles)
    }

    async fn assign_role(&self, user_id: &str, role: IdentityRole) -> Result<()> {
        self.change_role(Method::POST, user_id, role).await
    }

    async fn remove_role(&self, user_id: &str, role: IdentityRole) -> Result<()> {
        self.change_role(Method::DELETE, user_id, role).await
    }
}

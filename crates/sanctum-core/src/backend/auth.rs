//! Auth API client (`/auth/v1`).
//!
//! Credentials travel in the request body; tokens are never logged.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::{Endpoint, check_response, http_client};

/// User object as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata supplied at sign-up.
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl RemoteUser {
    /// Returns a non-empty string metadata value.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Session issued by the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry (unix seconds), when the service provides it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: RemoteUser,
}

/// Client for the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl AuthClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            http: http_client(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        self.endpoint.join(&format!("auth/v1/{path}"))
    }

    fn request(&self, method: reqwest::Method, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.endpoint.anon_key)
            .bearer_auth(bearer)
    }

    /// Registers a new identity. `metadata` is stored as the user's metadata.
    ///
    /// Returns the created user; any session the service may also return is
    /// ignored (sign-up never authenticates).
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<RemoteUser> {
        debug!("auth sign-up request");
        let response = self
            .request(reqwest::Method::POST, "signup", &self.endpoint.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await
            .context("Failed to send sign-up request")?;

        let body: Value = check_response(response)
            .await?
            .json()
            .await
            .context("Failed to parse sign-up response")?;

        // With auto-confirm the service wraps the user in a session.
        let user = body.get("user").cloned().unwrap_or(body);
        serde_json::from_value(user).context("Failed to parse sign-up user")
    }

    /// Exchanges email + password for a session.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        debug!("auth password grant request");
        let response = self
            .request(
                reqwest::Method::POST,
                "token?grant_type=password",
                &self.endpoint.anon_key,
            )
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .context("Failed to send sign-in request")?;

        check_response(response)
            .await?
            .json()
            .await
            .context("Failed to parse session response")
    }

    /// Exchanges a refresh token for a new session.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        debug!("auth refresh grant request");
        let response = self
            .request(
                reqwest::Method::POST,
                "token?grant_type=refresh_token",
                &self.endpoint.anon_key,
            )
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .context("Failed to send token refresh request")?;

        check_response(response)
            .await?
            .json()
            .await
            .context("Failed to parse session response")
    }

    /// Fetches the identity behind an access token.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn get_user(&self, access_token: &str) -> Result<RemoteUser> {
        let response = self
            .request(reqwest::Method::GET, "user", access_token)
            .send()
            .await
            .context("Failed to send user request")?;

        check_response(response)
            .await?
            .json()
            .await
            .context("Failed to parse user response")
    }

    /// Revokes the session behind an access token.
    ///
    /// # Errors
    /// Returns the service error unchanged, or a transport error.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        debug!("auth logout request");
        let response = self
            .request(reqwest::Method::POST, "logout", access_token)
            .send()
            .await
            .context("Failed to send logout request")?;

        check_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_parses_without_optional_fields() {
        let session: AuthSession = serde_json::from_str(
            r#"{
                "access_token": "at",
                "user": {"id": "7d3f9b0e-2c1a-4a57-9a43-1f0f2f5b8c11", "email": "a@b.co"}
            }"#,
        )
        .unwrap();
        assert_eq!(session.access_token, "at");
        assert!(session.refresh_token.is_none());
        assert!(session.user.user_metadata.is_empty());
    }

    #[test]
    fn test_metadata_str_ignores_blank_and_non_string() {
        let user: RemoteUser = serde_json::from_str(
            r#"{
                "id": "7d3f9b0e-2c1a-4a57-9a43-1f0f2f5b8c11",
                "user_metadata": {"username": "  ", "access_level": 3, "title": "Warden"}
            }"#,
        )
        .unwrap();
        assert_eq!(user.metadata_str("username"), None);
        assert_eq!(user.metadata_str("access_level"), None);
        assert_eq!(user.metadata_str("title"), Some("Warden"));
    }
}

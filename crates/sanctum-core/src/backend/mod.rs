//! HTTP clients for the hosted backend service.
//!
//! The service exposes two APIs under one base URL:
//! - `auth`: GoTrue-style identity endpoints under `/auth/v1`
//! - `rest`: PostgREST-style table endpoints under `/rest/v1`
//!
//! Both send the anonymous key in the `apikey` header and a bearer token
//! (the session access token, or the anon key when signed out).

pub mod auth;
pub mod rest;

use std::fmt;

use anyhow::Result;
use serde_json::Value;

pub use auth::{AuthClient, AuthSession, RemoteUser};
pub use rest::{Filter, Order, RestClient, SelectQuery};

/// Standard User-Agent header for sanctum API requests.
pub const USER_AGENT: &str = concat!("sanctum/", env!("CARGO_PKG_VERSION"));

/// Resolved service endpoint (base URL + anonymous key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub anon_key: String,
}

impl Endpoint {
    /// Used when no URL is configured. `.invalid` never resolves, so every
    /// request fails at request time.
    pub const UNREACHABLE_URL: &str = "https://placeholder.invalid";
    /// Used when no anon key is configured.
    pub const PLACEHOLDER_ANON_KEY: &str = "placeholder-anon-key";

    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Joins a path onto the base URL without doubling slashes.
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns true when the endpoint still points at the placeholder host.
    pub fn is_placeholder(&self) -> bool {
        self.url == Self::UNREACHABLE_URL
    }
}

/// Error reported by the backend service.
///
/// Carried inside `anyhow::Error` unchanged; callers may
/// `downcast_ref::<ServiceError>()` to inspect status or code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code.
    pub status: u16,
    /// Service error code (e.g. `PGRST116`, `invalid_credentials`).
    pub code: Option<String>,
    /// Human-readable message as returned by the service.
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ServiceError {
    /// Builds an error from an HTTP status and the raw response body.
    ///
    /// Understands both API error shapes:
    /// - tables: `{"code","message","details","hint"}`
    /// - auth: `{"msg"|"message"|"error_description"|"error", "code"|"error_code"}`
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |names: &[&str]| -> Option<String> {
            let obj = parsed.as_ref()?.as_object()?;
            names.iter().find_map(|name| match obj.get(*name)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        let message = field(&["message", "msg", "error_description", "error"])
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("Request failed with HTTP {status}")
                } else {
                    trimmed.to_string()
                }
            });

        Self {
            status,
            code: field(&["error_code", "code"]),
            message,
            details: field(&["details"]),
            hint: field(&["hint"]),
        }
    }

    /// Returns true for 401/403 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Returns true for any 4xx response.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Turns a non-success response into a `ServiceError`.
pub(crate) async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::from_response(status.as_u16(), &body).into())
}

/// Builds the shared reqwest client.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

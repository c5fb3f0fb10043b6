//! Auth endpoint client.
//!
//! Thin wrapper over the four session endpoints: renewal, sign-in exchange,
//! user profile and logout. It performs no retries and holds no state; the
//! session components decide what each failure means.

use serde::Deserialize;
use std::sync::Arc;

use super::credentials::{EmptyToken, UserProfile};
use crate::traits::http::set_bearer;
use crate::traits::{Headers, HttpClient, HttpError, IdentityAssertion, Response};

/// Renewal endpoint. The server reads the renewal cookie.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Sign-in exchange endpoint.
pub const SIGN_IN_PATH: &str = "/auth/google";

/// User profile endpoint.
pub const USER_PATH: &str = "/auth/user";

/// Server-side session invalidation endpoint.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Error type for auth endpoint calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    /// Body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Server returned a non-success status
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },
    /// Server answered with an empty access token
    #[error("Invalid token: {0}")]
    EmptyToken(#[from] EmptyToken),
}

impl ApiError {
    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Response from `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Response from `POST /auth/google`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub user: UserProfile,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// `GET /auth/user` may answer with the bare profile or wrap it in `user`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileEnvelope {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

/// Client for the session endpoints.
#[derive(Clone)]
pub struct AuthApi {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl AuthApi {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Whether `path` (with or without query string) is the renewal endpoint.
    pub fn is_refresh_path(path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        path.trim_end_matches('/') == REFRESH_PATH
    }

    /// Exchange the renewal cookie for a new access token.
    ///
    /// POST /auth/refresh
    pub async fn refresh(&self) -> Result<RefreshResponse, ApiError> {
        let response = self
            .http
            .post(&self.url(REFRESH_PATH), "", &Headers::new())
            .await?;
        let response = Self::ensure_success(response)?;
        Ok(response.json()?)
    }

    /// Exchange an identity-provider credential for an access token and profile.
    ///
    /// POST /auth/google
    pub async fn sign_in(&self, assertion: &IdentityAssertion) -> Result<SignInResponse, ApiError> {
        let body = serde_json::to_string(assertion)?;
        let response = self
            .http
            .post(&self.url(SIGN_IN_PATH), &body, &json_headers())
            .await?;
        let response = Self::ensure_success(response)?;
        Ok(response.json()?)
    }

    /// Fetch the profile of the user owning `access_token`.
    ///
    /// GET /auth/user
    pub async fn fetch_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let mut headers = Headers::new();
        set_bearer(&mut headers, access_token);
        let response = self.http.get(&self.url(USER_PATH), &headers).await?;
        let response = Self::ensure_success(response)?;
        let user = match response.json::<ProfileEnvelope>()? {
            ProfileEnvelope::Wrapped { user } => user,
            ProfileEnvelope::Bare(user) => user,
        };
        Ok(user)
    }

    /// Invalidate the session server-side.
    ///
    /// POST /auth/logout
    pub async fn logout(&self, access_token: Option<&str>) -> Result<(), ApiError> {
        let mut headers = Headers::new();
        if let Some(token) = access_token {
            set_bearer(&mut headers, token);
        }
        let response = self.http.post(&self.url(LOGOUT_PATH), "", &headers).await?;
        Self::ensure_success(response)?;
        Ok(())
    }

    /// Returns the response on success or the status and body as an error.
    fn ensure_success(response: Response) -> Result<Response, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ApiError::Status {
            status: response.status,
            message: message.chars().take(200).collect(),
        })
    }
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

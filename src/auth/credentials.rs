//! Access credential and user profile types.
//!
//! The access credential lives only in process memory. The long-lived renewal
//! credential is a cookie the client never reads.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Returned when a renewal or sign-in response carries an unusable token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access token is empty")]
pub struct EmptyToken;

/// Short-lived bearer token plus the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    issued_at: Instant,
    expires_at: Instant,
}

impl Credential {
    /// Create a credential valid for `lifetime` from now.
    ///
    /// Empty tokens are rejected: a stored credential is never an empty string.
    pub fn new(token: impl Into<String>, lifetime: Duration) -> Result<Self, EmptyToken> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(EmptyToken);
        }
        let issued_at = Instant::now();
        Ok(Self {
            token,
            issued_at,
            expires_at: issued_at + lifetime,
        })
    }

    /// Create a credential from an endpoint response.
    ///
    /// The lifetime is the first of: `expires_in` from the response, the `exp`
    /// claim of a JWT-shaped token, `default_lifetime`.
    pub fn issue(
        token: impl Into<String>,
        expires_in: Option<u64>,
        default_lifetime: Duration,
    ) -> Result<Self, EmptyToken> {
        let token = token.into();
        let lifetime = expires_in
            .filter(|secs| *secs > 0)
            .or_else(|| jwt_expires_in(&token))
            .map(Duration::from_secs)
            .unwrap_or(default_lifetime);
        Self::new(token, lifetime)
    }

    /// The bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Time left before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// When a proactive renewal should run: `margin` before expiry.
    ///
    /// If the margin is not shorter than the lifetime, renew at half-life
    /// instead so a short-lived token never yields a refresh point at or
    /// before its own issue instant.
    pub fn refresh_at(&self, margin: Duration) -> Instant {
        let lifetime = self.lifetime();
        if margin < lifetime {
            self.expires_at - margin
        } else {
            self.issued_at + lifetime / 2
        }
    }

    /// Short, non-reversible label for logs.
    pub fn fingerprint(&self) -> String {
        let tail: String = self
            .token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("…{} ({} bytes)", tail, self.token.len())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.fingerprint())
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// JWT claims for extracting expiration time.
#[derive(Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Seconds until a JWT access token expires.
///
/// Returns `None` if the token is not a JWT, has no `exp` claim, or is
/// already expired.
pub fn jwt_expires_in(access_token: &str) -> Option<u64> {
    let parts: Vec<&str> = access_token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&payload).ok()?;
    let now = chrono::Utc::now().timestamp();
    let remaining = claims.exp - now;
    if remaining > 0 {
        Some(remaining as u64)
    } else {
        None
    }
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Accept user ids sent either as strings or as integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(id) => Ok(id),
        RawId::Number(id) => Ok(id.to_string()),
    }
}

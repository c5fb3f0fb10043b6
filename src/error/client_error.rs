//! Unified error type returned by the request gateway.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Error from a call made through [`crate::session::RequestGateway`].
#[derive(Debug, Clone)]
pub enum ClientError {
    /// Session/credential failure.
    Auth(AuthError),

    /// Transport failure.
    Http(HttpError),

    /// The response body could not be decoded.
    Decode { message: String },
}

impl ClientError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Auth(AuthError::SessionChanged) => ErrorCategory::Interrupted,
            ClientError::Auth(_) => ErrorCategory::Session,
            ClientError::Http(HttpError::InvalidUrl(_)) => ErrorCategory::Request,
            ClientError::Http(HttpError::Cancelled) => ErrorCategory::Interrupted,
            ClientError::Http(_) => ErrorCategory::Transport,
            ClientError::Decode { .. } => ErrorCategory::Backend,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Check if this error requires re-authentication.
    pub fn requires_reauth(&self) -> bool {
        match self {
            ClientError::Auth(err) => err.requires_reauth(),
            _ => false,
        }
    }

    /// The auth error, if this is one.
    pub fn as_auth(&self) -> Option<&AuthError> {
        match self {
            ClientError::Auth(err) => Some(err),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ClientError::Auth(err) => err.user_message(),
            ClientError::Http(_) | ClientError::Decode { .. } => {
                self.category().recovery_hint().to_string()
            }
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Auth(err) => write!(f, "{}", err),
            ClientError::Http(err) => write!(f, "{}", err),
            ClientError::Decode { message } => write!(f, "Invalid response body: {}", message),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Auth(err) => Some(err),
            ClientError::Http(err) => Some(err),
            ClientError::Decode { .. } => None,
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(err: AuthError) -> Self {
        ClientError::Auth(err)
    }
}

impl From<HttpError> for ClientError {
    fn from(err: HttpError) -> Self {
        ClientError::Http(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode {
            message: err.to_string(),
        }
    }
}

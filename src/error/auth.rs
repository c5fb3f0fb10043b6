//! Authentication-related error types.
//!
//! This module defines the session failure taxonomy: what went wrong with a
//! credential, a renewal, a sign-in or a logout.

use std::fmt;

/// Authentication-specific error variants.
///
/// `AuthError` is `Clone` because one renewal outcome is delivered to every
/// caller that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A wrapped call received a 401 and could not be recovered.
    Unauthorized { path: String },

    /// The renewal call itself failed (network, non-success status, timeout).
    RefreshFailed { message: String },

    /// The identity-provider handshake or the sign-in exchange failed.
    SignInFailed { message: String },

    /// The server-side logout call failed. Local state is cleared anyway.
    LogoutCallFailed { message: String },

    /// The profile endpoint did not return a usable user.
    ProfileFetchFailed { message: String },

    /// The session was replaced or ended while a renewal was in flight, so
    /// the renewal's outcome was discarded.
    SessionChanged,

    /// No session exists.
    NotAuthenticated,
}

impl AuthError {
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        AuthError::RefreshFailed {
            message: message.into(),
        }
    }

    pub fn sign_in_failed(message: impl Into<String>) -> Self {
        AuthError::SignInFailed {
            message: message.into(),
        }
    }

    /// Check if this error means the user has to sign in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized { .. }
                | AuthError::RefreshFailed { .. }
                | AuthError::NotAuthenticated
        )
    }

    /// Whether this kind of error may ever be shown to the user.
    ///
    /// Renewal failures are only shown on the reactive path; that decision is
    /// made by the caller, not here.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            AuthError::LogoutCallFailed { .. }
                | AuthError::ProfileFetchFailed { .. }
                | AuthError::SessionChanged
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Unauthorized { .. } => {
                "You are not authorized to do that. Please sign in again.".to_string()
            }
            AuthError::RefreshFailed { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::SignInFailed { .. } => {
                "Sign-in failed. Please try again.".to_string()
            }
            AuthError::LogoutCallFailed { .. } => "You have been signed out.".to_string(),
            AuthError::ProfileFetchFailed { .. } => {
                "Could not load your profile. Please sign in again.".to_string()
            }
            AuthError::SessionChanged => {
                "Your session changed. Please try again.".to_string()
            }
            AuthError::NotAuthenticated => {
                "You are not signed in. Please sign in to continue.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized { .. } => "E_AUTH_UNAUTHORIZED",
            AuthError::RefreshFailed { .. } => "E_AUTH_REFRESH_FAIL",
            AuthError::SignInFailed { .. } => "E_AUTH_SIGN_IN",
            AuthError::LogoutCallFailed { .. } => "E_AUTH_LOGOUT",
            AuthError::ProfileFetchFailed { .. } => "E_AUTH_PROFILE",
            AuthError::SessionChanged => "E_AUTH_SESSION_CHANGED",
            AuthError::NotAuthenticated => "E_AUTH_NOT_AUTH",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthorized { path } => write!(f, "Unauthorized: {}", path),
            AuthError::RefreshFailed { message } => {
                write!(f, "Token refresh failed: {}", message)
            }
            AuthError::SignInFailed { message } => write!(f, "Sign-in failed: {}", message),
            AuthError::LogoutCallFailed { message } => {
                write!(f, "Logout call failed: {}", message)
            }
            AuthError::ProfileFetchFailed { message } => {
                write!(f, "Profile fetch failed: {}", message)
            }
            AuthError::SessionChanged => write!(f, "Session changed during renewal"),
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
        }
    }
}

impl std::error::Error for AuthError {}

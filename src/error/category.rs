//! Coarse classification of client failures.
//!
//! A category tells the caller what to do next: send the request again, sign
//! in again, wait for the API to be fixed, or fix the request itself.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The API could not be reached or did not answer in time.
    Transport,

    /// No usable session: renewal failed, sign-in failed, or the API still
    /// answers 401 after a renewal.
    Session,

    /// The session changed or the call was cancelled while it was running.
    Interrupted,

    /// The API answered with a body this client cannot read.
    Backend,

    /// The request was malformed before it left the client.
    Request,
}

impl ErrorCategory {
    /// Whether sending the same request again can succeed without any other
    /// action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transport | ErrorCategory::Interrupted)
    }

    /// Whether the user has to sign in before this can succeed.
    pub fn needs_sign_in(&self) -> bool {
        matches!(self, ErrorCategory::Session)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Session => "session",
            ErrorCategory::Interrupted => "interrupted",
            ErrorCategory::Backend => "backend",
            ErrorCategory::Request => "request",
        }
    }

    /// What the user can do about a failure in this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => {
                "The notedeck API did not respond. Check the API URL and your connection, then retry"
            }
            ErrorCategory::Session => "Your session could not be renewed. Sign in again",
            ErrorCategory::Interrupted => {
                "Your session changed while the request was running. Send it again"
            }
            ErrorCategory::Backend => {
                "The notedeck API sent a response this client cannot read. Retrying will not help"
            }
            ErrorCategory::Request => {
                "The request was not sent. Check the API URL and the request path"
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

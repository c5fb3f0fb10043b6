//! Identity-provider handshake abstraction.
//!
//! A third-party sign-in widget produces a credential that the session core
//! exchanges with the sign-in endpoint for an application access token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Credential handed over by the identity provider after a successful handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAssertion {
    /// Opaque provider credential (for Google, the ID token).
    pub credential: String,
    /// Client ID the credential was issued for, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl IdentityAssertion {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

// Keeps provider credentials out of logs.
impl std::fmt::Debug for IdentityAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityAssertion")
            .field("credential", &format_args!("<{} bytes>", self.credential.len()))
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Errors from the identity-provider handshake.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// The user closed or dismissed the widget.
    #[error("Sign-in was cancelled")]
    Cancelled,
    /// The provider reported a failure.
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Trait for the sign-in widget.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self) -> Result<IdentityAssertion, IdentityError>;
}

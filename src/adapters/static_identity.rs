//! Identity provider backed by a credential obtained out of band.
//!
//! The CLI cannot show a sign-in widget; the user pastes the provider's
//! credential instead and this adapter hands it over unchanged.

use async_trait::async_trait;

use crate::traits::{IdentityAssertion, IdentityError, IdentityProvider};

#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    assertion: Option<IdentityAssertion>,
}

impl StaticIdentity {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            assertion: Some(IdentityAssertion::new(credential)),
        }
    }

    /// A provider with nothing to hand over; every handshake is cancelled.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn sign_in(&self) -> Result<IdentityAssertion, IdentityError> {
        self.assertion.clone().ok_or(IdentityError::Cancelled)
    }
}

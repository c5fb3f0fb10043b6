//! Scripted identity provider for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::traits::{IdentityAssertion, IdentityError, IdentityProvider};

/// Identity provider that replays scripted handshake outcomes.
///
/// Outcomes are consumed in order; once the script is exhausted every
/// further handshake is reported as cancelled.
#[derive(Debug, Clone, Default)]
pub struct MockIdentity {
    script: Arc<Mutex<VecDeque<Result<IdentityAssertion, IdentityError>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose first handshake succeeds with `credential`.
    pub fn succeeding(credential: &str) -> Self {
        let identity = Self::new();
        identity.push_success(credential);
        identity
    }

    pub fn push_success(&self, credential: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(IdentityAssertion::new(credential)));
    }

    pub fn push_failure(&self, error: IdentityError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Number of handshakes started.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_in(&self) -> Result<IdentityAssertion, IdentityError> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(IdentityError::Cancelled))
    }
}

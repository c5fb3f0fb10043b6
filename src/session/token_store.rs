//! In-memory holder of the access credential and the signed-in user.
//!
//! Readers may look at it from anywhere; writes are crate-private and only
//! the refresh coordinator performs them. Credential and user are set or
//! cleared in the same transition. Both bump the epoch, so a renewal that
//! started under an older session can tell its outcome is stale. Renewing
//! the credential of the same session keeps the epoch.

use tokio::sync::watch;

use crate::auth::{Credential, UserProfile};

/// Contents of the store at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub credential: Option<Credential>,
    pub user: Option<UserProfile>,
    pub epoch: u64,
}

impl TokenState {
    /// A session exists iff both a credential and a user exist.
    pub fn has_session(&self) -> bool {
        self.credential.is_some() && self.user.is_some()
    }
}

#[derive(Debug)]
pub struct TokenStore {
    state: watch::Sender<TokenState>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(TokenState::default());
        Self { state }
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.borrow().credential.clone()
    }

    /// The bearer token, if a credential exists.
    pub fn token(&self) -> Option<String> {
        self.state
            .borrow()
            .credential
            .as_ref()
            .map(|c| c.token().to_string())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    pub fn has_session(&self) -> bool {
        self.state.borrow().has_session()
    }

    pub fn snapshot(&self) -> TokenState {
        self.state.borrow().clone()
    }

    /// Watch every change to the store.
    pub fn subscribe(&self) -> watch::Receiver<TokenState> {
        self.state.subscribe()
    }

    /// Replace the credential, keeping the user.
    pub(crate) fn set_credential(&self, credential: Credential) {
        self.state.send_modify(|state| state.credential = Some(credential));
    }

    /// Start a new session: replace credential and user together and bump
    /// the epoch.
    pub(crate) fn set_session(&self, credential: Credential, user: UserProfile) {
        self.state.send_modify(|state| {
            state.credential = Some(credential);
            state.user = Some(user);
            state.epoch += 1;
        });
    }

    /// Drop credential and user in one transition and bump the epoch.
    ///
    /// Returns whether anything was actually held.
    pub(crate) fn clear(&self) -> bool {
        let mut had_anything = false;
        self.state.send_modify(|state| {
            had_anything = state.credential.is_some() || state.user.is_some();
            state.credential = None;
            state.user = None;
            state.epoch += 1;
        });
        had_anything
    }
}

//! Session-level state machine.
//!
//! `Unauthenticated -> Authenticating -> Authenticated -> Unauthenticated`.
//! Renewal is a transient substate of `Authenticated` and is not modelled
//! here; callers can ask the coordinator whether one is in flight.

use std::fmt;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::auth::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Unauthenticated,
    /// Bootstrap or login in flight.
    Authenticating,
    Authenticated,
}

impl SessionPhase {
    /// Check if transitioning to `next` is allowed.
    ///
    /// Staying in the same phase is always allowed.
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Unauthenticated, Authenticating)
                | (Authenticating, Authenticated)
                | (Authenticating, Unauthenticated)
                | (Authenticated, Unauthenticated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Unauthenticated => "unauthenticated",
            SessionPhase::Authenticating => "authenticating",
            SessionPhase::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase plus the UI-facing flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusState {
    pub phase: SessionPhase,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for StatusState {
    /// Bootstrap always runs at startup, so a fresh status is already
    /// authenticating and loading.
    fn default() -> Self {
        Self {
            phase: SessionPhase::Authenticating,
            loading: true,
            error: None,
        }
    }
}

/// Everything a page needs to render session-dependent UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<UserProfile>,
    pub phase: SessionPhase,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.user.is_some()
    }
}

/// Observable session status.
#[derive(Debug)]
pub struct SessionStatus {
    state: watch::Sender<StatusState>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStatus {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StatusState::default());
        Self { state }
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn get(&self) -> StatusState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusState> {
        self.state.subscribe()
    }

    /// Move to `next`. Invalid transitions are logged and ignored.
    pub fn transition(&self, next: SessionPhase) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            let current = state.phase;
            if current == next {
                applied = true;
                return false;
            }
            if !current.can_transition_to(next) {
                warn!("Rejected session transition {} -> {}", current, next);
                return false;
            }
            debug!("Session phase {} -> {}", current, next);
            state.phase = next;
            applied = true;
            true
        });
        applied
    }

    /// Move to `Authenticated` from any phase, passing through
    /// `Authenticating` when starting from the signed-out state.
    pub fn mark_authenticated(&self) {
        if self.phase() == SessionPhase::Unauthenticated {
            self.transition(SessionPhase::Authenticating);
        }
        self.transition(SessionPhase::Authenticated);
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|state| state.error = Some(message));
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }
}

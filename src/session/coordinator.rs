//! Single-flight access token renewal.
//!
//! Every renewal request (reactive, proactive or bootstrap) goes through
//! [`RefreshCoordinator::refresh`]. The first caller while idle becomes the
//! leader and starts the renewal on its own task; every caller that arrives
//! while it is in flight is queued and receives that renewal's outcome, in
//! arrival order. The coordinator is also the only writer of the
//! [`TokenStore`].
//!
//! A renewal that starts without a signed-in user (bootstrap, or a reactive
//! renewal after a silent failure cleared the session) also fetches the
//! profile, so a stored credential always comes with its user. A renewal
//! whose session was replaced or ended while it was in flight settles as
//! [`AuthError::SessionChanged`] and touches nothing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::state::{SessionPhase, SessionStatus};
use super::token_store::TokenStore;
use crate::auth::{AuthApi, Credential, UserProfile};
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::events::{AppEvent, EventHub};
use crate::traits::{Navigator, Notice, Notifier};

type Waiter = oneshot::Sender<Result<Credential, AuthError>>;

struct Renewal {
    credential: Credential,
    /// Present when the renewal started without a signed-in user.
    user: Option<UserProfile>,
}

enum Settled {
    Renewed(Credential),
    /// A session was rebuilt from the renewal cookie alone.
    Restored(Credential, UserProfile),
    /// The session was replaced or ended while the renewal was in flight.
    Stale,
    Failed {
        err: AuthError,
        dropped_session: bool,
    },
}

enum RefreshState {
    Idle,
    InFlight {
        waiters: VecDeque<Waiter>,
        notify_on_failure: bool,
    },
}

pub struct RefreshCoordinator {
    api: AuthApi,
    store: TokenStore,
    status: SessionStatus,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    events: Arc<EventHub<AppEvent>>,
    token_lifetime: Duration,
    refresh_timeout: Duration,
    entry_route: String,
    state: Mutex<RefreshState>,
    renewals: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(
        config: &SessionConfig,
        api: AuthApi,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        events: Arc<EventHub<AppEvent>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            store: TokenStore::new(),
            status: SessionStatus::new(),
            navigator,
            notifier,
            events,
            token_lifetime: config.access_token_lifetime,
            refresh_timeout: config.refresh_timeout,
            entry_route: config.entry_route.clone(),
            state: Mutex::new(RefreshState::Idle),
            renewals: AtomicU64::new(0),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn api(&self) -> &AuthApi {
        &self.api
    }

    /// Whether a renewal call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock_state(), RefreshState::InFlight { .. })
    }

    /// Number of renewal calls actually issued.
    pub fn renewal_count(&self) -> u64 {
        self.renewals.load(Ordering::SeqCst)
    }

    /// Obtain a freshly renewed credential.
    ///
    /// Joins the in-flight renewal if there is one. With `notify_on_failure`
    /// a failed renewal also shows the "session expired" notice and moves to
    /// the entry route (once per renewal, however many callers asked).
    ///
    /// The renewal runs on its own task, so dropping this future does not
    /// cancel it for the other waiters.
    pub async fn refresh(self: &Arc<Self>, notify_on_failure: bool) -> Result<Credential, AuthError> {
        let (tx, rx) = oneshot::channel();

        let leader = {
            let mut state = self.lock_state();
            match &mut *state {
                RefreshState::InFlight {
                    waiters,
                    notify_on_failure: notify,
                } => {
                    *notify |= notify_on_failure;
                    waiters.push_back(tx);
                    debug!("Joined in-flight renewal ({} waiting)", waiters.len());
                    None
                }
                RefreshState::Idle => {
                    let mut waiters = VecDeque::new();
                    waiters.push_back(tx);
                    *state = RefreshState::InFlight {
                        waiters,
                        notify_on_failure,
                    };
                    Some((self.store.epoch(), self.store.user().is_none()))
                }
            }
        };

        if let Some((epoch, needs_profile)) = leader {
            self.renewals.fetch_add(1, Ordering::SeqCst);
            let this = Arc::clone(self);
            tokio::spawn(async move {
                let outcome = this.renew(needs_profile).await;
                this.settle(epoch, outcome);
            });
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::refresh_failed(
                "renewal task ended without a result",
            )),
        }
    }

    /// Install a session obtained by sign-in.
    ///
    /// Starts a new epoch, so a renewal in flight at this point will not
    /// store or clear anything.
    pub(crate) fn establish(&self, credential: Credential, user: UserProfile) {
        let _state = self.lock_state();
        info!(
            "Session established for user {} ({})",
            user.id,
            credential.fingerprint()
        );
        self.store.set_session(credential, user);
    }

    /// Drop the session. Returns whether one existed.
    ///
    /// A renewal in flight at this point will not store its result.
    pub(crate) fn end_session(&self) -> bool {
        let _state = self.lock_state();
        self.store.clear()
    }

    /// Perform one renewal, bounded by the configured timeout (profile fetch
    /// included).
    async fn renew(&self, needs_profile: bool) -> Result<Renewal, AuthError> {
        debug!("Renewing access token");
        match tokio::time::timeout(self.refresh_timeout, self.call_renewal(needs_profile)).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::refresh_failed(format!(
                "no response within {:?}",
                self.refresh_timeout
            ))),
        }
    }

    async fn call_renewal(&self, needs_profile: bool) -> Result<Renewal, AuthError> {
        let response = self
            .api
            .refresh()
            .await
            .map_err(|e| AuthError::refresh_failed(e.to_string()))?;
        let credential =
            Credential::issue(response.access_token, response.expires_in, self.token_lifetime)
                .map_err(|e| AuthError::refresh_failed(e.to_string()))?;
        if !needs_profile {
            return Ok(Renewal {
                credential,
                user: None,
            });
        }

        debug!("No signed-in user; fetching profile for the renewed token");
        let user = self
            .api
            .fetch_user(credential.token())
            .await
            .map_err(|e| AuthError::ProfileFetchFailed {
                message: e.to_string(),
            })?;
        Ok(Renewal {
            credential,
            user: Some(user),
        })
    }

    /// Apply a renewal outcome and hand it to every waiter.
    ///
    /// Nothing is stored or cleared unless the store is still in the epoch
    /// the renewal started in.
    fn settle(&self, epoch: u64, outcome: Result<Renewal, AuthError>) {
        let (settled, waiters, notify) = {
            let mut state = self.lock_state();

            let settled = if self.store.epoch() != epoch {
                Settled::Stale
            } else {
                match outcome {
                    Ok(Renewal {
                        credential,
                        user: Some(user),
                    }) => {
                        self.store.set_session(credential.clone(), user.clone());
                        Settled::Restored(credential, user)
                    }
                    Ok(Renewal {
                        credential,
                        user: None,
                    }) => {
                        self.store.set_credential(credential.clone());
                        Settled::Renewed(credential)
                    }
                    Err(err) => Settled::Failed {
                        dropped_session: self.store.clear(),
                        err,
                    },
                }
            };

            let (waiters, notify) = match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::InFlight {
                    waiters,
                    notify_on_failure,
                } => (waiters, notify_on_failure),
                RefreshState::Idle => (VecDeque::new(), false),
            };
            (settled, waiters, notify)
        };

        let outcome = match settled {
            Settled::Renewed(credential) => {
                info!(
                    "Access token renewed ({}), resolving {} waiter(s)",
                    credential.fingerprint(),
                    waiters.len()
                );
                Ok(credential)
            }
            Settled::Restored(credential, user) => {
                info!(
                    "Session restored for user {} ({}), resolving {} waiter(s)",
                    user.id,
                    credential.fingerprint(),
                    waiters.len()
                );
                self.status.mark_authenticated();
                self.status.clear_error();
                self.events.publish(&AppEvent::SignedIn { user });
                Ok(credential)
            }
            Settled::Stale => {
                debug!("Discarding renewal outcome: session changed while it was in flight");
                Err(AuthError::SessionChanged)
            }
            Settled::Failed {
                err,
                dropped_session,
            } => {
                warn!(
                    "Token renewal failed: {} (rejecting {} waiter(s))",
                    err,
                    waiters.len()
                );
                self.status.transition(SessionPhase::Unauthenticated);
                let surfaced = notify && self.surface_expiry(&err);
                if surfaced || dropped_session {
                    self.events.publish(&AppEvent::SessionExpired);
                }
                Err(err)
            }
        };

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Show the expiry notice and redirect, unless already on the entry route.
    fn surface_expiry(&self, err: &AuthError) -> bool {
        if self.navigator.is_on(&self.entry_route) {
            debug!("Already on {}; not surfacing session expiry", self.entry_route);
            return false;
        }
        let message = err.user_message();
        self.status.set_error(message.clone());
        self.notifier.notify(Notice::SessionExpired { message });
        self.navigator.navigate(&self.entry_route);
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

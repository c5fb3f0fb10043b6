//! Public session surface.
//!
//! [`SessionFacade`] owns every session component and exposes what pages
//! need: the current user, the loading and error flags, login and logout,
//! the request gateway and the application event hub.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::bootstrap::SessionBootstrap;
use super::coordinator::RefreshCoordinator;
use super::gateway::RequestGateway;
use super::scheduler::ProactiveRefreshScheduler;
use super::state::{SessionPhase, SessionSnapshot, StatusState};
use crate::auth::{AuthApi, Credential, UserProfile};
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::events::{AppEvent, EventHub};
use crate::traits::{HttpClient, IdentityProvider, Navigator, Notice, Notifier};

/// External collaborators the session core talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub http: Arc<dyn HttpClient>,
    pub identity: Arc<dyn IdentityProvider>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct SessionFacade {
    config: SessionConfig,
    coordinator: Arc<RefreshCoordinator>,
    gateway: RequestGateway,
    scheduler: ProactiveRefreshScheduler,
    bootstrap: SessionBootstrap,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    events: Arc<EventHub<AppEvent>>,
}

impl SessionFacade {
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            http,
            identity,
            navigator,
            notifier,
        } = collaborators;

        let events = Arc::new(EventHub::new());
        let api = AuthApi::new(config.api_base_url.clone(), Arc::clone(&http));
        let coordinator = RefreshCoordinator::new(
            &config,
            api,
            Arc::clone(&navigator),
            Arc::clone(&notifier),
            Arc::clone(&events),
        );
        let gateway = RequestGateway::new(http, Arc::clone(&coordinator));
        let scheduler = ProactiveRefreshScheduler::new(Arc::clone(&coordinator), config.safety_margin);
        let bootstrap = SessionBootstrap::new(Arc::clone(&coordinator));

        Self {
            config,
            coordinator,
            gateway,
            scheduler,
            bootstrap,
            identity,
            navigator,
            notifier,
            events,
        }
    }

    /// Run the startup bootstrap (once) and return the resulting state.
    ///
    /// A sign-in or logout that lands while bootstrap is in flight decides
    /// the outcome; bootstrap then neither restores nor clears anything.
    pub async fn initialize(&self) -> SessionSnapshot {
        if self.bootstrap.has_run() {
            return self.snapshot();
        }
        if self.bootstrap.run().await.is_some() {
            self.scheduler.start();
        }
        self.snapshot()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.coordinator.store().user()
    }

    pub fn loading(&self) -> bool {
        self.coordinator.status().loading()
    }

    pub fn error(&self) -> Option<String> {
        self.coordinator.status().error()
    }

    pub fn phase(&self) -> SessionPhase {
        self.coordinator.status().phase()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let status = self.coordinator.status().get();
        SessionSnapshot {
            user: self.user(),
            phase: status.phase,
            loading: status.loading,
            error: status.error,
        }
    }

    /// Watch phase, loading and error changes.
    pub fn subscribe(&self) -> watch::Receiver<StatusState> {
        self.coordinator.status().subscribe()
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn events(&self) -> &Arc<EventHub<AppEvent>> {
        &self.events
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn is_refresh_scheduled(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Sign in through the identity provider and exchange its credential.
    ///
    /// Failure is shown to the user. An existing session survives a failed
    /// re-login.
    pub async fn login(&self) -> Result<UserProfile, AuthError> {
        let status = self.coordinator.status();
        let was_authenticated = status.phase() == SessionPhase::Authenticated;
        if !was_authenticated {
            status.transition(SessionPhase::Authenticating);
        }
        status.clear_error();
        status.set_loading(true);

        let result = self.exchange().await;
        status.set_loading(false);

        match result {
            Ok((credential, user)) => {
                self.coordinator.establish(credential, user.clone());
                status.mark_authenticated();
                self.scheduler.start();
                self.events.publish(&AppEvent::SignedIn { user: user.clone() });
                info!("Signed in as {}", user.email);
                Ok(user)
            }
            Err(err) => {
                warn!("Sign-in failed: {} ({})", err, err.error_code());
                let message = err.user_message();
                status.set_error(message.clone());
                self.notifier.notify(Notice::SignInFailed { message });
                if !was_authenticated {
                    status.transition(SessionPhase::Unauthenticated);
                }
                Err(err)
            }
        }
    }

    async fn exchange(&self) -> Result<(Credential, UserProfile), AuthError> {
        let assertion = self
            .identity
            .sign_in()
            .await
            .map_err(|e| AuthError::sign_in_failed(e.to_string()))?;
        let response = self
            .coordinator
            .api()
            .sign_in(&assertion)
            .await
            .map_err(|e| AuthError::sign_in_failed(e.to_string()))?;
        let credential = Credential::issue(
            response.access_token,
            response.expires_in,
            self.config.access_token_lifetime,
        )
        .map_err(|e| AuthError::sign_in_failed(e.to_string()))?;
        Ok((credential, response.user))
    }

    /// Sign out. Never fails and is safe to call without a session.
    pub async fn logout(&self) {
        let token = self.coordinator.store().token();
        if let Err(e) = self.coordinator.api().logout(token.as_deref()).await {
            let err = AuthError::LogoutCallFailed {
                message: e.to_string(),
            };
            warn!("{} ({}); clearing local session anyway", err, err.error_code());
        }

        let had_session = self.coordinator.end_session();
        self.scheduler.stop();

        let status = self.coordinator.status();
        status.transition(SessionPhase::Unauthenticated);
        status.clear_error();
        status.set_loading(false);

        if !self.navigator.is_on(&self.config.entry_route) {
            self.navigator.navigate(&self.config.entry_route);
        }
        if had_session {
            self.events.publish(&AppEvent::SignedOut);
            info!("Signed out");
        }
    }

    /// Tear down: stop the timer and dispose the event hub.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.events.dispose();
    }
}

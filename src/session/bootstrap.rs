//! Startup session discovery.
//!
//! At startup nothing is known about the user. A silent renewal tells
//! whether the renewal cookie still names a live session; with no user in
//! the store the coordinator fetches the profile along with it and restores
//! the session. Every failure on this path ends in the plain signed-out
//! state with no error, exactly as for a first visit. If a sign-in or logout
//! changes the session while bootstrap is waiting, its outcome wins and
//! bootstrap leaves the state alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::coordinator::RefreshCoordinator;
use super::state::SessionPhase;
use crate::auth::UserProfile;
use crate::error::AuthError;

pub struct SessionBootstrap {
    coordinator: Arc<RefreshCoordinator>,
    ran: AtomicBool,
}

impl SessionBootstrap {
    pub fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
        Self {
            coordinator,
            ran: AtomicBool::new(false),
        }
    }

    pub fn has_run(&self) -> bool {
        self.ran.load(Ordering::SeqCst)
    }

    /// Try to restore a previous session. Returns the user if bootstrap
    /// restored one.
    ///
    /// Only the first call does anything. Later calls, and a bootstrap
    /// overtaken by a sign-in or logout, return `None`.
    pub async fn run(&self) -> Option<UserProfile> {
        if self.ran.swap(true, Ordering::SeqCst) {
            debug!("Session bootstrap already ran");
            return None;
        }

        let status = self.coordinator.status();
        status.set_loading(true);
        status.transition(SessionPhase::Authenticating);

        let restored = match self.coordinator.refresh(false).await {
            Ok(_) => match self.coordinator.store().user() {
                Some(user) => {
                    info!("Restored session for user {}", user.id);
                    status.mark_authenticated();
                    Some(user)
                }
                None => {
                    debug!("Session ended before bootstrap resumed");
                    return None;
                }
            },
            Err(AuthError::SessionChanged) => {
                debug!("Session changed during bootstrap; keeping it");
                return None;
            }
            Err(reason) => {
                debug!("No session to restore ({})", reason.error_code());
                status.transition(SessionPhase::Unauthenticated);
                None
            }
        };

        status.set_loading(false);
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockResponse;
    use crate::session::test_support::{Fixture, REFRESH_URL, USER_URL};
    use std::time::Duration;

    #[tokio::test]
    async fn test_fresh_visitor_is_quietly_signed_out() {
        let fx = Fixture::new();
        fx.http.set_response(REFRESH_URL, MockResponse::status(401, "no cookie"));
        let bootstrap = SessionBootstrap::new(fx.coordinator.clone());

        assert!(bootstrap.run().await.is_none());

        let status = fx.coordinator.status();
        assert_eq!(status.phase(), SessionPhase::Unauthenticated);
        assert!(!status.loading());
        assert!(status.error().is_none());
        assert!(fx.notifier.is_empty());
        assert!(fx.navigator.history().is_empty());
        assert_eq!(fx.http.request_count(USER_URL), 0);
    }

    #[tokio::test]
    async fn test_restores_existing_session() {
        let fx = Fixture::new();
        fx.refresh_succeeds_after("restored", Duration::ZERO);
        fx.user_endpoint_succeeds();
        let bootstrap = SessionBootstrap::new(fx.coordinator.clone());

        let user = bootstrap.run().await.unwrap();

        assert_eq!(user, Fixture::user());
        assert_eq!(fx.coordinator.status().phase(), SessionPhase::Authenticated);
        assert!(!fx.coordinator.status().loading());
        assert!(fx.coordinator.store().has_session());
        assert_eq!(
            fx.http.get_requests().last().unwrap().bearer(),
            Some("restored")
        );
    }

    #[tokio::test]
    async fn test_profile_failure_counts_as_no_session() {
        let fx = Fixture::new();
        fx.refresh_succeeds_after("restored", Duration::ZERO);
        fx.http.set_response(USER_URL, MockResponse::status(500, ""));
        let bootstrap = SessionBootstrap::new(fx.coordinator.clone());

        assert!(bootstrap.run().await.is_none());

        assert!(fx.coordinator.store().credential().is_none());
        assert_eq!(fx.coordinator.status().phase(), SessionPhase::Unauthenticated);
        assert!(fx.coordinator.status().error().is_none());
        assert!(fx.notifier.is_empty());
    }

    #[tokio::test]
    async fn test_session_end_during_profile_fetch_is_not_undone() {
        let fx = Fixture::new();
        fx.refresh_succeeds_after("restored", Duration::ZERO);
        fx.http.set_delay(USER_URL, Duration::from_millis(50));
        let bootstrap = Arc::new(SessionBootstrap::new(fx.coordinator.clone()));

        let task = {
            let bootstrap = bootstrap.clone();
            tokio::spawn(async move { bootstrap.run().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        fx.coordinator.end_session();
        fx.coordinator.status().transition(SessionPhase::Unauthenticated);

        assert!(task.await.unwrap().is_none());
        assert!(fx.coordinator.store().credential().is_none());
        assert!(fx.coordinator.store().user().is_none());
        assert_eq!(fx.coordinator.status().phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_in_during_failing_renewal_is_kept() {
        let fx = Fixture::new();
        fx.http.set_response(REFRESH_URL, MockResponse::status(401, "no cookie"));
        fx.http.set_delay(REFRESH_URL, Duration::from_millis(50));
        let bootstrap = Arc::new(SessionBootstrap::new(fx.coordinator.clone()));

        let task = {
            let bootstrap = bootstrap.clone();
            tokio::spawn(async move { bootstrap.run().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        fx.sign_in("signed-in");

        assert!(task.await.unwrap().is_none());
        assert_eq!(fx.coordinator.store().token().as_deref(), Some("signed-in"));
        assert_eq!(fx.coordinator.status().phase(), SessionPhase::Authenticated);
        assert!(fx.coordinator.status().error().is_none());
    }

    #[tokio::test]
    async fn test_runs_once() {
        let fx = Fixture::new();
        fx.http.set_response(REFRESH_URL, MockResponse::status(401, ""));
        let bootstrap = SessionBootstrap::new(fx.coordinator.clone());

        bootstrap.run().await;
        bootstrap.run().await;

        assert!(bootstrap.has_run());
        assert_eq!(fx.http.request_count(REFRESH_URL), 1);
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let fx = Fixture::new();
        fx.refresh_succeeds_after("restored", Duration::from_millis(50));
        fx.user_endpoint_succeeds();
        let bootstrap = Arc::new(SessionBootstrap::new(fx.coordinator.clone()));

        let task = {
            let bootstrap = bootstrap.clone();
            tokio::spawn(async move { bootstrap.run().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(fx.coordinator.status().loading());
        assert_eq!(fx.coordinator.status().phase(), SessionPhase::Authenticating);

        assert!(task.await.unwrap().is_some());
        assert!(!fx.coordinator.status().loading());
    }
}

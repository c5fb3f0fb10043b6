//! Proactive token renewal.
//!
//! A background task arms one timer at the current credential's refresh
//! point (`expiry - margin`). When it fires, the task renews silently through
//! the coordinator; the renewed credential changes the store, which re-arms
//! the timer. Any other change to the store (sign-in, reactive renewal,
//! logout) re-arms or disarms it too.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::coordinator::RefreshCoordinator;

pub struct ProactiveRefreshScheduler {
    coordinator: Arc<RefreshCoordinator>,
    margin: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ProactiveRefreshScheduler {
    pub fn new(coordinator: Arc<RefreshCoordinator>, margin: Duration) -> Self {
        Self {
            coordinator,
            margin,
            handle: Mutex::new(None),
        }
    }

    /// Start the timer task. Does nothing if it is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!("Proactive refresh already running");
            return;
        }
        tracing::info!(
            "Proactive refresh started (margin: {}s)",
            self.margin.as_secs()
        );
        *handle = Some(tokio::spawn(run(
            Arc::clone(&self.coordinator),
            self.margin,
        )));
    }

    /// Cancel the timer task, if any.
    pub fn stop(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("Proactive refresh stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ProactiveRefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(coordinator: Arc<RefreshCoordinator>, margin: Duration) {
    let mut changes = coordinator.store().subscribe();

    loop {
        let armed = changes.borrow_and_update().credential.clone();

        let Some(credential) = armed else {
            tracing::trace!("No credential; proactive refresh idle");
            if changes.changed().await.is_err() {
                break;
            }
            continue;
        };

        let fire_at = credential.refresh_at(margin);
        tracing::debug!(
            "Proactive refresh armed in {}s",
            fire_at.saturating_duration_since(Instant::now()).as_secs()
        );

        tokio::select! {
            _ = tokio::time::sleep_until(fire_at) => {
                match coordinator.store().credential() {
                    None => {
                        tracing::debug!("Proactive refresh fired after session ended; ignoring");
                        continue;
                    }
                    Some(current) if current != credential => {
                        tracing::debug!("Credential replaced before timer fired; re-arming");
                        continue;
                    }
                    Some(_) => {}
                }
                match coordinator.refresh(false).await {
                    Ok(renewed) => tracing::debug!(
                        "Proactive refresh succeeded ({})",
                        renewed.fingerprint()
                    ),
                    Err(err) => tracing::debug!("Proactive refresh failed silently: {}", err),
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Proactive refresh task exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockResponse;
    use crate::session::test_support::{Fixture, REFRESH_URL};

    const MINUTE: Duration = Duration::from_secs(60);

    async fn let_tasks_run() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(by: Duration) {
        tokio::time::advance(by).await;
        let_tasks_run().await;
    }

    fn scheduler(fx: &Fixture) -> ProactiveRefreshScheduler {
        ProactiveRefreshScheduler::new(fx.coordinator.clone(), fx.config.safety_margin)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_minute_fourteen_and_rearms() {
        let fx = Fixture::new();
        fx.sign_in("t0");
        fx.refresh_succeeds_after("t1", Duration::ZERO);
        let scheduler = scheduler(&fx);
        scheduler.start();
        let_tasks_run().await;

        advance(14 * MINUTE - Duration::from_secs(1)).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 0);

        advance(Duration::from_secs(1)).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 1);
        assert_eq!(fx.coordinator.store().token().as_deref(), Some("t1"));

        advance(14 * MINUTE - Duration::from_secs(1)).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 1);
        advance(Duration::from_secs(1)).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 2);

        assert!(fx.notifier.is_empty());
        assert!(fx.navigator.history().is_empty());
        assert!(fx.coordinator.store().has_session());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_credential_rearms_timer() {
        let fx = Fixture::new();
        fx.sign_in("t0");
        fx.refresh_succeeds_after("t2", Duration::ZERO);
        let scheduler = scheduler(&fx);
        scheduler.start();
        let_tasks_run().await;

        advance(5 * MINUTE).await;
        fx.sign_in("t1");
        let_tasks_run().await;

        advance(10 * MINUTE).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 0);

        advance(4 * MINUTE).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_timer() {
        let fx = Fixture::new();
        fx.sign_in("t0");
        fx.refresh_succeeds_after("t1", Duration::ZERO);
        let scheduler = scheduler(&fx);
        scheduler.start();
        let_tasks_run().await;
        assert!(scheduler.is_running());

        scheduler.stop();
        let_tasks_run().await;
        advance(30 * MINUTE).await;

        assert!(!scheduler.is_running());
        assert_eq!(fx.http.request_count(REFRESH_URL), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_session_disarms_timer() {
        let fx = Fixture::new();
        fx.sign_in("t0");
        fx.refresh_succeeds_after("t1", Duration::ZERO);
        let scheduler = scheduler(&fx);
        scheduler.start();
        let_tasks_run().await;

        advance(10 * MINUTE).await;
        fx.coordinator.end_session();
        advance(30 * MINUTE).await;

        assert_eq!(fx.http.request_count(REFRESH_URL), 0);
        assert!(scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_without_credential() {
        let fx = Fixture::new();
        let scheduler = scheduler(&fx);
        scheduler.start();

        advance(60 * MINUTE).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let fx = Fixture::new();
        fx.sign_in("t0");
        fx.refresh_succeeds_after("t1", Duration::ZERO);
        let scheduler = scheduler(&fx);
        scheduler.start();
        scheduler.start();
        let_tasks_run().await;

        advance(14 * MINUTE).await;
        assert_eq!(fx.http.request_count(REFRESH_URL), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_silent() {
        let fx = Fixture::new();
        fx.sign_in("t0");
        fx.http.set_response(REFRESH_URL, MockResponse::status(401, ""));
        let scheduler = scheduler(&fx);
        scheduler.start();
        let_tasks_run().await;

        advance(14 * MINUTE).await;

        assert_eq!(fx.http.request_count(REFRESH_URL), 1);
        assert!(fx.notifier.is_empty());
        assert!(fx.navigator.history().is_empty());
        assert!(fx.coordinator.status().error().is_none());
        assert!(!fx.coordinator.store().has_session());
    }
}

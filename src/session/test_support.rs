//! Shared fixture for the session unit tests.

use std::sync::Arc;
use std::time::Duration;

use super::coordinator::RefreshCoordinator;
use crate::adapters::mock::{MockHttpClient, MockResponse, RecordingNavigator, RecordingNotifier};
use crate::auth::{AuthApi, Credential, UserProfile};
use crate::config::SessionConfig;
use crate::events::{AppEvent, EventHub};

pub(crate) const BASE: &str = "https://api.test";
pub(crate) const REFRESH_URL: &str = "https://api.test/auth/refresh";
pub(crate) const SIGN_IN_URL: &str = "https://api.test/auth/google";
pub(crate) const USER_URL: &str = "https://api.test/auth/user";
pub(crate) const LOGOUT_URL: &str = "https://api.test/auth/logout";

pub(crate) struct Fixture {
    pub config: SessionConfig,
    pub http: MockHttpClient,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub events: Arc<EventHub<AppEvent>>,
    pub coordinator: Arc<RefreshCoordinator>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default().with_api_base_url(BASE))
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let http = MockHttpClient::new();
        let navigator = Arc::new(RecordingNavigator::at("/projects"));
        let notifier = Arc::new(RecordingNotifier::new());
        let events = Arc::new(EventHub::new());
        let api = AuthApi::new(config.api_base_url.clone(), Arc::new(http.clone()));
        let coordinator = RefreshCoordinator::new(
            &config,
            api,
            navigator.clone(),
            notifier.clone(),
            events.clone(),
        );
        let fixture = Self {
            config,
            http,
            navigator,
            notifier,
            events,
            coordinator,
        };
        fixture.user_endpoint_succeeds();
        fixture
    }

    pub fn user() -> UserProfile {
        UserProfile::new("u1", "Ada", "ada@example.com")
    }

    pub fn credential(&self, token: &str) -> Credential {
        Credential::new(token, self.config.access_token_lifetime).unwrap()
    }

    /// Put the fixture into an authenticated session holding `token`.
    pub fn sign_in(&self, token: &str) {
        self.coordinator.establish(self.credential(token), Self::user());
        self.coordinator.status().mark_authenticated();
        self.coordinator.status().set_loading(false);
    }

    pub fn refresh_succeeds_after(&self, token: &str, delay: Duration) {
        self.http.set_response(
            REFRESH_URL,
            MockResponse::json(200, serde_json::json!({ "access_token": token })),
        );
        if !delay.is_zero() {
            self.http.set_delay(REFRESH_URL, delay);
        }
    }

    pub fn user_endpoint_succeeds(&self) {
        self.http.set_response(
            USER_URL,
            MockResponse::json(
                200,
                serde_json::json!({ "id": "u1", "name": "Ada", "email": "ada@example.com" }),
            ),
        );
    }
}

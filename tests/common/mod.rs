//! Common test utilities for integration tests.
//!
//! Builds a [`SessionFacade`] against a wiremock server through the real
//! reqwest client, so cookies and headers go over an actual socket.
//!
//! # Example
//!
//! ```ignore
//! let h = common::harness().await;
//! common::mount_sign_in(&h.server, "stale").await;
//! h.facade.login().await.unwrap();
//! ```

#![allow(dead_code)]

use notedeck::adapters::mock::{MockIdentity, RecordingNavigator, RecordingNotifier};
use notedeck::adapters::ReqwestHttpClient;
use notedeck::config::SessionConfig;
use notedeck::session::{Collaborators, SessionFacade};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Name and value of the renewal cookie the fake server hands out.
pub const RENEWAL_COOKIE: &str = "refresh_token=r-123";

pub struct Harness {
    pub server: MockServer,
    pub identity: MockIdentity,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub facade: SessionFacade,
}

/// Facade wired to a fresh mock server, currently on `/projects`.
pub async fn harness() -> Harness {
    let server = MockServer::start().await;
    let config = SessionConfig::default()
        .with_api_base_url(server.uri())
        .with_refresh_timeout(Duration::from_secs(5));

    let identity = MockIdentity::new();
    let navigator = Arc::new(RecordingNavigator::at("/projects"));
    let notifier = Arc::new(RecordingNotifier::new());
    let http = ReqwestHttpClient::with_timeout(Duration::from_secs(5)).unwrap();

    let facade = SessionFacade::new(
        config,
        Collaborators {
            http: Arc::new(http),
            identity: Arc::new(identity.clone()),
            navigator: navigator.clone(),
            notifier: notifier.clone(),
        },
    );

    Harness {
        server,
        identity,
        navigator,
        notifier,
        facade,
    }
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({ "id": "u1", "name": "Ada Lovelace", "email": "ada@example.com" })
}

/// Sign-in exchange answering with `token` and setting the renewal cookie.
pub async fn mount_sign_in(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("{}; HttpOnly; Path=/", RENEWAL_COOKIE).as_str())
                .set_body_json(serde_json::json!({ "access_token": token, "user": user_json() })),
        )
        .mount(server)
        .await;
}

/// Sign in through the facade with a scripted identity handshake.
pub async fn sign_in(h: &Harness, token: &str) {
    mount_sign_in(&h.server, token).await;
    h.identity.push_success("google-id-token");
    h.facade.login().await.unwrap();
}

/// Renewal endpoint answering `token` after `delay`, expected exactly `times` times.
pub async fn mount_refresh(server: &MockServer, token: &str, delay: Duration, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": token }))
                .set_delay(delay),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Renewal endpoint rejecting the session after `delay`.
pub async fn mount_refresh_rejected(server: &MockServer, delay: Duration, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("refresh token expired")
                .set_delay(delay),
        )
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
}

/// Resource at `route` that only accepts `token`; everything else is 401.
pub async fn mount_resource_accepting(server: &MockServer, route: &str, token: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "id": "n1" }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

/// Number of requests the server received for `route`.
pub async fn received(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

//! Proactive renewal on virtual time.
//!
//! These run on a paused clock with the in-memory HTTP client, so a
//! fifteen-minute token lifetime takes no real time.

use notedeck::adapters::mock::{
    MockHttpClient, MockIdentity, MockResponse, RecordingNavigator, RecordingNotifier,
};
use notedeck::config::SessionConfig;
use notedeck::session::{Collaborators, SessionFacade, SessionPhase};
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = "https://api.notedeck.test";
const REFRESH_URL: &str = "https://api.notedeck.test/auth/refresh";
const NOTES_URL: &str = "https://api.notedeck.test/api/notes";
const MINUTE: Duration = Duration::from_secs(60);

struct Setup {
    http: MockHttpClient,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
    facade: SessionFacade,
}

async fn signed_in(token: &str) -> Setup {
    let http = MockHttpClient::new();
    let identity = MockIdentity::succeeding("google-id-token");
    let navigator = Arc::new(RecordingNavigator::at("/projects"));
    let notifier = Arc::new(RecordingNotifier::new());

    http.set_response(
        &format!("{}/auth/google", BASE),
        MockResponse::json(
            200,
            serde_json::json!({
                "access_token": token,
                "user": { "id": "u1", "name": "Ada", "email": "ada@example.com" }
            }),
        ),
    );

    let config = SessionConfig::default()
        .with_api_base_url(BASE)
        .with_access_token_lifetime(15 * MINUTE)
        .with_safety_margin(MINUTE);
    let facade = SessionFacade::new(
        config,
        Collaborators {
            http: Arc::new(http.clone()),
            identity: Arc::new(identity),
            navigator: navigator.clone(),
            notifier: notifier.clone(),
        },
    );
    facade.login().await.unwrap();
    let_tasks_run().await;

    Setup {
        http,
        notifier,
        navigator,
        facade,
    }
}

async fn let_tasks_run() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn advance(by: Duration) {
    tokio::time::advance(by).await;
    let_tasks_run().await;
}

#[tokio::test(start_paused = true)]
async fn test_proactive_cycle_renews_at_minute_fourteen() {
    let s = signed_in("t0").await;
    s.http.set_response(
        REFRESH_URL,
        MockResponse::json(200, serde_json::json!({ "access_token": "t1" })),
    );
    let mut status = s.facade.subscribe();
    status.borrow_and_update();

    advance(14 * MINUTE - Duration::from_secs(1)).await;
    assert_eq!(s.http.request_count(REFRESH_URL), 0);

    advance(Duration::from_secs(1)).await;
    assert_eq!(s.http.request_count(REFRESH_URL), 1);
    assert_eq!(
        s.facade.coordinator().store().token().as_deref(),
        Some("t1")
    );

    // Next renewal is relative to the new expiry.
    advance(14 * MINUTE - Duration::from_secs(1)).await;
    assert_eq!(s.http.request_count(REFRESH_URL), 1);
    advance(Duration::from_secs(1)).await;
    assert_eq!(s.http.request_count(REFRESH_URL), 2);

    // No visible state change.
    assert!(!status.has_changed().unwrap());
    assert_eq!(s.facade.phase(), SessionPhase::Authenticated);
    assert!(s.notifier.is_empty());
    assert!(s.navigator.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_proactive_and_reactive_renewal_collapse() {
    let s = signed_in("t0").await;
    s.http.set_response(
        REFRESH_URL,
        MockResponse::json(200, serde_json::json!({ "access_token": "t1" })),
    );
    s.http.set_delay(REFRESH_URL, Duration::from_secs(1));
    s.http.set_handler(NOTES_URL, |request| match request.bearer() {
        Some("t1") => MockResponse::status(200, "[]"),
        _ => MockResponse::status(401, ""),
    });

    // Both triggers land in the same turn: the timer is due and a call
    // carrying the old token gets 401.
    tokio::time::advance(14 * MINUTE).await;
    let response = s.facade.gateway().get("/api/notes").await.unwrap();
    let_tasks_run().await;

    assert_eq!(response.status, 200);
    assert_eq!(s.http.request_count(REFRESH_URL), 1);
    assert_eq!(s.facade.coordinator().renewal_count(), 1);
    assert!(s.notifier.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_logout_stops_timer() {
    let s = signed_in("t0").await;
    s.http.set_response(
        &format!("{}/auth/logout", BASE),
        MockResponse::status(204, ""),
    );
    s.http.set_response(
        REFRESH_URL,
        MockResponse::json(200, serde_json::json!({ "access_token": "t1" })),
    );

    s.facade.logout().await;
    advance(60 * MINUTE).await;

    assert_eq!(s.http.request_count(REFRESH_URL), 0);
    assert!(!s.facade.is_refresh_scheduled());
}

#[tokio::test(start_paused = true)]
async fn test_proactive_failure_is_silent() {
    let s = signed_in("t0").await;
    s.http.set_response(REFRESH_URL, MockResponse::status(401, ""));

    advance(14 * MINUTE).await;

    assert_eq!(s.http.request_count(REFRESH_URL), 1);
    assert!(s.notifier.is_empty());
    assert!(s.navigator.history().is_empty());
    assert!(s.facade.error().is_none());
    assert_eq!(s.facade.phase(), SessionPhase::Unauthenticated);
}

//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses or errors, queue one-shot responses, answer based on the request
//! (for example by the bearer token it carries), and delay responses so
//! concurrent callers overlap.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::http::header_value;
use crate::traits::{Headers, HttpClient, HttpError, Method, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body, if any
    pub body: Option<String>,
}

impl RecordedRequest {
    /// The bearer token carried by this request, if any.
    pub fn bearer(&self) -> Option<&str> {
        header_value(&self.headers, "Authorization").and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response (any status)
    Success(Response),
    /// Return a transport error
    Error(HttpError),
}

impl MockResponse {
    /// JSON response with the given status.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::json_body(status, &value))
    }

    /// Plain response with the given status and body.
    pub fn status(status: u16, body: &str) -> Self {
        MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> MockResponse + Send + Sync>;

#[derive(Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    queued: HashMap<String, VecDeque<MockResponse>>,
    handlers: HashMap<String, Handler>,
    delays: HashMap<String, Duration>,
    default_response: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// Mock HTTP client for testing.
///
/// Resolution order for a request URL: queued one-shot responses, handlers,
/// fixed responses, then the default. URLs match exactly first, then by the
/// longest configured prefix.
///
/// # Example
///
/// ```ignore
/// use notedeck::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://api.example.com/auth/refresh",
///     MockResponse::json(200, serde_json::json!({ "access_token": "t1" })),
/// );
/// client.set_delay("https://api.example.com/auth/refresh", Duration::from_millis(50));
/// ```
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed response for a URL.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(url.to_string(), response);
    }

    /// Queue a one-shot response for a URL, consumed before anything else.
    pub fn enqueue_response(&self, url: &str, response: MockResponse) {
        let mut state = self.state.lock().unwrap();
        state
            .queued
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Answer requests to a URL with a closure over the recorded request.
    pub fn set_handler<F>(&self, url: &str, handler: F)
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let mut state = self.state.lock().unwrap();
        state.handlers.insert(url.to_string(), Arc::new(handler));
    }

    /// Delay every response for a URL.
    pub fn set_delay(&self, url: &str, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.delays.insert(url.to_string(), delay);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut state = self.state.lock().unwrap();
        state.default_response = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests made to exactly `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    /// Find the most specific configured key for a URL.
    fn match_key<'a, V>(map: &'a HashMap<String, V>, url: &str) -> Option<&'a V> {
        if let Some(value) = map.get(url) {
            return Some(value);
        }
        map.iter()
            .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, value)| value)
    }

    /// Record the request and pick its response and delay.
    fn resolve(&self, request: RecordedRequest) -> (Option<MockResponse>, Option<Duration>) {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let delay = Self::match_key(&state.delays, &request.url).copied();

        let queued_key = state
            .queued
            .iter()
            .filter(|(pattern, queue)| {
                !queue.is_empty() && request.url.starts_with(pattern.as_str())
            })
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(pattern, _)| pattern.clone());
        if let Some(key) = queued_key {
            let response = state.queued.get_mut(&key).and_then(VecDeque::pop_front);
            return (response, delay);
        }

        let handler = Self::match_key(&state.handlers, &request.url).cloned();
        if let Some(handler) = handler {
            drop(state);
            return (Some(handler(&request)), delay);
        }

        let response = Self::match_key(&state.responses, &request.url)
            .cloned()
            .or_else(|| state.default_response.clone());
        (response, delay)
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        let request = RecordedRequest {
            method: method.as_str().to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        };

        let (response, delay) = self.resolve(request);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/test",
            MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
        );

        let response = client
            .get("https://example.com/test", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from("Hello"));

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "https://example.com/test");
    }

    #[tokio::test]
    async fn test_unmatched_url_is_error() {
        let client = MockHttpClient::new();
        let result = client.get("https://example.com/none", &Headers::new()).await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_queued_responses_are_consumed_in_order() {
        let client = MockHttpClient::new();
        let url = "https://example.com/auth/refresh";
        client.enqueue_response(url, MockResponse::status(200, "first"));
        client.enqueue_response(url, MockResponse::status(200, "second"));
        client.set_response(url, MockResponse::status(500, "fallback"));

        let bodies = [
            client.post(url, "", &Headers::new()).await.unwrap(),
            client.post(url, "", &Headers::new()).await.unwrap(),
            client.post(url, "", &Headers::new()).await.unwrap(),
        ];

        assert_eq!(bodies[0].text().unwrap(), "first");
        assert_eq!(bodies[1].text().unwrap(), "second");
        assert_eq!(bodies[2].status, 500);
        assert_eq!(client.request_count(url), 3);
    }

    #[tokio::test]
    async fn test_handler_sees_bearer_token() {
        let client = MockHttpClient::new();
        client.set_handler("https://example.com/api", |request| {
            match request.bearer() {
                Some("good") => MockResponse::status(200, "ok"),
                _ => MockResponse::status(401, "unauthorized"),
            }
        });

        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), "Bearer good".to_string());
        let ok = client.get("https://example.com/api/notes", &headers).await.unwrap();
        assert_eq!(ok.status, 200);

        let denied = client
            .get("https://example.com/api/notes", &Headers::new())
            .await
            .unwrap();
        assert_eq!(denied.status, 401);
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let client = MockHttpClient::new();
        client.set_response("https://example.com", MockResponse::status(404, ""));
        client.set_response("https://example.com/api", MockResponse::status(200, ""));

        let response = client
            .get("https://example.com/api/projects", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied() {
        let client = MockHttpClient::new();
        let url = "https://example.com/slow";
        client.set_response(url, MockResponse::status(200, ""));
        client.set_delay(url, Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        client.get(url, &Headers::new()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}

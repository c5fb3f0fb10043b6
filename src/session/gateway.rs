//! Request gateway.
//!
//! Every outbound API call goes through [`RequestGateway::send`]. It attaches
//! the current access token and, when the server answers 401, renews through
//! the coordinator and resends the call exactly once.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::coordinator::RefreshCoordinator;
use crate::auth::AuthApi;
use crate::error::{AuthError, ClientResult};
use crate::traits::http::{has_authorization, set_bearer};
use crate::traits::{Headers, HttpClient, Method, Response};

/// An outbound API call.
///
/// `path` is relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<String>,
    headers: Headers,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Headers::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// Wraps outbound calls with credential attachment and retry-after-renewal.
#[derive(Clone)]
pub struct RequestGateway {
    http: Arc<dyn HttpClient>,
    coordinator: Arc<RefreshCoordinator>,
}

impl RequestGateway {
    pub fn new(http: Arc<dyn HttpClient>, coordinator: Arc<RefreshCoordinator>) -> Self {
        Self { http, coordinator }
    }

    /// Send `request`.
    ///
    /// Any status other than 401 is returned as a response. A 401 is retried
    /// once with a renewed token; a second 401, or a 401 from the renewal
    /// endpoint itself, is returned as [`AuthError::Unauthorized`].
    /// If a sign-in replaces the session while that renewal is in flight, the
    /// retry uses the new session's token.
    pub async fn send(&self, mut request: ApiRequest) -> ClientResult<Response> {
        let url = self.coordinator.api().url(&request.path);

        let mut attached = None;
        if !has_authorization(&request.headers) {
            if let Some(token) = self.coordinator.store().token() {
                set_bearer(&mut request.headers, &token);
                attached = Some(token);
            }
        }

        loop {
            let response = self
                .http
                .send(
                    request.method,
                    &url,
                    request.body.as_deref(),
                    &request.headers,
                )
                .await?;

            if !response.is_unauthorized() {
                return Ok(response);
            }

            if AuthApi::is_refresh_path(&request.path) {
                debug!("Renewal endpoint answered 401; not retrying");
                return Err(unauthorized(&request));
            }
            if request.retried {
                warn!("{} {} still unauthorized after retry", request.method, request.path);
                return Err(unauthorized(&request));
            }
            request.retried = true;

            let current = self.coordinator.store().token();
            let token = match (attached.as_deref(), current) {
                (Some(sent), Some(current)) if sent != current => {
                    debug!(
                        "{} {} got 401 with a superseded token; retrying with the current one",
                        request.method, request.path
                    );
                    current
                }
                _ => {
                    debug!(
                        "{} {} got 401; renewing and retrying once",
                        request.method, request.path
                    );
                    match self.coordinator.refresh(true).await {
                        Ok(renewed) => renewed.token().to_string(),
                        Err(AuthError::SessionChanged) => match self.coordinator.store().token() {
                            Some(current) => current,
                            None => return Err(AuthError::SessionChanged.into()),
                        },
                        Err(err) => return Err(err.into()),
                    }
                }
            };

            set_bearer(&mut request.headers, &token);
            attached = Some(token);
        }
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> ClientResult<Response> {
        self.send(ApiRequest::get(path)).await
    }
}

fn unauthorized(request: &ApiRequest) -> crate::error::ClientError {
    AuthError::Unauthorized {
        path: request.path.clone(),
    }
    .into()
}

//! Session configuration.
//!
//! Holds the knobs of the session core: where the API lives, how long an
//! access token is assumed to live, how early the proactive renewal fires and
//! how long a renewal may take before it counts as failed.

use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "NOTEDECK_API_URL";
/// Environment variable overriding the access token lifetime (seconds).
pub const ENV_TOKEN_LIFETIME: &str = "NOTEDECK_TOKEN_LIFETIME_SECS";
/// Environment variable overriding the proactive renewal margin (seconds).
pub const ENV_REFRESH_MARGIN: &str = "NOTEDECK_REFRESH_MARGIN_SECS";
/// Environment variable overriding the renewal timeout (seconds).
pub const ENV_REFRESH_TIMEOUT: &str = "NOTEDECK_REFRESH_TIMEOUT_SECS";
/// Environment variable overriding the unauthenticated entry route.
pub const ENV_ENTRY_ROUTE: &str = "NOTEDECK_ENTRY_ROUTE";

/// Configuration for the session core.
///
/// Use the builder pattern to customize it.
///
/// # Example
///
/// ```ignore
/// use notedeck::config::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::default()
///     .with_api_base_url("https://api.notedeck.app")
///     .with_safety_margin(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base URL of the API (default: http://localhost:8000)
    pub api_base_url: String,
    /// Assumed access token lifetime when the server does not say (default: 15 minutes)
    pub access_token_lifetime: Duration,
    /// How long before expiry the proactive renewal fires (default: 60 seconds)
    pub safety_margin: Duration,
    /// Upper bound on a single renewal call (default: 10 seconds)
    pub refresh_timeout: Duration,
    /// Route shown to signed-out users (default: /login)
    pub entry_route: String,
    /// Timeout for the production HTTP client (default: 30 seconds)
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            access_token_lifetime: Duration::from_secs(15 * 60),
            safety_margin: Duration::from_secs(60),
            refresh_timeout: Duration::from_secs(10),
            entry_route: "/login".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SessionConfig {
    /// Create a new SessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the fallback access token lifetime.
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Set the proactive renewal margin.
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Set the renewal timeout.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Set the unauthenticated entry route.
    pub fn with_entry_route(mut self, route: impl Into<String>) -> Self {
        self.entry_route = route.into();
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create config from `NOTEDECK_*` environment variables.
    ///
    /// Unset variables keep their defaults. Unparseable or zero durations are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = non_empty_var(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(lifetime) = duration_var(ENV_TOKEN_LIFETIME) {
            config.access_token_lifetime = lifetime;
        }
        if let Some(margin) = duration_var(ENV_REFRESH_MARGIN) {
            config.safety_margin = margin;
        }
        if let Some(timeout) = duration_var(ENV_REFRESH_TIMEOUT) {
            config.refresh_timeout = timeout;
        }
        if let Some(route) = non_empty_var(ENV_ENTRY_ROUTE) {
            config.entry_route = route;
        }

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn duration_var(name: &str) -> Option<Duration> {
    let raw = non_empty_var(name)?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!("Ignoring {}={:?}: expected a positive number of seconds", name, raw);
            None
        }
    }
}

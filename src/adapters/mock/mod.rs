//! Mock implementations for testing.
//!
//! This module provides mock implementations of all trait abstractions,
//! enabling unit testing without network access or a real user interface.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`RecordingNavigator`] - Records redirects
//! - [`RecordingNotifier`] - Records user-visible notices
//! - [`MockIdentity`] - Scripted sign-in handshakes

pub mod http;
pub mod identity;
pub mod ui;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use identity::MockIdentity;
pub use ui::{RecordingNavigator, RecordingNotifier};

//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest (with cookie store)
//! - [`TerminalUi`] - Navigator and notifier for the CLI
//! - [`StaticIdentity`] - Identity provider fed from the command line
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for all adapters:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::RecordingNavigator`] / [`mock::RecordingNotifier`] - Record UI effects
//! - [`mock::MockIdentity`] - Scripted sign-in handshakes

pub mod mock;
pub mod reqwest_http;
pub mod static_identity;
pub mod terminal_ui;

pub use mock::{MockHttpClient, MockIdentity, RecordingNavigator, RecordingNotifier};
pub use reqwest_http::ReqwestHttpClient;
pub use static_identity::StaticIdentity;
pub use terminal_ui::TerminalUi;

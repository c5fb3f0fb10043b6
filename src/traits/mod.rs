//! Trait abstractions for dependency injection and testability.
//!
//! The session core talks to the outside world only through these traits,
//! so every collaborator can be swapped for a mock in tests.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations
//! - [`Navigator`] - Route control for the host application
//! - [`Notifier`] - User-visible notices
//! - [`IdentityProvider`] - Third-party sign-in handshake

pub mod http;
pub mod identity;
pub mod navigation;

pub use http::{Headers, HttpClient, HttpError, Method, Response};
pub use identity::{IdentityAssertion, IdentityError, IdentityProvider};
pub use navigation::{Navigator, Notice, Notifier};

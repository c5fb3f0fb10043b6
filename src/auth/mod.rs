//! Authentication primitives.
//!
//! This module provides:
//! - The in-memory access credential and the user profile
//! - The auth endpoint client (renewal, sign-in exchange, profile, logout)

pub mod api;
pub mod credentials;

pub use api::{ApiError, AuthApi, RefreshResponse, SignInResponse};
pub use credentials::{jwt_expires_in, Credential, EmptyToken, UserProfile};

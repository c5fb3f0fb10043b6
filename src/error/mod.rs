//! Error handling for the session core.
//!
//! - **Auth errors** ([`AuthError`]): the session failure taxonomy
//!   (unauthorized, refresh failed, sign-in failed, session changed)
//! - **Client errors** ([`ClientError`]): what the request gateway returns,
//!   combining auth, transport and decoding failures
//! - **Categories** ([`ErrorCategory`]): what to do next (resend, sign in)
//!
//! | Category | Cause | Resend helps |
//! |----------|-------|--------------|
//! | Transport | API unreachable or too slow | Yes |
//! | Session | Renewal or sign-in failed, 401 after renewal | No |
//! | Interrupted | Session changed or call cancelled mid-flight | Yes |
//! | Backend | Unreadable response body | No |
//! | Request | Malformed URL | No |

mod auth;
mod category;
mod client_error;
mod result;

pub use auth::AuthError;
pub use category::ErrorCategory;
pub use client_error::ClientError;
pub use result::ClientResult;

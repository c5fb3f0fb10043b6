//! Session and token lifecycle.
//!
//! Components, leaves first:
//! - [`TokenStore`] - in-memory access credential and user
//! - [`RefreshCoordinator`] - single-flight renewal, the only store writer
//! - [`RequestGateway`] - credential attachment and retry-after-renewal
//! - [`ProactiveRefreshScheduler`] - renews ahead of expiry
//! - [`SessionBootstrap`] - silent startup discovery
//! - [`SessionFacade`] - the surface the rest of the application uses

pub mod bootstrap;
pub mod coordinator;
pub mod facade;
pub mod gateway;
pub mod scheduler;
pub mod state;
pub mod token_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use bootstrap::SessionBootstrap;
pub use coordinator::RefreshCoordinator;
pub use facade::{Collaborators, SessionFacade};
pub use gateway::{ApiRequest, RequestGateway};
pub use scheduler::ProactiveRefreshScheduler;
pub use state::{SessionPhase, SessionSnapshot, SessionStatus, StatusState};
pub use token_store::{TokenState, TokenStore};

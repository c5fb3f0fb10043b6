//! Result type alias for gateway operations.

use super::client_error::ClientError;

/// Type alias for Results using [`ClientError`].
///
/// # Example
///
/// ```ignore
/// use notedeck::error::ClientResult;
///
/// async fn list_projects(gateway: &RequestGateway) -> ClientResult<Vec<Project>> {
///     let response = gateway.get("/api/projects").await?;
///     Ok(response.json()?)
/// }
/// ```
pub type ClientResult<T> = Result<T, ClientError>;

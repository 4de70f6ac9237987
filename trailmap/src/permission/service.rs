//! Platform permission service abstraction.

use futures::future::BoxFuture;
use thiserror::Error;

use super::PermissionState;

/// Errors reported by a platform permission service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionServiceError {
    /// The platform permission API could not be reached.
    #[error("Permission service unavailable: {0}")]
    Unavailable(String),
}

/// Platform location-permission API.
///
/// Implementations wrap the OS permission store. `check_permission` must not
/// prompt; `request_permission` may show the system dialog. Uses boxed
/// futures so the gate can hold an `Arc<dyn PermissionService>`.
pub trait PermissionService: Send + Sync {
    /// Query the current permission without prompting.
    fn check_permission(&self) -> BoxFuture<'_, Result<PermissionState, PermissionServiceError>>;

    /// Ask the user for permission (OS dialog when undetermined).
    fn request_permission(&self)
        -> BoxFuture<'_, Result<PermissionState, PermissionServiceError>>;
}

//! Permission gate implementation.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{PermissionService, PermissionState};

/// Owns the stored location-permission status.
///
/// The stored status is only mutated by check and request results. Every
/// distinct change is published on a watch channel; subscribers see the
/// latest value and are woken on change.
pub struct PermissionGate {
    service: Arc<dyn PermissionService>,
    status: watch::Sender<PermissionState>,
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl PermissionGate {
    /// Create a gate over the given platform service.
    ///
    /// The stored status starts as `Undetermined` until the first check.
    pub fn new(service: Arc<dyn PermissionService>) -> Self {
        let (status, _) = watch::channel(PermissionState::Undetermined);
        Self { service, status }
    }

    /// Last stored status. Does not touch the platform.
    pub fn status(&self) -> PermissionState {
        *self.status.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<PermissionState> {
        self.status.subscribe()
    }

    /// Query the platform without prompting and store the result.
    ///
    /// Safe to call repeatedly, e.g. whenever the app returns to the
    /// foreground. A service fault is stored and returned as `Denied`.
    pub async fn check_status(&self) -> PermissionState {
        let state = match self.service.check_permission().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Permission check failed, treating as denied");
                PermissionState::Denied
            }
        };
        self.store(state);
        state
    }

    /// Request permission from the user.
    ///
    /// Only prompts while the stored status is `Undetermined`. A resolved
    /// status is returned as-is, since some platforms permanently suppress
    /// repeat prompts after a denial. A service fault is stored and returned
    /// as `Denied`.
    pub async fn request_permission(&self) -> PermissionState {
        let current = self.status();
        if current.is_resolved() {
            debug!(status = %current, "Permission already resolved, not prompting");
            return current;
        }

        let state = match self.service.request_permission().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Permission request failed, treating as denied");
                PermissionState::Denied
            }
        };
        self.store(state);
        state
    }

    fn store(&self, state: PermissionState) {
        let changed = self.status.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            info!(status = %state, "Location permission changed");
        }
    }
}

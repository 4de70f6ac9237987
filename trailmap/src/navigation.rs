//! Permission-driven screen routing.
//!
//! The host shows a loading screen until the permission status is known,
//! then either the map or the permissions explainer. [`RouteGuard`] keeps
//! that choice in sync with the [`PermissionGate`](crate::permission::PermissionGate)
//! for the lifetime of the app.

use std::fmt;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::permission::PermissionState;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Permission status not known yet.
    Loading,
    /// Map screen.
    Map,
    /// Explains why location access is needed.
    Permissions,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Loading => "loading",
            Route::Map => "map",
            Route::Permissions => "permissions",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Screen for a permission status, or `None` to stay where we are.
pub fn route_for(state: PermissionState) -> Option<Route> {
    match state {
        PermissionState::Granted => Some(Route::Map),
        PermissionState::Denied => Some(Route::Permissions),
        PermissionState::Undetermined => None,
    }
}

/// Follows the permission status and publishes the current route.
pub struct RouteGuard {
    route: watch::Receiver<Route>,
    task: JoinHandle<()>,
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGuard")
            .field("route", &*self.route.borrow())
            .finish_non_exhaustive()
    }
}

impl RouteGuard {
    /// Spawn the routing task on the current runtime.
    ///
    /// The route starts as `Loading` and is then derived from every status
    /// seen on `permissions`, including the one current at start. The task
    /// ends when the gate is dropped or every route receiver is gone.
    pub fn start(mut permissions: watch::Receiver<PermissionState>) -> Self {
        let (tx, route) = watch::channel(Route::Loading);

        let task = tokio::spawn(async move {
            loop {
                let state = *permissions.borrow_and_update();
                if let Some(next) = route_for(state) {
                    let changed = tx.send_if_modified(|current| {
                        if *current == next {
                            false
                        } else {
                            *current = next;
                            true
                        }
                    });
                    if changed {
                        info!(route = %next, permission = %state, "Route changed");
                    }
                }

                tokio::select! {
                    changed = permissions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
            }
            debug!("Route guard stopped");
        });

        Self { route, task }
    }

    /// Current route.
    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    /// Receiver that is woken on route changes.
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.clone()
    }

    /// Stop the routing task.
    pub fn stop(self) {
        self.task.abort();
    }
}

//! Application bootstrap implementation.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::AppConfig;
use crate::error::TrackingError;
use crate::lifecycle::{LifecycleEvent, LifecycleMonitor};
use crate::navigation::{Route, RouteGuard};
use crate::permission::{PermissionGate, PermissionService, PermissionState};
use crate::position::PositionService;
use crate::session::MapSession;
use crate::tracker::LocationTracker;

/// Capacity of the lifecycle event channel.
const LIFECYCLE_CHANNEL_CAPACITY: usize = 16;

/// Trailmap application with its long-lived services.
///
/// Start order:
/// 1. Permission gate over the platform service
/// 2. Location tracker bound to the gate
/// 3. Route guard following the gate
/// 4. Lifecycle monitor driving re-checks and suspension
/// 5. Initial permission check (no prompt)
pub struct TrailmapApp {
    config: AppConfig,
    gate: Arc<PermissionGate>,
    tracker: Arc<LocationTracker>,
    routes: RouteGuard,
    lifecycle: LifecycleMonitor,
    lifecycle_tx: mpsc::Sender<LifecycleEvent>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for TrailmapApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailmapApp")
            .field("permission", &self.gate.status())
            .field("route", &self.routes.current())
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl TrailmapApp {
    /// Build and start every service on the current runtime.
    pub async fn start(
        config: AppConfig,
        permissions: Arc<dyn PermissionService>,
        positions: Arc<dyn PositionService>,
    ) -> Self {
        let gate = Arc::new(PermissionGate::new(permissions));
        let tracker = Arc::new(LocationTracker::new(
            gate.clone(),
            positions,
            config.tracker.clone(),
        ));

        let routes = RouteGuard::start(gate.subscribe());

        let cancel = CancellationToken::new();
        let (lifecycle_tx, lifecycle_rx) = mpsc::channel(LIFECYCLE_CHANNEL_CAPACITY);
        let lifecycle = LifecycleMonitor::start(
            tracker.clone(),
            config.lifecycle,
            lifecycle_rx,
            cancel.child_token(),
        );

        let status = gate.check_status().await;
        info!(permission = %status, "Trailmap started");

        Self {
            config,
            gate,
            tracker,
            routes,
            lifecycle,
            lifecycle_tx,
            cancel,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    pub fn tracker(&self) -> &Arc<LocationTracker> {
        &self.tracker
    }

    /// Current top-level route.
    pub fn route(&self) -> Route {
        self.routes.current()
    }

    /// Receiver woken on route changes.
    pub fn subscribe_route(&self) -> watch::Receiver<Route> {
        self.routes.subscribe()
    }

    /// Sender for the host's foreground/background transitions.
    pub fn lifecycle_sender(&self) -> mpsc::Sender<LifecycleEvent> {
        self.lifecycle_tx.clone()
    }

    /// Ask the user for location access (prompts only if undetermined).
    pub async fn request_permission(&self) -> PermissionState {
        self.gate.request_permission().await
    }

    /// Mount a map session with the configured watch and camera settings.
    pub async fn mount_map(&self) -> Result<MapSession, TrackingError> {
        MapSession::mount(self.tracker.clone(), self.config.session).await
    }

    /// Stop background tasks and release the watch.
    pub async fn shutdown(self) {
        info!("Shutting down Trailmap");

        self.cancel.cancel();
        self.lifecycle.shutdown().await;
        self.routes.stop();
        self.tracker.stop_watching();

        info!("Trailmap shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::sim::{SimulatedPermissionService, SimulatedPositionService};
    use std::time::Duration;

    async fn start_app(
        status: PermissionState,
    ) -> (TrailmapApp, Arc<SimulatedPermissionService>, Arc<SimulatedPositionService>) {
        let permissions = Arc::new(SimulatedPermissionService::new(status));
        let positions = Arc::new(SimulatedPositionService::new());
        let app = TrailmapApp::start(AppConfig::default(), permissions.clone(), positions.clone())
            .await;
        (app, permissions, positions)
    }

    async fn wait_for_route(app: &TrailmapApp, route: Route) {
        let mut rx = app.subscribe_route();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|r| *r == route))
            .await
            .expect("route not reached")
            .expect("route guard stopped");
    }

    #[tokio::test]
    async fn test_app_start_and_shutdown() {
        let (app, _, _) = start_app(PermissionState::Granted).await;

        assert_eq!(app.gate().status(), PermissionState::Granted);
        wait_for_route(&app, Route::Map).await;

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_permission_flow_routes_to_map() {
        let (app, permissions, _) = start_app(PermissionState::Undetermined).await;
        assert_eq!(app.route(), Route::Loading);

        assert_eq!(app.request_permission().await, PermissionState::Granted);
        wait_for_route(&app, Route::Map).await;
        assert_eq!(permissions.prompt_count(), 1);

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_denied_routes_to_permissions() {
        let (app, _, _) = start_app(PermissionState::Denied).await;

        wait_for_route(&app, Route::Permissions).await;
        assert_eq!(
            app.mount_map().await.unwrap_err(),
            TrackingError::PermissionDenied
        );

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_mount_map_and_shutdown_release_watch() {
        let (app, _, positions) = start_app(PermissionState::Granted).await;

        let session = app.mount_map().await.unwrap();
        positions.emit(Coordinate::new(1.0, 1.0));
        assert_eq!(session.trail(), vec![Coordinate::new(1.0, 1.0)]);

        drop(session);
        app.shutdown().await;
        assert_eq!(positions.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_lifecycle_recheck_updates_route() {
        let (app, permissions, _) = start_app(PermissionState::Granted).await;
        wait_for_route(&app, Route::Map).await;

        permissions.set_status(PermissionState::Denied);
        app.lifecycle_sender()
            .send(LifecycleEvent::BecameActive)
            .await
            .unwrap();

        wait_for_route(&app, Route::Permissions).await;
        app.shutdown().await;
    }
}

//! Integration tests for the tracking core.
//!
//! These tests drive the public API end to end with simulated platform
//! services:
//! - permission flow → tracker → map session → camera
//! - follow / pan / recenter reconciliation
//! - teardown and late platform callbacks
//!
//! Run with: `cargo test --test tracking_integration`

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use trailmap::app::{AppConfig, TrailmapApp};
use trailmap::camera::{CameraEvent, FollowState, TargetReason};
use trailmap::navigation::Route;
use trailmap::permission::{PermissionGate, PermissionState};
use trailmap::position::{PositionEvent, WatchOptions};
use trailmap::session::{MapSession, MapSessionConfig};
use trailmap::sim::{SimulatedPermissionService, SimulatedPositionService};
use trailmap::tracker::{LocationTracker, TrackerConfig, TrackerEvent};
use trailmap::{Coordinate, TrackingError};

// ============================================================================
// Helper Functions
// ============================================================================

struct Harness {
    permissions: Arc<SimulatedPermissionService>,
    positions: Arc<SimulatedPositionService>,
    tracker: Arc<LocationTracker>,
}

/// Build a gate and tracker over simulated services, with the platform
/// reporting `status`.
fn harness(status: PermissionState) -> Harness {
    let permissions = Arc::new(SimulatedPermissionService::new(status));
    let positions = Arc::new(SimulatedPositionService::new());
    let gate = Arc::new(PermissionGate::new(permissions.clone()));
    let tracker = Arc::new(LocationTracker::new(
        gate,
        positions.clone(),
        TrackerConfig {
            fix_timeout: Duration::from_millis(100),
            ..Default::default()
        },
    ));
    Harness {
        permissions,
        positions,
        tracker,
    }
}

/// Yield enough times for spawned tasks to drain their channels.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Drain the camera targets received so far.
fn drain_targets(rx: &mut broadcast::Receiver<CameraEvent>) -> Vec<(Coordinate, TargetReason)> {
    let mut targets = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let CameraEvent::Target { target, reason } = event {
            targets.push((target.center, reason));
        }
    }
    targets
}

fn track(n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| Coordinate::new(45.0 + i as f64 * 0.0001, 7.0 - i as f64 * 0.0001))
        .collect()
}

// ============================================================================
// Permission Scenarios
// ============================================================================

/// Undetermined → request granted → watch → first update lands in both the
/// trail and the camera.
#[tokio::test]
async fn test_undetermined_to_granted_first_update() {
    let h = harness(PermissionState::Undetermined);
    let gate = h.tracker.gate().clone();

    assert_eq!(gate.check_status().await, PermissionState::Undetermined);
    assert_eq!(gate.request_permission().await, PermissionState::Granted);
    assert_eq!(h.permissions.prompt_count(), 1);

    let session = MapSession::mount(h.tracker.clone(), MapSessionConfig::default())
        .await
        .expect("mount should succeed once granted");
    let mut camera = session.controller().subscribe();

    h.positions.emit(Coordinate::new(1.0, 1.0));
    settle().await;

    assert_eq!(session.trail(), vec![Coordinate::new(1.0, 1.0)]);
    assert_eq!(
        session.controller().current_target().center,
        Coordinate::new(1.0, 1.0)
    );
    assert_eq!(
        drain_targets(&mut camera),
        vec![(Coordinate::new(1.0, 1.0), TargetReason::Follow)]
    );
}

/// Denied → start fails, nothing is held.
#[tokio::test]
async fn test_denied_start_fails_cleanly() {
    let h = harness(PermissionState::Denied);
    h.tracker.gate().check_status().await;

    let result = h.tracker.start_watching(WatchOptions::default());

    assert_eq!(result, Err(TrackingError::PermissionDenied));
    assert!(h.tracker.trail().is_empty());
    assert!(!h.tracker.is_watching());
    assert_eq!(h.positions.subscribe_calls(), 0);
    assert_eq!(h.positions.active_subscriptions(), 0);
}

/// A denied user is never re-prompted.
#[tokio::test]
async fn test_denied_is_not_reprompted() {
    let permissions = Arc::new(
        SimulatedPermissionService::new(PermissionState::Undetermined)
            .with_request_outcome(PermissionState::Denied),
    );
    let gate = PermissionGate::new(permissions.clone());

    assert_eq!(gate.request_permission().await, PermissionState::Denied);
    assert_eq!(gate.request_permission().await, PermissionState::Denied);
    assert_eq!(permissions.prompt_count(), 1);
}

// ============================================================================
// Camera Follow Scenarios
// ============================================================================

/// Following {2,2}, pan, {3,3} ignored, recenter jumps to {3,3}.
#[tokio::test]
async fn test_follow_pan_recenter_through_session() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;
    let session = MapSession::mount(h.tracker.clone(), MapSessionConfig::default())
        .await
        .unwrap();
    let mut camera = session.controller().subscribe();

    h.positions.emit(Coordinate::new(2.0, 2.0));
    settle().await;
    assert_eq!(
        session.controller().current_target().center,
        Coordinate::new(2.0, 2.0)
    );

    session.on_user_pan();
    assert_eq!(session.follow_state(), FollowState::Free);

    h.positions.emit(Coordinate::new(3.0, 3.0));
    settle().await;
    assert_eq!(
        session.controller().current_target().center,
        Coordinate::new(2.0, 2.0)
    );

    assert!(session.on_recenter().is_none());
    assert_eq!(session.follow_state(), FollowState::Following);
    assert_eq!(
        session.controller().current_target().center,
        Coordinate::new(3.0, 3.0)
    );

    assert_eq!(
        drain_targets(&mut camera),
        vec![
            (Coordinate::new(2.0, 2.0), TargetReason::Follow),
            (Coordinate::new(3.0, 3.0), TargetReason::Recenter),
        ]
    );
    // Both updates were recorded regardless of follow state
    assert_eq!(session.trail().len(), 2);
}

/// While following, the camera ends on the last delivered coordinate.
#[tokio::test]
async fn test_following_tracks_long_sequence() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;
    let session = MapSession::mount(h.tracker.clone(), MapSessionConfig::default())
        .await
        .unwrap();

    let coords = track(200);
    for coord in &coords {
        h.positions.emit(*coord);
    }
    settle().await;

    assert_eq!(session.trail(), coords);
    assert_eq!(
        session.controller().current_target().center,
        *coords.last().unwrap()
    );
}

/// After a pan, no follow target is emitted however many updates arrive.
#[tokio::test]
async fn test_no_targets_while_free() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;
    let session = MapSession::mount(h.tracker.clone(), MapSessionConfig::default())
        .await
        .unwrap();

    session.on_user_pan();
    let mut camera = session.controller().subscribe();
    for coord in track(50) {
        h.positions.emit(coord);
    }
    settle().await;

    assert!(drain_targets(&mut camera).is_empty());
    assert_eq!(session.trail().len(), 50);
}

/// A background recenter fix that resolves after a pan is discarded.
#[tokio::test]
async fn test_recenter_fix_after_pan_is_discarded() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;
    let session = MapSession::mount(h.tracker.clone(), MapSessionConfig::default())
        .await
        .unwrap();
    let default_target = session.controller().current_target();

    h.positions.set_fix(Some(Coordinate::new(8.0, 8.0)));
    h.positions.set_fix_delay(Duration::from_millis(30));
    session.on_user_pan();

    let pending = session.on_recenter().expect("no position known yet");
    session.on_user_pan();
    pending.await.unwrap();

    assert_eq!(session.controller().current_target(), default_target);
    assert_eq!(session.follow_state(), FollowState::Free);
}

// ============================================================================
// Tracker Lifecycle
// ============================================================================

/// A callback already in flight when the watch stops changes nothing.
#[tokio::test]
async fn test_late_callback_after_stop() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;
    let mut events = h.tracker.subscribe();

    h.tracker.start_watching(WatchOptions::default()).unwrap();
    h.positions.emit(Coordinate::new(1.0, 1.0));
    h.tracker.stop_watching();

    h.positions
        .deliver_late(PositionEvent::Update(Coordinate::new(2.0, 2.0)));

    assert_eq!(h.tracker.trail(), vec![Coordinate::new(1.0, 1.0)]);
    assert_eq!(h.tracker.last_known(), Some(Coordinate::new(1.0, 1.0)));

    let seen: Vec<TrackerEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert_eq!(
        seen,
        vec![
            TrackerEvent::Started(WatchOptions::default()),
            TrackerEvent::Position(Coordinate::new(1.0, 1.0)),
            TrackerEvent::Stopped,
        ]
    );
}

/// Starting twice with identical options keeps a single subscription.
#[tokio::test]
async fn test_double_start_single_subscription() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;

    h.tracker.start_watching(WatchOptions::default()).unwrap();
    h.tracker.start_watching(WatchOptions::default()).unwrap();

    assert_eq!(h.positions.subscribe_calls(), 1);
    assert_eq!(h.positions.active_subscriptions(), 1);
}

/// Unmounting releases the watch even when updates keep coming.
#[tokio::test]
async fn test_unmount_stops_tracking() {
    let h = harness(PermissionState::Granted);
    h.tracker.gate().check_status().await;
    let session = MapSession::mount(h.tracker.clone(), MapSessionConfig::default())
        .await
        .unwrap();
    h.positions.emit(Coordinate::new(1.0, 1.0));

    session.unmount().await;
    h.positions.emit(Coordinate::new(2.0, 2.0));

    assert_eq!(h.positions.active_subscriptions(), 0);
    assert_eq!(h.tracker.trail(), vec![Coordinate::new(1.0, 1.0)]);
}

// ============================================================================
// Application
// ============================================================================

/// Full app: undetermined → granted routes to the map, which then tracks.
#[tokio::test]
async fn test_app_end_to_end() {
    let permissions = Arc::new(SimulatedPermissionService::new(PermissionState::Undetermined));
    let positions = Arc::new(SimulatedPositionService::new());
    let app = TrailmapApp::start(AppConfig::default(), permissions, positions.clone()).await;
    let mut routes = app.subscribe_route();
    assert_eq!(app.route(), Route::Loading);

    app.request_permission().await;
    tokio::time::timeout(Duration::from_secs(1), routes.wait_for(|r| *r == Route::Map))
        .await
        .expect("route should reach the map")
        .unwrap();

    let session = app.mount_map().await.unwrap();
    for coord in track(3) {
        positions.emit(coord);
    }
    settle().await;
    assert_eq!(session.trail(), track(3));

    session.unmount().await;
    app.shutdown().await;
    assert_eq!(positions.active_subscriptions(), 0);
}

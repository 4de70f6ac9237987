//! Map screen session.
//!
//! A [`MapSession`] is what the map screen holds while it is visible. Mounting
//! resolves where the camera starts, begins the continuous watch and spawns a
//! pump task that feeds tracker positions into the camera controller.
//!
//! ```text
//!   PositionService ──► LocationTracker ──broadcast──► pump ──► CameraFollowController
//!                            │                                        │
//!                            └── trail ──► renderer ◄── CameraEvent ──┘
//! ```
//!
//! Dropping the session (or calling [`MapSession::unmount`]) cancels the pump,
//! detaches the controller and releases the watch.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::camera::{CameraFollowController, CameraSettings, FollowState};
use crate::coord::Coordinate;
use crate::error::TrackingError;
use crate::position::WatchOptions;
use crate::tracker::{LocationTracker, TrackerEvent};

/// What a map session needs to start.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapSessionConfig {
    /// Options for the continuous watch.
    pub watch: WatchOptions,
    /// Camera settings, including the fallback location.
    pub camera: CameraSettings,
}

/// State owned by the visible map screen.
pub struct MapSession {
    tracker: Arc<LocationTracker>,
    controller: CameraFollowController,
    trail_visible: AtomicBool,
    /// Recenter fixes still in flight.
    pending_fixes: Arc<AtomicUsize>,
    last_error: Arc<Mutex<Option<TrackingError>>>,
    cancel: CancellationToken,
    pump: Option<JoinHandle<()>>,
    torn_down: bool,
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("controller", &self.controller)
            .field("trail_visible", &self.trail_visible())
            .field("last_error", &*self.last_error.lock())
            .finish_non_exhaustive()
    }
}

impl MapSession {
    /// Mount the map screen.
    ///
    /// The camera starts on the tracker's last known position, else on a
    /// fresh one-shot fix, else on the configured default location.
    ///
    /// # Errors
    ///
    /// Returns the error of `start_watching`, typically `PermissionDenied`.
    /// Nothing is left running in that case.
    pub async fn mount(
        tracker: Arc<LocationTracker>,
        config: MapSessionConfig,
    ) -> Result<Self, TrackingError> {
        let initial = resolve_initial_location(&tracker, &config.camera).await;
        let controller = CameraFollowController::new(tracker.clone(), config.camera, initial);

        // Subscribe before watching so the first update is not missed
        let events = tracker.subscribe();
        tracker.start_watching(config.watch)?;

        let cancel = CancellationToken::new();
        let last_error = Arc::new(Mutex::new(None));
        let pump = tokio::spawn(pump(
            events,
            controller.clone(),
            last_error.clone(),
            cancel.clone(),
        ));

        info!(
            latitude = initial.latitude,
            longitude = initial.longitude,
            "Map session mounted"
        );

        Ok(Self {
            tracker,
            controller,
            trail_visible: AtomicBool::new(true),
            pending_fixes: Arc::new(AtomicUsize::new(0)),
            last_error,
            cancel,
            pump: Some(pump),
            torn_down: false,
        })
    }

    /// The camera controller driving this session.
    pub fn controller(&self) -> &CameraFollowController {
        &self.controller
    }

    /// Current follow mode.
    pub fn follow_state(&self) -> FollowState {
        self.controller.follow_state()
    }

    /// Forward a user pan to the controller.
    pub fn on_user_pan(&self) {
        self.controller.on_user_pan();
    }

    /// Recenter the camera. While a fix is fetched in the background
    /// [`is_loading`](Self::is_loading) reports true.
    pub fn on_recenter(&self) -> Option<JoinHandle<()>> {
        self.track_fix(self.controller.on_recenter())
    }

    /// Flip the follow mode, recentering when it turns on.
    pub fn toggle_follow(&self) -> Option<JoinHandle<()>> {
        self.track_fix(self.controller.toggle_follow())
    }

    /// Flip trail visibility and return the new value.
    ///
    /// The trail keeps recording while hidden.
    pub fn toggle_trail_visibility(&self) -> bool {
        !self.trail_visible.fetch_xor(true, Ordering::AcqRel)
    }

    /// Whether the trail should be drawn.
    pub fn trail_visible(&self) -> bool {
        self.trail_visible.load(Ordering::Acquire)
    }

    /// True while a recenter fix is being acquired.
    pub fn is_loading(&self) -> bool {
        self.pending_fixes.load(Ordering::Acquire) > 0
    }

    /// Trail recorded so far (oldest first).
    pub fn trail(&self) -> Vec<Coordinate> {
        self.tracker.trail()
    }

    /// Last subscription failure reported while this session was mounted.
    pub fn last_error(&self) -> Option<TrackingError> {
        self.last_error.lock().clone()
    }

    /// Count `fix` as pending until it completes.
    ///
    /// The returned handle resolves after the count is dropped again.
    fn track_fix(&self, fix: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let fix = fix?;
        self.pending_fixes.fetch_add(1, Ordering::AcqRel);
        let pending = self.pending_fixes.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = fix.await {
                warn!(error = %e, "Recenter fix task failed");
            }
            pending.fetch_sub(1, Ordering::AcqRel);
        }))
    }

    /// Tear down and wait for the pump task to finish.
    pub async fn unmount(mut self) {
        let pump = self.pump.take();
        self.teardown();
        if let Some(pump) = pump {
            if let Err(e) = pump.await {
                warn!(error = %e, "Map session pump failed");
            }
        }
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.cancel.cancel();
        self.controller.detach();
        self.tracker.stop_watching();
        info!("Map session unmounted");
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn resolve_initial_location(
    tracker: &LocationTracker,
    camera: &CameraSettings,
) -> Coordinate {
    if let Some(known) = tracker.last_known() {
        return known;
    }
    match tracker.one_shot_location().await {
        Ok(coord) => coord,
        Err(e) => {
            debug!(error = %e, "No initial fix, using default location");
            camera.default_location
        }
    }
}

async fn pump(
    mut events: broadcast::Receiver<TrackerEvent>,
    controller: CameraFollowController,
    last_error: Arc<Mutex<Option<TrackingError>>>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(TrackerEvent::Position(coord)) => controller.on_position_update(coord),
            Ok(TrackerEvent::Failed(e)) => {
                warn!(error = %e, "Location tracking failed");
                *last_error.lock() = Some(e);
            }
            Ok(TrackerEvent::Started(_)) | Ok(TrackerEvent::Stopped) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Map session fell behind tracker events");
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("Map session pump stopped");
}

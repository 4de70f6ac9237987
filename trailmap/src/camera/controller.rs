//! Camera follow controller implementation.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{CameraSettings, CameraTarget};
use crate::coord::Coordinate;
use crate::tracker::LocationTracker;

/// Capacity of the camera event broadcast channel.
const EVENT_CAPACITY: usize = 256;

/// Whether the camera follows the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowState {
    /// Camera recenters on every new position.
    Following,
    /// User is panning freely; the camera stays put.
    Free,
}

impl FollowState {
    /// Short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowState::Following => "following",
            FollowState::Free => "free",
        }
    }

    /// Whether the host should offer a recenter affordance.
    pub fn shows_recenter(&self) -> bool {
        matches!(self, FollowState::Free)
    }
}

impl fmt::Display for FollowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a camera target was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetReason {
    /// New position while following.
    Follow,
    /// Immediate response to a recenter action.
    Recenter,
    /// Background fix requested by a recenter with no known position.
    RecenterFix,
}

/// Notification for the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    /// Animate the camera to `target`.
    Target {
        target: CameraTarget,
        reason: TargetReason,
    },
    /// Follow mode changed.
    FollowChanged(FollowState),
}

#[derive(Debug)]
struct ControllerState {
    follow: FollowState,
    initial: Coordinate,
    latest: Option<Coordinate>,
    target: CameraTarget,
    /// Id of the recenter whose background fix may still be applied.
    pending_fix: Option<u64>,
    next_request_id: u64,
    detached: bool,
}

struct ControllerShared {
    settings: CameraSettings,
    tracker: Arc<LocationTracker>,
    state: Mutex<ControllerState>,
    events: broadcast::Sender<CameraEvent>,
}

impl ControllerShared {
    fn emit_target(&self, state: &mut ControllerState, center: Coordinate, reason: TargetReason) {
        let target = self.settings.target_at(center);
        state.target = target;
        debug!(
            latitude = center.latitude,
            longitude = center.longitude,
            ?reason,
            "Camera target"
        );
        let _ = self.events.send(CameraEvent::Target { target, reason });
    }

    fn set_follow(&self, state: &mut ControllerState, follow: FollowState) {
        if state.follow != follow {
            state.follow = follow;
            info!(follow = %follow, "Camera follow mode changed");
            let _ = self.events.send(CameraEvent::FollowChanged(follow));
        }
    }

    fn apply_fix(&self, request_id: u64, coord: Coordinate) {
        let mut state = self.state.lock();
        let active = !state.detached
            && state.follow == FollowState::Following
            && state.pending_fix == Some(request_id);
        if !active {
            debug!(request_id, "Discarding stale recenter fix");
            return;
        }
        state.pending_fix = None;
        state.latest = Some(coord);
        self.emit_target(&mut state, coord, TargetReason::RecenterFix);
    }
}

/// Reconciles the position stream with user gestures.
///
/// Cheap to clone; clones share state. The controller owns its
/// [`FollowState`] exclusively: only the operations below change it.
///
/// # Example
///
/// ```ignore
/// let controller = CameraFollowController::new(tracker, settings, initial);
/// let mut camera = controller.subscribe();
///
/// controller.on_position_update(Coordinate::new(2.0, 2.0)); // target {2,2}
/// controller.on_user_pan();                                 // Free
/// controller.on_position_update(Coordinate::new(3.0, 3.0)); // no target
/// controller.on_recenter();                                 // target {3,3}
/// ```
#[derive(Clone)]
pub struct CameraFollowController {
    shared: Arc<ControllerShared>,
}

impl fmt::Debug for CameraFollowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraFollowController")
            .field("settings", &self.shared.settings)
            .field("state", &*self.shared.state.lock())
            .finish_non_exhaustive()
    }
}

impl CameraFollowController {
    /// Create a controller in `Following` with the camera on `initial`.
    ///
    /// `initial` is also the fallback target for a recenter before any
    /// position is known.
    pub fn new(
        tracker: Arc<LocationTracker>,
        settings: CameraSettings,
        initial: Coordinate,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(ControllerShared {
                settings,
                tracker,
                state: Mutex::new(ControllerState {
                    follow: FollowState::Following,
                    initial,
                    latest: None,
                    target: settings.target_at(initial),
                    pending_fix: None,
                    next_request_id: 0,
                    detached: false,
                }),
                events,
            }),
        }
    }

    /// Subscribe to camera events.
    pub fn subscribe(&self) -> broadcast::Receiver<CameraEvent> {
        self.shared.events.subscribe()
    }

    /// User started a pan or zoom gesture.
    ///
    /// Disengages follow mode immediately, no debounce. Any pending recenter
    /// fix is abandoned.
    pub fn on_user_pan(&self) {
        let mut state = self.shared.state.lock();
        state.pending_fix = None;
        self.shared.set_follow(&mut state, FollowState::Free);
    }

    /// User asked to recenter on their position.
    ///
    /// Re-engages follow mode and targets the latest known coordinate. With
    /// no coordinate known, targets the initial location and requests a
    /// one-shot fix in the background; the returned handle resolves once that
    /// request has finished (applied or discarded).
    pub fn on_recenter(&self) -> Option<JoinHandle<()>> {
        let tracker_known = self.shared.tracker.last_known();

        let mut state = self.shared.state.lock();
        self.shared.set_follow(&mut state, FollowState::Following);
        state.next_request_id += 1;
        let request_id = state.next_request_id;

        if let Some(coord) = state.latest.or(tracker_known) {
            state.pending_fix = None;
            state.latest = Some(coord);
            self.shared
                .emit_target(&mut state, coord, TargetReason::Recenter);
            return None;
        }

        let initial = state.initial;
        self.shared
            .emit_target(&mut state, initial, TargetReason::Recenter);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime, skipping recenter fix");
                return None;
            }
        };
        state.pending_fix = Some(request_id);
        drop(state);

        let shared = Arc::clone(&self.shared);
        Some(runtime.spawn(async move {
            match shared.tracker.one_shot_location().await {
                Ok(coord) => shared.apply_fix(request_id, coord),
                Err(e) => {
                    debug!(request_id, error = %e, "Recenter fix failed, keeping initial target");
                    let mut state = shared.state.lock();
                    if state.pending_fix == Some(request_id) {
                        state.pending_fix = None;
                    }
                }
            }
        }))
    }

    /// Follow button: `Following` behaves as a pan, `Free` as a recenter.
    pub fn toggle_follow(&self) -> Option<JoinHandle<()>> {
        match self.follow_state() {
            FollowState::Following => {
                self.on_user_pan();
                None
            }
            FollowState::Free => self.on_recenter(),
        }
    }

    /// A new position arrived from the tracker.
    ///
    /// Always remembered as the latest coordinate; moves the camera only
    /// while following.
    pub fn on_position_update(&self, coord: Coordinate) {
        let mut state = self.shared.state.lock();
        if state.detached {
            return;
        }
        state.latest = Some(coord);
        match state.follow {
            FollowState::Following => {
                // A live position supersedes any pending recenter fix
                state.pending_fix = None;
                self.shared
                    .emit_target(&mut state, coord, TargetReason::Follow);
            }
            FollowState::Free => {
                trace!("Position update while free, camera unchanged");
            }
        }
    }

    /// Stop reacting to positions and discard any pending fix.
    pub fn detach(&self) {
        let mut state = self.shared.state.lock();
        state.detached = true;
        state.pending_fix = None;
    }

    /// Current camera target.
    pub fn current_target(&self) -> CameraTarget {
        self.shared.state.lock().target
    }

    /// Current follow mode.
    pub fn follow_state(&self) -> FollowState {
        self.shared.state.lock().follow
    }

    /// Latest coordinate the controller has seen.
    pub fn latest(&self) -> Option<Coordinate> {
        self.shared.state.lock().latest
    }

    /// Camera settings in use.
    pub fn settings(&self) -> &CameraSettings {
        &self.shared.settings
    }
}

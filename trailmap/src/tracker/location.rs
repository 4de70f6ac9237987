//! Location tracker implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use super::{Trail, TrackerEvent};
use crate::coord::Coordinate;
use crate::error::TrackingError;
use crate::permission::PermissionGate;
use crate::position::{
    PositionError, PositionEvent, PositionService, PositionSink, SubscriptionHandle, WatchOptions,
};

/// Default upper bound for a one-shot fix (10 seconds).
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(10);

/// Default capacity of the tracker event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration for the location tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Upper bound for one-shot fix acquisition.
    pub fix_timeout: Duration,
    /// Broadcast channel capacity for [`TrackerEvent`]s.
    pub event_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fix_timeout: DEFAULT_FIX_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// One active continuous watch.
///
/// `handle` is `None` between registering the session and the service
/// returning from `subscribe`.
#[derive(Debug)]
struct TrackingSession {
    id: u64,
    options: WatchOptions,
    handle: Option<SubscriptionHandle>,
}

#[derive(Debug, Default)]
struct TrackerState {
    session: Option<TrackingSession>,
    /// Options of a watch paused by [`LocationTracker::suspend_watching`].
    suspended: Option<WatchOptions>,
    last_known: Option<Coordinate>,
    /// Count of streamed updates applied, used to order one-shot fixes.
    update_seq: u64,
    trail: Trail,
}

impl TrackerState {
    fn is_active(&self, session_id: u64) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == session_id)
    }
}

struct TrackerShared {
    gate: Arc<PermissionGate>,
    service: Arc<dyn PositionService>,
    config: TrackerConfig,
    state: Mutex<TrackerState>,
    events: broadcast::Sender<TrackerEvent>,
    next_session_id: AtomicU64,
}

impl TrackerShared {
    /// Build the sink for a session. Holds only a weak reference so the
    /// service's copy of the sink does not keep the tracker alive.
    fn sink_for(self: &Arc<Self>, session_id: u64) -> PositionSink {
        let weak: Weak<TrackerShared> = Arc::downgrade(self);
        Arc::new(move |event: PositionEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_event(session_id, event);
            }
        })
    }

    fn handle_event(&self, session_id: u64, event: PositionEvent) {
        match event {
            PositionEvent::Update(coord) => {
                let mut state = self.state.lock();
                if !state.is_active(session_id) {
                    trace!(session_id, "Discarding update for inactive session");
                    return;
                }
                state.last_known = Some(coord);
                state.update_seq += 1;
                state.trail.push(coord);
                debug!(
                    session_id,
                    latitude = coord.latitude,
                    longitude = coord.longitude,
                    trail_len = state.trail.len(),
                    "Position update"
                );
                let _ = self.events.send(TrackerEvent::Position(coord));
            }
            PositionEvent::Error(e) if e.is_transient() => {
                debug!(session_id, error = %e, "Transient position error, keeping session");
            }
            PositionEvent::Error(e) => {
                warn!(session_id, error = %e, "Position subscription failed");
                self.end_session(
                    Some(session_id),
                    TrackerEvent::Failed(TrackingError::subscription(e.to_string())),
                );
            }
        }
    }

    /// Tear down the active session, optionally only if it has the given id.
    ///
    /// The session is removed and `event` broadcast under the lock, so no
    /// update for it can be applied afterwards. The handle is released after
    /// the lock is dropped. Returns true if a session was torn down.
    fn end_session(&self, only_id: Option<u64>, event: TrackerEvent) -> bool {
        let session = {
            let mut state = self.state.lock();
            let matches = match (only_id, state.session.as_ref()) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(id), Some(session)) => session.id == id,
            };
            if !matches {
                return false;
            }
            let session = state.session.take();
            let _ = self.events.send(event);
            session
        };

        if let Some(session) = session {
            self.release(session);
        }
        true
    }

    /// Give a removed session's handle back to the service.
    fn release(&self, session: TrackingSession) {
        info!(session_id = session.id, "Location watch stopped");
        if let Some(handle) = session.handle {
            self.service.unsubscribe(handle);
        }
    }
}

/// Owns the continuous position watch, the last known coordinate and the trail.
///
/// Construct once at the composition root and share by `Arc`. Dropping the
/// tracker releases any active subscription.
///
/// # Example
///
/// ```ignore
/// use trailmap::position::WatchOptions;
/// use trailmap::tracker::{LocationTracker, TrackerConfig};
///
/// let tracker = LocationTracker::new(gate, position_service, TrackerConfig::default());
/// let mut events = tracker.subscribe();
///
/// tracker.start_watching(WatchOptions::default())?;
/// while let Ok(event) = events.recv().await {
///     println!("{:?}", event);
/// }
/// ```
pub struct LocationTracker {
    shared: Arc<TrackerShared>,
}

impl std::fmt::Debug for LocationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationTracker")
            .field("config", &self.shared.config)
            .field("state", &*self.shared.state.lock())
            .finish_non_exhaustive()
    }
}

impl LocationTracker {
    /// Create a tracker gated on `gate` and backed by `service`.
    pub fn new(
        gate: Arc<PermissionGate>,
        service: Arc<dyn PositionService>,
        config: TrackerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            shared: Arc::new(TrackerShared {
                gate,
                service,
                config,
                state: Mutex::new(TrackerState::default()),
                events,
                next_session_id: AtomicU64::new(1),
            }),
        }
    }

    /// Subscribe to tracker notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.shared.events.subscribe()
    }

    /// The permission gate this tracker is bound to.
    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.shared.gate
    }

    /// Request a single fix bounded by the configured timeout.
    ///
    /// A fix becomes the last known coordinate but is not part of the trail
    /// and is not broadcast. A fix that resolves after a streamed update
    /// arrived is returned but does not replace the newer coordinate.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if permission is not granted
    /// - `LocationUnavailable` on timeout or service failure
    pub async fn one_shot_location(&self) -> Result<Coordinate, TrackingError> {
        if !self.shared.gate.status().is_granted() {
            return Err(TrackingError::PermissionDenied);
        }

        let seq_at_request = self.shared.state.lock().update_seq;
        let timeout = self.shared.config.fix_timeout;
        let request = self.shared.service.current_position(timeout);
        let coord = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(coord)) => coord,
            Ok(Err(PositionError::PermissionRevoked)) => {
                return Err(TrackingError::PermissionDenied);
            }
            Ok(Err(e)) => {
                debug!(error = %e, "One-shot fix failed");
                return Err(TrackingError::unavailable(e.to_string()));
            }
            Err(_) => {
                debug!(timeout_ms = timeout.as_millis(), "One-shot fix timed out");
                return Err(TrackingError::unavailable(format!(
                    "no fix within {}ms",
                    timeout.as_millis()
                )));
            }
        };

        {
            let mut state = self.shared.state.lock();
            if state.update_seq != seq_at_request {
                debug!("One-shot fix superseded by streamed update");
                return Ok(coord);
            }
            state.last_known = Some(coord);
        }
        debug!(
            latitude = coord.latitude,
            longitude = coord.longitude,
            "One-shot fix acquired"
        );
        Ok(coord)
    }

    /// Begin a continuous watch.
    ///
    /// No-op if a session with equal options is already active. A session
    /// with different options is torn down before the new one subscribes.
    /// Any suspended watch is discarded.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if permission is not granted (nothing is held)
    /// - `SubscriptionFailure` if the service refuses the subscription
    pub fn start_watching(&self, options: WatchOptions) -> Result<(), TrackingError> {
        let permission = self.shared.gate.status();
        if !permission.is_granted() {
            warn!(status = %permission, "Refusing to watch location without permission");
            return Err(TrackingError::PermissionDenied);
        }

        let session_id = self.shared.next_session_id.fetch_add(1, Ordering::Relaxed);
        let previous = {
            let mut state = self.shared.state.lock();
            state.suspended = None;
            if let Some(active) = state.session.as_ref() {
                if active.options == options {
                    debug!(session_id = active.id, "Watch already active with same options");
                    return Ok(());
                }
            }
            let previous = state.session.take();
            if previous.is_some() {
                let _ = self.shared.events.send(TrackerEvent::Stopped);
            }
            state.session = Some(TrackingSession {
                id: session_id,
                options,
                handle: None,
            });
            let _ = self.shared.events.send(TrackerEvent::Started(options));
            previous
        };

        if let Some(previous) = previous {
            info!(
                session_id = previous.id,
                "Replacing location watch with new options"
            );
            if let Some(handle) = previous.handle {
                self.shared.service.unsubscribe(handle);
            }
        }

        let sink = self.shared.sink_for(session_id);
        match self.shared.service.subscribe(&options, sink) {
            Ok(handle) => {
                let mut state = self.shared.state.lock();
                match state.session.as_mut() {
                    Some(session) if session.id == session_id => {
                        session.handle = Some(handle);
                        info!(
                            session_id,
                            interval_ms = options.min_interval.as_millis(),
                            accuracy = %options.accuracy,
                            "Location watch started"
                        );
                        Ok(())
                    }
                    _ => {
                        // Ended while subscribing (stop or failure event)
                        drop(state);
                        self.shared.service.unsubscribe(handle);
                        Err(TrackingError::subscription(
                            "session ended while subscribing",
                        ))
                    }
                }
            }
            Err(e) => {
                warn!(session_id, error = %e, "Location subscription refused");
                self.shared.end_session(Some(session_id), TrackerEvent::Stopped);
                Err(TrackingError::subscription(e.to_string()))
            }
        }
    }

    /// Release the active watch. Idempotent.
    ///
    /// Once this returns no further update is applied or broadcast for the
    /// released session, even if the platform delivers one late. A suspended
    /// watch is discarded too, so it can no longer be resumed.
    pub fn stop_watching(&self) {
        if self.shared.state.lock().suspended.take().is_some() {
            debug!("Suspended location watch discarded");
        }
        self.shared.end_session(None, TrackerEvent::Stopped);
    }

    /// Pause the active watch, remembering its options for
    /// [`resume_watching`](Self::resume_watching).
    ///
    /// Returns false if no watch was active.
    pub fn suspend_watching(&self) -> bool {
        let session = {
            let mut state = self.shared.state.lock();
            let Some(session) = state.session.take() else {
                return false;
            };
            state.suspended = Some(session.options);
            let _ = self.shared.events.send(TrackerEvent::Stopped);
            session
        };
        self.shared.release(session);
        true
    }

    /// Restart a suspended watch with its original options.
    ///
    /// Returns `Ok(false)` if nothing is suspended, either because no watch
    /// was paused or because its owner stopped it meanwhile.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if permission is not granted; the watch stays
    ///   suspended
    /// - `SubscriptionFailure` if the service refuses the subscription
    pub fn resume_watching(&self) -> Result<bool, TrackingError> {
        if !self.shared.gate.status().is_granted() {
            return Err(TrackingError::PermissionDenied);
        }
        let Some(options) = self.shared.state.lock().suspended.take() else {
            return Ok(false);
        };
        self.start_watching(options).map(|()| true)
    }

    /// Options of a suspended watch, if any.
    pub fn suspended_options(&self) -> Option<WatchOptions> {
        self.shared.state.lock().suspended
    }

    /// Empty the trail without touching the subscription.
    pub fn clear_trail(&self) {
        self.shared.state.lock().trail.clear();
        debug!("Trail cleared");
    }

    /// Check if a watch session is active.
    pub fn is_watching(&self) -> bool {
        self.shared.state.lock().session.is_some()
    }

    /// Options of the active session.
    pub fn active_options(&self) -> Option<WatchOptions> {
        self.shared.state.lock().session.as_ref().map(|s| s.options)
    }

    /// Most recent observed coordinate.
    pub fn last_known(&self) -> Option<Coordinate> {
        self.shared.state.lock().last_known
    }

    /// Snapshot of the trail coordinates (oldest first).
    pub fn trail(&self) -> Vec<Coordinate> {
        self.shared.state.lock().trail.coordinates()
    }

    /// Number of points in the trail.
    pub fn trail_len(&self) -> usize {
        self.shared.state.lock().trail.len()
    }
}

impl Drop for LocationTracker {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

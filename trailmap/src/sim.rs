//! Simulated platform services.
//!
//! In-process implementations of [`PermissionService`] and
//! [`PositionService`] driven by explicit calls instead of an OS. Used by the
//! test suites and by the CLI `replay` command to push a recorded track
//! through the core.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trailmap::sim::SimulatedPositionService;
//! use trailmap::position::{PositionEvent, PositionService, WatchOptions};
//! use trailmap::Coordinate;
//!
//! let service = SimulatedPositionService::new();
//! let handle = service
//!     .subscribe(&WatchOptions::default(), Arc::new(|event: PositionEvent| println!("{:?}", event)))
//!     .unwrap();
//! service.emit(Coordinate::new(1.0, 1.0));
//! service.unsubscribe(handle);
//! assert_eq!(service.active_subscriptions(), 0);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;

use crate::coord::Coordinate;
use crate::permission::{PermissionService, PermissionServiceError, PermissionState};
use crate::position::{
    PositionError, PositionEvent, PositionService, PositionSink, SubscriptionHandle, WatchOptions,
};

// =============================================================================
// Permission service
// =============================================================================

#[derive(Debug)]
struct PermissionSimState {
    status: PermissionState,
    request_outcome: PermissionState,
    failing: bool,
    prompts: usize,
}

/// Scripted permission service.
///
/// `request_permission` answers with the configured outcome while the
/// platform status is undetermined, and returns the stored status otherwise,
/// like an OS that never re-prompts.
#[derive(Debug)]
pub struct SimulatedPermissionService {
    state: Mutex<PermissionSimState>,
}

impl SimulatedPermissionService {
    /// Create a service reporting `status`. Requests grant by default.
    pub fn new(status: PermissionState) -> Self {
        Self {
            state: Mutex::new(PermissionSimState {
                status,
                request_outcome: PermissionState::Granted,
                failing: false,
                prompts: 0,
            }),
        }
    }

    /// Set what the user answers to the permission dialog.
    pub fn with_request_outcome(self, outcome: PermissionState) -> Self {
        self.state.lock().request_outcome = outcome;
        self
    }

    /// Change the platform status (e.g. user edited system settings).
    pub fn set_status(&self, status: PermissionState) {
        self.state.lock().status = status;
    }

    /// Make every call fail with `Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Number of times the dialog was shown.
    pub fn prompt_count(&self) -> usize {
        self.state.lock().prompts
    }
}

impl PermissionService for SimulatedPermissionService {
    fn check_permission(&self) -> BoxFuture<'_, Result<PermissionState, PermissionServiceError>> {
        let result = {
            let state = self.state.lock();
            if state.failing {
                Err(PermissionServiceError::Unavailable(
                    "simulated fault".to_string(),
                ))
            } else {
                Ok(state.status)
            }
        };
        async move { result }.boxed()
    }

    fn request_permission(
        &self,
    ) -> BoxFuture<'_, Result<PermissionState, PermissionServiceError>> {
        let result = {
            let mut state = self.state.lock();
            if state.failing {
                Err(PermissionServiceError::Unavailable(
                    "simulated fault".to_string(),
                ))
            } else {
                if state.status == PermissionState::Undetermined {
                    state.prompts += 1;
                    state.status = state.request_outcome;
                }
                Ok(state.status)
            }
        };
        async move { result }.boxed()
    }
}

// =============================================================================
// Position service
// =============================================================================

#[derive(Default)]
struct PositionSimState {
    active: BTreeMap<u64, (WatchOptions, PositionSink)>,
    released: Vec<PositionSink>,
    next_id: u64,
    subscribe_calls: usize,
    refuse: bool,
    fix: Option<Coordinate>,
    fix_delay: Duration,
}

/// Scripted position service.
///
/// Sinks are invoked on the caller's thread with no internal lock held.
/// `current_position` ignores the requested timeout so that callers' own
/// bounds are what limits the wait.
#[derive(Default)]
pub struct SimulatedPositionService {
    state: Mutex<PositionSimState>,
}

impl std::fmt::Debug for SimulatedPositionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SimulatedPositionService")
            .field("active", &state.active.len())
            .field("subscribe_calls", &state.subscribe_calls)
            .field("fix", &state.fix)
            .finish_non_exhaustive()
    }
}

impl SimulatedPositionService {
    /// Create a service with no fix available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fix returned by `current_position`.
    pub fn with_fix(self, fix: Coordinate) -> Self {
        self.set_fix(Some(fix));
        self
    }

    /// Set (or clear) the fix returned by `current_position`.
    pub fn set_fix(&self, fix: Option<Coordinate>) {
        self.state.lock().fix = fix;
    }

    /// Delay before `current_position` resolves.
    pub fn set_fix_delay(&self, delay: Duration) {
        self.state.lock().fix_delay = delay;
    }

    /// Make `subscribe` fail with `ServiceUnavailable`.
    pub fn refuse_subscriptions(&self, refuse: bool) {
        self.state.lock().refuse = refuse;
    }

    /// Deliver a position update to every active subscription.
    pub fn emit(&self, coord: Coordinate) {
        self.deliver(PositionEvent::Update(coord), false);
    }

    /// Deliver an error to every active subscription.
    pub fn emit_error(&self, error: PositionError) {
        self.deliver(PositionEvent::Error(error), false);
    }

    /// Deliver an event to every sink ever registered, including released
    /// ones, as a platform callback that was already in flight would.
    pub fn deliver_late(&self, event: PositionEvent) {
        self.deliver(event, true);
    }

    /// Number of subscriptions not yet released.
    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Total number of `subscribe` calls.
    pub fn subscribe_calls(&self) -> usize {
        self.state.lock().subscribe_calls
    }

    /// Options of the active subscriptions (oldest first).
    pub fn active_options(&self) -> Vec<WatchOptions> {
        self.state
            .lock()
            .active
            .values()
            .map(|(options, _)| *options)
            .collect()
    }

    fn deliver(&self, event: PositionEvent, include_released: bool) {
        let sinks: Vec<PositionSink> = {
            let state = self.state.lock();
            let mut sinks: Vec<PositionSink> =
                state.active.values().map(|(_, sink)| sink.clone()).collect();
            if include_released {
                sinks.extend(state.released.iter().cloned());
            }
            sinks
        };
        for sink in sinks {
            sink(event.clone());
        }
    }
}

impl PositionService for SimulatedPositionService {
    fn current_position(
        &self,
        _timeout: Duration,
    ) -> BoxFuture<'_, Result<Coordinate, PositionError>> {
        let (fix, delay) = {
            let state = self.state.lock();
            (state.fix, state.fix_delay)
        };
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            fix.ok_or(PositionError::Timeout)
        }
        .boxed()
    }

    fn subscribe(
        &self,
        options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<SubscriptionHandle, PositionError> {
        let mut state = self.state.lock();
        state.subscribe_calls += 1;
        if state.refuse {
            return Err(PositionError::ServiceUnavailable(
                "simulated refusal".to_string(),
            ));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.active.insert(id, (*options, sink));
        Ok(SubscriptionHandle::new(id))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut state = self.state.lock();
        if let Some((_, sink)) = state.active.remove(&handle.id()) {
            state.released.push(sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recording_sink() -> (PositionSink, Arc<Mutex<Vec<PositionEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: PositionSink = Arc::new(move |event: PositionEvent| sink_seen.lock().push(event));
        (sink, seen)
    }

    #[test]
    fn test_emit_reaches_active_sinks_only() {
        let service = SimulatedPositionService::new();
        let (sink, seen) = recording_sink();
        let handle = service.subscribe(&WatchOptions::default(), sink).unwrap();

        service.emit(Coordinate::new(1.0, 1.0));
        service.unsubscribe(handle);
        service.emit(Coordinate::new(2.0, 2.0));

        assert_eq!(
            *seen.lock(),
            vec![PositionEvent::Update(Coordinate::new(1.0, 1.0))]
        );
    }

    #[test]
    fn test_deliver_late_reaches_released_sinks() {
        let service = SimulatedPositionService::new();
        let (sink, seen) = recording_sink();
        let handle = service.subscribe(&WatchOptions::default(), sink).unwrap();
        service.unsubscribe(handle);

        service.deliver_late(PositionEvent::Update(Coordinate::new(3.0, 3.0)));

        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_refused_subscription_counts_call() {
        let service = SimulatedPositionService::new();
        service.refuse_subscriptions(true);
        let (sink, _) = recording_sink();

        assert!(service.subscribe(&WatchOptions::default(), sink).is_err());
        assert_eq!(service.subscribe_calls(), 1);
        assert_eq!(service.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_current_position() {
        let service = SimulatedPositionService::new();
        assert_eq!(
            service.current_position(Duration::from_secs(1)).await,
            Err(PositionError::Timeout)
        );

        service.set_fix(Some(Coordinate::new(5.0, 6.0)));
        assert_eq!(
            service.current_position(Duration::from_secs(1)).await,
            Ok(Coordinate::new(5.0, 6.0))
        );
    }

    #[tokio::test]
    async fn test_permission_request_only_prompts_once() {
        let service = SimulatedPermissionService::new(PermissionState::Undetermined)
            .with_request_outcome(PermissionState::Denied);

        assert_eq!(service.request_permission().await, Ok(PermissionState::Denied));
        assert_eq!(service.request_permission().await, Ok(PermissionState::Denied));
        assert_eq!(service.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_permission_failure() {
        let service = SimulatedPermissionService::new(PermissionState::Granted);
        service.set_failing(true);
        assert!(service.check_permission().await.is_err());
    }
}

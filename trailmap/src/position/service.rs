//! Position service trait and event types.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use super::WatchOptions;
use crate::coord::Coordinate;

/// Errors reported by the platform position service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Temporary loss of signal. The subscription stays alive.
    #[error("Position signal lost")]
    SignalLost,

    /// The location service is disabled or unreachable.
    #[error("Location service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Permission was revoked while the subscription was active.
    #[error("Location permission revoked")]
    PermissionRevoked,

    /// No fix was produced within the requested time.
    #[error("Timed out waiting for a position fix")]
    Timeout,
}

impl PositionError {
    /// Whether the condition is expected to clear on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, PositionError::SignalLost)
    }
}

/// A raw event delivered to a subscription sink.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    /// A new position fix.
    Update(Coordinate),
    /// The subscription reported an error.
    Error(PositionError),
}

/// Callback receiving raw events for one subscription.
///
/// Services must not hold internal locks while invoking a sink; the sink
/// may call back into the service (e.g. to unsubscribe).
pub type PositionSink = Arc<dyn Fn(PositionEvent) + Send + Sync>;

/// Opaque handle for an active subscription.
///
/// Not `Clone`: exactly one owner can give it back via
/// [`PositionService::unsubscribe`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Wrap a service-specific subscription id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Service-specific subscription id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Platform position API.
///
/// # Example
///
/// ```ignore
/// let handle = service.subscribe(&WatchOptions::default(), Arc::new(|event| {
///     println!("{:?}", event);
/// }))?;
/// // ...
/// service.unsubscribe(handle);
/// ```
pub trait PositionService: Send + Sync {
    /// Request a single fix, waiting at most `timeout`.
    fn current_position(&self, timeout: Duration)
        -> BoxFuture<'_, Result<Coordinate, PositionError>>;

    /// Start delivering events to `sink` until unsubscribed.
    fn subscribe(
        &self,
        options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<SubscriptionHandle, PositionError>;

    /// Stop a subscription. No events are delivered for it afterwards.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_signal_loss_is_transient() {
        assert!(PositionError::SignalLost.is_transient());
        assert!(!PositionError::PermissionRevoked.is_transient());
        assert!(!PositionError::ServiceUnavailable("gps off".into()).is_transient());
        assert!(!PositionError::Timeout.is_transient());
    }

    #[test]
    fn test_handle_exposes_id() {
        let handle = SubscriptionHandle::new(42);
        assert_eq!(handle.id(), 42);
    }
}

//! Error taxonomy for location operations.
//!
//! Only conditions the UI layer must react to are represented here.
//! Transient conditions (no fix yet, signal loss) are state, not errors:
//! they show up as an absent last-known coordinate or a quiet stream.

use thiserror::Error;

/// Errors surfaced by the tracker and the map session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// Location permission is not granted.
    ///
    /// Non-fatal: the host should redirect to the permission flow.
    #[error("Location permission not granted")]
    PermissionDenied,

    /// A one-shot fix timed out or the service reported no fix.
    ///
    /// Non-fatal: callers fall back to a default coordinate.
    #[error("Location unavailable: {reason}")]
    LocationUnavailable { reason: String },

    /// A continuous watch failed after being active, or could not be created.
    ///
    /// The session has been torn down. No retry is attempted by the core.
    #[error("Location subscription failed: {reason}")]
    SubscriptionFailure { reason: String },
}

impl TrackingError {
    /// Build a `LocationUnavailable` error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        TrackingError::LocationUnavailable {
            reason: reason.into(),
        }
    }

    /// Build a `SubscriptionFailure` error.
    pub fn subscription(reason: impl Into<String>) -> Self {
        TrackingError::SubscriptionFailure {
            reason: reason.into(),
        }
    }
}

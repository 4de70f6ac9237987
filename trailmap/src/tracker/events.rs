//! Tracker change notifications.

use crate::coord::Coordinate;
use crate::error::TrackingError;
use crate::position::WatchOptions;

/// Notification broadcast by the [`LocationTracker`](super::LocationTracker).
///
/// Delivered in the order the tracker mutated its state, which is the order
/// the position service produced the underlying events.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A watch session started with the given options.
    Started(WatchOptions),
    /// A new position was recorded (last known + trail).
    Position(Coordinate),
    /// The active session was stopped by the caller.
    Stopped,
    /// The active session was torn down by a service failure.
    Failed(TrackingError),
}

impl TrackerEvent {
    /// The coordinate carried by a `Position` event.
    pub fn position(&self) -> Option<Coordinate> {
        match self {
            TrackerEvent::Position(coord) => Some(*coord),
            _ => None,
        }
    }
}

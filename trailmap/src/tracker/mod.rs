//! Live position tracking.
//!
//! The [`LocationTracker`] owns the single continuous watch of a map screen,
//! the last known coordinate and the [`Trail`] of visited points.
//!
//! # Session Lifecycle
//!
//! ```text
//! Idle --[start_watching, granted]--> Watching(session N)
//! Watching --[start_watching, same options]--> Watching (no-op)
//! Watching --[start_watching, new options]--> Watching(session N+1)
//! Watching --[stop_watching | Drop]--> Idle
//! Watching --[ServiceUnavailable | PermissionRevoked]--> Idle + Failed event
//! Watching --[SignalLost]--> Watching (absorbed)
//! ```
//!
//! Each session has a monotonic id. Raw events are tagged with the id of the
//! session that subscribed them, and anything tagged with an id that is no
//! longer active is dropped without touching the trail or notifying.

mod events;
mod location;
mod trail;

pub use events::TrackerEvent;
pub use location::{LocationTracker, TrackerConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_FIX_TIMEOUT};
pub use trail::{Trail, TrailPoint};

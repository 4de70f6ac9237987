//! Camera follow state machine.
//!
//! The [`CameraFollowController`] decides where the map camera should point
//! and whether it tracks the user. It never touches a rendering surface; it
//! only emits [`CameraEvent`]s that the host animates.
//!
//! # State Machine
//!
//! ```text
//! Following --[user pan/zoom]--> Free
//! Free      --[user pan/zoom]--> Free
//! Following --[recenter]-------> Following (+ target on latest)
//! Free      --[recenter]-------> Following (+ target on latest)
//! Following --[position]-------> Following (+ target on position)
//! Free      --[position]-------> Free      (camera untouched)
//! ```
//!
//! A recenter with no known position targets the initial location and asks
//! the tracker for a fix in the background. That fix is applied only if the
//! recenter is still the active request when it resolves.

mod controller;
mod target;

pub use controller::{CameraEvent, CameraFollowController, FollowState, TargetReason};
pub use target::{
    CameraSettings, CameraTarget, ZoomHint, DEFAULT_ANIMATION, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM,
    DEFAULT_REGION_DELTA,
};

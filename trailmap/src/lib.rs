//! Trailmap - live position tracking with a follow-me map camera
//!
//! This library provides the core of a live map screen: permission gating,
//! a continuous position watch with an accumulated trail, and the camera
//! follow state machine that reconciles the position stream with user
//! gestures. Rendering, navigation and platform dialogs are collaborators
//! behind the traits in [`permission`] and [`position`].
//!
//! # Architecture
//!
//! ```text
//! PermissionService ──► PermissionGate ──► RouteGuard ──► host navigation
//!                             │
//!                             ▼ granted
//! PositionService ───► LocationTracker ──► TrackerEvent (broadcast)
//!                                                │
//!                                                ▼
//!                gestures ──► CameraFollowController ──► CameraEvent
//! ```

pub mod app;
pub mod camera;
pub mod config;
pub mod coord;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod navigation;
pub mod permission;
pub mod position;
pub mod session;
pub mod sim;
pub mod tracker;

pub use coord::Coordinate;
pub use error::TrackingError;

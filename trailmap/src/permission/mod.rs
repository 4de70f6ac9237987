//! Location permission gating.
//!
//! The [`PermissionGate`] owns the app's view of the OS location permission.
//! It talks to the platform through the [`PermissionService`] trait and
//! publishes every status change on a watch channel so navigation and the
//! tracker can react.
//!
//! # Fail-soft
//!
//! Platform faults never propagate out of the gate. A check or request that
//! errors is reported as [`PermissionState::Denied`], so callers are never
//! blocked on a broken permission service.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trailmap::permission::{PermissionGate, PermissionState};
//!
//! let gate = Arc::new(PermissionGate::new(platform_service));
//! if gate.check_status().await == PermissionState::Undetermined {
//!     gate.request_permission().await;
//! }
//! ```

mod gate;
mod service;
mod state;

pub use gate::PermissionGate;
pub use service::{PermissionService, PermissionServiceError};
pub use state::{ParsePermissionStateError, PermissionState};

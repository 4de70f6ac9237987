//! Composition root.
//!
//! `TrailmapApp` builds the permission gate, the tracker, the route guard and
//! the lifecycle monitor once, wires them together and hands out `Arc`s.
//! There is no global store; hosts keep the app value and pass its parts
//! down to screens.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────── TrailmapApp ─────────────────────────────┐
//! │                                                                           │
//! │  PermissionService ──► PermissionGate ──watch──► RouteGuard ──► Route     │
//! │                              │                                            │
//! │  PositionService ────► LocationTracker ◄── LifecycleMonitor ◄── mpsc      │
//! │                              │                                            │
//! │                              └──► MapSession (per map screen)             │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trailmap::app::{AppConfig, TrailmapApp};
//!
//! let config = AppConfig::load(None)?;
//! let app = TrailmapApp::start(config, permission_service, position_service).await;
//!
//! if app.request_permission().await.is_granted() {
//!     let session = app.mount_map().await?;
//!     // ...
//!     session.unmount().await;
//! }
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::TrailmapApp;
pub use config::AppConfig;
pub use error::AppError;

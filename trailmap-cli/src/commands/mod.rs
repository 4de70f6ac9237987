//! CLI command implementations.
//!
//! - [`config`] - Configuration management (path, list, init)
//! - [`replay`] - Feed a recorded track through the map session

pub mod config;
pub mod replay;

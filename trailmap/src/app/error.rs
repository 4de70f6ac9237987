//! Application error types.

use thiserror::Error;

use crate::config::ConfigFileError;

/// Errors raised while preparing the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigFileError),

    /// Log output could not be set up.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[source] std::io::Error),
}

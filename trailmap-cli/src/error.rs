//! CLI error handling with user-facing messages.

use std::fmt;
use std::path::PathBuf;
use std::process;

use trailmap::app::AppError;
use trailmap::config::ConfigFileError;
use trailmap::TrackingError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Track file could not be read
    TrackRead { path: PathBuf, error: std::io::Error },
    /// Track file line could not be parsed
    TrackParse { line: usize, reason: String },
    /// Tracking refused or failed
    Tracking(TrackingError),
}

impl CliError {
    /// Print the error (with hints where useful) and exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Tracking(TrackingError::PermissionDenied) => {
                eprintln!();
                eprintln!("The simulated user denied location access.");
                eprintln!("Re-run without --deny, or with --permission granted.");
            }
            CliError::TrackParse { .. } => {
                eprintln!();
                eprintln!("Expected one 'latitude,longitude' pair per line, e.g.:");
                eprintln!("  47.3769,8.5417");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::TrackRead { path, error } => {
                write!(f, "Failed to read track '{}': {}", path.display(), error)
            }
            CliError::TrackParse { line, reason } => {
                write!(f, "Invalid track line {}: {}", line, reason)
            }
            CliError::Tracking(e) => write!(f, "Tracking failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::TrackRead { error, .. } => Some(error),
            CliError::Tracking(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Config(e) => CliError::Config(e.to_string()),
            AppError::Logging(e) => CliError::LoggingInit(e.to_string()),
        }
    }
}

impl From<TrackingError> for CliError {
    fn from(e: TrackingError) -> Self {
        CliError::Tracking(e)
    }
}

//! Application configuration for `TrailmapApp`.

use std::path::Path;

use super::error::AppError;
use crate::config::ConfigFile;
use crate::lifecycle::LifecycleConfig;
use crate::logging::{self, LoggingGuard};
use crate::session::MapSessionConfig;
use crate::tracker::TrackerConfig;

/// Everything `TrailmapApp::start` needs, resolved from the config file.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub session: MapSessionConfig,
    pub lifecycle: LifecycleConfig,
    /// Source file values, kept for logging setup and display.
    pub file: ConfigFile,
}

impl AppConfig {
    /// Load from `path`, or from `~/.trailmap/config.ini` when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        Ok(Self::from_config_file(file))
    }

    /// Derive component settings from a parsed config file.
    pub fn from_config_file(file: ConfigFile) -> Self {
        Self {
            tracker: file.tracker_config(),
            session: MapSessionConfig {
                watch: file.watch_options(),
                camera: file.camera_settings(),
            },
            lifecycle: file.lifecycle,
            file,
        }
    }

    /// Install file and stdout logging as configured in `[logging]`.
    pub fn init_logging(&self) -> Result<LoggingGuard, AppError> {
        logging::init_logging(&self.file.logging.directory, &self.file.logging.file)
            .map_err(AppError::Logging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::AccuracyTier;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[tracking]\naccuracy = low\nfix_timeout_ms = 2500\n[lifecycle]\nsuspend_on_background = true\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();

        assert_eq!(config.session.watch.accuracy, AccuracyTier::Low);
        assert_eq!(config.tracker.fix_timeout, Duration::from_millis(2500));
        assert!(config.lifecycle.suspend_on_background);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[camera]\nmin_zoom = huge\n").unwrap();

        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(AppError::Config(_))
        ));
    }
}

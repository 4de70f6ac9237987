//! Configuration sections and their defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::camera::{
    CameraSettings, ZoomHint, DEFAULT_ANIMATION, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM,
    DEFAULT_REGION_DELTA,
};
use crate::coord::Coordinate;
use crate::lifecycle::LifecycleConfig;
use crate::logging::{DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};
use crate::position::{AccuracyTier, WatchOptions};
use crate::tracker::{TrackerConfig, DEFAULT_EVENT_CAPACITY};

/// Default minimum interval between position updates.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 5000;

/// Default bound on a one-shot fix.
pub const DEFAULT_FIX_TIMEOUT_MS: u64 = 10_000;

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSection {
    pub update_interval: Duration,
    pub accuracy: AccuracyTier,
    pub fix_timeout: Duration,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS),
            accuracy: AccuracyTier::default(),
            fix_timeout: Duration::from_millis(DEFAULT_FIX_TIMEOUT_MS),
        }
    }
}

/// `[camera]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSection {
    /// Where the camera starts when no position is known.
    pub default_location: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub animation: Duration,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            default_location: Coordinate::new(0.0, 0.0),
            latitude_delta: DEFAULT_REGION_DELTA,
            longitude_delta: DEFAULT_REGION_DELTA,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            animation: DEFAULT_ANIMATION,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSection {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub tracking: TrackingSection,
    pub camera: CameraSection,
    /// `[lifecycle]` section.
    pub lifecycle: LifecycleConfig,
    pub logging: LoggingSection,
}

impl ConfigFile {
    /// Options for the continuous watch.
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions::new(self.tracking.update_interval, self.tracking.accuracy)
    }

    /// Tracker settings.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            fix_timeout: self.tracking.fix_timeout,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Camera settings for the follow controller.
    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            default_location: self.camera.default_location,
            zoom: ZoomHint {
                latitude_delta: self.camera.latitude_delta,
                longitude_delta: self.camera.longitude_delta,
                min_zoom: self.camera.min_zoom,
                max_zoom: self.camera.max_zoom,
            },
            animation: self.camera.animation,
        }
    }
}

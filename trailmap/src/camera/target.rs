//! Camera target values.

use std::time::Duration;

use crate::coord::Coordinate;

/// Default visible span in degrees around the center (both axes).
pub const DEFAULT_REGION_DELTA: f64 = 0.005;

/// Default minimum zoom level the map allows.
pub const DEFAULT_MIN_ZOOM: u8 = 15;

/// Default maximum zoom level the map allows.
pub const DEFAULT_MAX_ZOOM: u8 = 20;

/// Default camera animation duration.
pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(1000);

/// Zoom hint for the renderer: the region span plus the allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomHint {
    /// Visible latitude span in degrees.
    pub latitude_delta: f64,
    /// Visible longitude span in degrees.
    pub longitude_delta: f64,
    /// Lowest zoom level the user may reach.
    pub min_zoom: u8,
    /// Highest zoom level the user may reach.
    pub max_zoom: u8,
}

impl Default for ZoomHint {
    fn default() -> Self {
        Self {
            latitude_delta: DEFAULT_REGION_DELTA,
            longitude_delta: DEFAULT_REGION_DELTA,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// Where the camera should point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    /// Center of the view.
    pub center: Coordinate,
    /// Span and zoom bounds.
    pub zoom: ZoomHint,
    /// Suggested animation duration.
    pub animation: Duration,
}

/// Camera configuration shared by every target the controller computes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Used when no position is known at all.
    pub default_location: Coordinate,
    /// Span and zoom bounds.
    pub zoom: ZoomHint,
    /// Animation duration for every target.
    pub animation: Duration,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            default_location: Coordinate::new(0.0, 0.0),
            zoom: ZoomHint::default(),
            animation: DEFAULT_ANIMATION,
        }
    }
}

impl CameraSettings {
    /// Compute the target centered on `center`.
    pub fn target_at(&self, center: Coordinate) -> CameraTarget {
        CameraTarget {
            center,
            zoom: self.zoom,
            animation: self.animation,
        }
    }
}

//! Trail of visited positions.
//!
//! Append-only while a session is active: insertion order is temporal
//! order and nothing is deduplicated or rate limited here. The platform
//! already applies the watch interval.

use std::time::{Duration, Instant};

use crate::coord::Coordinate;

/// A single recorded point in the trail.
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    /// Recorded position.
    pub coordinate: Coordinate,
    /// When this point was recorded.
    pub recorded_at: Instant,
}

impl TrailPoint {
    /// Create a point recorded now.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            recorded_at: Instant::now(),
        }
    }

    /// Create a point with explicit timestamp (for testing).
    pub fn with_timestamp(coordinate: Coordinate, recorded_at: Instant) -> Self {
        Self {
            coordinate,
            recorded_at,
        }
    }
}

/// Ordered history of observed coordinates (oldest first).
///
/// # Usage
///
/// ```
/// use trailmap::tracker::Trail;
/// use trailmap::Coordinate;
///
/// let mut trail = Trail::new();
/// trail.push(Coordinate::new(1.0, 1.0));
/// trail.push(Coordinate::new(1.0, 1.0));
///
/// assert_eq!(trail.len(), 2);
/// assert_eq!(trail.latest(), Some(Coordinate::new(1.0, 1.0)));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Trail {
    points: Vec<TrailPoint>,
}

impl Trail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a coordinate recorded now.
    pub fn push(&mut self, coordinate: Coordinate) {
        self.points.push(TrailPoint::new(coordinate));
    }

    /// Append a coordinate with explicit timestamp (for testing).
    #[cfg(test)]
    pub fn push_at(&mut self, coordinate: Coordinate, recorded_at: Instant) {
        self.points
            .push(TrailPoint::with_timestamp(coordinate, recorded_at));
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the trail has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Iterate over recorded points (oldest first).
    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    /// Copy of the coordinates in recording order, as drawn by the polyline.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.points.iter().map(|p| p.coordinate).collect()
    }

    /// Most recent coordinate.
    pub fn latest(&self) -> Option<Coordinate> {
        self.points.last().map(|p| p.coordinate)
    }

    /// Time between the first and last recorded point.
    pub fn time_span(&self) -> Option<Duration> {
        let oldest = self.points.first()?;
        let newest = self.points.last()?;
        Some(newest.recorded_at.duration_since(oldest.recorded_at))
    }
}

//! Continuous-watch options.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default minimum interval between updates (5 seconds).
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(5000);

/// Desired accuracy of position updates.
///
/// Maps onto the platform's priority classes (coarse network, balanced,
/// GPS high accuracy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccuracyTier {
    /// Coarse, low-power positioning.
    Low,
    /// Balanced power and accuracy.
    Balanced,
    /// Best available accuracy (GPS).
    #[default]
    High,
}

impl AccuracyTier {
    /// Get the lowercase name used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccuracyTier::Low => "low",
            AccuracyTier::Balanced => "balanced",
            AccuracyTier::High => "high",
        }
    }
}

impl fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing an [`AccuracyTier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown accuracy tier '{0}' (expected low, balanced or high)")]
pub struct ParseAccuracyError(pub String);

impl FromStr for AccuracyTier {
    type Err = ParseAccuracyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(AccuracyTier::Low),
            "balanced" => Ok(AccuracyTier::Balanced),
            "high" => Ok(AccuracyTier::High),
            _ => Err(ParseAccuracyError(s.to_string())),
        }
    }
}

/// Options for a continuous position watch.
///
/// Two watches are compatible when their options compare equal; the tracker
/// keeps an active session instead of restarting it in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchOptions {
    /// Minimum interval between delivered updates.
    pub min_interval: Duration,
    /// Desired accuracy tier.
    pub accuracy: AccuracyTier,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_UPDATE_INTERVAL,
            accuracy: AccuracyTier::High,
        }
    }
}

impl WatchOptions {
    /// Create options with the given interval and accuracy.
    pub fn new(min_interval: Duration, accuracy: AccuracyTier) -> Self {
        Self {
            min_interval,
            accuracy,
        }
    }

    /// Set the minimum update interval.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the accuracy tier.
    pub fn with_accuracy(mut self, accuracy: AccuracyTier) -> Self {
        self.accuracy = accuracy;
        self
    }
}

//! INI parsing: `Ini` to `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::position::AccuracyTier;

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays the keys present.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [tracking]
    if let Some(section) = ini.section(Some("tracking")) {
        if let Some(ms) = positive_millis(section, "tracking", "update_interval_ms")? {
            config.tracking.update_interval = ms;
        }
        if let Some(v) = section.get("accuracy") {
            config.tracking.accuracy = AccuracyTier::from_str(v.trim()).map_err(|_| {
                invalid("tracking", "accuracy", v, "must be one of: low, balanced, high")
            })?;
        }
        if let Some(ms) = positive_millis(section, "tracking", "fix_timeout_ms")? {
            config.tracking.fix_timeout = ms;
        }
    }

    // [camera]
    if let Some(section) = ini.section(Some("camera")) {
        if let Some(v) = section.get("default_latitude") {
            config.camera.default_location.latitude =
                parse_in_range(v, MIN_LAT, MAX_LAT).ok_or_else(|| {
                    invalid("camera", "default_latitude", v, "must be between -90 and 90")
                })?;
        }
        if let Some(v) = section.get("default_longitude") {
            config.camera.default_location.longitude =
                parse_in_range(v, MIN_LON, MAX_LON).ok_or_else(|| {
                    invalid("camera", "default_longitude", v, "must be between -180 and 180")
                })?;
        }
        for (key, field) in [
            ("latitude_delta", &mut config.camera.latitude_delta),
            ("longitude_delta", &mut config.camera.longitude_delta),
        ] {
            if let Some(v) = section.get(key) {
                *field = v
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .ok_or_else(|| invalid("camera", key, v, "must be a positive number"))?;
            }
        }
        for (key, field) in [
            ("min_zoom", &mut config.camera.min_zoom),
            ("max_zoom", &mut config.camera.max_zoom),
        ] {
            if let Some(v) = section.get(key) {
                *field = v
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| invalid("camera", key, v, "must be an integer from 0 to 255"))?;
            }
        }
        if config.camera.min_zoom > config.camera.max_zoom {
            return Err(invalid(
                "camera",
                "min_zoom",
                &config.camera.min_zoom.to_string(),
                "must not exceed max_zoom",
            ));
        }
        if let Some(v) = section.get("animation_ms") {
            config.camera.animation = v
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| invalid("camera", "animation_ms", v, "must be a whole number of milliseconds"))?;
        }
    }

    // [lifecycle]
    if let Some(section) = ini.section(Some("lifecycle")) {
        if let Some(v) = section.get("suspend_on_background") {
            config.lifecycle.suspend_on_background = parse_bool(v).ok_or_else(|| {
                invalid("lifecycle", "suspend_on_background", v, "must be true or false")
            })?;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(invalid("logging", "file", v, "must be a plain file name"));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive_millis(
    section: &Properties,
    section_name: &str,
    key: &str,
) -> Result<Option<Duration>, ConfigFileError> {
    let Some(v) = section.get(key) else {
        return Ok(None);
    };
    match v.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
        _ => Err(invalid(section_name, key, v, "must be a positive integer (milliseconds)")),
    }
}

fn parse_in_range(value: &str, min: f64, max: f64) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

/// Parse a boolean, accepting the usual spellings.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

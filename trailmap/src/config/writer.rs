//! Serialization of `ConfigFile` to a commented INI string.

use super::settings::ConfigFile;

/// Render the config as it is written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let tracking = &config.tracking;
    let camera = &config.camera;

    format!(
        r#"[tracking]
; Minimum time between position updates, in milliseconds
update_interval_ms = {}
; Positioning accuracy: low, balanced, high
accuracy = {}
; Give up on a single position fix after this many milliseconds
fix_timeout_ms = {}

[camera]
; Where the map starts when no position is known yet
default_latitude = {}
default_longitude = {}
; Visible span around the user, in degrees
latitude_delta = {}
longitude_delta = {}
; Zoom bounds suggested to the map renderer
min_zoom = {}
max_zoom = {}
; Camera animation duration, in milliseconds
animation_ms = {}

[lifecycle]
; Stop tracking while the app is in the background
suspend_on_background = {}

[logging]
directory = {}
file = {}
"#,
        tracking.update_interval.as_millis(),
        tracking.accuracy,
        tracking.fix_timeout.as_millis(),
        camera.default_location.latitude,
        camera.default_location.longitude,
        camera.latitude_delta,
        camera.longitude_delta,
        camera.min_zoom,
        camera.max_zoom,
        camera.animation.as_millis(),
        config.lifecycle.suspend_on_background,
        config.logging.directory.display(),
        config.logging.file,
    )
}

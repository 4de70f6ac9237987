//! Configuration management commands: `config path`, `config list` and
//! `config init`.

use std::path::Path;

use clap::Subcommand;
use trailmap::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// List the effective settings
    List,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, path: Option<&Path>) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Init { force } => run_init(&path, force),
    }
}

fn run_list(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    for line in settings_lines(&config) {
        println!("{}", line);
    }
    if !path.exists() {
        println!();
        println!("(no file at {}, showing defaults)", path.display());
    }
    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    ConfigFile::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Render the effective settings as `section.key = value` lines.
fn settings_lines(config: &ConfigFile) -> Vec<String> {
    let t = &config.tracking;
    let c = &config.camera;
    vec![
        format!("tracking.update_interval_ms = {}", t.update_interval.as_millis()),
        format!("tracking.accuracy = {}", t.accuracy),
        format!("tracking.fix_timeout_ms = {}", t.fix_timeout.as_millis()),
        format!("camera.default_latitude = {}", c.default_location.latitude),
        format!("camera.default_longitude = {}", c.default_location.longitude),
        format!("camera.latitude_delta = {}", c.latitude_delta),
        format!("camera.longitude_delta = {}", c.longitude_delta),
        format!("camera.min_zoom = {}", c.min_zoom),
        format!("camera.max_zoom = {}", c.max_zoom),
        format!("camera.animation_ms = {}", c.animation.as_millis()),
        format!(
            "lifecycle.suspend_on_background = {}",
            config.lifecycle.suspend_on_background
        ),
        format!("logging.directory = {}", config.logging.directory.display()),
        format!("logging.file = {}", config.logging.file),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_lines_defaults() {
        let lines = settings_lines(&ConfigFile::default());
        assert!(lines.contains(&"tracking.accuracy = high".to_string()));
        assert!(lines.contains(&"camera.max_zoom = 20".to_string()));
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        run_init(&path, false).unwrap();
        assert!(path.exists());
        assert!(matches!(run_init(&path, false), Err(CliError::Config(_))));
        run_init(&path, true).unwrap();
    }
}

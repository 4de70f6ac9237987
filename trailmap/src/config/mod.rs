//! User configuration in `~/.trailmap/config.ini`.
//!
//! Every key is optional; missing keys keep their defaults. Section structs
//! live in [`settings`], parsing in `parser` and serialization in `writer`.
//!
//! # Example
//!
//! ```
//! use trailmap::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let options = config.watch_options();
//! assert_eq!(options.min_interval.as_millis(), 5000);
//! ```

mod file;
mod parser;
pub mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CameraSection, ConfigFile, LoggingSection, TrackingSection, DEFAULT_FIX_TIMEOUT_MS,
    DEFAULT_UPDATE_INTERVAL_MS,
};

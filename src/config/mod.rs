//! Settings for pitch itself (`pitch.yml`).
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use pitch::config::load_settings;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("pitch.yml"), "app_name: UFO2").unwrap();
//!
//! let settings = load_settings(temp.path(), None).unwrap();
//! assert_eq!(settings.app_name, "UFO2");
//! assert_eq!(settings.manifest.to_str(), Some("requirements.txt"));
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    expand_home, find_project_root, load_settings, load_settings_file, parse_settings,
    resolve_path, SETTINGS_FILE,
};
pub use schema::{ApplicationSettings, PitchSettings, SmokeSettings, TimeoutSettings};

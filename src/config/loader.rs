//! Settings discovery and loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::schema::PitchSettings;
use crate::error::{PitchError, Result};

/// Settings file name looked for in the project root.
pub const SETTINGS_FILE: &str = "pitch.yml";

/// Find the project root by walking up from `start`.
///
/// Looks for a `pitch.yml` first, then falls back to a `.git` directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(SETTINGS_FILE).is_file() {
            return Some(current);
        }
        if current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load settings for `project_root`.
///
/// An explicit path must exist. Without one, `<project_root>/pitch.yml` is
/// used when present and the defaults otherwise.
///
/// # Errors
///
/// Returns `SettingsNotFound` if an explicit file doesn't exist.
/// Returns `SettingsParse` if the YAML is invalid.
pub fn load_settings(project_root: &Path, explicit: Option<&Path>) -> Result<PitchSettings> {
    match explicit {
        Some(path) => load_settings_file(&resolve_path(project_root, path)),
        None => {
            let path = project_root.join(SETTINGS_FILE);
            match load_settings_file(&path) {
                Err(PitchError::SettingsNotFound { .. }) => {
                    tracing::debug!(
                        "No {} in {}, using defaults",
                        SETTINGS_FILE,
                        project_root.display()
                    );
                    Ok(PitchSettings::default())
                }
                other => other,
            }
        }
    }
}

/// Load a single settings file.
pub fn load_settings_file(path: &Path) -> Result<PitchSettings> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PitchError::SettingsNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PitchError::Io(e)
        }
    })?;

    let settings = parse_settings(&content, path)?;
    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Parse YAML content into settings. An empty document is all defaults.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<PitchSettings> {
    if content.trim().is_empty() {
        return Ok(PitchSettings::default());
    }
    serde_yaml::from_str(content).map_err(|e| PitchError::SettingsParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Resolve a settings path against the project root, expanding `~`.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        expanded
    } else {
        project_root.join(expanded)
    }
}

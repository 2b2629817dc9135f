//! Error types for pitch operations.
//!
//! This module defines [`PitchError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Recoverable failures (a missing tool, one broken package, a config
//!   finding, a failed smoke test) are not errors: the stage that hits them
//!   records a [`ValidationResult`](crate::report::ValidationResult).
//! - Only [`PitchError::EnvironmentCreation`] and
//!   [`PitchError::InstallerUnavailable`] abort a run; the rest stop the
//!   command before the pipeline starts.
//! - Use `anyhow::Error` (via `PitchError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pitch operations.
#[derive(Debug, Error)]
pub enum PitchError {
    /// The isolated environment could not be created. Fatal.
    #[error("Failed to create environment at {path}: {message}")]
    EnvironmentCreation { path: PathBuf, message: String },

    /// The environment's package installer cannot be run. Fatal.
    #[error("Package installer unavailable in {path}: {message}")]
    InstallerUnavailable { path: PathBuf, message: String },

    /// Shell command could not be spawned or failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Settings file explicitly requested but not found.
    #[error("Settings not found: {path}")]
    SettingsNotFound { path: PathBuf },

    /// Failed to parse the settings file.
    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    /// Malformed package manifest.
    #[error("Invalid manifest {path} line {line}: {message}")]
    ManifestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for pitch operations.
pub type Result<T> = std::result::Result<T, PitchError>;

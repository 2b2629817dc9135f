//! Pitch - bootstrap and validate a workstation for the UFO agent.
//!
//! Pitch probes the machine for the tools the application needs, creates or
//! reuses its Python environment, installs and import-checks every package
//! in the manifest, checks the application's own tree, materializes and
//! validates the application config, runs a smoke test and writes a
//! timestamped report. The exit code tells automation whether the setup
//! passed (0), is usable but degraded (1) or failed (2).
//!
//! # Modules
//!
//! - [`appconfig`] - Application config template handling and validation rules
//! - [`application`] - Layout, import and platform checks on the application tree
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - `pitch.yml` settings loading
//! - [`environment`] - Python environment creation and reuse
//! - [`error`] - Error types and result aliases
//! - [`packages`] - Manifest parsing, installation and import checks
//! - [`report`] - Validation results and run reports
//! - [`requirements`] - System tool probing and installation
//! - [`runner`] - Pipeline orchestration and the run state machine
//! - [`shell`] - External command execution
//! - [`smoke`] - Launch smoke test
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use pitch::packages::parse_manifest;
//!
//! let text = "pyyaml==6.0.1\n# comment\nart\n";
//! let packages = parse_manifest(text, Path::new("requirements.txt")).unwrap();
//! assert_eq!(packages.len(), 2);
//! assert_eq!(packages[0].version.as_deref(), Some("6.0.1"));
//! ```

pub mod appconfig;
pub mod application;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod packages;
pub mod report;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod smoke;
pub mod ui;

pub use error::{PitchError, Result};

//! Prerequisite detection and installation.
//!
//! This module checks that the external tools the target application needs
//! (a Python interpreter, Git, a C/C++ toolchain) are installed and new
//! enough, and installs missing ones through the OS package manager where
//! one is known.
//!
//! # Modules
//!
//! - [`registry`] - Tool requirement definitions and per-platform built-ins
//! - [`version`] - Version extraction from tool output and comparison
//! - [`prober`] - Detect, install, and re-probe each requirement

pub mod prober;
pub mod registry;
pub mod version;

pub use prober::{probe, probe_one, ProbeOptions};
pub use registry::{RequirementRegistry, ToolRequirement};
pub use version::Version;

//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`pitch run`, `pitch check-config`)
//! - Settings loaded once, before any command runs
//! - Consistent exit codes across commands

pub mod check_config;
pub mod completions;
pub mod dispatcher;
pub mod last;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

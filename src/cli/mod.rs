//! Command-line interface for pitch.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckConfigArgs, Cli, Commands, CompletionsArgs, LastArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};

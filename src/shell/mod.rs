//! Subprocess execution.
//!
//! Stages never spawn processes directly; they go through a
//! [`CommandRunner`], which is [`SystemRunner`] in production and
//! [`ScriptedRunner`] in tests.

pub mod command;
pub mod mock;
pub mod platform;
pub mod runner;

pub use command::{execute, CommandResult, CommandSpec, OutputCallback, OutputLine};
pub use mock::ScriptedRunner;
pub use platform::{is_ci, shell_invocation, Platform};
pub use runner::{CommandRunner, SystemRunner};

//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_settings, PitchSettings};
use crate::error::Result;
use crate::shell::SystemRunner;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, returning its exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Result for a pipeline exit code (0 pass, 1 partial, 2 fail).
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            Self::success()
        } else {
            Self::failure(exit_code)
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    settings_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            settings_path: None,
        }
    }

    /// Use an explicit settings file instead of `<project>/pitch.yml`.
    pub fn with_settings(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn settings(&self) -> Result<PitchSettings> {
        load_settings(&self.project_root, self.settings_path.as_deref())
    }

    /// Dispatch and execute a command.
    ///
    /// Settings are loaded first for the commands that need them, so a
    /// broken `pitch.yml` fails before anything runs.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let runner = SystemRunner::new().with_echo(ui.output_mode().shows_command_output());

        match &cli.command {
            None | Some(Commands::Run(_)) => {
                let args = cli.run_args().unwrap_or_default();
                let settings = self.settings()?;
                let cmd = super::run::RunCommand::new(&self.project_root, settings, args, &runner);
                cmd.execute(ui)
            }
            Some(Commands::CheckConfig(args)) => {
                let cmd = super::check_config::CheckConfigCommand::new(
                    &self.project_root,
                    self.settings()?,
                    args.clone(),
                );
                cmd.execute(ui)
            }
            Some(Commands::Last(args)) => {
                let settings = self.settings()?;
                let cmd = super::last::LastCommand::new(&self.project_root, settings, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PitchError;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn from_exit_code() {
        assert!(CommandResult::from_exit_code(0).success);
        assert_eq!(CommandResult::from_exit_code(2).exit_code, 2);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn missing_explicit_settings_fail_before_running() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf())
            .with_settings(Some(PathBuf::from("nope.yml")));
        let cli = Cli::parse_from(["pitch", "last"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui);

        assert!(matches!(result, Err(PitchError::SettingsNotFound { .. })));
    }
}

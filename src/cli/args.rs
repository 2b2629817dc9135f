//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Pitch - prepare and validate a workstation for the UFO agent.
#[derive(Debug, Parser)]
#[command(name = "pitch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file (overrides <project>/pitch.yml)
    #[arg(short, long, global = true, env = "PITCH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output, including installer output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Options for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline (default if no command specified)
    Run(RunArgs),

    /// Create the application config from its template and validate it
    CheckConfig(CheckConfigArgs),

    /// Print the most recent run report
    Last(LastArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Leave non-critical packages out of install and validation
    #[arg(long)]
    pub skip_optional: bool,

    /// Application config file (overrides the settings)
    #[arg(long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Package manifest (overrides the settings)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Environment location (overrides the settings)
    #[arg(long, value_name = "PATH")]
    pub env_path: Option<PathBuf>,

    /// Probe and validate only; install nothing
    #[arg(long)]
    pub check_only: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Layer `self` over `outer`; a flag set in either place is kept.
    pub fn merged_over(&self, outer: &RunArgs) -> RunArgs {
        RunArgs {
            skip_optional: self.skip_optional || outer.skip_optional,
            config_path: self.config_path.clone().or_else(|| outer.config_path.clone()),
            manifest: self.manifest.clone().or_else(|| outer.manifest.clone()),
            env_path: self.env_path.clone().or_else(|| outer.env_path.clone()),
            check_only: self.check_only || outer.check_only,
            json: self.json || outer.json,
        }
    }
}

/// Arguments for the `check-config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckConfigArgs {
    /// Application config file (overrides the settings)
    #[arg(long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Print findings as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `last` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LastArgs {
    /// Print only the report's path
    #[arg(long)]
    pub path: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl Cli {
    /// Effective pipeline arguments, if this invocation runs the pipeline.
    ///
    /// Flags given before `run` are kept; those after it win for paths.
    pub fn run_args(&self) -> Option<RunArgs> {
        match &self.command {
            None => Some(self.run.clone()),
            Some(Commands::Run(args)) => Some(args.merged_over(&self.run)),
            Some(_) => None,
        }
    }

    /// Whether this invocation writes machine-readable output to stdout.
    pub fn wants_json(&self) -> bool {
        match (&self.command, self.run_args()) {
            (_, Some(args)) => args.json,
            (Some(Commands::CheckConfig(args)), None) => args.json,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_accepts_run_flags() {
        let cli = Cli::parse_from(["pitch", "--skip-optional", "--check-only"]);
        assert!(cli.command.is_none());
        assert!(cli.run.skip_optional);
        assert!(cli.run.check_only);
    }

    #[test]
    fn run_subcommand_with_paths() {
        let cli = Cli::parse_from([
            "pitch",
            "run",
            "--config-path",
            "cfg/config.yaml",
            "--env-path",
            "venv",
            "--json",
        ]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.config_path, Some(PathBuf::from("cfg/config.yaml")));
                assert_eq!(args.env_path, Some(PathBuf::from("venv")));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pitch", "check-config", "--project", "/work/ufo", "--debug"]);
        assert_eq!(cli.project, Some(PathBuf::from("/work/ufo")));
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::CheckConfig(_))));
    }

    #[test]
    fn global_flags_before_subcommand() {
        let cli = Cli::parse_from(["pitch", "--settings", "ci/pitch.yml", "last", "--path"]);
        assert_eq!(cli.settings, Some(PathBuf::from("ci/pitch.yml")));
        match cli.command {
            Some(Commands::Last(args)) => assert!(args.path),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn flags_before_run_subcommand_are_kept() {
        let cli = Cli::parse_from(["pitch", "--check-only", "--manifest", "a.txt", "run"]);
        let args = cli.run_args().unwrap();
        assert!(args.check_only);
        assert_eq!(args.manifest, Some(PathBuf::from("a.txt")));

        let cli = Cli::parse_from(["pitch", "--manifest", "a.txt", "run", "--manifest", "b.txt"]);
        assert_eq!(cli.run_args().unwrap().manifest, Some(PathBuf::from("b.txt")));

        assert!(Cli::parse_from(["pitch", "--json", "run"]).wants_json());
        assert!(Cli::parse_from(["pitch", "last"]).run_args().is_none());
    }

    #[test]
    fn wants_json() {
        assert!(Cli::parse_from(["pitch", "--json"]).wants_json());
        assert!(Cli::parse_from(["pitch", "check-config", "--json"]).wants_json());
        assert!(!Cli::parse_from(["pitch", "last"]).wants_json());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["pitch", "--workflow", "x"]).is_err());
    }
}

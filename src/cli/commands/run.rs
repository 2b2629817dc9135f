//! Run command implementation.
//!
//! The `pitch run` command (also the default) runs the full pipeline,
//! writes the report and exits with the overall status.

use std::path::{Path, PathBuf};

use crate::cli::args::RunArgs;
use crate::config::{resolve_path, PitchSettings};
use crate::error::{PitchError, Result};
use crate::report::{OverallStatus, ReportStore, RunReport};
use crate::runner::{run_pipeline, PipelineOptions};
use crate::shell::CommandRunner;
use crate::ui::{NonInteractiveUI, OutputMode, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand<'a> {
    project_root: PathBuf,
    settings: PitchSettings,
    args: RunArgs,
    runner: &'a dyn CommandRunner,
}

impl<'a> RunCommand<'a> {
    /// Create a new run command.
    pub fn new(
        project_root: &Path,
        settings: PitchSettings,
        args: RunArgs,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            settings,
            args,
            runner,
        }
    }

    /// Settings with the command-line path overrides applied.
    pub fn effective_settings(&self) -> PitchSettings {
        let mut settings = self.settings.clone();
        if let Some(path) = &self.args.config_path {
            settings.config_path = path.clone();
        }
        if let Some(path) = &self.args.manifest {
            settings.manifest = path.clone();
        }
        if let Some(path) = &self.args.env_path {
            settings.env_path = path.clone();
        }
        settings
    }

    fn build_options(&self) -> PipelineOptions {
        PipelineOptions {
            skip_optional: self.args.skip_optional,
            check_only: self.args.check_only,
            ..PipelineOptions::new(&self.project_root)
        }
    }

    fn show_summary(&self, report: &RunReport, written: Option<&Path>, ui: &mut dyn UserInterface) {
        for problem in report.problems() {
            if let Some(hint) = &problem.remediation {
                ui.show_hint(&format!("{}: {}", problem.target, hint));
            }
        }

        let line = format!("{} ({})", report.overall, report.state);
        match report.overall {
            OverallStatus::Pass => ui.success(&line),
            OverallStatus::Partial => ui.warning(&line),
            OverallStatus::Fail => ui.error(&line),
        }
        if let Some(path) = written {
            ui.message(&format!("Report written to {}", path.display()));
        }
    }
}

impl Command for RunCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.effective_settings();
        let options = self.build_options();

        // JSON goes to stdout alone; progress is suppressed.
        let mut silent = NonInteractiveUI::new(OutputMode::Silent);
        let pipeline_ui: &mut dyn UserInterface = if self.args.json {
            &mut silent
        } else {
            &mut *ui
        };

        let report = run_pipeline(&settings, &options, self.runner, pipeline_ui)?;

        let store = ReportStore::new(resolve_path(&self.project_root, &settings.reports_dir));
        let written = match store.write(&report) {
            Ok(path) => {
                tracing::info!("Report written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Could not write report: {}", e);
                None
            }
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| PitchError::Other(e.into()))?;
            println!("{}", json);
        } else {
            if written.is_none() {
                ui.warning(&format!("Could not write report to {}", store.dir().display()));
            }
            self.show_summary(&report, written.as_deref(), ui);
        }

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}

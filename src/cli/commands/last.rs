//! Last command implementation.
//!
//! The `pitch last` command prints the most recent run report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::args::LastArgs;
use crate::config::{resolve_path, PitchSettings};
use crate::error::Result;
use crate::report::ReportStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The last command implementation.
pub struct LastCommand {
    project_root: PathBuf,
    settings: PitchSettings,
    args: LastArgs,
}

impl LastCommand {
    /// Create a new last command.
    pub fn new(project_root: &Path, settings: PitchSettings, args: LastArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            settings,
            args,
        }
    }

    fn store(&self) -> ReportStore {
        ReportStore::new(resolve_path(&self.project_root, &self.settings.reports_dir))
    }

    /// Path of the newest report, if any run has written one.
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        self.store().latest()
    }
}

impl Command for LastCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(path) = self.latest()? else {
            ui.message(&format!(
                "No reports found in {}. Run `pitch` first.",
                self.store().dir().display()
            ));
            return Ok(CommandResult::success());
        };

        if self.args.path {
            println!("{}", path.display());
        } else {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read report {:?}", path))?;
            print!("{}", text);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{generate_report, ReportInput};
    use crate::runner::{Phase, RunState};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn write_report(dir: &Path) -> PathBuf {
        let report = generate_report(ReportInput {
            app_name: "UFO".to_string(),
            environment: PathBuf::from("ufo_env"),
            state: RunState::Active(Phase::Reported),
            results: vec![],
            smoke: None,
            fatal: None,
        });
        ReportStore::new(dir).write(&report).unwrap()
    }

    #[test]
    fn no_reports_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let cmd = LastCommand::new(temp.path(), PitchSettings::default(), LastArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("No reports found"));
    }

    #[test]
    fn finds_report_in_configured_directory() {
        let temp = TempDir::new().unwrap();
        let settings = PitchSettings {
            reports_dir: PathBuf::from("out/reports"),
            ..Default::default()
        };
        let written = write_report(&temp.path().join("out/reports"));
        let cmd = LastCommand::new(temp.path(), settings, LastArgs { path: true });

        assert_eq!(cmd.latest().unwrap(), Some(written));
        let mut ui = MockUI::new();
        assert!(cmd.execute(&mut ui).unwrap().success);
        assert!(ui.messages().is_empty());
    }
}

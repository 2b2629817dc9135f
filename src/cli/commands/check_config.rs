//! Check-config command implementation.
//!
//! The `pitch check-config` command materializes the application config
//! from its template if needed and validates it, without touching tools,
//! environments or packages.

use std::path::{Path, PathBuf};

use crate::appconfig::{ensure_config, validate_config, ConfigStatus, ValidateOptions};
use crate::cli::args::CheckConfigArgs;
use crate::config::{resolve_path, PitchSettings};
use crate::error::{PitchError, Result};
use crate::report::{any_degrading, ValidationResult};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The check-config command implementation.
pub struct CheckConfigCommand {
    project_root: PathBuf,
    settings: PitchSettings,
    args: CheckConfigArgs,
}

impl CheckConfigCommand {
    /// Create a new check-config command.
    pub fn new(project_root: &Path, settings: PitchSettings, args: CheckConfigArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            settings,
            args,
        }
    }

    /// The config file to check, honoring `--config-path`.
    pub fn target(&self) -> PathBuf {
        let path = self.args.config_path.as_ref().unwrap_or(&self.settings.config_path);
        resolve_path(&self.project_root, path)
    }

    fn check(&self) -> Result<(ConfigStatus, Vec<ValidationResult>)> {
        let template = resolve_path(&self.project_root, &self.settings.config_template);
        let target = self.target();

        let status = ensure_config(&template, &target)?;
        if status == ConfigStatus::TemplateMissing {
            return Ok((status, vec![status.to_result(&template, &target)]));
        }

        let options = ValidateOptions {
            required_sections: self.settings.required_sections.clone(),
        };
        Ok((status, validate_config(&target, &options)))
    }
}

impl Command for CheckConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (status, results) = self.check()?;
        let exit_code = if any_degrading(&results) { 1 } else { 0 };

        if self.args.json {
            let body = serde_json::json!({
                "config": self.target().display().to_string(),
                "created": status == ConfigStatus::Created,
                "results": results,
                "exit_code": exit_code,
            });
            let json =
                serde_json::to_string_pretty(&body).map_err(|e| PitchError::Other(e.into()))?;
            println!("{}", json);
            return Ok(CommandResult::from_exit_code(exit_code));
        }

        ui.show_header("Configuration");
        if status == ConfigStatus::Created {
            ui.message(&format!(
                "Created {} from the template; fill in your keys",
                self.target().display()
            ));
        }
        for result in &results {
            ui.show_result(result);
        }

        if exit_code == 0 {
            ui.success("Configuration looks good");
        } else {
            ui.error("Configuration has problems");
        }

        Ok(CommandResult::from_exit_code(exit_code))
    }
}

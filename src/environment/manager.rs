//! Create or reuse the isolated environment.

use std::path::Path;
use std::time::Duration;

use super::handle::{EnvironmentHandle, InstallerUpgrade};
use crate::error::{PitchError, Result};
use crate::shell::{CommandResult, CommandRunner, CommandSpec};

/// Timeouts and switches for environment commands.
#[derive(Debug, Clone)]
pub struct EnvironmentOptions {
    pub create_timeout: Duration,
    pub installer_timeout: Duration,
    /// Upgrade the installer inside the environment. Off for check-only runs.
    pub allow_upgrade: bool,
}

impl Default for EnvironmentOptions {
    fn default() -> Self {
        Self {
            create_timeout: Duration::from_secs(300),
            installer_timeout: Duration::from_secs(600),
            allow_upgrade: true,
        }
    }
}

/// Make sure a usable environment exists at `path`.
///
/// An existing environment (detected by its activation marker) is reused;
/// otherwise `base_python -m venv` creates one. The installer must respond
/// before it is upgraded. A failed upgrade is recorded on the handle and is
/// not an error. With `allow_upgrade` off the upgrade is not attempted.
///
/// # Errors
///
/// [`PitchError::EnvironmentCreation`] if creation fails, and
/// [`PitchError::InstallerUnavailable`] if `pip` cannot be run. Both are
/// fatal for the run.
pub fn ensure_environment(
    path: &Path,
    base_python: &str,
    runner: &dyn CommandRunner,
    options: &EnvironmentOptions,
) -> Result<EnvironmentHandle> {
    let mut handle = EnvironmentHandle::at(path);

    if handle.exists() {
        tracing::info!("Reusing environment at {}", path.display());
    } else {
        tracing::info!("Creating environment at {}", path.display());
        let spec = CommandSpec::new(base_python)
            .args(["-m", "venv"])
            .arg(path.to_string_lossy())
            .timeout(options.create_timeout);

        let creation_error = |message: String| PitchError::EnvironmentCreation {
            path: path.to_path_buf(),
            message,
        };

        let result = runner
            .run(&spec)
            .map_err(|e| creation_error(e.to_string()))?;
        if !result.success {
            return Err(creation_error(failure_reason(&result)));
        }
        if !handle.exists() {
            return Err(creation_error(format!(
                "{} missing after creation",
                handle.activation_marker().display()
            )));
        }
        handle.created = true;
    }

    let installer_error = |message: String| PitchError::InstallerUnavailable {
        path: path.to_path_buf(),
        message,
    };
    let check = handle
        .python_command(["-m", "pip", "--version"])
        .timeout(options.installer_timeout);
    let result = runner
        .run(&check)
        .map_err(|e| installer_error(e.to_string()))?;
    if !result.success {
        return Err(installer_error(failure_reason(&result)));
    }

    if !options.allow_upgrade {
        tracing::info!("Installs disabled; leaving the installer as is");
        return Ok(handle);
    }

    let upgrade = handle
        .python_command(["-m", "pip", "install", "--upgrade", "pip"])
        .timeout(options.installer_timeout);
    handle.installer_upgrade = match runner.run(&upgrade) {
        Ok(result) if result.success => InstallerUpgrade::Upgraded,
        Ok(result) => {
            tracing::warn!("Installer upgrade failed: {}", failure_reason(&result));
            InstallerUpgrade::Failed
        }
        Err(e) => {
            tracing::warn!("Installer upgrade could not start: {}", e);
            InstallerUpgrade::Failed
        }
    };

    Ok(handle)
}

fn failure_reason(result: &CommandResult) -> String {
    if result.timed_out {
        return "timed out".to_string();
    }
    result
        .last_line()
        .map(str::to_string)
        .unwrap_or_else(|| format!("exit code {:?}", result.exit_code))
}

//! Handle to an isolated Python environment.

use std::path::{Path, PathBuf};

use crate::report::{Status, TargetKind, ValidationResult};
use crate::shell::{CommandSpec, Platform};

/// What happened to the in-environment installer upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerUpgrade {
    /// Not attempted because installs are disabled.
    Skipped,
    Upgraded,
    /// Attempted and failed, typically offline.
    Failed,
}

/// An isolated package environment (a virtualenv) on disk.
///
/// Later stages receive the handle explicitly and run the environment's
/// interpreter by path; nothing activates the environment for the current
/// process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentHandle {
    root: PathBuf,
    platform: Platform,
    /// Whether this run created the environment.
    pub created: bool,
    pub installer_upgrade: InstallerUpgrade,
}

impl EnvironmentHandle {
    /// Handle for an environment at `root` on the current platform.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self::with_platform(root, Platform::current())
    }

    /// Handle for an environment with an explicit layout.
    pub fn with_platform(root: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            root: root.into(),
            platform,
            created: false,
            installer_upgrade: InstallerUpgrade::Skipped,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the interpreter and entry-point scripts.
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(self.platform.scripts_dir())
    }

    /// The environment's interpreter.
    pub fn python(&self) -> PathBuf {
        self.scripts_dir().join(self.platform.python_executable())
    }

    /// The file whose presence marks an existing environment.
    pub fn activation_marker(&self) -> PathBuf {
        self.scripts_dir().join("activate")
    }

    /// Whether an environment already exists at the root.
    pub fn exists(&self) -> bool {
        self.activation_marker().is_file()
    }

    /// A command running the environment's interpreter with `args`.
    pub fn python_command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.python().to_string_lossy().into_owned()).args(args)
    }

    /// Variables that make a child process behave as if the environment
    /// were activated.
    pub fn command_env(&self) -> Vec<(String, String)> {
        let scripts = self.scripts_dir().to_string_lossy().into_owned();
        let path = match std::env::var("PATH") {
            Ok(existing) if !existing.is_empty() => {
                format!("{}{}{}", scripts, self.platform.path_separator(), existing)
            }
            _ => scripts,
        };
        vec![
            (
                "VIRTUAL_ENV".to_string(),
                self.root.to_string_lossy().into_owned(),
            ),
            ("PATH".to_string(), path),
        ]
    }

    /// Results describing the environment for the report.
    pub fn results(&self) -> Vec<ValidationResult> {
        let mut results = vec![ValidationResult::ok(
            TargetKind::Environment,
            self.root.display().to_string(),
        )];
        match self.installer_upgrade {
            InstallerUpgrade::Upgraded => {}
            InstallerUpgrade::Skipped => results.push(
                ValidationResult::new(TargetKind::Environment, "pip upgrade", Status::Skipped)
                    .with_detail("installs disabled")
                    .degrading(false),
            ),
            InstallerUpgrade::Failed => results.push(
                ValidationResult::new(TargetKind::Environment, "pip upgrade", Status::Warning)
                    .with_detail("installer could not be upgraded")
                    .with_hint(format!(
                        "Run `{}` once network access is available",
                        self.python_command(["-m", "pip", "install", "--upgrade", "pip"])
                    ))
                    .degrading(false),
            ),
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_layout() {
        let handle = EnvironmentHandle::with_platform("C:/work/ufo_env", Platform::Windows);
        assert_eq!(handle.scripts_dir(), Path::new("C:/work/ufo_env/Scripts"));
        assert_eq!(
            handle.python(),
            Path::new("C:/work/ufo_env/Scripts/python.exe")
        );
        assert_eq!(
            handle.activation_marker(),
            Path::new("C:/work/ufo_env/Scripts/activate")
        );
    }

    #[test]
    fn unix_layout() {
        let handle = EnvironmentHandle::with_platform("/work/ufo_env", Platform::Linux);
        assert_eq!(handle.python(), Path::new("/work/ufo_env/bin/python"));
        assert_eq!(
            handle.activation_marker(),
            Path::new("/work/ufo_env/bin/activate")
        );
    }

    #[test]
    fn command_env_prepends_scripts_dir() {
        let handle = EnvironmentHandle::with_platform("/work/ufo_env", Platform::Linux);
        let env = handle.command_env();

        assert_eq!(env[0], ("VIRTUAL_ENV".to_string(), "/work/ufo_env".to_string()));
        assert_eq!(env[1].0, "PATH");
        assert!(env[1].1.starts_with("/work/ufo_env/bin"));
    }

    #[test]
    fn python_command_uses_env_interpreter() {
        let handle = EnvironmentHandle::with_platform("/work/ufo_env", Platform::Linux);
        let spec = handle.python_command(["-m", "pip", "--version"]);
        assert_eq!(spec.command_line(), "/work/ufo_env/bin/python -m pip --version");
    }

    #[test]
    fn failed_upgrade_adds_advisory_warning() {
        let mut handle = EnvironmentHandle::with_platform("/work/ufo_env", Platform::Linux);
        handle.installer_upgrade = InstallerUpgrade::Failed;
        let results = handle.results();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].status, Status::Warning);
        assert!(!results[1].is_degrading());

        handle.installer_upgrade = InstallerUpgrade::Upgraded;
        assert_eq!(handle.results().len(), 1);
    }

    #[test]
    fn skipped_upgrade_is_reported_as_skipped() {
        let handle = EnvironmentHandle::with_platform("/work/ufo_env", Platform::Linux);
        let results = handle.results();

        assert_eq!(results[1].status, Status::Skipped);
        assert!(!results[1].is_degrading());
    }
}

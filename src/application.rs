//! Checks on the application's own source tree.
//!
//! Pitch runs from a checkout of the application. Before the smoke test it
//! confirms that the package directory has the expected layout and that the
//! application's modules import inside the environment. Running on an OS
//! the application does not support is an advisory warning, never a failure.

use std::path::PathBuf;
use std::time::Duration;

use crate::environment::EnvironmentHandle;
use crate::packages::import_names::is_valid_module;
use crate::report::{Status, TargetKind, ValidationResult};
use crate::shell::{CommandRunner, Platform};

/// What the application tree should look like, and where it is.
#[derive(Debug, Clone)]
pub struct ApplicationSpec {
    /// Project root; module imports run from here.
    pub root: PathBuf,
    /// Package directory, relative to `root`.
    pub package_dir: PathBuf,
    pub directories: Vec<String>,
    pub files: Vec<String>,
    pub modules: Vec<String>,
    pub import_timeout: Duration,
}

impl ApplicationSpec {
    fn package_path(&self) -> PathBuf {
        self.root.join(&self.package_dir)
    }

    fn display_entry(&self, entry: &str) -> String {
        format!("{}/{}", self.package_dir.display(), entry)
    }
}

/// Advisory warning when `platform` is not Windows and `windows_only` is set.
pub fn check_platform(platform: Platform, windows_only: bool) -> Option<ValidationResult> {
    if !windows_only || platform == Platform::Windows {
        return None;
    }
    let name = match platform {
        Platform::MacOS => "macOS",
        Platform::Linux => "Linux",
        Platform::Windows => "Windows",
    };
    Some(
        ValidationResult::new(TargetKind::Application, "operating system", Status::Warning)
            .with_detail(format!("{} detected; the application targets Windows", name))
            .with_hint("Setup can be checked here, but UI automation only works on Windows")
            .degrading(false),
    )
}

/// One result per expected directory and file in the package.
///
/// A missing package directory yields a single error instead.
pub fn check_layout(spec: &ApplicationSpec) -> Vec<ValidationResult> {
    let package = spec.package_path();
    if !package.is_dir() {
        return vec![ValidationResult::new(
            TargetKind::Application,
            spec.package_dir.display().to_string(),
            Status::Error,
        )
        .with_detail(format!("package directory not found at {}", package.display()))
        .with_hint("Run pitch from the application checkout, or set application.package_dir")];
    }

    let dirs = spec
        .directories
        .iter()
        .map(|name| (name, package.join(name).is_dir(), "directory"));
    let files = spec
        .files
        .iter()
        .map(|name| (name, package.join(name).is_file(), "file"));

    dirs.chain(files)
        .map(|(name, present, what)| {
            let target = spec.display_entry(name);
            if present {
                ValidationResult::ok(TargetKind::Application, target)
            } else {
                ValidationResult::new(TargetKind::Application, target, Status::Missing)
                    .with_detail(format!("{} not found", what))
                    .with_hint("Restore it from the upstream repository")
            }
        })
        .collect()
}

/// Import each application module with the environment's interpreter.
pub fn check_modules(
    spec: &ApplicationSpec,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
) -> Vec<ValidationResult> {
    spec.modules
        .iter()
        .map(|module| import_module(spec, module, env, runner))
        .collect()
}

fn import_module(
    spec: &ApplicationSpec,
    module: &str,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
) -> ValidationResult {
    let target = format!("import {}", module);
    if !is_valid_module(module) {
        return ValidationResult::new(TargetKind::Application, target, Status::Error)
            .with_detail("not a valid module name")
            .with_hint("Fix application.modules in pitch.yml");
    }

    let command = env
        .python_command(["-c".to_string(), format!("import {}", module)])
        .cwd(&spec.root)
        .timeout(spec.import_timeout);
    let reason = match runner.run(&command) {
        Ok(result) if result.success => {
            return ValidationResult::ok(TargetKind::Application, target);
        }
        Ok(result) if result.timed_out => "timed out".to_string(),
        Ok(result) => result
            .last_line()
            .map(str::to_string)
            .unwrap_or_else(|| format!("exit code {:?}", result.exit_code)),
        Err(e) => e.to_string(),
    };
    tracing::debug!("import {} failed: {}", module, reason);

    ValidationResult::new(TargetKind::Application, target, Status::Missing)
        .with_detail(reason)
        .with_hint(format!(
            "Check that {} is complete and its dependencies are in the manifest",
            spec.package_dir.display()
        ))
}

/// Layout checks, then module imports unless the package is absent.
pub fn check_application(
    spec: &ApplicationSpec,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
) -> Vec<ValidationResult> {
    let mut results = check_layout(spec);
    if spec.package_path().is_dir() {
        results.extend(check_modules(spec, env, runner));
    } else {
        results.extend(spec.modules.iter().map(|module| {
            ValidationResult::new(
                TargetKind::Application,
                format!("import {}", module),
                Status::Skipped,
            )
            .with_detail("package directory missing")
            .degrading(false)
        }));
    }
    results
}

/// Create the default layout under `root`; used by tests across the crate.
#[cfg(test)]
pub(crate) fn scaffold(root: &std::path::Path, settings: &crate::config::ApplicationSettings) {
    let package = root.join(&settings.package_dir);
    for dir in &settings.directories {
        std::fs::create_dir_all(package.join(dir)).unwrap();
    }
    for file in &settings.files {
        std::fs::write(package.join(file), "").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApplicationSettings;
    use crate::shell::{CommandResult, ScriptedRunner};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn spec(root: &Path) -> ApplicationSpec {
        let settings = ApplicationSettings::default();
        ApplicationSpec {
            root: root.to_path_buf(),
            package_dir: settings.package_dir,
            directories: settings.directories,
            files: settings.files,
            modules: settings.modules,
            import_timeout: Duration::from_secs(5),
        }
    }

    fn env(root: &Path) -> EnvironmentHandle {
        EnvironmentHandle::with_platform(root.join("ufo_env"), Platform::Linux)
    }

    #[test]
    fn complete_layout_is_all_ok() {
        let temp = TempDir::new().unwrap();
        scaffold(temp.path(), &ApplicationSettings::default());

        let results = check_layout(&spec(temp.path()));

        assert_eq!(results.len(), 9);
        assert!(results.iter().all(|r| r.status == Status::Ok));
        assert!(results.iter().any(|r| r.target == "ufo/__main__.py"));
    }

    #[test]
    fn missing_entries_are_named() {
        let temp = TempDir::new().unwrap();
        scaffold(temp.path(), &ApplicationSettings::default());
        fs::remove_dir(temp.path().join("ufo/prompts")).unwrap();
        fs::remove_file(temp.path().join("ufo/__main__.py")).unwrap();

        let results = check_layout(&spec(temp.path()));

        let missing: Vec<&str> = results
            .iter()
            .filter(|r| r.status == Status::Missing)
            .map(|r| r.target.as_str())
            .collect();
        assert_eq!(missing, vec!["ufo/prompts", "ufo/__main__.py"]);
        assert!(results.iter().all(|r| r.degrades));
    }

    #[test]
    fn file_in_place_of_directory_is_missing() {
        let temp = TempDir::new().unwrap();
        scaffold(temp.path(), &ApplicationSettings::default());
        fs::remove_dir(temp.path().join("ufo/llm")).unwrap();
        fs::write(temp.path().join("ufo/llm"), "").unwrap();

        let results = check_layout(&spec(temp.path()));
        let llm = results.iter().find(|r| r.target == "ufo/llm").unwrap();

        assert_eq!(llm.status, Status::Missing);
    }

    #[test]
    fn absent_package_skips_imports() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        let results = check_application(&spec(temp.path()), &env(temp.path()), &runner);

        assert_eq!(results[0].status, Status::Error);
        assert_eq!(results[0].target, "ufo");
        assert!(results[1..].iter().all(|r| r.status == Status::Skipped));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failing_module_import_is_missing_with_reason() {
        let temp = TempDir::new().unwrap();
        scaffold(temp.path(), &ApplicationSettings::default());
        let runner = ScriptedRunner::new();
        runner.on(
            "import ufo.llm",
            CommandResult::failure(1, "ModuleNotFoundError: No module named 'openai'"),
        );
        runner.on("import", CommandResult::success(""));

        let results = check_modules(&spec(temp.path()), &env(temp.path()), &runner);

        assert_eq!(results.len(), 4);
        let llm = results.iter().find(|r| r.target == "import ufo.llm").unwrap();
        assert_eq!(llm.status, Status::Missing);
        assert!(llm.detail.as_deref().unwrap().contains("openai"));
        assert_eq!(results.iter().filter(|r| r.status == Status::Ok).count(), 3);
        assert!(runner.was_called("bin/python -c \"import ufo.prompter\""));
    }

    #[test]
    fn invalid_module_name_is_not_run() {
        let temp = TempDir::new().unwrap();
        let mut spec = spec(temp.path());
        spec.modules = vec!["ufo; import os".to_string()];
        let runner = ScriptedRunner::new();

        let results = check_modules(&spec, &env(temp.path()), &runner);

        assert_eq!(results[0].status, Status::Error);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn non_windows_platform_is_an_advisory() {
        let warning = check_platform(Platform::Linux, true).unwrap();
        assert_eq!(warning.status, Status::Warning);
        assert!(!warning.is_degrading());
        assert!(warning.detail.as_deref().unwrap().contains("Linux"));

        assert!(check_platform(Platform::Windows, true).is_none());
        assert!(check_platform(Platform::MacOS, false).is_none());
    }
}

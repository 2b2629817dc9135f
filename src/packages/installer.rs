//! Dependency installer and validator.
//!
//! Installs the declared packages into the environment, tolerating partial
//! failure, then verifies every package by importing it. Only a package
//! installer that cannot be started at all is an error; anything that goes
//! wrong with an individual package becomes a [`ValidationResult`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::import_names::{needs_binary_retry, ImportNames};
use super::manifest::PackageSpec;
use crate::environment::EnvironmentHandle;
use crate::error::{PitchError, Result};
use crate::report::{Status, TargetKind, ValidationResult};
use crate::shell::{CommandResult, CommandRunner, CommandSpec};
use crate::ui::UserInterface;

/// Knobs for [`install_and_validate`].
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Leave non-critical packages out entirely.
    pub skip_optional: bool,
    /// Run the installer at all; when false only import probes run.
    pub allow_install: bool,
    pub install_timeout: Duration,
    pub import_timeout: Duration,
    pub import_names: ImportNames,
    /// Extra packages to retry as binary-only wheels.
    pub binary_only: Vec<String>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            skip_optional: false,
            allow_install: true,
            install_timeout: Duration::from_secs(1800),
            import_timeout: Duration::from_secs(120),
            import_names: ImportNames::builtin(),
            binary_only: Vec::new(),
        }
    }
}

/// Which attempt got a package installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Bulk,
    Standard,
    BinaryOnly,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Bulk => "bulk install",
            Strategy::Standard => "individual install",
            Strategy::BinaryOnly => "binary-only install",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InstallOutcome {
    Installed(Strategy),
    Failed(String),
    NotAttempted,
}

/// Install `packages` into `env` and import-probe each one.
///
/// Returns one result per package, in manifest order.
///
/// # Errors
///
/// [`PitchError::InstallerUnavailable`] if the installer process cannot be
/// started.
pub fn install_and_validate(
    packages: &[PackageSpec],
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
    options: &InstallOptions,
    ui: &mut dyn UserInterface,
) -> Result<Vec<ValidationResult>> {
    let selected: Vec<&PackageSpec> = packages
        .iter()
        .filter(|p| p.critical || !options.skip_optional)
        .collect();

    let outcomes = if options.allow_install && !selected.is_empty() {
        install_all(&selected, env, runner, options, ui)?
    } else {
        HashMap::new()
    };

    let total = packages.len();
    let mut results = Vec::with_capacity(total);
    for (i, package) in packages.iter().enumerate() {
        ui.show_progress(i + 1, total);
        let result = if package.critical || !options.skip_optional {
            let outcome = outcomes
                .get(package.name.as_str())
                .cloned()
                .unwrap_or(InstallOutcome::NotAttempted);
            let mut spinner = ui.start_spinner(&format!("Importing {}", package.name));
            let imported = probe_import(package, env, runner, options);
            spinner.finish_and_clear();
            classify(package, outcome, imported)
        } else {
            ValidationResult::new(TargetKind::Package, &package.name, Status::Skipped)
                .with_detail("optional, skipped")
                .degrading(false)
        };

        if result.is_degrading() {
            tracing::warn!("{}", result.summary_line());
        }
        ui.show_result(&result);
        results.push(result);
    }

    Ok(results)
}

fn install_all<'a>(
    selected: &[&'a PackageSpec],
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
    options: &InstallOptions,
    ui: &mut dyn UserInterface,
) -> Result<HashMap<&'a str, InstallOutcome>> {
    let mut outcomes = HashMap::new();

    let mut spinner = ui.start_spinner(&format!("Installing {} packages", selected.len()));
    let bulk = pip_install(env, selected.iter().map(|p| p.install_arg()), &[], options);
    let result = run_installer(runner, env, &bulk)?;
    if result.success {
        spinner.finish_success(&format!("Installed {} packages", selected.len()));
        for package in selected {
            outcomes.insert(package.name.as_str(), InstallOutcome::Installed(Strategy::Bulk));
        }
        return Ok(outcomes);
    }

    spinner.finish_error("Bulk install failed, installing packages one at a time");
    tracing::warn!("Bulk install failed: {}", reason(&result));

    // Sequential on purpose: parallel installers race on the same site-packages.
    for package in selected {
        let mut spinner = ui.start_spinner(&format!("Installing {}", package.name));
        let standard = pip_install(env, [package.install_arg()], &[], options);
        let result = run_installer(runner, env, &standard)?;

        let outcome = if result.success {
            InstallOutcome::Installed(Strategy::Standard)
        } else if needs_binary_retry(&package.name, &options.binary_only) {
            spinner.set_message(&format!("Retrying {} as binary-only", package.name));
            let binary = pip_install(
                env,
                [package.install_arg()],
                &["--only-binary", ":all:"],
                options,
            );
            let retry = run_installer(runner, env, &binary)?;
            if retry.success {
                InstallOutcome::Installed(Strategy::BinaryOnly)
            } else {
                InstallOutcome::Failed(reason(&retry))
            }
        } else {
            InstallOutcome::Failed(reason(&result))
        };

        match &outcome {
            InstallOutcome::Installed(strategy) => {
                spinner.finish_success(&format!("{} ({})", package.name, strategy))
            }
            _ => spinner.finish_error(&format!("{} could not be installed", package.name)),
        }
        outcomes.insert(package.name.as_str(), outcome);
    }

    Ok(outcomes)
}

fn pip_install<I>(
    env: &EnvironmentHandle,
    packages: I,
    flags: &[&str],
    options: &InstallOptions,
) -> CommandSpec
where
    I: IntoIterator<Item = String>,
{
    env.python_command(["-m", "pip", "install", "--disable-pip-version-check"])
        .args(flags.iter().copied())
        .args(packages)
        .timeout(options.install_timeout)
}

fn run_installer(
    runner: &dyn CommandRunner,
    env: &EnvironmentHandle,
    spec: &CommandSpec,
) -> Result<CommandResult> {
    tracing::debug!("Running {}", spec);
    runner.run(spec).map_err(|e| PitchError::InstallerUnavailable {
        path: env.root().to_path_buf(),
        message: e.to_string(),
    })
}

fn reason(result: &CommandResult) -> String {
    if result.timed_out {
        "timed out".to_string()
    } else {
        result
            .last_line()
            .map(str::to_string)
            .unwrap_or_else(|| format!("exit code {:?}", result.exit_code))
    }
}

/// First candidate module that imports, if any.
fn probe_import(
    package: &PackageSpec,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
    options: &InstallOptions,
) -> std::result::Result<String, Vec<String>> {
    let candidates = options.import_names.candidates(&package.name);
    for module in &candidates {
        let spec = env
            .python_command(["-c".to_string(), format!("import {}", module)])
            .timeout(options.import_timeout);
        match runner.run(&spec) {
            Ok(result) if result.success => return Ok(module.clone()),
            Ok(result) => tracing::debug!("import {} failed: {}", module, reason(&result)),
            Err(e) => tracing::debug!("import {} could not run: {}", module, e),
        }
    }
    Err(candidates)
}

fn classify(
    package: &PackageSpec,
    outcome: InstallOutcome,
    imported: std::result::Result<String, Vec<String>>,
) -> ValidationResult {
    let base = |status| {
        ValidationResult::new(TargetKind::Package, &package.name, status)
            .degrading(package.critical)
    };
    let manual_install = format!(
        "Install manually: python -m pip install {}",
        package.install_arg()
    );

    match (outcome, imported) {
        (InstallOutcome::Installed(strategy), Ok(module)) => {
            base(Status::Ok).with_detail(format!("{}, imports as {}", strategy, module))
        }
        (InstallOutcome::NotAttempted, Ok(module)) => {
            base(Status::Ok).with_detail(format!("imports as {}", module))
        }
        (InstallOutcome::Installed(strategy), Err(tried)) => base(Status::Missing)
            .with_detail(format!(
                "{} succeeded but import failed (tried {})",
                strategy,
                tried.join(", ")
            ))
            .with_hint(format!(
                "Add the module name under import_names in pitch.yml, e.g. `{}: <module>`",
                package.name
            )),
        (InstallOutcome::Failed(why), Ok(module)) => match &package.version {
            None => base(Status::Ok).with_detail(format!(
                "install failed ({}), existing copy imports as {}",
                why, module
            )),
            Some(version) => base(Status::VersionMismatch)
                .with_detail(format!(
                    "install of {} failed ({}), an unverified existing copy imports",
                    version, why
                ))
                .with_hint(manual_install),
        },
        (InstallOutcome::Failed(why), Err(_)) => base(Status::Error)
            .with_detail(why)
            .with_hint(manual_install),
        (InstallOutcome::NotAttempted, Err(tried)) => base(Status::Missing)
            .with_detail(format!("not importable (tried {})", tried.join(", ")))
            .with_hint(manual_install),
    }
}

//! Prerequisite prober.
//!
//! Runs each requirement's detection command, compares the detected version
//! against the declared minimum, and installs what is absent or too old.
//! Every requirement yields exactly one [`ValidationResult`]; probing never
//! stops early.

use std::time::Duration;

use super::registry::ToolRequirement;
use super::version::Version;
use crate::report::{Status, TargetKind, ValidationResult};
use crate::shell::{CommandRunner, CommandSpec};
use crate::ui::UserInterface;

/// Knobs for [`probe`].
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Run install commands for absent or outdated tools.
    pub allow_install: bool,
    pub detect_timeout: Duration,
    pub install_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            allow_install: true,
            detect_timeout: Duration::from_secs(30),
            install_timeout: Duration::from_secs(1800),
        }
    }
}

/// What one detection pass found.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Finding {
    /// Present and new enough (version may be unknown if no minimum).
    Satisfied(Option<Version>),
    /// Present but older than the minimum.
    TooOld(Version),
    /// Present but no version could be read while a minimum is declared.
    Unverifiable,
    /// Detection failed, timed out, or the program is not on PATH.
    Absent(String),
}

/// Probe every requirement, installing where allowed.
pub fn probe(
    requirements: &[ToolRequirement],
    runner: &dyn CommandRunner,
    options: &ProbeOptions,
    ui: &mut dyn UserInterface,
) -> Vec<ValidationResult> {
    let total = requirements.len();
    requirements
        .iter()
        .enumerate()
        .map(|(i, requirement)| {
            ui.show_progress(i + 1, total);
            let mut spinner = ui.start_spinner(&format!("Checking {}", requirement.name));
            let result = probe_one(requirement, runner, options);
            spinner.finish_and_clear();
            if !result.is_ok() {
                tracing::warn!("{}", result.summary_line());
            }
            ui.show_result(&result);
            result
        })
        .collect()
}

/// Probe a single requirement.
pub fn probe_one(
    requirement: &ToolRequirement,
    runner: &dyn CommandRunner,
    options: &ProbeOptions,
) -> ValidationResult {
    let first = detect(requirement, runner, options.detect_timeout);
    tracing::debug!("{} detection: {:?}", requirement.name, first);

    match first {
        Finding::Satisfied(version) => satisfied(requirement, version, None),
        Finding::Unverifiable => unverifiable(requirement),
        Finding::Absent(_) | Finding::TooOld(_) => {
            let install = match (&requirement.install, options.allow_install) {
                (Some(install), true) => install,
                _ => return unresolved(requirement, first, false),
            };

            tracing::info!("Installing {}: {}", requirement.name, install);
            let spec = CommandSpec::shell(install).timeout(options.install_timeout);
            let installed = match runner.run(&spec) {
                Ok(result) if result.success => true,
                Ok(result) => {
                    tracing::warn!(
                        "Install of {} failed: {}",
                        requirement.name,
                        result.last_line().unwrap_or("no output")
                    );
                    false
                }
                Err(e) => {
                    tracing::warn!("Install of {} could not start: {}", requirement.name, e);
                    false
                }
            };

            match detect(requirement, runner, options.detect_timeout) {
                Finding::Satisfied(version) => {
                    satisfied(requirement, version, Some("installed this run"))
                }
                Finding::Unverifiable => unverifiable(requirement),
                second => unresolved(requirement, second, installed),
            }
        }
    }
}

fn detect(requirement: &ToolRequirement, runner: &dyn CommandRunner, timeout: Duration) -> Finding {
    let spec = CommandSpec::shell(&requirement.detect).timeout(timeout);
    let result = match runner.run(&spec) {
        Ok(result) => result,
        Err(e) => return Finding::Absent(format!("could not run: {}", e)),
    };

    if result.timed_out {
        return Finding::Absent("detection timed out".to_string());
    }
    if !result.success {
        return Finding::Absent(
            result
                .last_line()
                .map(str::to_string)
                .unwrap_or_else(|| format!("exit code {:?}", result.exit_code)),
        );
    }

    let output = result.combined_output();
    if output.trim().is_empty() {
        return Finding::Absent("detection printed nothing".to_string());
    }

    let found = Version::extract(&output);
    match (&requirement.minimum_version, found) {
        (None, version) => Finding::Satisfied(version),
        (Some(_), None) => Finding::Unverifiable,
        (Some(minimum), Some(version)) if version.satisfies(minimum) => {
            Finding::Satisfied(Some(version))
        }
        (Some(_), Some(version)) => Finding::TooOld(version),
    }
}

fn satisfied(
    requirement: &ToolRequirement,
    version: Option<Version>,
    note: Option<&str>,
) -> ValidationResult {
    let mut result = ValidationResult::ok(TargetKind::Tool, &requirement.name);
    let detail = match (version, note) {
        (Some(v), Some(n)) => Some(format!("{}, {}", v, n)),
        (Some(v), None) => Some(v.to_string()),
        (None, Some(n)) => Some(n.to_string()),
        (None, None) => None,
    };
    if let Some(detail) = detail {
        result = result.with_detail(detail);
    }
    result
}

fn unverifiable(requirement: &ToolRequirement) -> ValidationResult {
    let minimum = requirement
        .minimum_version
        .as_ref()
        .map(Version::to_string)
        .unwrap_or_default();
    ValidationResult::new(TargetKind::Tool, &requirement.name, Status::VersionMismatch)
        .with_detail(format!("version could not be determined (need >= {})", minimum))
        .with_hint(format!(
            "Verify the installed version manually with `{}`",
            requirement.detect
        ))
}

fn unresolved(
    requirement: &ToolRequirement,
    finding: Finding,
    installed: bool,
) -> ValidationResult {
    match finding {
        Finding::TooOld(version) => {
            let minimum = requirement
                .minimum_version
                .as_ref()
                .map(Version::to_string)
                .unwrap_or_default();
            ValidationResult::new(TargetKind::Tool, &requirement.name, Status::VersionMismatch)
                .with_detail(format!("found {}, need >= {}", version, minimum))
                .with_hint(requirement.remediation())
        }
        Finding::Absent(reason) => {
            let hint = if installed {
                format!(
                    "Installed, but not visible to this process yet. Open a new terminal and re-run. {}",
                    requirement.remediation()
                )
            } else {
                requirement.remediation()
            };
            ValidationResult::new(TargetKind::Tool, &requirement.name, Status::Missing)
                .with_detail(reason)
                .with_hint(hint)
        }
        Finding::Satisfied(version) => satisfied(requirement, version, None),
        Finding::Unverifiable => unverifiable(requirement),
    }
}

//! Smoke invocation of the target application.
//!
//! A smoke test is a minimal run (by default `python -m ufo --help`) that
//! confirms the application starts inside the environment. It records the
//! command, the exit code, and whether each expected artifact was produced.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::environment::EnvironmentHandle;
use crate::report::{Status, TargetKind, ValidationResult};
use crate::shell::{CommandRunner, CommandSpec};

/// Clock slack when deciding whether an artifact is fresh.
const MTIME_SLACK: Duration = Duration::from_secs(2);

/// What to run and what it should produce.
#[derive(Debug, Clone)]
pub struct SmokeSpec {
    /// Command line, run through the platform shell.
    pub command: String,
    /// Paths (relative to `cwd`) that the command should create or update.
    pub expected_artifacts: Vec<PathBuf>,
    /// Working directory.
    pub cwd: PathBuf,
    pub timeout: Duration,
}

/// Whether one expected artifact showed up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactCheck {
    pub path: PathBuf,
    pub produced: bool,
}

/// What happened when the smoke command ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeRecord {
    pub command: String,
    /// False when the shell itself could not be started.
    pub launched: bool,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub artifacts: Vec<ArtifactCheck>,
    /// Last line of output on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_output: Option<String>,
}

impl SmokeRecord {
    /// Exit code 0 within the timeout and every artifact produced.
    pub fn passed(&self) -> bool {
        self.launched
            && !self.timed_out
            && self.exit_code == Some(0)
            && self.artifacts.iter().all(|a| a.produced)
    }

    /// Summarize as a validation result for the report.
    pub fn to_result(&self) -> ValidationResult {
        if self.passed() {
            return ValidationResult::ok(TargetKind::Smoke, &self.command)
                .with_detail("exit code 0");
        }

        let reason = if !self.launched {
            "could not be started".to_string()
        } else if self.timed_out {
            "timed out".to_string()
        } else if self.exit_code != Some(0) {
            match self.exit_code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            }
        } else {
            let missing: Vec<String> = self
                .artifacts
                .iter()
                .filter(|a| !a.produced)
                .map(|a| a.path.display().to_string())
                .collect();
            format!("did not produce {}", missing.join(", "))
        };

        let mut result = ValidationResult::new(TargetKind::Smoke, &self.command, Status::Error)
            .with_detail(reason)
            .with_hint("Run the command by hand inside the environment to see the full output");
        if let Some(line) = &self.failure_output {
            result.detail = result.detail.map(|d| format!("{}: {}", d, line));
        }
        result
    }
}

/// Run the smoke command inside `env` and check its artifacts.
pub fn run_smoke(
    spec: &SmokeSpec,
    env: &EnvironmentHandle,
    runner: &dyn CommandRunner,
) -> SmokeRecord {
    let started = SystemTime::now();
    let command = CommandSpec::shell(&spec.command)
        .cwd(&spec.cwd)
        .envs(env.command_env())
        .timeout(spec.timeout);

    tracing::info!("Smoke test: {}", spec.command);
    let outcome = runner.run(&command);

    let artifacts = spec
        .expected_artifacts
        .iter()
        .map(|path| ArtifactCheck {
            path: path.clone(),
            produced: artifact_produced(&spec.cwd.join(path), started),
        })
        .collect();

    match outcome {
        Ok(result) => SmokeRecord {
            command: spec.command.clone(),
            launched: true,
            exit_code: result.exit_code,
            timed_out: result.timed_out,
            artifacts,
            failure_output: if result.success {
                None
            } else {
                result.last_line().map(str::to_string)
            },
        },
        Err(e) => {
            tracing::warn!("Smoke command could not start: {}", e);
            SmokeRecord {
                command: spec.command.clone(),
                launched: false,
                exit_code: None,
                timed_out: false,
                artifacts,
                failure_output: None,
            }
        }
    }
}

/// Exists and was modified no earlier than shortly before `since`.
fn artifact_produced(path: &Path, since: SystemTime) -> bool {
    let Ok(meta) = path.metadata() else {
        return false;
    };
    let threshold = since.checked_sub(MTIME_SLACK).unwrap_or(since);
    meta.modified().map(|m| m >= threshold).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{CommandResult, ScriptedRunner};
    use std::fs;
    use tempfile::TempDir;

    fn spec(dir: &Path, artifacts: &[&str]) -> SmokeSpec {
        SmokeSpec {
            command: "python -m ufo --help".to_string(),
            expected_artifacts: artifacts.iter().map(PathBuf::from).collect(),
            cwd: dir.to_path_buf(),
            timeout: Duration::from_secs(30),
        }
    }

    fn env(dir: &Path) -> EnvironmentHandle {
        EnvironmentHandle::at(dir.join("ufo_env"))
    }

    #[test]
    fn passing_smoke_test() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.on("python -m ufo --help", CommandResult::success("usage: ufo"));

        let record = run_smoke(&spec(temp.path(), &[]), &env(temp.path()), &runner);

        assert!(record.passed());
        assert_eq!(record.exit_code, Some(0));
        assert_eq!(record.to_result().status, Status::Ok);
    }

    #[test]
    fn non_zero_exit_fails() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.on(
            "python -m ufo",
            CommandResult::failure(1, "ModuleNotFoundError: No module named 'ufo'"),
        );

        let record = run_smoke(&spec(temp.path(), &[]), &env(temp.path()), &runner);
        let result = record.to_result();

        assert!(!record.passed());
        assert_eq!(result.status, Status::Error);
        let detail = result.detail.unwrap();
        assert!(detail.contains("exited with code 1"));
        assert!(detail.contains("No module named 'ufo'"));
    }

    #[test]
    fn timeout_fails() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.on("python -m ufo", CommandResult::timeout());

        let record = run_smoke(&spec(temp.path(), &[]), &env(temp.path()), &runner);

        assert!(record.timed_out);
        assert!(record.to_result().detail.unwrap().contains("timed out"));
    }

    #[test]
    fn unstartable_shell_is_recorded() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();

        let record = run_smoke(&spec(temp.path(), &[]), &env(temp.path()), &runner);

        assert!(!record.launched);
        assert!(!record.passed());
    }

    #[test]
    fn produced_artifacts_are_detected() {
        let temp = TempDir::new().unwrap();
        let logs = temp.path().join("logs");
        let runner = ScriptedRunner::new();
        runner.on_with("python -m ufo", move |_| {
            fs::create_dir_all(&logs).unwrap();
            fs::write(logs.join("response.log"), "ok").unwrap();
            Ok(CommandResult::success(""))
        });

        let record = run_smoke(
            &spec(temp.path(), &["logs/response.log", "logs/screenshot.png"]),
            &env(temp.path()),
            &runner,
        );

        assert!(record.artifacts[0].produced);
        assert!(!record.artifacts[1].produced);
        assert!(!record.passed());
        assert!(record
            .to_result()
            .detail
            .unwrap()
            .contains("screenshot.png"));
    }

    #[test]
    fn smoke_runs_with_environment_variables() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new();
        runner.on_with("python -m ufo", |spec| {
            assert!(spec.env.contains_key("VIRTUAL_ENV"));
            assert!(spec.env.contains_key("PATH"));
            Ok(CommandResult::success(""))
        });

        let record = run_smoke(&spec(temp.path(), &[]), &env(temp.path()), &runner);
        assert!(record.passed());
    }
}

//! The per-invocation run report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::runner::RunState;
use crate::smoke::SmokeRecord;

use super::result::{any_degrading, Status, TargetKind, ValidationResult};

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Partial,
    Fail,
}

impl OverallStatus {
    /// Derive the overall status from the final state and all results.
    pub fn from_run(state: &RunState, results: &[ValidationResult]) -> Self {
        if state.is_failed() {
            OverallStatus::Fail
        } else if any_degrading(results) {
            OverallStatus::Partial
        } else {
            OverallStatus::Pass
        }
    }

    /// Process exit code: 0 pass, 1 partial, 2 fail.
    pub fn exit_code(self) -> i32 {
        match self {
            OverallStatus::Pass => 0,
            OverallStatus::Partial => 1,
            OverallStatus::Fail => 2,
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::Partial => "PARTIAL",
            OverallStatus::Fail => "FAIL",
        })
    }
}

/// Everything a run found, frozen at the end of the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    /// Name of the application being prepared.
    pub app_name: String,
    /// Environment root, whether or not it could be created.
    pub environment: PathBuf,
    pub state: RunState,
    pub results: Vec<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke: Option<SmokeRecord>,
    pub overall: OverallStatus,
    /// The error that aborted the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
}

/// Inputs for [`generate_report`].
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub app_name: String,
    pub environment: PathBuf,
    pub state: RunState,
    pub results: Vec<ValidationResult>,
    pub smoke: Option<SmokeRecord>,
    pub fatal: Option<String>,
}

/// Assemble the final report, stamped with the current UTC time.
pub fn generate_report(input: ReportInput) -> RunReport {
    generate_report_at(input, Utc::now())
}

/// Assemble the final report with an explicit timestamp.
pub fn generate_report_at(input: ReportInput, timestamp: DateTime<Utc>) -> RunReport {
    let overall = OverallStatus::from_run(&input.state, &input.results);
    RunReport {
        timestamp,
        app_name: input.app_name,
        environment: input.environment,
        state: input.state,
        results: input.results,
        smoke: input.smoke,
        overall,
        fatal: input.fatal,
    }
}

const KIND_ORDER: [TargetKind; 6] = [
    TargetKind::Tool,
    TargetKind::Environment,
    TargetKind::Package,
    TargetKind::Application,
    TargetKind::Config,
    TargetKind::Smoke,
];

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        self.overall.exit_code()
    }

    /// Number of results with the given status.
    pub fn count(&self, status: Status) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Results that pulled the run down to partial.
    pub fn problems(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.is_degrading())
    }

    /// Human-readable report text.
    ///
    /// Contains no durations, so two runs over an unchanged machine render
    /// identically apart from the timestamp line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} environment report", self.app_name);
        let _ = writeln!(out, "Generated: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "Environment: {}", self.environment.display());
        let _ = writeln!(out, "Final state: {}", self.state);
        let _ = writeln!(out, "Overall: {}", self.overall);
        if let Some(fatal) = &self.fatal {
            let _ = writeln!(out, "Aborted: {}", fatal);
        }

        for kind in KIND_ORDER {
            let section: Vec<&ValidationResult> =
                self.results.iter().filter(|r| r.kind == kind).collect();
            if section.is_empty() {
                continue;
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", kind.heading());
            let width = section.iter().map(|r| r.target.len()).max().unwrap_or(0);
            for result in section {
                let _ = write!(
                    out,
                    "  [{:<16}] {:<width$}",
                    result.status.to_string(),
                    result.target,
                    width = width
                );
                if let Some(detail) = &result.detail {
                    let _ = write!(out, "  {}", detail);
                }
                let _ = writeln!(out);
                if !result.is_ok() {
                    if let Some(hint) = &result.remediation {
                        let _ = writeln!(out, "      fix: {}", hint);
                    }
                }
            }
        }

        if let Some(smoke) = &self.smoke {
            if !smoke.artifacts.is_empty() {
                let _ = writeln!(out);
                let _ = writeln!(out, "Smoke artifacts");
                for artifact in &smoke.artifacts {
                    let mark = if artifact.produced { "produced" } else { "absent" };
                    let _ = writeln!(out, "  [{:<8}] {}", mark, artifact.path.display());
                }
            }
        }

        let _ = writeln!(out);
        let summary: Vec<String> = Status::ALL
            .iter()
            .map(|s| (s, self.count(*s)))
            .filter(|(_, n)| *n > 0)
            .map(|(s, n)| format!("{} {}", n, s))
            .collect();
        let _ = writeln!(out, "Summary: {}", summary.join(", "));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Phase;
    use chrono::TimeZone;

    fn reported(degraded: bool) -> RunState {
        if degraded {
            RunState::Degraded(Phase::Reported)
        } else {
            RunState::Active(Phase::Reported)
        }
    }

    fn input(state: RunState, results: Vec<ValidationResult>) -> ReportInput {
        ReportInput {
            app_name: "UFO".to_string(),
            environment: PathBuf::from("/work/ufo_env"),
            state,
            results,
            smoke: None,
            fatal: None,
        }
    }

    #[test]
    fn all_ok_is_pass() {
        let results = vec![
            ValidationResult::ok(TargetKind::Tool, "python"),
            ValidationResult::ok(TargetKind::Package, "six"),
        ];
        let report = generate_report(input(reported(false), results));
        assert_eq!(report.overall, OverallStatus::Pass);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn degrading_result_is_partial() {
        let results = vec![
            ValidationResult::ok(TargetKind::Tool, "python"),
            ValidationResult::new(TargetKind::Package, "torch", Status::Error),
        ];
        let report = generate_report(input(reported(true), results));
        assert_eq!(report.overall, OverallStatus::Partial);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.problems().count(), 1);
    }

    #[test]
    fn advisory_result_stays_pass() {
        let results = vec![
            ValidationResult::new(TargetKind::Config, "HOST_AGENT.API_KEY", Status::Warning)
                .degrading(false),
        ];
        let report = generate_report(input(reported(false), results));
        assert_eq!(report.overall, OverallStatus::Pass);
    }

    #[test]
    fn failed_run_is_fail() {
        let report = generate_report(input(RunState::Failed(Phase::Probing), vec![]));
        assert_eq!(report.overall, OverallStatus::Fail);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn render_groups_by_stage_and_shows_hints() {
        let results = vec![
            ValidationResult::new(TargetKind::Tool, "git", Status::Missing)
                .with_hint("winget install Git.Git"),
            ValidationResult::ok(TargetKind::Package, "six").with_detail("bulk"),
        ];
        let text = generate_report(input(reported(true), results)).render();

        assert!(text.contains("Tools"));
        assert!(text.contains("Packages"));
        assert!(!text.contains("Configuration"));
        assert!(text.contains("fix: winget install Git.Git"));
        assert!(text.contains("Overall: PARTIAL"));
        assert!(text.contains("Summary: 1 ok, 1 missing"));
    }

    #[test]
    fn renders_differ_only_in_timestamp() {
        let results = vec![
            ValidationResult::ok(TargetKind::Tool, "python").with_detail("3.11.4"),
            ValidationResult::new(TargetKind::Package, "faiss-cpu", Status::Error),
        ];
        let first = generate_report_at(
            input(reported(true), results.clone()),
            Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        )
        .render();
        let second = generate_report_at(
            input(reported(true), results),
            Utc.with_ymd_and_hms(2026, 1, 6, 17, 30, 0).unwrap(),
        )
        .render();

        let differing: Vec<(&str, &str)> = first
            .lines()
            .zip(second.lines())
            .filter(|(a, b)| a != b)
            .collect();
        assert_eq!(differing.len(), 1);
        assert!(differing[0].0.starts_with("Generated:"));
    }

    #[test]
    fn json_uses_lowercase_overall() {
        let report = generate_report(input(reported(false), vec![]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall"], "pass");
        assert_eq!(json["state"]["state"], "active");
        assert_eq!(json["state"]["phase"], "REPORTED");
    }
}

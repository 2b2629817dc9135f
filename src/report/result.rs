//! Per-target validation results.
//!
//! Every stage reports what it found as a list of [`ValidationResult`]s.
//! Failures that do not halt the run are never raised as errors; they end
//! up here and in the final report.

use serde::Serialize;
use std::fmt;

/// Outcome of checking one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Present and usable.
    Ok,
    /// Absent, or installed but unusable.
    Missing,
    /// Present but the version is wrong or could not be determined.
    VersionMismatch,
    /// Every attempt to provide it failed.
    Error,
    /// Advisory finding.
    Warning,
    /// Deliberately not checked.
    Skipped,
}

impl Status {
    /// All statuses, in report order.
    pub const ALL: [Status; 6] = [
        Status::Ok,
        Status::Missing,
        Status::VersionMismatch,
        Status::Error,
        Status::Warning,
        Status::Skipped,
    ];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::Missing => "missing",
            Status::VersionMismatch => "version-mismatch",
            Status::Error => "error",
            Status::Warning => "warning",
            Status::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Which stage a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Tool,
    Environment,
    Package,
    Application,
    Config,
    Smoke,
}

impl TargetKind {
    /// Section heading used in reports.
    pub fn heading(self) -> &'static str {
        match self {
            TargetKind::Tool => "Tools",
            TargetKind::Environment => "Environment",
            TargetKind::Package => "Packages",
            TargetKind::Application => "Application",
            TargetKind::Config => "Configuration",
            TargetKind::Smoke => "Smoke test",
        }
    }
}

/// The result of validating a single tool, package, or config rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// What was checked (tool name, package name, config location).
    pub target: String,
    /// Stage the result came from.
    pub kind: TargetKind,
    /// What was found.
    pub status: Status,
    /// What the user can do about it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Extra facts (detected version, install strategy, rule id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether a non-ok status degrades the overall run.
    pub degrades: bool,
}

impl ValidationResult {
    /// Create a result. Results degrade the run by default.
    pub fn new(kind: TargetKind, target: impl Into<String>, status: Status) -> Self {
        Self {
            target: target.into(),
            kind,
            status,
            remediation: None,
            detail: None,
            degrades: true,
        }
    }

    pub fn ok(kind: TargetKind, target: impl Into<String>) -> Self {
        Self::new(kind, target, Status::Ok)
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.remediation = Some(hint.into());
        self
    }

    /// Attach detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set whether a failure here degrades the run.
    pub fn degrading(mut self, degrades: bool) -> Self {
        self.degrades = degrades;
        self
    }

    /// Ok or deliberately skipped.
    pub fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok | Status::Skipped)
    }

    /// Whether this result pulls the overall status down to partial.
    pub fn is_degrading(&self) -> bool {
        self.degrades && !self.is_ok()
    }

    /// One-line form, e.g. `git: ok (2.45.1)`.
    pub fn summary_line(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}: {} ({})", self.target, self.status, detail),
            None => format!("{}: {}", self.target, self.status),
        }
    }
}

/// Whether any result in the slice degrades the run.
pub fn any_degrading(results: &[ValidationResult]) -> bool {
    results.iter().any(ValidationResult::is_degrading)
}

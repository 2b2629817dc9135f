//! Config lint rule definitions.
//!
//! - [`ConfigRule`] - The trait every config check implements
//! - [`ConfigDiagnostic`] - One finding, tied to a dotted location
//! - [`RuleRegistry`] - The ordered set of rules to run

use std::fmt;

use super::document::ConfigDocument;
use super::rules::{
    DeploymentLooksLikeModelRule, InlineCredentialsRule, PlaceholderValuesRule,
    RequiredFieldsRule, RequiredSectionsRule,
};
use super::validator::ValidateOptions;
use crate::report::{Status, TargetKind, ValidationResult};

/// Unique identifier for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a config finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Advisory; reported but does not degrade the run.
    Warning,
    /// The application will not run correctly.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A finding produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    pub rule_id: RuleId,
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `HOST_AGENT.API_KEY`.
    pub location: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ConfigDiagnostic {
    pub fn new(
        rule_id: RuleId,
        severity: Severity,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            location: location.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Report entry for this finding.
    pub fn to_result(&self) -> ValidationResult {
        let (status, degrades) = match self.severity {
            Severity::Error => (Status::Error, true),
            Severity::Warning => (Status::Warning, false),
        };
        let result = ValidationResult::new(TargetKind::Config, &self.location, status)
            .with_detail(format!("{}: {}", self.rule_id, self.message))
            .degrading(degrades);
        match &self.suggestion {
            Some(hint) => result.with_hint(hint),
            None => result,
        }
    }
}

/// A check over the application config document.
pub trait ConfigRule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Description of what this rule checks.
    fn description(&self) -> &str;

    fn default_severity(&self) -> Severity;

    fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic>;
}

/// Rules run in registration order, so findings come out in a stable order.
pub struct RuleRegistry {
    rules: Vec<Box<dyn ConfigRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Registry with every built-in rule.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(RequiredSectionsRule));
        registry.register(Box::new(RequiredFieldsRule));
        registry.register(Box::new(PlaceholderValuesRule));
        registry.register(Box::new(DeploymentLooksLikeModelRule));
        registry.register(Box::new(InlineCredentialsRule));
        registry
    }

    /// Register a rule, replacing one with the same id.
    pub fn register(&mut self, rule: Box<dyn ConfigRule>) {
        let id = rule.id();
        match self.rules.iter().position(|r| r.id() == id) {
            Some(i) => self.rules[i] = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn get(&self, id: &RuleId) -> Option<&dyn ConfigRule> {
        self.rules.iter().find(|r| &r.id() == id).map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ConfigRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Run every rule against `doc`.
    pub fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic> {
        self.iter()
            .flat_map(|rule| {
                let found = rule.check(doc, options);
                tracing::debug!(
                    "Rule {} ({}) produced {} findings",
                    rule.id(),
                    rule.description(),
                    found.len()
                );
                found
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

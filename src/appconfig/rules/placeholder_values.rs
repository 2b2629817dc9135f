//! Template placeholder values left in place.

use regex::Regex;
use std::sync::LazyLock;

use crate::appconfig::{
    ConfigDiagnostic, ConfigDocument, ConfigRule, RuleId, Severity, ValidateOptions,
};

static PLACEHOLDER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\byour[_\- ]",
        r"<[^<>\s][^<>]*>",
        r"(?i)^sk-x*$",
        r"(?i)placeholder",
        r"(?i)^changeme$",
        r"(?i)^(todo|tbd|xxx+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\$\{[A-Za-z_][A-Za-z0-9_]*\}|%[A-Za-z_][A-Za-z0-9_]*%)$").unwrap()
});

/// A `${VAR}` or Windows-style `%VAR%` reference, resolved by the
/// application at startup.
pub fn is_env_reference(value: &str) -> bool {
    ENV_REFERENCE.is_match(value.trim())
}

/// Whether `value` looks like template filler rather than a real setting.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    !is_env_reference(value) && PLACEHOLDER_PATTERNS.iter().any(|p| p.is_match(value))
}

/// No agent setting still holds a placeholder from the template.
pub struct PlaceholderValuesRule;

impl ConfigRule for PlaceholderValuesRule {
    fn id(&self) -> RuleId {
        RuleId::new("placeholder-values")
    }

    fn description(&self) -> &str {
        "Flags agent settings that still hold template placeholders"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic> {
        let sections = doc.agent_sections(&options.required_sections);
        sections
            .iter()
            .flat_map(|section| section.strings())
            .filter(|(_, value)| is_placeholder(value))
            .map(|(location, value)| {
                ConfigDiagnostic::new(
                    self.id(),
                    self.default_severity(),
                    &location,
                    format!("placeholder value '{}'", value),
                )
                .with_suggestion(format!("Replace the value of {} with a real setting", location))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_placeholders() {
        for value in [
            "YOUR_API_KEY",
            "your-resource-name",
            "https://<resource>.openai.azure.com",
            "sk-xxxxxxxx",
            "sk-",
            "<placeholder>",
            "PLACEHOLDER_ENDPOINT",
            "changeme",
            "TODO",
        ] {
            assert!(is_placeholder(value), "{value} should be a placeholder");
        }
    }

    #[test]
    fn real_values_are_not_placeholders() {
        for value in [
            "https://api.openai.com/v1/chat/completions",
            "gpt-4o",
            "sk-proj-1a2b3c",
            "${OPENAI_API_KEY}",
            "${YOUR_API_KEY}",
            "%YOUR_API_KEY%",
            "2024-02-15-preview",
            "a < b",
        ] {
            assert!(!is_placeholder(value), "{value} should not be a placeholder");
        }
    }

    #[test]
    fn reports_location_of_each_placeholder() {
        let doc = ConfigDocument::parse(
            "HOST_AGENT:\n  API_BASE: https://<resource>.openai.azure.com\n  API_KEY: sk-xxxx\n  API_MODEL: gpt-4o\nAPP_AGENT:\n  API_KEY: ${KEY}\n",
        )
        .unwrap();

        let found = PlaceholderValuesRule.check(&doc, &ValidateOptions::default());
        let locations: Vec<_> = found.iter().map(|d| d.location.as_str()).collect();
        assert_eq!(locations, vec!["HOST_AGENT.API_BASE", "HOST_AGENT.API_KEY"]);
    }

    #[test]
    fn values_outside_agent_sections_are_ignored() {
        let doc = ConfigDocument::parse("PROMPT: Describe <control> on screen\n").unwrap();
        assert!(PlaceholderValuesRule
            .check(&doc, &ValidateOptions::default())
            .is_empty());
    }
}

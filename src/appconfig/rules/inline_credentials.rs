//! Literal API keys in the config file.

use super::placeholder_values::{is_env_reference, is_placeholder};
use crate::appconfig::{
    ConfigDiagnostic, ConfigDocument, ConfigRule, RuleId, Severity, ValidateOptions,
};

/// Recommends `${VAR}` references over keys written into the file.
pub struct InlineCredentialsRule;

impl ConfigRule for InlineCredentialsRule {
    fn id(&self) -> RuleId {
        RuleId::new("inline-credentials")
    }

    fn description(&self) -> &str {
        "Warns about API keys stored literally in the config file"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic> {
        doc.agent_sections(&options.required_sections)
            .into_iter()
            .filter_map(|section| {
                let key = section.str_field("API_KEY")?.trim();
                // Blank and placeholder keys are reported by other rules.
                if key.is_empty() || is_env_reference(key) || is_placeholder(key) {
                    return None;
                }
                Some(
                    ConfigDiagnostic::new(
                        self.id(),
                        self.default_severity(),
                        section.location("API_KEY"),
                        "API key is stored in the config file",
                    )
                    .with_suggestion(format!(
                        "Set API_KEY to ${{{}_API_KEY}} and export the key as an environment variable",
                        section.name
                    )),
                )
            })
            .collect()
    }
}

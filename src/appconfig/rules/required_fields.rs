//! Connection fields every agent section needs.

use crate::appconfig::{
    ConfigDiagnostic, ConfigDocument, ConfigRule, RuleId, Severity, ValidateOptions,
};

const COMMON_FIELDS: &[&str] = &["API_TYPE", "API_BASE", "API_KEY"];

/// Every present agent section carries the connection fields. Azure
/// sections also need a deployment id; Azure AD sections authenticate
/// without a key.
pub struct RequiredFieldsRule;

impl ConfigRule for RequiredFieldsRule {
    fn id(&self) -> RuleId {
        RuleId::new("required-fields")
    }

    fn description(&self) -> &str {
        "Ensures each agent section has its API connection fields"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic> {
        let mut diagnostics = Vec::new();

        for section in doc.agent_sections(&options.required_sections) {
            let mut fields: Vec<&str> = COMMON_FIELDS.to_vec();
            if section.api_type().as_deref() == Some("azure_ad") {
                fields.retain(|f| *f != "API_KEY");
            }
            if section.is_azure() {
                fields.push("API_DEPLOYMENT_ID");
            }

            for field in fields {
                if !section.has_value(field) {
                    diagnostics.push(
                        ConfigDiagnostic::new(
                            self.id(),
                            self.default_severity(),
                            section.location(field),
                            "missing or empty",
                        )
                        .with_suggestion(format!("Set {} in {}", field, section.name)),
                    );
                }
            }
        }

        diagnostics
    }
}

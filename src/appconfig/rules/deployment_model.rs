//! Azure deployment ids that are really model names.

use crate::appconfig::{
    ConfigDiagnostic, ConfigDocument, ConfigRule, RuleId, Severity, ValidateOptions,
};

/// Public model names commonly pasted where a deployment name belongs.
pub const MODEL_NAMES: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-4-32k",
    "gpt-35-turbo",
    "gpt-3.5-turbo",
    "gpt-4.1",
    "o1",
    "o3-mini",
];

/// On Azure, `API_DEPLOYMENT_ID` names a deployment, which only
/// coincidentally matches a model name. Advisory.
pub struct DeploymentLooksLikeModelRule;

impl ConfigRule for DeploymentLooksLikeModelRule {
    fn id(&self) -> RuleId {
        RuleId::new("deployment-looks-like-model")
    }

    fn description(&self) -> &str {
        "Warns when an Azure deployment id is a generic model name"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic> {
        let mut diagnostics = Vec::new();

        for section in doc.agent_sections(&options.required_sections) {
            if !section.is_azure() {
                continue;
            }
            let Some(deployment) = section.str_field("API_DEPLOYMENT_ID") else {
                continue;
            };
            let deployment = deployment.trim();
            if MODEL_NAMES.iter().any(|m| m.eq_ignore_ascii_case(deployment)) {
                diagnostics.push(
                    ConfigDiagnostic::new(
                        self.id(),
                        self.default_severity(),
                        section.location("API_DEPLOYMENT_ID"),
                        format!("'{}' looks like a model name, not a deployment name", deployment),
                    )
                    .with_suggestion(
                        "Use the deployment name shown in the Azure portal under Model deployments",
                    ),
                );
            }
        }

        diagnostics
    }
}

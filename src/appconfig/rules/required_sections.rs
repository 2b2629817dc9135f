//! Required agent sections.

use crate::appconfig::document::AGENT_SETTINGS;
use crate::appconfig::{
    ConfigDiagnostic, ConfigDocument, ConfigRule, RuleId, Severity, ValidateOptions,
};

/// Every required agent section exists at the top level or under
/// `AGENT_SETTINGS`.
pub struct RequiredSectionsRule;

impl ConfigRule for RequiredSectionsRule {
    fn id(&self) -> RuleId {
        RuleId::new("required-sections")
    }

    fn description(&self) -> &str {
        "Ensures the required agent sections are present"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &ConfigDocument, options: &ValidateOptions) -> Vec<ConfigDiagnostic> {
        options
            .required_sections
            .iter()
            .filter(|name| doc.section(name).is_none())
            .map(|name| {
                ConfigDiagnostic::new(
                    self.id(),
                    self.default_severity(),
                    name.as_str(),
                    "required section is missing",
                )
                .with_suggestion(format!(
                    "Add a {} section (top level or under {}) from the config template",
                    name, AGENT_SETTINGS
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(yaml: &str) -> Vec<ConfigDiagnostic> {
        let doc = ConfigDocument::parse(yaml).unwrap();
        RequiredSectionsRule.check(&doc, &ValidateOptions::default())
    }

    #[test]
    fn all_sections_present() {
        assert!(check("HOST_AGENT: {}\nAPP_AGENT: {}\nBACKUP_AGENT: {}\n").is_empty());
    }

    #[test]
    fn nested_sections_count() {
        let found = check(
            "AGENT_SETTINGS:\n  HOST_AGENT: {}\n  APP_AGENT: {}\nBACKUP_AGENT: {}\n",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn reports_each_missing_section() {
        let found = check("HOST_AGENT: {}\n");
        let locations: Vec<_> = found.iter().map(|d| d.location.as_str()).collect();
        assert_eq!(locations, vec!["APP_AGENT", "BACKUP_AGENT"]);
        assert!(found.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn section_that_is_not_a_mapping_is_missing() {
        let found = check("HOST_AGENT: gpt\nAPP_AGENT: {}\nBACKUP_AGENT: {}\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "HOST_AGENT");
    }

    #[test]
    fn custom_required_list() {
        let doc = ConfigDocument::parse("HOST_AGENT: {}\n").unwrap();
        let options = ValidateOptions {
            required_sections: vec!["HOST_AGENT".to_string()],
        };
        assert!(RequiredSectionsRule.check(&doc, &options).is_empty());
    }
}

//! Validate the application config file.

use std::fs;
use std::io;
use std::path::Path;

use super::document::ConfigDocument;
use super::rule::RuleRegistry;
use crate::report::{Status, TargetKind, ValidationResult};

/// Agent sections the application cannot start without.
pub const DEFAULT_REQUIRED_SECTIONS: &[&str] = &["HOST_AGENT", "APP_AGENT", "BACKUP_AGENT"];

/// Options for [`validate_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    pub required_sections: Vec<String>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            required_sections: DEFAULT_REQUIRED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Parse `target` and run every built-in rule over it.
///
/// Never fails: an unreadable or unparseable file is itself a result. A
/// clean file yields a single ok result.
pub fn validate_config(target: &Path, options: &ValidateOptions) -> Vec<ValidationResult> {
    let name = target.display().to_string();

    let text = match fs::read_to_string(target) {
        Ok(text) => text,
        Err(e) => {
            let detail = if e.kind() == io::ErrorKind::NotFound {
                "file not found".to_string()
            } else {
                format!("cannot read: {}", e)
            };
            return vec![ValidationResult::new(TargetKind::Config, name, Status::Error)
                .with_detail(detail)
                .with_hint("Run `pitch check-config` to create it from the template")];
        }
    };

    let doc = match ConfigDocument::parse(&text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("{} is not valid YAML: {}", name, e);
            return vec![ValidationResult::new(TargetKind::Config, name, Status::Error)
                .with_detail(format!("invalid YAML: {}", e))
                .with_hint("Fix the YAML syntax; compare against the config template")];
        }
    };

    validate_document(&name, &doc, options)
}

/// Run the built-in rules over an already-parsed document.
pub fn validate_document(
    name: &str,
    doc: &ConfigDocument,
    options: &ValidateOptions,
) -> Vec<ValidationResult> {
    let registry = RuleRegistry::with_builtins();
    let diagnostics = registry.check(doc, options);
    if diagnostics.is_empty() {
        return vec![ValidationResult::ok(TargetKind::Config, name)
            .with_detail(format!("{} rules passed", registry.len()))];
    }
    diagnostics.iter().map(|d| d.to_result()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::any_degrading;
    use tempfile::TempDir;

    const GOOD: &str = "\
HOST_AGENT:
  API_TYPE: aoai
  API_BASE: https://contoso.openai.azure.com
  API_KEY: ${AZURE_OPENAI_KEY}
  API_DEPLOYMENT_ID: ufo-gpt4o
APP_AGENT:
  API_TYPE: openai
  API_BASE: https://api.openai.com/v1/chat/completions
  API_KEY: ${OPENAI_API_KEY}
BACKUP_AGENT:
  API_TYPE: openai
  API_BASE: https://api.openai.com/v1/chat/completions
  API_KEY: ${OPENAI_API_KEY}
";

    fn write(text: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, text).unwrap();
        (temp, path)
    }

    #[test]
    fn clean_config_is_one_ok_result() {
        let (_temp, path) = write(GOOD);
        let results = validate_config(&path, &ValidateOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, Status::Ok);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let (_temp, path) = write("HOST_AGENT:\n  API_KEY: [unclosed\n");
        let results = validate_config(&path, &ValidateOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, Status::Error);
        assert!(results[0].detail.as_deref().unwrap().starts_with("invalid YAML"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let results =
            validate_config(&temp.path().join("config.yaml"), &ValidateOptions::default());
        assert_eq!(results[0].status, Status::Error);
        assert!(any_degrading(&results));
    }

    #[test]
    fn missing_host_agent_degrades() {
        let (_temp, path) = write(&GOOD.replace("HOST_AGENT", "HOST_AGENT_OLD"));
        let results = validate_config(&path, &ValidateOptions::default());
        assert!(results
            .iter()
            .any(|r| r.target == "HOST_AGENT" && r.status == Status::Error));
        assert!(any_degrading(&results));
    }

    #[test]
    fn model_name_deployment_only_warns() {
        let (_temp, path) = write(&GOOD.replace("ufo-gpt4o", "gpt-4o"));
        let results = validate_config(&path, &ValidateOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, Status::Warning);
        assert!(!any_degrading(&results));
    }

    #[test]
    fn placeholder_key_is_an_error() {
        let (_temp, path) = write(&GOOD.replace("${OPENAI_API_KEY}", "sk-xxxx"));
        let results = validate_config(&path, &ValidateOptions::default());
        let targets: Vec<_> = results.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["APP_AGENT.API_KEY", "BACKUP_AGENT.API_KEY"]);
        assert!(any_degrading(&results));
    }
}

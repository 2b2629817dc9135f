//! The target application's own config file.
//!
//! [`ensure_config`] materializes it from the template when absent, and
//! [`validate_config`] runs the lint-style [`ConfigRule`]s over it. The file
//! is only ever read after it exists.

pub mod document;
pub mod rule;
pub mod rules;
pub mod template;
pub mod validator;

pub use document::{AgentSection, ConfigDocument};
pub use rule::{ConfigDiagnostic, ConfigRule, RuleId, RuleRegistry, Severity};
pub use template::{ensure_config, ConfigStatus};
pub use validator::{validate_config, validate_document, ValidateOptions, DEFAULT_REQUIRED_SECTIONS};

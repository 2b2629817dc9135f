//! Built-in config rules.

pub mod deployment_model;
pub mod inline_credentials;
pub mod placeholder_values;
pub mod required_fields;
pub mod required_sections;

pub use deployment_model::DeploymentLooksLikeModelRule;
pub use inline_credentials::InlineCredentialsRule;
pub use placeholder_values::{is_env_reference, is_placeholder, PlaceholderValuesRule};
pub use required_fields::RequiredFieldsRule;
pub use required_sections::RequiredSectionsRule;

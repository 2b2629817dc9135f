//! Materialize the application config from its template.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::report::{Status, TargetKind, ValidationResult};

/// What [`ensure_config`] found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    /// The target existed and was left untouched.
    AlreadyPresent,
    /// The target was created from the template.
    Created,
    /// Neither the target nor the template exists.
    TemplateMissing,
}

impl ConfigStatus {
    /// Report entry for this outcome. A missing template is an error since
    /// nothing can be validated.
    pub fn to_result(self, template: &Path, target: &Path) -> ValidationResult {
        let name = target.display().to_string();
        match self {
            ConfigStatus::AlreadyPresent => {
                ValidationResult::ok(TargetKind::Config, name).with_detail("existing file")
            }
            ConfigStatus::Created => ValidationResult::ok(TargetKind::Config, name)
                .with_detail(format!("created from {}", template.display())),
            ConfigStatus::TemplateMissing => {
                ValidationResult::new(TargetKind::Config, name, Status::Error)
                    .with_detail(format!("template {} not found", template.display()))
                    .with_hint(format!(
                        "Create {} by hand or restore {}",
                        target.display(),
                        template.display()
                    ))
            }
        }
    }
}

/// Copy `template` to `target` unless `target` already exists.
///
/// An existing target is never opened for writing. The copy uses
/// create-new semantics, so a file that appears concurrently is kept.
pub fn ensure_config(template: &Path, target: &Path) -> Result<ConfigStatus> {
    if target.exists() {
        tracing::debug!("Config {} already present", target.display());
        return Ok(ConfigStatus::AlreadyPresent);
    }

    let contents = match fs::read(template) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Config template {} not found", template.display());
            return Ok(ConfigStatus::TemplateMissing);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(ConfigStatus::AlreadyPresent)
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(&contents)?;

    tracing::info!(
        "Created {} from {}",
        target.display(),
        template.display()
    );
    Ok(ConfigStatus::Created)
}

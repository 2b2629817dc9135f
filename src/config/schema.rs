//! Settings schema for `pitch.yml`.
//!
//! Every field has a default, so an absent or empty file describes the
//! standard UFO layout:
//!
//! ```yaml
//! app_name: UFO
//! python: python3
//! env_path: ufo_env
//! manifest: requirements.txt
//! config_template: ufo/config/config.yaml.template
//! config_path: ufo/config/config.yaml
//! required_sections: [HOST_AGENT, APP_AGENT, BACKUP_AGENT]
//! import_names:
//!   pywinauto: pywinauto
//! binary_only: [pyaudio]
//! requirements:
//!   - name: node
//!     detect: node --version
//!     minimum_version: "18"
//!     hint: Install Node.js 18 or newer
//! application:
//!   package_dir: ufo
//!   directories: [agents, config, llm, utils]
//!   files: [__init__.py, __main__.py]
//!   modules: [ufo, ufo.llm, ufo.utils]
//!   windows_only: true
//! smoke:
//!   command: python -m ufo --help
//!   artifacts: []
//! timeouts:
//!   probe: 30
//!   install: 1800
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::appconfig::DEFAULT_REQUIRED_SECTIONS;
use crate::requirements::ToolRequirement;
use crate::shell::Platform;

/// Root of `pitch.yml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PitchSettings {
    /// Display name of the application being prepared.
    pub app_name: String,

    /// Base interpreter used to create the environment. Defaults to
    /// `python` on Windows and `python3` elsewhere.
    pub python: Option<String>,

    /// Environment location, relative to the project root.
    pub env_path: PathBuf,

    /// Package manifest, relative to the project root.
    pub manifest: PathBuf,

    /// Application config template.
    pub config_template: PathBuf,

    /// Application config file.
    pub config_path: PathBuf,

    /// Agent sections the config must contain.
    pub required_sections: Vec<String>,

    /// Extra install-name to import-name mappings.
    pub import_names: BTreeMap<String, String>,

    /// Extra packages to retry as binary-only wheels.
    pub binary_only: Vec<String>,

    /// Tool requirements added to (or replacing) the built-ins.
    pub requirements: Vec<ToolRequirement>,

    pub application: ApplicationSettings,

    pub smoke: SmokeSettings,

    pub timeouts: TimeoutSettings,

    /// Where run reports are written, relative to the project root.
    pub reports_dir: PathBuf,
}

impl Default for PitchSettings {
    fn default() -> Self {
        Self {
            app_name: "UFO".to_string(),
            python: None,
            env_path: PathBuf::from("ufo_env"),
            manifest: PathBuf::from("requirements.txt"),
            config_template: PathBuf::from("ufo/config/config.yaml.template"),
            config_path: PathBuf::from("ufo/config/config.yaml"),
            required_sections: DEFAULT_REQUIRED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            import_names: BTreeMap::new(),
            binary_only: Vec::new(),
            requirements: Vec::new(),
            application: ApplicationSettings::default(),
            smoke: SmokeSettings::default(),
            timeouts: TimeoutSettings::default(),
            reports_dir: PathBuf::from(".pitch/reports"),
        }
    }
}

impl PitchSettings {
    /// Base interpreter command for `platform`.
    pub fn python_for(&self, platform: Platform) -> String {
        self.python
            .clone()
            .unwrap_or_else(|| platform.default_python().to_string())
    }
}

/// Expected shape of the application's own source tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplicationSettings {
    /// Set to false to skip the layout, import and platform checks.
    pub enabled: bool,

    /// Package directory, relative to the project root.
    pub package_dir: PathBuf,

    /// Subdirectories the package must contain.
    pub directories: Vec<String>,

    /// Files the package must contain.
    pub files: Vec<String>,

    /// Modules that must import inside the environment.
    pub modules: Vec<String>,

    /// Warn when running anywhere but Windows.
    pub windows_only: bool,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            enabled: true,
            package_dir: PathBuf::from("ufo"),
            directories: strings(&[
                "agents", "automator", "config", "llm", "prompter", "prompts", "utils",
            ]),
            files: strings(&["__init__.py", "__main__.py"]),
            modules: strings(&["ufo", "ufo.llm", "ufo.utils", "ufo.prompter"]),
            windows_only: true,
        }
    }
}

/// The smoke invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmokeSettings {
    /// Command line run through the platform shell inside the environment.
    pub command: String,

    /// Files the command is expected to produce, relative to the project root.
    pub artifacts: Vec<PathBuf>,

    /// Set to false to skip the smoke invocation.
    pub enabled: bool,
}

impl Default for SmokeSettings {
    fn default() -> Self {
        Self {
            command: "python -m ufo --help".to_string(),
            artifacts: Vec::new(),
            enabled: true,
        }
    }
}

/// Timeouts in seconds, per command category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutSettings {
    /// Tool detection commands.
    pub probe: u64,
    /// Installs: OS package manager and pip.
    pub install: u64,
    /// One import probe.
    pub import: u64,
    /// Environment creation and installer checks.
    pub environment: u64,
    /// The smoke invocation.
    pub smoke: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            probe: 30,
            install: 1800,
            import: 120,
            environment: 300,
            smoke: 300,
        }
    }
}

impl TimeoutSettings {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe)
    }

    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install)
    }

    pub fn import(&self) -> Duration {
        Duration::from_secs(self.import)
    }

    pub fn environment(&self) -> Duration {
        Duration::from_secs(self.environment)
    }

    pub fn smoke(&self) -> Duration {
        Duration::from_secs(self.smoke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings: PitchSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.app_name, "UFO");
        assert_eq!(settings.env_path, PathBuf::from("ufo_env"));
        assert_eq!(
            settings.required_sections,
            vec!["HOST_AGENT", "APP_AGENT", "BACKUP_AGENT"]
        );
        assert!(settings.smoke.enabled);
        assert_eq!(settings.timeouts.install(), Duration::from_secs(1800));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings: PitchSettings = serde_yaml::from_str(
            "timeouts:\n  probe: 5\nsmoke:\n  artifacts: [logs/run.log]\n",
        )
        .unwrap();
        assert_eq!(settings.timeouts.probe(), Duration::from_secs(5));
        assert_eq!(settings.timeouts.import(), Duration::from_secs(120));
        assert_eq!(settings.smoke.command, "python -m ufo --help");
        assert_eq!(settings.smoke.artifacts, vec![PathBuf::from("logs/run.log")]);
    }

    #[test]
    fn custom_requirements_parse() {
        let settings: PitchSettings = serde_yaml::from_str(
            "requirements:\n  - name: node\n    detect: node --version\n    minimum_version: \"18\"\n",
        )
        .unwrap();
        let node = &settings.requirements[0];
        assert_eq!(node.name, "node");
        assert_eq!(node.minimum_version.as_ref().unwrap().major(), 18);
        assert!(node.install.is_none());
    }

    #[test]
    fn application_section_overrides_layout() {
        let settings: PitchSettings = serde_yaml::from_str(
            "application:\n  package_dir: src/ufo\n  modules: [ufo]\n  windows_only: false\n",
        )
        .unwrap();
        let app = &settings.application;
        assert_eq!(app.package_dir, PathBuf::from("src/ufo"));
        assert_eq!(app.modules, vec!["ufo"]);
        assert!(!app.windows_only);
        assert!(app.enabled);
        assert!(app.directories.contains(&"llm".to_string()));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<PitchSettings>("manifests: reqs.txt\n").is_err());
    }

    #[test]
    fn python_defaults_per_platform() {
        let settings = PitchSettings::default();
        assert_eq!(settings.python_for(Platform::Windows), "python");
        assert_eq!(settings.python_for(Platform::Linux), "python3");

        let custom = PitchSettings {
            python: Some("py -3.11".to_string()),
            ..Default::default()
        };
        assert_eq!(custom.python_for(Platform::Windows), "py -3.11");
    }
}

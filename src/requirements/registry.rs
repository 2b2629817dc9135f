//! Tool requirement definitions.
//!
//! Defines which external tools must exist, how to detect them, and how to
//! install them. The registry holds the built-in requirements for the
//! current platform plus any custom requirements from `pitch.yml`.

use serde::Deserialize;

use super::version::Version;
use crate::shell::Platform;

const WINGET_FLAGS: &str =
    "-e --source winget --silent --accept-package-agreements --accept-source-agreements";

const VSWHERE: &str = "\"%ProgramFiles(x86)%\\Microsoft Visual Studio\\Installer\\vswhere.exe\"";

/// An external tool that must be present before anything else runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolRequirement {
    /// Requirement name (e.g. "python", "git").
    pub name: String,

    /// Detection command line, run through the platform shell.
    pub detect: String,

    /// Oldest acceptable version.
    #[serde(default)]
    pub minimum_version: Option<Version>,

    /// Install command line (usually the OS package manager).
    #[serde(default)]
    pub install: Option<String>,

    /// What to tell the user when the tool is still missing.
    #[serde(default)]
    pub hint: Option<String>,
}

impl ToolRequirement {
    /// Create a requirement detected by `detect`.
    pub fn new(name: impl Into<String>, detect: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detect: detect.into(),
            minimum_version: None,
            install: None,
            hint: None,
        }
    }

    pub fn minimum(mut self, version: Version) -> Self {
        self.minimum_version = Some(version);
        self
    }

    pub fn install(mut self, command: impl Into<String>) -> Self {
        self.install = Some(command.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Hint to show, falling back to a generic message.
    pub fn remediation(&self) -> String {
        match (&self.hint, &self.install) {
            (Some(hint), _) => hint.clone(),
            (None, Some(install)) => format!("Install manually: {}", install),
            (None, None) => format!("Install {} and make sure it is on PATH", self.name),
        }
    }
}

/// Registry of tool requirements, in probe order.
#[derive(Debug, Clone, Default)]
pub struct RequirementRegistry {
    requirements: Vec<ToolRequirement>,
}

impl RequirementRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in requirements for `platform`, probing `python` as the base
    /// interpreter.
    pub fn builtin(platform: Platform, python: &str) -> Self {
        let python_detect = format!("{} --version", quote_program(python));
        let minimum_python = Version::new([3, 10]);

        let requirements = match platform {
            Platform::Windows => vec![
                ToolRequirement::new("python", python_detect)
                    .minimum(minimum_python)
                    .install(format!("winget install --id Python.Python.3.11 {}", WINGET_FLAGS))
                    .hint("Install Python 3.10 or newer from https://www.python.org/downloads/ and tick \"Add python.exe to PATH\""),
                ToolRequirement::new("git", "git --version")
                    .install(format!("winget install --id Git.Git {}", WINGET_FLAGS))
                    .hint("Install Git from https://git-scm.com/download/win"),
                ToolRequirement::new(
                    "msvc-build-tools",
                    format!(
                        "{} -latest -products * -requires Microsoft.VisualStudio.Component.VC.Tools.x86.x64 -property catalog_productDisplayVersion",
                        VSWHERE
                    ),
                )
                .install(format!(
                    "winget install --id Microsoft.VisualStudio.2022.BuildTools {} --override \"--quiet --wait --add Microsoft.VisualStudio.Workload.VCTools --includeRecommended\"",
                    WINGET_FLAGS
                ))
                .hint("Install the Visual Studio Build Tools with the \"Desktop development with C++\" workload"),
            ],
            Platform::MacOS => vec![
                ToolRequirement::new("python", python_detect)
                    .minimum(minimum_python)
                    .hint("Install Python 3.10 or newer: brew install python@3.11"),
                ToolRequirement::new("git", "git --version")
                    .hint("Install Git: xcode-select --install (or brew install git)"),
                ToolRequirement::new("cc", "cc --version")
                    .hint("Install the Xcode Command Line Tools: xcode-select --install"),
            ],
            Platform::Linux => vec![
                ToolRequirement::new("python", python_detect)
                    .minimum(minimum_python)
                    .hint("Install Python 3.10 or newer with venv support, e.g. sudo apt install python3 python3-venv"),
                ToolRequirement::new("git", "git --version")
                    .hint("Install Git with your package manager, e.g. sudo apt install git"),
                ToolRequirement::new("cc", "cc --version")
                    .hint("Install a C compiler, e.g. sudo apt install build-essential"),
            ],
        };

        Self { requirements }
    }

    /// Add custom requirements. A custom requirement with the name of an
    /// existing one replaces it in place.
    pub fn extend(&mut self, custom: impl IntoIterator<Item = ToolRequirement>) {
        for requirement in custom {
            match self
                .requirements
                .iter_mut()
                .find(|r| r.name == requirement.name)
            {
                Some(existing) => *existing = requirement,
                None => self.requirements.push(requirement),
            }
        }
    }

    /// Look up a requirement by name.
    pub fn get(&self, name: &str) -> Option<&ToolRequirement> {
        self.requirements.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.requirements.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn as_slice(&self) -> &[ToolRequirement] {
        &self.requirements
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

fn quote_program(program: &str) -> String {
    if program.contains(char::is_whitespace) && !program.starts_with('"') {
        format!("\"{}\"", program)
    } else {
        program.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_builtins_install_with_winget() {
        let registry = RequirementRegistry::builtin(Platform::Windows, "python");
        assert_eq!(registry.names(), vec!["python", "git", "msvc-build-tools"]);
        for requirement in registry.as_slice() {
            let install = requirement.install.as_deref().unwrap();
            assert!(install.starts_with("winget install"), "{}", install);
        }
        assert!(registry
            .get("msvc-build-tools")
            .unwrap()
            .detect
            .contains("vswhere.exe"));
    }

    #[test]
    fn python_requires_three_ten() {
        for platform in [Platform::Windows, Platform::Linux, Platform::MacOS] {
            let registry = RequirementRegistry::builtin(platform, "python3");
            let python = registry.get("python").unwrap();
            assert_eq!(python.minimum_version, Some(Version::new([3, 10])));
            assert_eq!(python.detect, "python3 --version");
        }
    }

    #[test]
    fn unix_builtins_only_hint() {
        let registry = RequirementRegistry::builtin(Platform::Linux, "python3");
        assert_eq!(registry.names(), vec!["python", "git", "cc"]);
        assert!(registry.as_slice().iter().all(|r| r.install.is_none()));
        assert!(registry.as_slice().iter().all(|r| r.hint.is_some()));
    }

    #[test]
    fn interpreter_path_with_spaces_is_quoted() {
        let registry =
            RequirementRegistry::builtin(
                Platform::Windows,
                "C:\\Program Files\\Python311\\python.exe",
            );
        assert_eq!(
            registry.get("python").unwrap().detect,
            "\"C:\\Program Files\\Python311\\python.exe\" --version"
        );
    }

    #[test]
    fn extend_appends_and_replaces() {
        let mut registry = RequirementRegistry::builtin(Platform::Linux, "python3");
        registry.extend([
            ToolRequirement::new("node", "node --version"),
            ToolRequirement::new("git", "git --version").minimum(Version::new([2, 40])),
        ]);

        assert_eq!(registry.names(), vec!["python", "git", "cc", "node"]);
        assert_eq!(
            registry.get("git").unwrap().minimum_version,
            Some(Version::new([2, 40]))
        );
    }

    #[test]
    fn remediation_falls_back_to_install_command() {
        let requirement =
            ToolRequirement::new("node", "node --version").install("winget install node");
        assert_eq!(requirement.remediation(), "Install manually: winget install node");

        let bare = ToolRequirement::new("node", "node --version");
        assert!(bare.remediation().contains("on PATH"));
    }

    #[test]
    fn deserializes_custom_requirement() {
        let yaml = r#"
name: node
detect: node --version
minimum_version: "18"
hint: Install Node.js 18+
"#;
        let requirement: ToolRequirement = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(requirement.name, "node");
        assert_eq!(requirement.minimum_version, Some(Version::new([18])));
        assert!(requirement.install.is_none());
    }
}

//! Package manifest parsing.
//!
//! One package per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! pyyaml==6.0.1        # critical
//! azure-identity       # critical
//! langchain[openai]==0.2.1
//! art
//! ```
//!
//! A trailing `# critical` marks a package whose import must succeed for the
//! run to pass. Other trailing comments are ignored. Version ranges, URLs,
//! and pip options are rejected.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{PitchError, Result};

static REQUIREMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?P<extras>\[[A-Za-z0-9._,\s-]+\])?\s*(?:==\s*(?P<version>[A-Za-z0-9][A-Za-z0-9.*+!_-]*))?$",
    )
    .unwrap()
});

/// One declared package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSpec {
    /// Install name as written.
    pub name: String,
    /// Extras, e.g. `[openai]`, kept verbatim without spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<String>,
    /// Pinned version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Must import for the run to pass.
    pub critical: bool,
}

impl PackageSpec {
    /// An unpinned, non-critical package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: None,
            version: None,
            critical: false,
        }
    }

    pub fn pinned(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Argument to hand to the installer, e.g. `langchain[openai]==0.2.1`.
    pub fn install_arg(&self) -> String {
        let mut arg = self.name.clone();
        if let Some(extras) = &self.extras {
            arg.push_str(extras);
        }
        if let Some(version) = &self.version {
            arg.push_str("==");
            arg.push_str(version);
        }
        arg
    }

    /// Canonical form of the name for comparisons (PEP 503 style).
    pub fn normalized_name(&self) -> String {
        normalize(&self.name)
    }
}

/// Lowercase and fold runs of `-`, `_`, `.` into `-`.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_sep {
                out.push('-');
            }
            last_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        }
    }
    out
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Vec<PackageSpec>> {
    let text = fs::read_to_string(path).map_err(|e| PitchError::ManifestParse {
        path: path.to_path_buf(),
        line: 0,
        message: format!("cannot read file: {}", e),
    })?;
    parse_manifest(&text, path)
}

/// Parse manifest text. `path` is only used in error messages.
pub fn parse_manifest(text: &str, path: &Path) -> Result<Vec<PackageSpec>> {
    let mut packages = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let error = |message: String| PitchError::ManifestParse {
            path: path.to_path_buf(),
            line: line_no,
            message,
        };

        let (requirement, comment) = match raw.split_once('#') {
            Some((req, comment)) => (req.trim(), Some(comment.trim())),
            None => (raw.trim(), None),
        };
        if requirement.is_empty() {
            continue;
        }

        let caps = REQUIREMENT_REGEX.captures(requirement).ok_or_else(|| {
            error(format!(
                "unsupported requirement '{}' (expected name or name==version)",
                requirement
            ))
        })?;

        let package = PackageSpec {
            name: caps["name"].to_string(),
            extras: caps
                .name("extras")
                .map(|m| m.as_str().split_whitespace().collect::<String>()),
            version: caps.name("version").map(|m| m.as_str().to_string()),
            critical: comment.is_some_and(|c| c.eq_ignore_ascii_case("critical")),
        };

        if let Some(first) = seen.insert(package.normalized_name(), line_no) {
            return Err(error(format!(
                "duplicate package '{}' (first declared on line {})",
                package.name, first
            )));
        }
        packages.push(package);
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<Vec<PackageSpec>> {
        parse_manifest(text, Path::new("requirements.txt"))
    }

    #[test]
    fn parses_names_pins_and_critical_markers() {
        let packages = parse(
            "# UFO dependencies\n\
             \n\
             pyyaml==6.0.1   # critical\n\
             azure-identity  # critical\n\
             art\n\
             colorama==0.4.6 # terminal colors\n",
        )
        .unwrap();

        assert_eq!(
            packages,
            vec![
                PackageSpec::new("pyyaml").pinned("6.0.1").critical(),
                PackageSpec::new("azure-identity").critical(),
                PackageSpec::new("art"),
                PackageSpec::new("colorama").pinned("0.4.6"),
            ]
        );
    }

    #[test]
    fn critical_marker_is_case_insensitive() {
        let packages = parse("numpy # CRITICAL").unwrap();
        assert!(packages[0].critical);
    }

    #[test]
    fn parses_extras() {
        let packages = parse("langchain[openai, community]==0.2.1").unwrap();
        assert_eq!(packages[0].name, "langchain");
        assert_eq!(packages[0].extras.as_deref(), Some("[openai,community]"));
        assert_eq!(packages[0].install_arg(), "langchain[openai,community]==0.2.1");
    }

    #[test]
    fn rejects_version_ranges_with_line_number() {
        let err = parse("art\nnumpy>=1.26\n").unwrap_err();
        match err {
            PitchError::ManifestParse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("numpy>=1.26"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_pip_options() {
        assert!(parse("-r other.txt").is_err());
        assert!(parse("--index-url https://example.invalid").is_err());
    }

    #[test]
    fn rejects_duplicates_after_normalization() {
        let err = parse("PyYAML\nart\npyyaml==6.0").unwrap_err();
        match err {
            PitchError::ManifestParse { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("line 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_manifest_is_empty() {
        assert!(parse("\n# nothing yet\n").unwrap().is_empty());
    }

    #[test]
    fn normalize_folds_separators() {
        assert_eq!(normalize("Sentence_Transformers"), "sentence-transformers");
        assert_eq!(normalize("zope.interface"), "zope-interface");
        assert_eq!(normalize("a--b"), "a-b");
    }

    #[test]
    fn load_reports_unreadable_file() {
        let temp = TempDir::new().unwrap();
        let missing: PathBuf = temp.path().join("requirements.txt");
        assert!(matches!(
            load_manifest(&missing),
            Err(PitchError::ManifestParse { line: 0, .. })
        ));
    }

    #[test]
    fn load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(&path, "openai==1.35.0 # critical\n").unwrap();
        let packages = load_manifest(&path).unwrap();
        assert_eq!(packages[0].install_arg(), "openai==1.35.0");
    }
}

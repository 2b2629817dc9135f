//! Install-name to import-name mapping.
//!
//! Many packages are imported under a different name than they are
//! installed with (`pyyaml` is imported as `yaml`). The built-in table covers
//! the packages the target application depends on; `pitch.yml` can add more.

use std::collections::BTreeMap;

use super::manifest::normalize;

const BUILTIN: &[(&str, &str)] = &[
    ("azure-identity", "azure.identity"),
    ("beautifulsoup4", "bs4"),
    ("faiss-cpu", "faiss"),
    ("faiss-gpu", "faiss"),
    ("gradio-client", "gradio_client"),
    ("langchain-community", "langchain_community"),
    ("langchain-huggingface", "langchain_huggingface"),
    ("opencv-python", "cv2"),
    ("opencv-python-headless", "cv2"),
    ("pillow", "PIL"),
    ("protobuf", "google.protobuf"),
    ("python-dateutil", "dateutil"),
    ("python-dotenv", "dotenv"),
    ("pywin32", "win32api"),
    ("pyyaml", "yaml"),
    ("scikit-learn", "sklearn"),
    ("sentence-transformers", "sentence_transformers"),
];

/// Packages that commonly need a native build and should be retried as
/// binary-only wheels.
pub const NATIVE_BUILD: &[&str] = &[
    "faiss-cpu",
    "lxml",
    "numpy",
    "opencv-python",
    "pywin32",
    "torch",
];

/// Lookup table from normalized install name to import module.
#[derive(Debug, Clone)]
pub struct ImportNames {
    table: BTreeMap<String, String>,
}

impl Default for ImportNames {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ImportNames {
    /// The built-in table.
    pub fn builtin() -> Self {
        let table = BUILTIN
            .iter()
            .map(|(package, module)| (normalize(package), module.to_string()))
            .collect();
        Self { table }
    }

    /// Add or override mappings. Invalid module names are skipped.
    pub fn extend<I, K, V>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (package, module) in extra {
            let module = module.into();
            if is_valid_module(&module) {
                self.table.insert(normalize(package.as_ref()), module);
            } else {
                tracing::warn!(
                    "Ignoring import mapping for {}: '{}' is not a module name",
                    package.as_ref(),
                    module
                );
            }
        }
    }

    /// Modules to try importing for `package`, in order: the mapped name,
    /// then the install name lowercased with `-` replaced by `_`.
    pub fn candidates(&self, package: &str) -> Vec<String> {
        let mut candidates = Vec::with_capacity(2);
        if let Some(mapped) = self.table.get(&normalize(package)) {
            candidates.push(mapped.clone());
        }
        let fallback = package.to_lowercase().replace(['-', '.'], "_");
        if is_valid_module(&fallback) && !candidates.contains(&fallback) {
            candidates.push(fallback);
        }
        candidates
    }
}

/// Dotted Python identifier, e.g. `azure.identity`.
pub fn is_valid_module(module: &str) -> bool {
    !module.is_empty()
        && module.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Whether `package` is on a binary-only retry list.
pub fn needs_binary_retry(package: &str, extra: &[String]) -> bool {
    let name = normalize(package);
    NATIVE_BUILD.iter().any(|p| normalize(p) == name) || extra.iter().any(|p| normalize(p) == name)
}

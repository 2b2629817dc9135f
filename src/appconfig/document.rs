//! Read-only view of the application config document.

use serde_yaml::{Mapping, Value};

/// Key under which newer config layouts nest the agent sections.
pub const AGENT_SETTINGS: &str = "AGENT_SETTINGS";

/// A parsed application config.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Value,
}

/// One agent section (`HOST_AGENT`, `APP_AGENT`, ...).
#[derive(Debug, Clone, Copy)]
pub struct AgentSection<'a> {
    pub name: &'a str,
    /// Dotted path prefix, e.g. `AGENT_SETTINGS.HOST_AGENT`.
    pub nested: bool,
    pub fields: &'a Mapping,
}

impl ConfigDocument {
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        let root = serde_yaml::from_str(text)?;
        Ok(Self { root })
    }

    /// Look up a section at the top level first, then under `AGENT_SETTINGS`.
    pub fn section(&self, name: &str) -> Option<AgentSection<'_>> {
        let top = self.root.as_mapping()?;
        if let Some(fields) = top.get(name).and_then(Value::as_mapping) {
            return Some(AgentSection {
                name: key_str(top, name),
                nested: false,
                fields,
            });
        }
        let nested = top.get(AGENT_SETTINGS).and_then(Value::as_mapping)?;
        nested
            .get(name)
            .and_then(Value::as_mapping)
            .map(|fields| AgentSection {
                name: key_str(nested, name),
                nested: true,
                fields,
            })
    }

    /// Every agent section in the document: mapping-valued keys ending in
    /// `_AGENT` or listed in `known`, top level before nested.
    pub fn agent_sections(&self, known: &[String]) -> Vec<AgentSection<'_>> {
        let Some(top) = self.root.as_mapping() else {
            return Vec::new();
        };
        let nested = top.get(AGENT_SETTINGS).and_then(Value::as_mapping);

        let mut sections: Vec<AgentSection<'_>> = Vec::new();
        for (mapping, is_nested) in [(Some(top), false), (nested, true)] {
            let Some(mapping) = mapping else { continue };
            for (key, value) in mapping {
                let (Some(name), Some(fields)) = (key.as_str(), value.as_mapping()) else {
                    continue;
                };
                let is_agent = name.ends_with("_AGENT") || known.iter().any(|k| k == name);
                if is_agent && !sections.iter().any(|s| s.name == name) {
                    sections.push(AgentSection {
                        name,
                        nested: is_nested,
                        fields,
                    });
                }
            }
        }
        sections
    }
}

// Borrow the key from the mapping itself so the section outlives `name`.
fn key_str<'a>(mapping: &'a Mapping, name: &str) -> &'a str {
    mapping
        .iter()
        .find_map(|(k, _)| k.as_str().filter(|k| *k == name))
        .unwrap_or_default()
}

impl<'a> AgentSection<'a> {
    /// Dotted location of a field in this section.
    pub fn location(&self, field: &str) -> String {
        if self.nested {
            format!("{}.{}.{}", AGENT_SETTINGS, self.name, field)
        } else {
            format!("{}.{}", self.name, field)
        }
    }

    /// A string field, if present and a string.
    pub fn str_field(&self, field: &str) -> Option<&'a str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Present and not null or blank.
    pub fn has_value(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// `API_TYPE`, lowercased.
    pub fn api_type(&self) -> Option<String> {
        self.str_field("API_TYPE").map(|t| t.trim().to_ascii_lowercase())
    }

    /// Azure-hosted deployments are addressed by deployment id.
    pub fn is_azure(&self) -> bool {
        matches!(self.api_type().as_deref(), Some("azure" | "aoai" | "azure_ad"))
    }

    /// All string values in the section, with their dotted locations.
    pub fn strings(&self) -> Vec<(String, &'a str)> {
        let mut out = Vec::new();
        for (key, value) in self.fields {
            if let Some(key) = key.as_str() {
                collect_strings(&self.location(key), value, &mut out);
            }
        }
        out
    }
}

fn collect_strings<'a>(location: &str, value: &'a Value, out: &mut Vec<(String, &'a str)>) {
    match value {
        Value::String(s) => out.push((location.to_string(), s.as_str())),
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                if let Some(key) = key.as_str() {
                    collect_strings(&format!("{}.{}", location, key), value, out);
                }
            }
        }
        Value::Sequence(items) => {
            for (i, value) in items.iter().enumerate() {
                collect_strings(&format!("{}[{}]", location, i), value, out);
            }
        }
        _ => {}
    }
}

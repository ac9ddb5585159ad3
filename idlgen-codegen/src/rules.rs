//! Rule documents.
//!
//! A rules file comes in one of two dialects, told apart by shape before any
//! traversal starts:
//!
//! - **Legacy**: a top-level `generate_rules` key holding flat
//!   `module_rules`, `interface_rules` and `struct_rules` lists. The key wins
//!   even when modern keys are present too.
//! - **Modern**: named documents, each with optional `when`, `context`,
//!   `path`, `source`, `extra_filters` and one rule per traversal level
//!   (`system`, `module`, `interface`, `struct`, `enum`). A top-level mapping
//!   that uses those keys directly is read as a single unnamed document.
//!
//! ```yaml
//! backend:
//!   when: [simulator]
//!   module:
//!     documents:
//!       "{{module.module_name|lower}}.h": module.h.tpl
//!   interface:
//!     path: "{{interface|lower}}"
//!     documents:
//!       - "{{interface|lower}}.cpp": interface.cpp.tpl
//!     preserve:
//!       - "{{interface|lower}}_impl.cpp": impl.cpp.tpl
//! ```

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::GenerateError;

/// Keys that make a top-level mapping a single unnamed document.
const DOCUMENT_KEYS: [&str; 10] = [
    "system",
    "module",
    "interface",
    "struct",
    "enum",
    "context",
    "path",
    "source",
    "extra_filters",
    "when",
];

/// Marker key of the legacy dialect.
pub const LEGACY_KEY: &str = "generate_rules";

/// A parsed rules file.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSet {
    Legacy(LegacyRules),
    Modern(Vec<RuleDocument>),
}

impl RuleSet {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenerateError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::InvalidRules {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parse and classify a rules document.
    pub fn parse(content: &str, path: &Path) -> Result<Self, GenerateError> {
        let invalid = |message: String| GenerateError::InvalidRules {
            path: path.to_path_buf(),
            message,
        };

        let value: Value = serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let root = match value {
            Value::Null => return Ok(RuleSet::Modern(Vec::new())),
            Value::Object(root) => root,
            other => return Err(invalid(format!("expected a mapping, found {}", kind(&other)))),
        };

        if let Some(legacy) = root.get(LEGACY_KEY) {
            return LegacyRules::from_value(legacy)
                .map(RuleSet::Legacy)
                .map_err(invalid);
        }

        if root.keys().any(|key| DOCUMENT_KEYS.contains(&key.as_str())) {
            let document = RuleDocument::from_map(None, &root).map_err(invalid)?;
            return Ok(RuleSet::Modern(vec![document]));
        }

        root.iter()
            .map(|(name, value)| match value {
                Value::Object(map) => RuleDocument::from_map(Some(name.clone()), map),
                Value::Null => RuleDocument::from_map(Some(name.clone()), &Map::new()),
                other => Err(format!("document '{}' must be a mapping, found {}", name, kind(other))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RuleSet::Modern)
            .map_err(invalid)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, RuleSet::Legacy(_))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// A `when` condition: a feature name or a list of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition(Vec<String>);

impl Condition {
    fn from_value(value: Option<&Value>) -> Result<Self, String> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(feature)) => Ok(Self(vec![feature.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(format!("'when' entries must be strings, found {}", kind(other))),
                })
                .collect::<Result<_, _>>()
                .map(Self),
            Some(other) => Err(format!("'when' must be a string or a list, found {}", kind(other))),
        }
    }

    /// No condition, or at least one of its features is enabled.
    pub fn holds(&self, features: &BTreeSet<String>) -> bool {
        self.0.is_empty() || self.0.iter().any(|feature| features.contains(feature))
    }

    pub fn features(&self) -> &[String] {
        &self.0
    }
}

/// Destination name pattern to template name, in declaration order.
pub type Documents = Vec<(String, String)>;

fn documents(value: Option<&Value>, key: &str) -> Result<Documents, String> {
    let entry = |name: &String, template: &Value| match template {
        Value::String(template) => Ok((name.clone(), template.clone())),
        other => Err(format!("template of '{}' in '{}' must be a string, found {}", name, key, kind(other))),
    };
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => map.iter().map(|(n, t)| entry(n, t)).collect(),
        Some(Value::Array(items)) => {
            let mut out = Vec::new();
            for item in items {
                let Value::Object(map) = item else {
                    return Err(format!("entries of '{}' must be mappings, found {}", key, kind(item)));
                };
                for (name, template) in map {
                    out.push(entry(name, template)?);
                }
            }
            Ok(out)
        }
        Some(other) => Err(format!("'{}' must be a mapping or a list, found {}", key, kind(other))),
    }
}

fn string(map: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("'{}' must be a string, found {}", key, kind(other))),
    }
}

fn context(map: &Map<String, Value>) -> Result<Map<String, Value>, String> {
    match map.get("context") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(context)) => Ok(context.clone()),
        Some(other) => Err(format!("'context' must be a mapping, found {}", kind(other))),
    }
}

/// The rule of one traversal level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    pub when: Condition,
    pub context: Map<String, Value>,
    /// Destination sub-directory pattern, kept for later rules once set.
    pub path: Option<String>,
    /// Template name prefix, kept for later rules once set.
    pub source: Option<String>,
    pub documents: Documents,
    /// Documents only created when missing.
    pub preserve: Documents,
}

impl Rule {
    fn from_value(level: &str, value: &Value) -> Result<Self, String> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => return Err(format!("rule '{}' must be a mapping, found {}", level, kind(other))),
        };
        Ok(Self {
            when: Condition::from_value(map.get("when"))?,
            context: context(map)?,
            path: string(map, "path")?,
            source: string(map, "source")?,
            documents: documents(map.get("documents"), "documents")?,
            preserve: documents(map.get("preserve"), "preserve")?,
        })
    }
}

/// One document of the modern dialect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDocument {
    /// The document key, `None` for an unnamed top-level document.
    pub name: Option<String>,
    pub when: Condition,
    pub context: Map<String, Value>,
    pub path: Option<String>,
    pub source: Option<String>,
    pub extra_filters: Vec<String>,
    pub system: Option<Rule>,
    pub module: Option<Rule>,
    pub interface: Option<Rule>,
    pub structure: Option<Rule>,
    pub enumeration: Option<Rule>,
}

impl RuleDocument {
    fn from_map(name: Option<String>, map: &Map<String, Value>) -> Result<Self, String> {
        let rule = |level: &str| map.get(level).map(|v| Rule::from_value(level, v)).transpose();
        let extra_filters = match map.get("extra_filters") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(name)) => vec![name.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name.clone()),
                    other => Err(format!(
                        "'extra_filters' entries must be strings, found {}",
                        kind(other)
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(format!("'extra_filters' must be a list, found {}", kind(other)));
            }
        };

        Ok(Self {
            name,
            when: Condition::from_value(map.get("when"))?,
            context: context(map)?,
            path: string(map, "path")?,
            source: string(map, "source")?,
            extra_filters,
            system: rule("system")?,
            module: rule("module")?,
            interface: rule("interface")?,
            structure: rule("struct")?,
            enumeration: rule("enum")?,
        })
    }
}

/// One legacy rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyRule {
    pub dest_file: String,
    pub template_file: String,
    #[serde(default)]
    pub preserve: bool,
}

/// The `generate_rules` section of the legacy dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyRules {
    pub module_rules: Vec<LegacyRule>,
    pub interface_rules: Vec<LegacyRule>,
    /// Only applied when given as a list.
    pub struct_rules: Option<Vec<LegacyRule>>,
}

impl LegacyRules {
    fn from_value(value: &Value) -> Result<Self, String> {
        let list = |key: &str| -> Result<Option<Vec<LegacyRule>>, String> {
            match value.get(key) {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| {
                        serde_json::from_value(item.clone())
                            .map_err(|e| format!("invalid entry in '{}': {}", key, e))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some),
                _ => Ok(None),
            }
        };
        Ok(Self {
            module_rules: list("module_rules")?.unwrap_or_default(),
            interface_rules: list("interface_rules")?.unwrap_or_default(),
            struct_rules: list("struct_rules")?,
        })
    }
}

/// The rules file of a template directory: `<dir>/../<name>.yaml`.
pub fn rules_path(template: &Path) -> PathBuf {
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = template.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}.yaml", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> RuleSet {
        RuleSet::parse(content, Path::new("rules.yaml")).unwrap()
    }

    #[test]
    fn test_legacy_key_wins() {
        let rules = parse(
            r#"
generate_rules:
  module_rules:
    - { dest_file: "{{module}}.h", template_file: module.tpl }
  interface_rules: ~
module:
  documents: { "x": "y.tpl" }
"#,
        );
        let RuleSet::Legacy(legacy) = rules else {
            panic!("expected legacy rules");
        };
        assert_eq!(legacy.module_rules.len(), 1);
        assert!(!legacy.module_rules[0].preserve);
        assert!(legacy.interface_rules.is_empty());
        assert_eq!(legacy.struct_rules, None);
    }

    #[test]
    fn test_single_unnamed_document() {
        let rules = parse(r#"{"module": {"documents": [{"{{module.name}}": "t.tpl"}]}}"#);
        let RuleSet::Modern(documents) = rules else {
            panic!("expected modern rules");
        };
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].name, None);
        let module = documents[0].module.as_ref().unwrap();
        assert_eq!(
            module.documents,
            vec![("{{module.name}}".to_string(), "t.tpl".to_string())]
        );
        assert!(documents[0].interface.is_none());
    }

    #[test]
    fn test_named_documents_keep_order() {
        let rules = parse(
            r#"
backend:
  when: simulator
  extra_filters: [backend]
  interface:
    preserve: { "{{interface}}.cpp": impl.tpl }
frontend:
  source: qt
  struct:
    documents: { "{{struct}}.h": struct.tpl }
"#,
        );
        let RuleSet::Modern(documents) = rules else {
            panic!("expected modern rules");
        };
        let names: Vec<_> = documents.iter().map(|d| d.name.as_deref()).collect();
        assert_eq!(names, vec![Some("backend"), Some("frontend")]);
        assert_eq!(documents[0].when.features(), ["simulator"]);
        assert_eq!(documents[0].extra_filters, vec!["backend"]);
        assert_eq!(documents[0].interface.as_ref().unwrap().preserve.len(), 1);
        assert_eq!(documents[1].source.as_deref(), Some("qt"));
        assert!(documents[1].structure.is_some());
    }

    #[test]
    fn test_condition_holds() {
        let features: BTreeSet<String> = ["dbus".to_string()].into();
        assert!(Condition::default().holds(&features));
        assert!(Condition(vec!["dbus".into(), "zoned".into()]).holds(&features));
        assert!(!Condition(vec!["zoned".into()]).holds(&features));
    }

    #[test]
    fn test_invalid_documents_shape() {
        let err = RuleSet::parse("x:\n  module:\n    documents: 3\n", Path::new("r.yaml")).unwrap_err();
        assert!(err.to_string().contains("'documents' must be a mapping or a list"));
    }

    #[test]
    fn test_extra_filters_must_be_names() {
        let err = RuleSet::parse("x:\n  extra_filters: [qt, 3]\n", Path::new("r.yaml")).unwrap_err();
        assert!(
            err.to_string().contains("'extra_filters' entries must be strings"),
            "{}",
            err
        );
    }

    #[test]
    fn test_rules_path() {
        assert_eq!(
            rules_path(Path::new("/tpl/backend_qtro")),
            PathBuf::from("/tpl/backend_qtro.yaml")
        );
    }
}

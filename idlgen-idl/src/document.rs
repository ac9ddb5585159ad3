//! Raw, unresolved shape of a model document.
//!
//! ```yaml
//! module: org.example
//! version: "1.0"
//! imports: [org.common]
//! interfaces:
//!   - name: Echo
//!     properties:
//!       - { name: text, type: string }
//!     operations:
//!       - name: echo
//!         type: string
//!         parameters: [{ name: msg, type: string }]
//! structs:
//!   - name: Point
//!     fields: [{ name: x, type: int }, { name: y, type: int }]
//! enums:
//!   - name: Color
//!     members: [Red, { name: Green, value: 2 }]
//! ```
//!
//! JSON documents use the same keys.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawModule {
    pub module: String,
    #[serde(default)]
    pub version: Option<serde_yaml::Value>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub interfaces: Vec<RawInterface>,
    #[serde(default)]
    pub structs: Vec<RawStruct>,
    #[serde(default)]
    pub enums: Vec<RawEnum>,
}

/// Only the module name, used by the import-free pass.
#[derive(Debug, Deserialize)]
pub(crate) struct RawHeader {
    pub module: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawInterface {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default)]
    pub operations: Vec<RawOperation>,
    #[serde(default)]
    pub signals: Vec<RawSignal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawOperation {
    pub name: String,
    #[serde(rename = "type", default = "void")]
    pub ty: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSignal {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawStruct {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawEnum {
    pub name: String,
    #[serde(default)]
    pub flag: bool,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Option<Value>,
    pub members: Vec<RawMember>,
}

/// An enum member, either a bare name or a full mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawMember {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        value: Option<i64>,
        #[serde(default)]
        comment: String,
        #[serde(default)]
        tags: Option<Value>,
    },
}

fn void() -> String {
    "void".to_string()
}

/// Interpret a `version` entry, which YAML may read as a number.
pub(crate) fn version_text(value: Option<&serde_yaml::Value>) -> Option<String> {
    match value? {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

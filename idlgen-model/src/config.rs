//! Typed generation configuration records.
//!
//! These records are filled by the tagging pass from the `config` and
//! `config_simulator` tag namespaces, so filters read named fields instead of
//! looking up free-form keys.

use serde::Serialize;
use serde_json::{Map, Value};

/// How a module maps onto a target-language namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum NamespaceMode {
    /// No namespace at all.
    #[default]
    None,
    /// The namespace is supplied implicitly by the generated environment (`qt`).
    Implicit,
    /// Derived from the dotted module name (`module`).
    FromModule,
    /// An explicit namespace literal.
    Explicit(String),
}

impl NamespaceMode {
    /// Interpret the `config.namespace` tag value.
    pub fn from_tag(value: Option<&str>) -> Self {
        match value {
            None | Some("") => NamespaceMode::None,
            Some("qt") => NamespaceMode::Implicit,
            Some("module") => NamespaceMode::FromModule,
            Some(explicit) => NamespaceMode::Explicit(explicit.to_string()),
        }
    }
}

/// Module level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleConfig {
    /// Target module identifier passed by the caller.
    pub module: Option<String>,
    /// Force overwriting of all outputs.
    pub force: bool,
    pub namespace: NamespaceMode,
}

/// Interface level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceConfig {
    /// QML facing type name (`qml_type`, falling back to `qml_name`).
    pub qml_type: Option<String>,
    /// Raw `config_simulator` mapping of the interface (zones and friends).
    pub simulator: Option<Map<String, Value>>,
}

impl InterfaceConfig {
    /// Simulation zones declared on the interface, if any.
    pub fn zones(&self) -> Vec<String> {
        let Some(zones) = self.simulator.as_ref().and_then(|s| s.get("zones")) else {
            return Vec::new();
        };
        match zones {
            Value::Array(items) => items
                .iter()
                .filter_map(|z| z.as_str().map(str::to_string))
                .collect(),
            Value::Object(map) => map.keys().cloned().collect(),
            Value::String(s) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// Simulator metadata of a single property.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertySimulation {
    pub range: Option<Value>,
    pub domain: Option<Value>,
    pub minimum: Option<Value>,
    pub maximum: Option<Value>,
    pub default: Option<Value>,
    pub unsupported: Option<Value>,
}

impl PropertySimulation {
    /// Keys in output order.
    pub const KEYS: [&'static str; 6] = [
        "range",
        "domain",
        "minimum",
        "maximum",
        "default",
        "unsupported",
    ];

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            range: map.get("range").cloned(),
            domain: map.get("domain").cloned(),
            minimum: map.get("minimum").cloned(),
            maximum: map.get("maximum").cloned(),
            default: map.get("default").cloned(),
            unsupported: map.get("unsupported").cloned(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match key {
            "range" => self.range.as_ref(),
            "domain" => self.domain.as_ref(),
            "minimum" => self.minimum.as_ref(),
            "maximum" => self.maximum.as_ref(),
            "default" => self.default.as_ref(),
            "unsupported" => self.unsupported.as_ref(),
            _ => None,
        }
    }

    /// Present entries in output order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        Self::KEYS
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
    }
}

/// Property level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyConfig {
    pub getter_name: Option<String>,
    pub setter_name: Option<String>,
    /// `None` when the property carries no `config_simulator` tag.
    pub simulator: Option<PropertySimulation>,
}

/// Struct level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructConfig {
    pub qml_type: Option<String>,
}

/// Enum level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumConfig {
    /// Spelling of the flag type (`config.type`), plural of the enum name otherwise.
    pub flag_type: Option<String>,
    pub qml_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_namespace_mode_from_tag() {
        assert_eq!(NamespaceMode::from_tag(None), NamespaceMode::None);
        assert_eq!(NamespaceMode::from_tag(Some("")), NamespaceMode::None);
        assert_eq!(NamespaceMode::from_tag(Some("qt")), NamespaceMode::Implicit);
        assert_eq!(
            NamespaceMode::from_tag(Some("module")),
            NamespaceMode::FromModule
        );
        assert_eq!(
            NamespaceMode::from_tag(Some("acme::cars")),
            NamespaceMode::Explicit("acme::cars".into())
        );
    }

    #[test]
    fn test_interface_zones() {
        let config = InterfaceConfig {
            qml_type: None,
            simulator: json!({ "zones": ["FrontLeft", "FrontRight"] })
                .as_object()
                .cloned(),
        };
        assert_eq!(config.zones(), vec!["FrontLeft", "FrontRight"]);
        assert!(InterfaceConfig::default().zones().is_empty());
    }

    #[test]
    fn test_property_simulation_entries_in_order() {
        let map = json!({ "default": 5, "range": [0, 10], "ignored": true });
        let sim = PropertySimulation::from_map(map.as_object().unwrap());
        let keys: Vec<_> = sim.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["range", "default"]);
    }
}

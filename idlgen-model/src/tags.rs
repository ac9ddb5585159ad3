//! Raw annotation storage.

use serde::Serialize;
use serde_json::{Map, Value};

/// Namespaced annotations attached to a model node.
///
/// Stored as `namespace -> key -> value`. Namespaces usually hold a mapping;
/// a namespace declared without values holds an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tags(Map<String, Value>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tags from a JSON object, non-object values are ignored.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.0.contains_key(namespace)
    }

    /// Get the mapping stored under a namespace.
    pub fn namespace(&self, namespace: &str) -> Option<&Map<String, Value>> {
        self.0.get(namespace).and_then(Value::as_object)
    }

    /// Get a single value, e.g. `get("config", "getter_name")`.
    pub fn get(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.namespace(namespace).and_then(|ns| ns.get(key))
    }

    /// Get a string value, empty strings included.
    pub fn get_str(&self, namespace: &str, key: &str) -> Option<&str> {
        self.get(namespace, key).and_then(Value::as_str)
    }

    /// Follow a dotted path through nested mappings, e.g. `config.qml_name`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Make sure a namespace exists, without touching existing values.
    pub fn ensure_namespace(&mut self, namespace: &str) -> &mut Map<String, Value> {
        let entry = self
            .0
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("namespace was normalized to an object"),
        }
    }

    /// Set a single value, creating the namespace if needed.
    pub fn set(&mut self, namespace: &str, key: impl Into<String>, value: impl Into<Value>) {
        self.ensure_namespace(namespace)
            .insert(key.into(), value.into());
    }

    /// Recursively merge `other` into these tags, values from `other` win.
    pub fn merge(&mut self, other: &Map<String, Value>) {
        merge_maps(&mut self.0, other);
    }
}

fn merge_maps(target: &mut Map<String, Value>, other: &Map<String, Value>) {
    for (key, value) in other {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_maps(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

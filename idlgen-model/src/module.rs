use std::path::PathBuf;

use idlgen_core::{Version, capitalize};
use serde::Serialize;

use crate::{Enum, Interface, ModuleConfig, Struct, Tags};

/// A named, versioned namespace of interfaces, structs and enums.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    /// Dotted module name, e.g. `org.example`.
    pub name: String,
    pub version: Version,
    /// Names of imported modules, in declaration order.
    pub imports: Vec<String>,
    pub comment: String,
    pub interfaces: Vec<Interface>,
    pub structs: Vec<Struct>,
    pub enums: Vec<Enum>,
    pub tags: Tags,
    pub config: ModuleConfig,
    /// The document this module was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Module {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            imports: Vec::new(),
            comment: String::new(),
            interfaces: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            tags: Tags::new(),
            config: ModuleConfig::default(),
            source: None,
        }
    }

    pub fn with_import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_struct(mut self, structure: Struct) -> Self {
        self.structs.push(structure);
        self
    }

    pub fn with_enum(mut self, enumeration: Enum) -> Self {
        self.enums.push(enumeration);
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// The last part of the module name, capitalized (`org.example.climate` -> `Climate`).
    pub fn module_name(&self) -> String {
        capitalize(self.name.rsplit('.').next().unwrap_or(&self.name))
    }

    /// The dotted name split into its parts.
    pub fn name_parts(&self) -> Vec<&str> {
        self.name.split('.').collect()
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn structure(&self, name: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Whether this module declares a type (interface, struct or enum) with this name.
    pub fn declares(&self, name: &str) -> bool {
        self.interface(name).is_some()
            || self.structure(name).is_some()
            || self.enumeration(name).is_some()
    }

    /// Whether the module declares nothing but its name.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.structs.is_empty() && self.enums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name() {
        let module = Module::new("org.example.climate", Version::new(1, 0));
        assert_eq!(module.module_name(), "Climate");
        assert_eq!(module.name_parts(), vec!["org", "example", "climate"]);

        let flat = Module::new("demo", Version::new(1, 0));
        assert_eq!(flat.module_name(), "Demo");
    }

    #[test]
    fn test_declares() {
        let module = Module::new("org.example", Version::new(1, 0))
            .with_interface(Interface::new("Echo"))
            .with_enum(Enum::new("Color", ["Red"]));
        assert!(module.declares("Echo"));
        assert!(module.declares("Color"));
        assert!(!module.declares("Point"));
        assert!(!module.is_empty());
    }
}

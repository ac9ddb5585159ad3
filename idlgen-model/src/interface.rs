//! Interfaces and their members.

use serde::Serialize;

use crate::{InterfaceConfig, PropertyConfig, Tags, Type};

/// A service-like contract made of properties, operations and signals.
#[derive(Debug, Clone, Serialize)]
pub struct Interface {
    pub name: String,
    pub comment: String,
    pub properties: Vec<Property>,
    pub operations: Vec<Operation>,
    pub signals: Vec<Signal>,
    pub tags: Tags,
    pub config: InterfaceConfig,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            properties: Vec::new(),
            operations: Vec::new(),
            signals: Vec::new(),
            tags: Tags::new(),
            config: InterfaceConfig::default(),
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|o| o.name == name)
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// A typed, named property of an interface.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub readonly: bool,
    pub is_const: bool,
    pub comment: String,
    pub tags: Tags,
    pub config: PropertyConfig,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            readonly: false,
            is_const: false,
            comment: String::new(),
            tags: Tags::new(),
            config: PropertyConfig::default(),
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

/// A callable operation, the type is its return type.
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub parameters: Vec<Parameter>,
    pub is_const: bool,
    pub comment: String,
    pub tags: Tags,
}

impl Operation {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            parameters: Vec::new(),
            is_const: false,
            comment: String::new(),
            tags: Tags::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A notification emitted by an interface.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub comment: String,
    pub tags: Tags,
}

impl Signal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            comment: String::new(),
            tags: Tags::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A typed parameter of an operation or signal.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub tags: Tags,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: Tags::new(),
        }
    }
}

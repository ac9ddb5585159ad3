//! A uniform borrowed view over typed symbols.

use crate::{
    Field, Interface, Module, Operation, Parameter, Property, PropertyConfig, Struct, Tags, Type,
};

/// What kind of node a [`Symbol`] views.
#[derive(Debug, Clone, Copy)]
pub enum SymbolKind<'a> {
    Property(&'a PropertyConfig),
    Parameter,
    Field,
    /// An operation, viewed through its return type.
    Operation,
    /// The element type of a list or model, named after its owner.
    Nested,
}

/// A named, typed symbol: property, parameter, field, operation or nested type.
///
/// Filters accept this single shape so the type dispatch lives in one place.
#[derive(Debug, Clone, Copy)]
pub struct Symbol<'a> {
    pub name: &'a str,
    /// Name of the declaring interface or struct, if any.
    pub owner: Option<&'a str>,
    pub module: &'a Module,
    pub ty: &'a Type,
    pub tags: &'a Tags,
    pub kind: SymbolKind<'a>,
}

impl<'a> Symbol<'a> {
    pub fn property(module: &'a Module, interface: &'a Interface, property: &'a Property) -> Self {
        Self {
            name: &property.name,
            owner: Some(&interface.name),
            module,
            ty: &property.ty,
            tags: &property.tags,
            kind: SymbolKind::Property(&property.config),
        }
    }

    pub fn operation(
        module: &'a Module,
        interface: &'a Interface,
        operation: &'a Operation,
    ) -> Self {
        Self {
            name: &operation.name,
            owner: Some(&interface.name),
            module,
            ty: &operation.ty,
            tags: &operation.tags,
            kind: SymbolKind::Operation,
        }
    }

    pub fn parameter(module: &'a Module, owner: &'a str, parameter: &'a Parameter) -> Self {
        Self {
            name: &parameter.name,
            owner: Some(owner),
            module,
            ty: &parameter.ty,
            tags: &parameter.tags,
            kind: SymbolKind::Parameter,
        }
    }

    pub fn field(module: &'a Module, structure: &'a Struct, field: &'a Field) -> Self {
        Self {
            name: &field.name,
            owner: Some(&structure.name),
            module,
            ty: &field.ty,
            tags: &field.tags,
            kind: SymbolKind::Field,
        }
    }

    /// View the element type of this symbol's list or model type.
    pub fn nested(&self) -> Option<Symbol<'a>> {
        self.ty.nested().map(|ty| self.with_type(ty))
    }

    /// The same symbol seen through another type.
    pub fn with_type(&self, ty: &'a Type) -> Symbol<'a> {
        Symbol {
            ty,
            kind: SymbolKind::Nested,
            ..*self
        }
    }

    /// Fully qualified name, e.g. `org.example.Echo#text`.
    pub fn qualified_name(&self) -> String {
        match self.owner {
            Some(owner) => format!("{}.{}#{}", self.module.name, owner, self.name),
            None => format!("{}.{}", self.module.name, self.name),
        }
    }

    /// The property configuration, when viewing a property.
    pub fn property_config(&self) -> Option<&'a PropertyConfig> {
        match self.kind {
            SymbolKind::Property(config) => Some(config),
            _ => None,
        }
    }
}

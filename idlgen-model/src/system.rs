//! The root container and symbol lookup.

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    Enum, EnumMember, Field, Interface, Module, Operation, Parameter, Property, Signal, Struct,
    SymbolRef, Tags,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("module '{0}' is declared more than once")]
    DuplicateModule(String),
}

/// A borrowed node found by qualified-name lookup.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Module(&'a Module),
    Interface(&'a Module, &'a Interface),
    Struct(&'a Module, &'a Struct),
    Enum(&'a Module, &'a Enum),
    Property(&'a Module, &'a Interface, &'a Property),
    Operation(&'a Module, &'a Interface, &'a Operation),
    Signal(&'a Module, &'a Interface, &'a Signal),
    /// Parameters are never found by name, only reached by traversal.
    Parameter(&'a Module, &'a Interface, &'a Parameter),
    Field(&'a Module, &'a Struct, &'a Field),
    Member(&'a Module, &'a Enum, &'a EnumMember),
}

impl<'a> NodeRef<'a> {
    /// Node kind as used in diagnostics and deprecation tables.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeRef::Module(_) => "Module",
            NodeRef::Interface(..) => "Interface",
            NodeRef::Struct(..) => "Struct",
            NodeRef::Enum(..) => "Enum",
            NodeRef::Property(..) => "Property",
            NodeRef::Operation(..) => "Operation",
            NodeRef::Signal(..) => "Signal",
            NodeRef::Parameter(..) => "Parameter",
            NodeRef::Field(..) => "Field",
            NodeRef::Member(..) => "EnumMember",
        }
    }

    /// The node's own name, the dotted name for modules.
    pub fn name(&self) -> &'a str {
        match self {
            NodeRef::Module(m) => &m.name,
            NodeRef::Interface(_, i) => &i.name,
            NodeRef::Struct(_, s) => &s.name,
            NodeRef::Enum(_, e) => &e.name,
            NodeRef::Property(_, _, p) => &p.name,
            NodeRef::Operation(_, _, o) => &o.name,
            NodeRef::Signal(_, _, s) => &s.name,
            NodeRef::Parameter(_, _, p) => &p.name,
            NodeRef::Field(_, _, f) => &f.name,
            NodeRef::Member(_, _, m) => &m.name,
        }
    }

    pub fn tags(&self) -> &'a Tags {
        match self {
            NodeRef::Module(m) => &m.tags,
            NodeRef::Interface(_, i) => &i.tags,
            NodeRef::Struct(_, s) => &s.tags,
            NodeRef::Enum(_, e) => &e.tags,
            NodeRef::Property(_, _, p) => &p.tags,
            NodeRef::Operation(_, _, o) => &o.tags,
            NodeRef::Signal(_, _, s) => &s.tags,
            NodeRef::Parameter(_, _, p) => &p.tags,
            NodeRef::Field(_, _, f) => &f.tags,
            NodeRef::Member(_, _, m) => &m.tags,
        }
    }
}

/// The root of the model: an ordered set of uniquely named modules.
#[derive(Debug, Clone, Default)]
pub struct System {
    modules: IndexMap<String, Module>,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, keeping declaration order.
    pub fn add_module(&mut self, module: Module) -> Result<(), ModelError> {
        if self.modules.contains_key(&module.name) {
            return Err(ModelError::DuplicateModule(module.name));
        }
        self.modules.insert(module.name.clone(), module);
        Ok(())
    }

    /// Builder form of [`System::add_module`], for tests and fixtures.
    pub fn with_module(mut self, module: Module) -> Result<Self, ModelError> {
        self.add_module(module)?;
        Ok(self)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
        self.modules.values_mut()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Module by declaration index.
    pub fn module_at(&self, index: usize) -> Option<&Module> {
        self.modules.get_index(index).map(|(_, m)| m)
    }

    pub fn module_index(&self, name: &str) -> Option<usize> {
        self.modules.get_index_of(name)
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Whether every import of `module` names a module of this system.
    pub fn imports_resolvable(&self, module: &Module) -> bool {
        self.unresolved_imports(module).is_empty()
    }

    /// Imports of `module` that name no module of this system.
    pub fn unresolved_imports<'a>(&self, module: &'a Module) -> Vec<&'a str> {
        module
            .imports
            .iter()
            .filter(|import| !self.contains_module(import))
            .map(String::as_str)
            .collect()
    }

    pub fn enumeration(&self, reference: &SymbolRef) -> Option<(&Module, &Enum)> {
        let module = self.module(&reference.module)?;
        module.enumeration(&reference.name).map(|e| (module, e))
    }

    pub fn structure(&self, reference: &SymbolRef) -> Option<(&Module, &Struct)> {
        let module = self.module(&reference.module)?;
        module.structure(&reference.name).map(|s| (module, s))
    }

    pub fn interface(&self, reference: &SymbolRef) -> Option<(&Module, &Interface)> {
        let module = self.module(&reference.module)?;
        module.interface(&reference.name).map(|i| (module, i))
    }

    /// Find a node by qualified name: `module`, `module.Type` or `module.Type#member`.
    pub fn lookup(&self, qualified: &str) -> Option<NodeRef<'_>> {
        let (path, fragment) = match qualified.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (qualified, None),
        };

        if fragment.is_none()
            && let Some(module) = self.module(path)
        {
            return Some(NodeRef::Module(module));
        }

        let (module_name, type_name) = path.rsplit_once('.')?;
        let module = self.module(module_name)?;

        if let Some(interface) = module.interface(type_name) {
            let Some(fragment) = fragment else {
                return Some(NodeRef::Interface(module, interface));
            };
            if let Some(p) = interface.property(fragment) {
                return Some(NodeRef::Property(module, interface, p));
            }
            if let Some(o) = interface.operation(fragment) {
                return Some(NodeRef::Operation(module, interface, o));
            }
            return interface
                .signal(fragment)
                .map(|s| NodeRef::Signal(module, interface, s));
        }

        if let Some(structure) = module.structure(type_name) {
            return match fragment {
                None => Some(NodeRef::Struct(module, structure)),
                Some(fragment) => structure
                    .field(fragment)
                    .map(|f| NodeRef::Field(module, structure, f)),
            };
        }

        let enumeration = module.enumeration(type_name)?;
        match fragment {
            None => Some(NodeRef::Enum(module, enumeration)),
            Some(fragment) => enumeration
                .member(fragment)
                .map(|m| NodeRef::Member(module, enumeration, m)),
        }
    }

    /// Mutable access to the tags of the node with this qualified name.
    pub fn tags_mut(&mut self, qualified: &str) -> Option<&mut Tags> {
        let (path, fragment) = match qualified.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (qualified, None),
        };

        if fragment.is_none() && self.modules.contains_key(path) {
            return self.modules.get_mut(path).map(|m| &mut m.tags);
        }

        let (module_name, type_name) = path.rsplit_once('.')?;
        let module = self.modules.get_mut(module_name)?;

        if let Some(interface) = module.interfaces.iter_mut().find(|i| i.name == type_name) {
            let Some(fragment) = fragment else {
                return Some(&mut interface.tags);
            };
            if let Some(p) = interface.properties.iter_mut().find(|p| p.name == fragment) {
                return Some(&mut p.tags);
            }
            if let Some(o) = interface.operations.iter_mut().find(|o| o.name == fragment) {
                return Some(&mut o.tags);
            }
            return interface
                .signals
                .iter_mut()
                .find(|s| s.name == fragment)
                .map(|s| &mut s.tags);
        }

        if let Some(structure) = module.structs.iter_mut().find(|s| s.name == type_name) {
            return match fragment {
                None => Some(&mut structure.tags),
                Some(fragment) => structure
                    .fields
                    .iter_mut()
                    .find(|f| f.name == fragment)
                    .map(|f| &mut f.tags),
            };
        }

        let enumeration = module.enums.iter_mut().find(|e| e.name == type_name)?;
        match fragment {
            None => Some(&mut enumeration.tags),
            Some(fragment) => enumeration
                .members
                .iter_mut()
                .find(|m| m.name == fragment)
                .map(|m| &mut m.tags),
        }
    }
}

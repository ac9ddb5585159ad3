//! Model nodes as template values.
//!
//! Templates see the model through [`Node`] objects: a shared handle to the
//! [`System`] plus an index path to one node. Attribute access resolves the
//! path on demand, so no model data is copied into the template context.
//! A node renders as its name. The `type` attribute of a typed symbol is a
//! [`TypeView`], whose `nested` attribute walks into list and model element
//! types.
//!
//! Filters receive these values back and turn them into typed views with
//! [`Typed::from_value`] or [`Node::from_value`].

use std::{fmt, sync::Arc};

use idlgen_model::{Module, NodeRef, Symbol, SymbolRef, System, Type};
use minijinja::{
    Error, ErrorKind,
    value::{Object, ObjectRepr, Value},
};

/// Index path from the system root to one model node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePath {
    System,
    Module(usize),
    Interface(usize, usize),
    Struct(usize, usize),
    Enum(usize, usize),
    Property(usize, usize, usize),
    Operation(usize, usize, usize),
    Signal(usize, usize, usize),
    /// Module, interface, operation, parameter.
    OperationParameter(usize, usize, usize, usize),
    /// Module, interface, signal, parameter.
    SignalParameter(usize, usize, usize, usize),
    Field(usize, usize, usize),
    Member(usize, usize, usize),
}

impl NodePath {
    fn module_index(&self) -> Option<usize> {
        match *self {
            NodePath::System => None,
            NodePath::Module(m)
            | NodePath::Interface(m, _)
            | NodePath::Struct(m, _)
            | NodePath::Enum(m, _)
            | NodePath::Property(m, ..)
            | NodePath::Operation(m, ..)
            | NodePath::Signal(m, ..)
            | NodePath::OperationParameter(m, ..)
            | NodePath::SignalParameter(m, ..)
            | NodePath::Field(m, ..)
            | NodePath::Member(m, ..) => Some(m),
        }
    }

    /// The path of the interface, struct or enum declaring this member.
    fn owner(&self) -> Option<NodePath> {
        match *self {
            NodePath::Property(m, i, _)
            | NodePath::Operation(m, i, _)
            | NodePath::Signal(m, i, _)
            | NodePath::OperationParameter(m, i, ..)
            | NodePath::SignalParameter(m, i, ..) => Some(NodePath::Interface(m, i)),
            NodePath::Field(m, s, _) => Some(NodePath::Struct(m, s)),
            NodePath::Member(m, e, _) => Some(NodePath::Enum(m, e)),
            _ => None,
        }
    }
}

/// A model node exposed to templates.
#[derive(Debug, Clone)]
pub struct Node {
    system: Arc<System>,
    path: NodePath,
}

impl Node {
    pub fn new(system: Arc<System>, path: NodePath) -> Self {
        Self { system, path }
    }

    /// The system root.
    pub fn root(system: Arc<System>) -> Self {
        Self::new(system, NodePath::System)
    }

    pub fn into_value(self) -> Value {
        Value::from_object(self)
    }

    /// Get the node behind a template value.
    pub fn from_value(value: &Value) -> Option<Arc<Node>> {
        value.downcast_object::<Node>()
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn path(&self) -> NodePath {
        self.path
    }

    fn at(&self, path: NodePath) -> Value {
        Node::new(self.system.clone(), path).into_value()
    }

    /// Resolve the path, `None` for the system root.
    pub fn resolve(&self) -> Option<NodeRef<'_>> {
        let system = &*self.system;
        let module = system.module_at(self.path.module_index()?)?;
        Some(match self.path {
            NodePath::System => return None,
            NodePath::Module(_) => NodeRef::Module(module),
            NodePath::Interface(_, i) => NodeRef::Interface(module, module.interfaces.get(i)?),
            NodePath::Struct(_, s) => NodeRef::Struct(module, module.structs.get(s)?),
            NodePath::Enum(_, e) => NodeRef::Enum(module, module.enums.get(e)?),
            NodePath::Property(_, i, p) => {
                let interface = module.interfaces.get(i)?;
                NodeRef::Property(module, interface, interface.properties.get(p)?)
            }
            NodePath::Operation(_, i, o) => {
                let interface = module.interfaces.get(i)?;
                NodeRef::Operation(module, interface, interface.operations.get(o)?)
            }
            NodePath::Signal(_, i, s) => {
                let interface = module.interfaces.get(i)?;
                NodeRef::Signal(module, interface, interface.signals.get(s)?)
            }
            NodePath::OperationParameter(_, i, o, p) => {
                let interface = module.interfaces.get(i)?;
                let operation = interface.operations.get(o)?;
                NodeRef::Parameter(module, interface, operation.parameters.get(p)?)
            }
            NodePath::SignalParameter(_, i, s, p) => {
                let interface = module.interfaces.get(i)?;
                let signal = interface.signals.get(s)?;
                NodeRef::Parameter(module, interface, signal.parameters.get(p)?)
            }
            NodePath::Field(_, s, f) => {
                let structure = module.structs.get(s)?;
                NodeRef::Field(module, structure, structure.fields.get(f)?)
            }
            NodePath::Member(_, e, m) => {
                let enumeration = module.enums.get(e)?;
                NodeRef::Member(module, enumeration, enumeration.members.get(m)?)
            }
        })
    }

    /// The owning module, or the module itself.
    pub fn module(&self) -> Option<&Module> {
        self.system.module_at(self.path.module_index()?)
    }

    /// The typed symbol view of a property, operation, parameter or field.
    pub fn symbol(&self) -> Option<Symbol<'_>> {
        Some(match self.resolve()? {
            NodeRef::Property(m, i, p) => Symbol::property(m, i, p),
            NodeRef::Operation(m, i, o) => Symbol::operation(m, i, o),
            NodeRef::Parameter(m, i, p) => Symbol::parameter(m, &i.name, p),
            NodeRef::Field(m, s, f) => Symbol::field(m, s, f),
            _ => return None,
        })
    }

    pub fn name(&self) -> &str {
        match self.resolve() {
            None => "System",
            Some(node) => node.name(),
        }
    }

    /// `module`, `module.Type` or `module.Type#member`.
    pub fn qualified_name(&self) -> String {
        let Some(node) = self.resolve() else {
            return String::new();
        };
        match node {
            NodeRef::Module(m) => m.name.clone(),
            NodeRef::Interface(m, _) | NodeRef::Struct(m, _) | NodeRef::Enum(m, _) => {
                format!("{}.{}", m.name, self.name())
            }
            NodeRef::Property(m, i, _)
            | NodeRef::Operation(m, i, _)
            | NodeRef::Signal(m, i, _)
            | NodeRef::Parameter(m, i, _) => format!("{}.{}#{}", m.name, i.name, self.name()),
            NodeRef::Field(m, s, _) => format!("{}.{}#{}", m.name, s.name, self.name()),
            NodeRef::Member(m, e, _) => format!("{}.{}#{}", m.name, e.name, self.name()),
        }
    }

    /// Node of the symbol a type refers to.
    fn reference(&self, reference: &SymbolRef) -> Option<Value> {
        let m = self.system.module_index(&reference.module)?;
        let module = self.system.module_at(m)?;
        let name = reference.name.as_str();
        let path = if let Some(i) = module.interfaces.iter().position(|i| i.name == name) {
            NodePath::Interface(m, i)
        } else if let Some(s) = module.structs.iter().position(|s| s.name == name) {
            NodePath::Struct(m, s)
        } else {
            NodePath::Enum(m, module.enums.iter().position(|e| e.name == name)?)
        };
        Some(self.at(path))
    }

    fn children(&self, count: usize, path: impl Fn(usize) -> NodePath) -> Value {
        Value::from((0..count).map(|i| self.at(path(i))).collect::<Vec<_>>())
    }

    fn common_attribute(&self, node: &NodeRef<'_>, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::from(self.name())),
            "qualified_name" => Some(Value::from(self.qualified_name())),
            "kind" => Some(Value::from(node.kind())),
            "tags" => Some(Value::from_serialize(node.tags())),
            "module" => Some(self.at(NodePath::Module(self.path.module_index()?))),
            _ => None,
        }
    }

    fn attribute(&self, key: &str) -> Option<Value> {
        let Some(node) = self.resolve() else {
            let count = self.system.len();
            return match key {
                "modules" => Some(self.children(count, NodePath::Module)),
                "name" => Some(Value::from("System")),
                _ => None,
            };
        };
        if let Some(value) = self.common_attribute(&node, key) {
            return Some(value);
        }
        let owner = || self.path.owner().map(|p| self.at(p));

        match (node, self.path) {
            (NodeRef::Module(module), NodePath::Module(m)) => match key {
                "module_name" => Some(Value::from(module.module_name())),
                "version" => Some(Value::from(module.version.to_string())),
                "majorVersion" => Some(Value::from(module.version.major())),
                "minorVersion" => Some(Value::from(module.version.minor())),
                "imports" => Some(Value::from_serialize(&module.imports)),
                "name_parts" => Some(Value::from_serialize(module.name_parts())),
                "comment" => Some(Value::from(module.comment.as_str())),
                "interfaces" => Some(self.children(module.interfaces.len(), |i| {
                    NodePath::Interface(m, i)
                })),
                "structs" => Some(self.children(module.structs.len(), |s| NodePath::Struct(m, s))),
                "enums" => Some(self.children(module.enums.len(), |e| NodePath::Enum(m, e))),
                _ => None,
            },
            (NodeRef::Interface(_, interface), NodePath::Interface(m, i)) => match key {
                "comment" => Some(Value::from(interface.comment.as_str())),
                "properties" => Some(self.children(interface.properties.len(), |p| {
                    NodePath::Property(m, i, p)
                })),
                "operations" => Some(self.children(interface.operations.len(), |o| {
                    NodePath::Operation(m, i, o)
                })),
                "signals" => Some(self.children(interface.signals.len(), |s| {
                    NodePath::Signal(m, i, s)
                })),
                _ => None,
            },
            (NodeRef::Struct(_, structure), NodePath::Struct(m, s)) => match key {
                "comment" => Some(Value::from(structure.comment.as_str())),
                "fields" => Some(self.children(structure.fields.len(), |f| {
                    NodePath::Field(m, s, f)
                })),
                _ => None,
            },
            (NodeRef::Enum(_, enumeration), NodePath::Enum(m, e)) => match key {
                "comment" => Some(Value::from(enumeration.comment.as_str())),
                "is_flag" => Some(Value::from(enumeration.is_flag)),
                "is_enum" => Some(Value::from(!enumeration.is_flag)),
                "members" => Some(self.children(enumeration.members.len(), |x| {
                    NodePath::Member(m, e, x)
                })),
                _ => None,
            },
            (NodeRef::Property(_, _, property), _) => match key {
                "type" => Some(self.type_view()),
                "comment" => Some(Value::from(property.comment.as_str())),
                "readonly" => Some(Value::from(property.readonly)),
                "writeable" => Some(Value::from(!property.readonly && !property.is_const)),
                "const" | "is_const" => Some(Value::from(property.is_const)),
                "interface" => owner(),
                _ => None,
            },
            (NodeRef::Operation(_, _, operation), NodePath::Operation(m, i, o)) => match key {
                "type" => Some(self.type_view()),
                "comment" => Some(Value::from(operation.comment.as_str())),
                "const" | "is_const" => Some(Value::from(operation.is_const)),
                "parameters" => Some(self.children(operation.parameters.len(), |p| {
                    NodePath::OperationParameter(m, i, o, p)
                })),
                "interface" => owner(),
                _ => None,
            },
            (NodeRef::Signal(_, _, signal), NodePath::Signal(m, i, s)) => match key {
                "comment" => Some(Value::from(signal.comment.as_str())),
                "parameters" => Some(self.children(signal.parameters.len(), |p| {
                    NodePath::SignalParameter(m, i, s, p)
                })),
                "interface" => owner(),
                _ => None,
            },
            (NodeRef::Parameter(..), _) => match key {
                "type" => Some(self.type_view()),
                "interface" => owner(),
                _ => None,
            },
            (NodeRef::Field(_, _, field), _) => match key {
                "type" => Some(self.type_view()),
                "comment" => Some(Value::from(field.comment.as_str())),
                "struct" => owner(),
                _ => None,
            },
            (NodeRef::Member(_, _, member), _) => match key {
                "value" => member.value.map(Value::from),
                "comment" => Some(Value::from(member.comment.as_str())),
                "enum" => owner(),
                _ => None,
            },
            _ => None,
        }
    }

    fn type_view(&self) -> Value {
        Value::from_object(TypeView {
            owner: self.clone(),
            depth: 0,
        })
    }
}

impl Object for Node {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.attribute(key.as_str()?)
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The type of a typed symbol, or an element type nested inside it.
#[derive(Debug, Clone)]
pub struct TypeView {
    owner: Node,
    /// How many list/model levels below the owner's own type.
    depth: usize,
}

impl TypeView {
    pub fn system(&self) -> &System {
        self.owner.system()
    }

    /// The owner's symbol seen through this (possibly nested) type.
    pub fn symbol(&self) -> Option<Symbol<'_>> {
        let mut symbol = self.owner.symbol()?;
        for _ in 0..self.depth {
            symbol = symbol.nested()?;
        }
        Some(symbol)
    }

    pub fn ty(&self) -> Option<&Type> {
        self.symbol().map(|s| s.ty)
    }

    fn attribute(self: &Arc<Self>, key: &str) -> Option<Value> {
        let ty = self.ty()?;
        let flag = |f: fn(&Type) -> bool| Some(Value::from(f(ty)));
        match key {
            "name" => Some(Value::from(ty.name())),
            "kind" => Some(Value::from(ty.kind())),
            "is_void" => flag(Type::is_void),
            "is_primitive" => flag(Type::is_primitive),
            "is_complex" => flag(Type::is_complex),
            "is_int" => flag(Type::is_int),
            "is_bool" => flag(Type::is_bool),
            "is_string" => flag(Type::is_string),
            "is_real" => flag(Type::is_real),
            "is_var" => flag(Type::is_var),
            "is_enum" => flag(Type::is_enum),
            "is_flag" => flag(Type::is_flag),
            "is_struct" => flag(Type::is_struct),
            "is_interface" => flag(Type::is_interface),
            "is_list" => flag(Type::is_list),
            "is_model" => flag(Type::is_model),
            "is_map" => flag(Type::is_map),
            "nested" => {
                ty.nested()?;
                Some(Value::from_object(TypeView {
                    owner: self.owner.clone(),
                    depth: self.depth + 1,
                }))
            }
            "reference" => self.owner.reference(ty.reference()?),
            "qualified_name" => ty
                .reference()
                .map(|r| Value::from(r.qualified_name()))
                .or_else(|| Some(Value::from(ty.name()))),
            // a type is its own typed symbol
            "type" => Some(Value::from_object(TypeView::clone(self))),
            "module" => self.owner.common_attribute(&self.owner.resolve()?, "module"),
            _ => None,
        }
    }
}

impl Object for TypeView {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.attribute(key.as_str()?)
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty() {
            Some(ty) => write!(f, "{}", ty.name()),
            None => Ok(()),
        }
    }
}

/// A template value that carries a typed symbol.
#[derive(Debug, Clone)]
pub enum Typed {
    Node(Arc<Node>),
    Type(Arc<TypeView>),
}

impl Typed {
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(node) = value.downcast_object::<Node>() {
            return Some(Typed::Node(node));
        }
        value.downcast_object::<TypeView>().map(Typed::Type)
    }

    pub fn system(&self) -> &System {
        match self {
            Typed::Node(node) => node.system(),
            Typed::Type(view) => view.system(),
        }
    }

    pub fn symbol(&self) -> Option<Symbol<'_>> {
        match self {
            Typed::Node(node) => node.symbol(),
            Typed::Type(view) => view.symbol(),
        }
    }
}

/// Error for a value a filter cannot work with.
pub fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

/// The typed symbol behind `value`, or an error naming `filter`.
pub fn expect_typed(value: &Value, filter: &str) -> Result<Typed, Error> {
    Typed::from_value(value)
        .filter(|typed| typed.symbol().is_some())
        .ok_or_else(|| invalid(format!("{}: Unknown symbol {} of type {}", filter, value, value.kind())))
}

/// The module node behind `value`, or an error.
pub fn expect_module(value: &Value) -> Result<Arc<Node>, Error> {
    Node::from_value(value)
        .filter(|node| matches!(node.path(), NodePath::Module(_)))
        .ok_or_else(|| invalid("symbol is not a module"))
}

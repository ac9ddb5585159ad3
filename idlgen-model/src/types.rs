//! Type descriptors.

use std::fmt;

use serde::Serialize;

/// Reference to a named symbol (enum, struct or interface) in some module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolRef {
    pub module: String,
    pub name: String,
}

impl SymbolRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Fully qualified name, e.g. `org.example.Point`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Builtin primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Int,
    Bool,
    String,
    Real,
    Var,
}

impl Primitive {
    /// Get the IDL type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Real => "real",
            Primitive::Var => "var",
        }
    }

    /// Parse an IDL primitive type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Primitive::Int),
            "bool" => Some(Primitive::Bool),
            "string" => Some(Primitive::String),
            "real" => Some(Primitive::Real),
            "var" => Some(Primitive::Var),
            _ => None,
        }
    }
}

/// A resolved IDL type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum Type {
    Void,
    Primitive(Primitive),
    Enum(SymbolRef),
    Flag(SymbolRef),
    Struct(SymbolRef),
    Interface(SymbolRef),
    List(Box<Type>),
    Model(Box<Type>),
    Map(Box<Type>),
}

impl Type {
    pub const INT: Type = Type::Primitive(Primitive::Int);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);
    pub const STRING: Type = Type::Primitive(Primitive::String);
    pub const REAL: Type = Type::Primitive(Primitive::Real);
    pub const VAR: Type = Type::Primitive(Primitive::Var);

    pub fn list(nested: Type) -> Self {
        Type::List(Box::new(nested))
    }

    pub fn model(nested: Type) -> Self {
        Type::Model(Box::new(nested))
    }

    pub fn map(nested: Type) -> Self {
        Type::Map(Box::new(nested))
    }

    pub fn enumeration(module: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Enum(SymbolRef::new(module, name))
    }

    pub fn flag(module: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Flag(SymbolRef::new(module, name))
    }

    pub fn structure(module: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Struct(SymbolRef::new(module, name))
    }

    pub fn interface(module: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Interface(SymbolRef::new(module, name))
    }

    /// The type name as written in the IDL (nested types excluded).
    pub fn name(&self) -> &str {
        match self {
            Type::Void => "void",
            Type::Primitive(p) => p.as_str(),
            Type::Enum(r) | Type::Flag(r) | Type::Struct(r) | Type::Interface(r) => &r.name,
            Type::List(_) => "list",
            Type::Model(_) => "model",
            Type::Map(_) => "map",
        }
    }

    /// The kind of this type, used in diagnostics (`'interface'`, `'map'`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Primitive(p) => p.as_str(),
            Type::Enum(_) => "enum",
            Type::Flag(_) => "flag",
            Type::Struct(_) => "struct",
            Type::Interface(_) => "interface",
            Type::List(_) => "list",
            Type::Model(_) => "model",
            Type::Map(_) => "map",
        }
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Anything that is neither primitive nor void.
    pub fn is_complex(&self) -> bool {
        !self.is_primitive() && !self.is_void()
    }

    pub fn is_int(&self) -> bool {
        self.primitive() == Some(Primitive::Int)
    }

    pub fn is_bool(&self) -> bool {
        self.primitive() == Some(Primitive::Bool)
    }

    pub fn is_string(&self) -> bool {
        self.primitive() == Some(Primitive::String)
    }

    pub fn is_real(&self) -> bool {
        self.primitive() == Some(Primitive::Real)
    }

    pub fn is_var(&self) -> bool {
        self.primitive() == Some(Primitive::Var)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Type::Enum(_))
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Type::Flag(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, Type::Interface(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Type::Model(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Type::Map(_))
    }

    /// The element type of a list, model or map.
    pub fn nested(&self) -> Option<&Type> {
        match self {
            Type::List(nested) | Type::Model(nested) | Type::Map(nested) => Some(nested),
            _ => None,
        }
    }

    /// The referenced symbol of an enum, flag, struct or interface type.
    pub fn reference(&self) -> Option<&SymbolRef> {
        match self {
            Type::Enum(r) | Type::Flag(r) | Type::Struct(r) | Type::Interface(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::List(nested) | Type::Model(nested) | Type::Map(nested) => {
                write!(f, "{}<{}>", self.name(), nested)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_roundtrip() {
        for p in [
            Primitive::Int,
            Primitive::Bool,
            Primitive::String,
            Primitive::Real,
            Primitive::Var,
        ] {
            assert_eq!(Primitive::from_name(p.as_str()), Some(p));
        }
        assert_eq!(Primitive::from_name("float"), None);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::INT.to_string(), "int");
        assert_eq!(Type::list(Type::STRING).to_string(), "list<string>");
        assert_eq!(
            Type::model(Type::structure("org.example", "Point")).to_string(),
            "model<Point>"
        );
        assert_eq!(Type::Void.to_string(), "void");
    }

    #[test]
    fn test_type_predicates() {
        let point = Type::structure("org.example", "Point");
        assert!(point.is_struct());
        assert!(point.is_complex());
        assert!(!point.is_primitive());
        assert_eq!(point.reference().unwrap().qualified_name(), "org.example.Point");

        assert!(Type::REAL.is_real());
        assert!(!Type::Void.is_complex());
        assert!(Type::list(Type::INT).nested().unwrap().is_int());
        assert_eq!(Type::map(Type::INT).kind(), "map");
        assert_eq!(Type::interface("a", "B").kind(), "interface");
    }
}

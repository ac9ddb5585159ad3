//! Qt/C++ spelling of IDL types.

use idlgen_core::upper_first;
use idlgen_model::{Enum, Module, Primitive, Symbol, SymbolRef, System, Type};

use crate::{MappingError, namespace::namespace_prefix};

/// Maps typed symbols to C++ declarations and literals.
///
/// Referenced enums and structs are looked up in `system`, the class
/// prefix is put in front of enum scopes that are spelled without a
/// namespace (`enum_value`, `qml_info_type`).
#[derive(Debug, Clone, Copy)]
pub struct QtTypeMapper<'a> {
    system: &'a System,
    class_prefix: &'a str,
}

type Result<T> = std::result::Result<T, MappingError>;

impl<'a> QtTypeMapper<'a> {
    pub fn new(system: &'a System, class_prefix: &'a str) -> Self {
        Self {
            system,
            class_prefix,
        }
    }

    pub(crate) fn unknown(filter: &'static str, symbol: &Symbol<'_>) -> MappingError {
        MappingError::UnknownType {
            filter,
            symbol: symbol.name.to_string(),
            ty: symbol.ty.name().to_string(),
        }
    }

    fn module(&self, filter: &'static str, symbol: &Symbol<'_>, reference: &SymbolRef) -> Result<&'a Module> {
        self.system
            .module(&reference.module)
            .ok_or_else(|| Self::unknown(filter, symbol))
    }

    fn enumeration(&self, filter: &'static str, symbol: &Symbol<'_>, reference: &SymbolRef) -> Result<(&'a Module, &'a Enum)> {
        self.system
            .enumeration(reference)
            .ok_or_else(|| Self::unknown(filter, symbol))
    }

    /// `::ns::Module::` scope of a referenced enum.
    fn enum_scope(&self, module: &Module) -> String {
        format!("{}{}", namespace_prefix(module), upper_first(&module.module_name()))
    }

    /// Spelling of an enum or flag type: the configured flag type or the
    /// plural of a flag, the enum name otherwise.
    pub fn flag_type_of(enumeration: &Enum) -> String {
        if !enumeration.is_flag {
            return enumeration.name.clone();
        }
        enumeration
            .config
            .flag_type
            .clone()
            .unwrap_or_else(|| format!("{}s", enumeration.name))
    }

    /// `flag_type` of a typed symbol, the symbol name for non enum types.
    pub fn flag_type(&self, symbol: &Symbol<'_>) -> Result<String> {
        match symbol.ty {
            Type::Enum(reference) | Type::Flag(reference) => {
                let (_, enumeration) = self.enumeration("flag_type", symbol, reference)?;
                Ok(Self::flag_type_of(enumeration))
            }
            _ => Ok(symbol.name.to_string()),
        }
    }

    fn enum_type(&self, filter: &'static str, symbol: &Symbol<'_>, reference: &SymbolRef) -> Result<String> {
        let (module, enumeration) = self.enumeration(filter, symbol, reference)?;
        Ok(format!("{}::{}", self.enum_scope(module), Self::flag_type_of(enumeration)))
    }

    fn model_type(&self, filter: &'static str, symbol: &Symbol<'_>, nested: &Type) -> Result<String> {
        if nested.is_primitive() {
            Ok(format!("{}VariantModel *", namespace_prefix(symbol.module)))
        } else if nested.is_complex() {
            Ok("QIfPagingModel *".to_string())
        } else {
            Err(Self::unknown(filter, symbol))
        }
    }

    fn class_type(&self, filter: &'static str, symbol: &Symbol<'_>, reference: &SymbolRef) -> Result<String> {
        let module = self.module(filter, symbol, reference)?;
        Ok(format!("{}{}", namespace_prefix(module), reference.name))
    }

    /// Type of a property getter or an operation return value.
    pub fn return_type(&self, symbol: &Symbol<'_>) -> Result<String> {
        const FILTER: &str = "return_type";
        match symbol.ty {
            Type::Enum(r) | Type::Flag(r) => self.enum_type(FILTER, symbol, r),
            Type::Void => Ok("void".to_string()),
            Type::Primitive(Primitive::String) => Ok("QString".to_string()),
            Type::Primitive(Primitive::Var) => Ok("QVariant".to_string()),
            Type::Primitive(Primitive::Real) => Ok("qreal".to_string()),
            Type::Primitive(p) => Ok(p.as_str().to_string()),
            Type::List(_) => Ok("QVariantList".to_string()),
            Type::Model(nested) => self.model_type(FILTER, symbol, nested),
            Type::Struct(r) | Type::Interface(r) => self.class_type(FILTER, symbol, r),
            Type::Map(_) => Err(Self::unknown(FILTER, symbol)),
        }
    }

    /// Parameter declaration, e.g. `const QString &name`.
    pub fn parameter_type(&self, symbol: &Symbol<'_>) -> Result<String> {
        const FILTER: &str = "parameter_type";
        let name = symbol.name;
        match symbol.ty {
            Type::Enum(r) | Type::Flag(r) => Ok(format!("{} {}", self.enum_type(FILTER, symbol, r)?, name)),
            Type::Primitive(Primitive::String) => Ok(format!("const QString &{}", name)),
            Type::Primitive(Primitive::Var) => Ok(format!("const QVariant &{}", name)),
            Type::Primitive(Primitive::Real) => Ok(format!("qreal {}", name)),
            Type::Void | Type::Primitive(_) => Ok(format!("{} {}", symbol.ty.name(), name)),
            Type::List(_) => Ok(format!("const QVariantList &{}", name)),
            Type::Model(nested) => Ok(format!("{}{}", self.model_type(FILTER, symbol, nested)?, name)),
            Type::Struct(r) | Type::Interface(r) => {
                Ok(format!("const {} &{}", self.class_type(FILTER, symbol, r)?, name))
            }
            Type::Map(_) => Err(Self::unknown(FILTER, symbol)),
        }
    }

    /// Parameter declaration with a default argument, e.g. `int count=int(0)`.
    pub fn parameter_type_default(&self, symbol: &Symbol<'_>) -> Result<String> {
        const FILTER: &str = "parameter_type_default";
        let name = symbol.name;
        match symbol.ty {
            Type::Enum(r) | Type::Flag(r) => Ok(format!(
                "{} {}={}",
                self.enum_type(FILTER, symbol, r)?,
                name,
                self.default_type_value(symbol)?
            )),
            Type::Primitive(Primitive::String) => Ok(format!("const QString &{}=QString()", name)),
            Type::Primitive(Primitive::Var) => Ok(format!("const QVariant &{}=QVariant()", name)),
            Type::Primitive(Primitive::Real) => Ok(format!("qreal {}=qreal()", name)),
            Type::Void | Type::Primitive(_) => Ok(format!(
                "{} {}={}",
                symbol.ty.name(),
                name,
                self.default_type_value(symbol)?
            )),
            Type::List(_) => Ok(format!("const QVariantList &{}=QVariantList()", name)),
            Type::Model(nested) => Ok(format!("{}{}=nullptr", self.model_type(FILTER, symbol, nested)?, name)),
            Type::Struct(r) | Type::Interface(r) => {
                let class = self.class_type(FILTER, symbol, r)?;
                Ok(format!("const {0} &{1}={0}()", class, name))
            }
            Type::Map(_) => Err(Self::unknown(FILTER, symbol)),
        }
    }

    /// The zero value of the symbol's type.
    pub fn default_type_value(&self, symbol: &Symbol<'_>) -> Result<String> {
        const FILTER: &str = "default_type_value";
        match symbol.ty {
            Type::Primitive(Primitive::Int) => Ok("int(0)".to_string()),
            Type::Primitive(Primitive::Bool) => Ok("bool(false)".to_string()),
            Type::Primitive(Primitive::String) => Ok("QString()".to_string()),
            Type::Primitive(Primitive::Real) => Ok("qreal(0.0)".to_string()),
            Type::Primitive(Primitive::Var) => Ok("QVariant()".to_string()),
            Type::Void => Ok(String::new()),
            Type::Enum(r) => {
                let (module, enumeration) = self.enumeration(FILTER, symbol, r)?;
                let first = enumeration.first_member().ok_or_else(|| MappingError::EmptyEnum {
                    filter: FILTER,
                    name: enumeration.name.clone(),
                })?;
                Ok(format!("{}::{}", self.enum_scope(module), first.name))
            }
            Type::Flag(r) => {
                let (module, enumeration) = self.enumeration(FILTER, symbol, r)?;
                Ok(format!("{}::{}()", self.enum_scope(module), Self::flag_type_of(enumeration)))
            }
            Type::List(_) => Ok("QVariantList()".to_string()),
            Type::Struct(r) => Ok(format!("{}()", self.class_type(FILTER, symbol, r)?)),
            Type::Model(_) => Ok("nullptr".to_string()),
            Type::Interface(_) | Type::Map(_) => Err(Self::unknown(FILTER, symbol)),
        }
    }

    /// A value distinct from [`default_type_value`](Self::default_type_value).
    ///
    /// Enums use their last member, structs recurse into their fields.
    pub fn test_type_value(&self, symbol: &Symbol<'_>) -> Result<String> {
        const FILTER: &str = "test_type_value";
        match symbol.ty {
            Type::Primitive(Primitive::Int) => Ok("111".to_string()),
            Type::Primitive(Primitive::Bool) => Ok("true".to_string()),
            Type::Primitive(Primitive::String) => Ok(r#"u"TEST STRING"_s"#.to_string()),
            Type::Primitive(Primitive::Real) => Ok("1234.5678".to_string()),
            Type::Primitive(Primitive::Var) => Ok(r#"QVariant("TEST VARIANT")"#.to_string()),
            Type::Void => Ok(String::new()),
            Type::Enum(r) | Type::Flag(r) => {
                let (module, enumeration) = self.enumeration(FILTER, symbol, r)?;
                let last = enumeration.last_member().ok_or_else(|| MappingError::EmptyEnum {
                    filter: FILTER,
                    name: enumeration.name.clone(),
                })?;
                Ok(format!("{}::{}", self.enum_scope(module), last.name))
            }
            Type::List(nested) => {
                let value = self.test_type_value(&symbol.with_type(nested))?;
                if nested.is_primitive() {
                    Ok(format!("QVariantList({})", value))
                } else {
                    Ok(format!("QVariantList({{QVariant::fromValue({})}})", value))
                }
            }
            Type::Struct(r) => {
                let (module, structure) = self
                    .system
                    .structure(r)
                    .ok_or_else(|| Self::unknown(FILTER, symbol))?;
                let values = structure
                    .fields
                    .iter()
                    .map(|field| self.test_type_value(&Symbol::field(module, structure, field)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{}{}({})", namespace_prefix(module), structure.name, values.join(", ")))
            }
            Type::Model(_) => Ok("new QIfPagingModel()".to_string()),
            Type::Interface(_) | Type::Map(_) => Err(Self::unknown(FILTER, symbol)),
        }
    }

    /// Type name used in QML type information.
    pub fn qml_info_type(&self, symbol: &Symbol<'_>) -> Result<String> {
        const FILTER: &str = "qml_info_type";
        match symbol.ty {
            Type::Enum(r) | Type::Flag(r) => {
                let (module, enumeration) = self.enumeration(FILTER, symbol, r)?;
                Ok(format!(
                    "{}{}::{}",
                    self.class_prefix,
                    upper_first(&module.module_name()),
                    Self::flag_type_of(enumeration)
                ))
            }
            Type::Primitive(Primitive::Real) => Ok("double".to_string()),
            Type::Void | Type::Primitive(_) => Ok(symbol.ty.name().to_string()),
            Type::Struct(_) => Ok("QVariant".to_string()),
            Type::List(_) => Ok("QVariantList".to_string()),
            Type::Model(_) => Ok("QIfPagingModel".to_string()),
            Type::Interface(_) | Type::Map(_) => Err(Self::unknown(FILTER, symbol)),
        }
    }

    /// C++ literal of one enum value, e.g. `Climate::Warm`.
    ///
    /// Qualified values keep their last segment only.
    pub fn enum_literal(&self, value: &str, module_name: &str) -> String {
        let value = value.trim();
        let value = value.rsplit('.').next().unwrap_or(value);
        format!("{}{}::{}", self.class_prefix, upper_first(module_name), value)
    }

    /// `|`-separated enum values, each turned into its literal.
    pub fn enum_value(&self, value: &str, module_name: &str) -> String {
        value
            .split('|')
            .map(|part| self.enum_literal(part, module_name))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Module name of the enum `symbol` refers to.
    pub(crate) fn enum_module_name(&self, filter: &'static str, symbol: &Symbol<'_>) -> Result<String> {
        match symbol.ty {
            Type::Enum(r) | Type::Flag(r) => Ok(self.module(filter, symbol, r)?.module_name()),
            _ => Err(Self::unknown(filter, symbol)),
        }
    }

    pub(crate) fn system(&self) -> &'a System {
        self.system
    }
}

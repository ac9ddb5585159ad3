//! Type resolution: turns raw documents into a [`System`].

use std::collections::HashMap;

use idlgen_model::{
    Enum, EnumMember, Field, Interface, Module, Operation, Parameter, Primitive, Property, Signal,
    Struct, System, Tags, Type, Version,
};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    Error, Result, SourceContext,
    document::{
        RawEnum, RawInterface, RawMember, RawModule, RawParameter, RawStruct, version_text,
    },
};

/// What a declared name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declared {
    Enum { flag: bool },
    Struct,
    Interface,
}

/// Declared names per module, across every loaded document.
#[derive(Debug, Default)]
struct SymbolTable {
    modules: HashMap<String, HashMap<String, Declared>>,
}

impl SymbolTable {
    fn declare(&mut self, raw: &RawModule) {
        let names = self.modules.entry(raw.module.clone()).or_default();
        for e in &raw.enums {
            names.insert(e.name.clone(), Declared::Enum { flag: e.flag });
        }
        for s in &raw.structs {
            names.insert(s.name.clone(), Declared::Struct);
        }
        for i in &raw.interfaces {
            names.insert(i.name.clone(), Declared::Interface);
        }
    }

    fn get(&self, module: &str, name: &str) -> Option<Declared> {
        self.modules.get(module)?.get(name).copied()
    }
}

/// A parsed document together with its source, for error reporting.
pub(crate) struct Loaded {
    pub ctx: SourceContext,
    pub raw: RawModule,
    pub path: std::path::PathBuf,
}

/// Resolves type spellings from the point of view of one module.
struct Resolver<'a> {
    symbols: &'a SymbolTable,
    module: &'a str,
    imports: &'a [String],
    ctx: &'a SourceContext,
}

impl Resolver<'_> {
    fn resolve(&self, spelling: &str) -> Result<Type> {
        let spelling = spelling.trim();

        if let Some(open) = spelling.find('<') {
            let Some(inner) = spelling[open + 1..].strip_suffix('>') else {
                return Err(self
                    .ctx
                    .validation_error(format!("invalid type '{}'", spelling), spelling));
            };
            let nested = self.resolve(inner)?;
            return match spelling[..open].trim() {
                "list" => Ok(Type::list(nested)),
                "model" => Ok(Type::model(nested)),
                "map" => Ok(Type::map(nested)),
                other => Err(self.ctx.validation_error(
                    format!("unknown container type '{}'", other),
                    spelling,
                )),
            };
        }

        if spelling == "void" {
            return Ok(Type::Void);
        }
        if let Some(primitive) = Primitive::from_name(spelling) {
            return Ok(Type::Primitive(primitive));
        }

        let (module, declared) = self
            .lookup(spelling)
            .ok_or_else(|| self.ctx.unknown_type_error(spelling, self.module))?;
        let name = spelling.rsplit('.').next().unwrap_or(spelling);
        Ok(match declared {
            Declared::Enum { flag: false } => Type::enumeration(module, name),
            Declared::Enum { flag: true } => Type::flag(module, name),
            Declared::Struct => Type::structure(module, name),
            Declared::Interface => Type::interface(module, name),
        })
    }

    /// Local names first, then imports in declaration order.
    fn lookup(&self, spelling: &str) -> Option<(String, Declared)> {
        if let Some((module, name)) = spelling.rsplit_once('.') {
            return self
                .symbols
                .get(module, name)
                .map(|d| (module.to_string(), d));
        }
        std::iter::once(self.module)
            .chain(self.imports.iter().map(String::as_str))
            .find_map(|module| {
                self.symbols
                    .get(module, spelling)
                    .map(|d| (module.to_string(), d))
            })
    }

    fn parameters(&self, raw: &[RawParameter]) -> Result<Vec<Parameter>> {
        raw.iter()
            .map(|p| {
                Ok(Parameter {
                    tags: tags(p.tags.clone()),
                    ..Parameter::new(&p.name, self.resolve(&p.ty)?)
                })
            })
            .collect()
    }

    fn interface(&self, raw: &RawInterface) -> Result<Interface> {
        let mut interface = Interface::new(&raw.name).with_tags(tags(raw.tags.clone()));
        interface.comment = raw.comment.clone();

        for p in &raw.properties {
            let mut property = Property::new(&p.name, self.resolve(&p.ty)?)
                .with_tags(tags(p.tags.clone()));
            property.readonly = p.readonly;
            property.is_const = p.is_const;
            property.comment = p.comment.clone();
            interface.properties.push(property);
        }
        for o in &raw.operations {
            let mut operation = Operation::new(&o.name, self.resolve(&o.ty)?);
            operation.parameters = self.parameters(&o.parameters)?;
            operation.is_const = o.is_const;
            operation.comment = o.comment.clone();
            operation.tags = tags(o.tags.clone());
            interface.operations.push(operation);
        }
        for s in &raw.signals {
            let mut signal = Signal::new(&s.name);
            signal.parameters = self.parameters(&s.parameters)?;
            signal.comment = s.comment.clone();
            signal.tags = tags(s.tags.clone());
            interface.signals.push(signal);
        }
        Ok(interface)
    }

    fn structure(&self, raw: &RawStruct) -> Result<Struct> {
        let mut structure = Struct::new(&raw.name);
        structure.comment = raw.comment.clone();
        structure.tags = tags(raw.tags.clone());
        for f in &raw.fields {
            let mut field = Field::new(&f.name, self.resolve(&f.ty)?);
            field.comment = f.comment.clone();
            field.tags = tags(f.tags.clone());
            structure.fields.push(field);
        }
        Ok(structure)
    }
}

fn enumeration(raw: &RawEnum) -> Enum {
    let members = raw.members.iter().map(|member| match member {
        RawMember::Name(name) => EnumMember::new(name),
        RawMember::Full {
            name,
            value,
            comment,
            tags: member_tags,
        } => EnumMember {
            value: *value,
            comment: comment.clone(),
            tags: tags(member_tags.clone()),
            ..EnumMember::new(name)
        },
    });
    Enum {
        is_flag: raw.flag,
        comment: raw.comment.clone(),
        members: members.collect(),
        tags: tags(raw.tags.clone()),
        ..Enum::new(&raw.name, Vec::<String>::new())
    }
}

fn tags(value: Option<Value>) -> Tags {
    value.map(Tags::from_value).unwrap_or_default()
}

fn version(loaded: &Loaded) -> Result<Option<Version>> {
    let Some(text) = version_text(loaded.raw.version.as_ref()) else {
        return Ok(None);
    };
    text.parse()
        .map(Some)
        .map_err(|reason: String| loaded.ctx.validation_error(reason, &text))
}

/// Build the system from every loaded document.
///
/// Documents declaring the same module are merged in load order.
pub(crate) fn build_system(documents: Vec<Loaded>) -> Result<System> {
    let mut symbols = SymbolTable::default();
    for doc in &documents {
        symbols.declare(&doc.raw);
    }

    let mut groups: IndexMap<String, Vec<&Loaded>> = IndexMap::new();
    for doc in &documents {
        groups.entry(doc.raw.module.clone()).or_default().push(doc);
    }

    let mut system = System::new();
    for (name, docs) in groups {
        let mut module_version: Option<Version> = None;
        let mut module = Module::new(&name, Version::new(1, 0));

        for doc in &docs {
            if let Some(v) = version(doc)? {
                match module_version {
                    Some(first) if first != v => {
                        return Err(Box::new(Error::VersionConflict {
                            name: name.clone(),
                            first: first.to_string(),
                            second: v.to_string(),
                        }));
                    }
                    _ => module_version = Some(v),
                }
            }
            for import in &doc.raw.imports {
                if !module.imports.contains(import) {
                    module.imports.push(import.clone());
                }
            }
            if module.comment.is_empty() {
                module.comment = doc.raw.comment.clone();
            }
            if let Some(Value::Object(map)) = &doc.raw.tags {
                module.tags.merge(map);
            }
            if module.source.is_none() {
                module.source = Some(doc.path.clone());
            }
        }
        if let Some(v) = module_version {
            module.version = v;
        }

        for doc in &docs {
            let resolver = Resolver {
                symbols: &symbols,
                module: &name,
                imports: &module.imports,
                ctx: &doc.ctx,
            };
            let mut interfaces = Vec::new();
            for raw in &doc.raw.interfaces {
                interfaces.push(resolver.interface(raw)?);
            }
            let mut structs = Vec::new();
            for raw in &doc.raw.structs {
                structs.push(resolver.structure(raw)?);
            }
            module.interfaces.extend(interfaces);
            module.structs.extend(structs);
            module.enums.extend(doc.raw.enums.iter().map(enumeration));
        }

        tracing::debug!(module = %name, documents = docs.len(), "resolved module");
        system.add_module(module).map_err(|e| {
            docs[0]
                .ctx
                .validation_error(e.to_string(), &docs[0].raw.module)
        })?;
    }
    Ok(system)
}

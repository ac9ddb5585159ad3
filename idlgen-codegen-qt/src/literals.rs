//! Literals built from annotation values.
//!
//! Annotations carry plain YAML values. [`default_value`] turns such a value
//! into a C++ initializer for a symbol, [`simulation_data`] gathers the
//! simulator annotations of a module into one JSON document. Both follow
//! the symbol's type: struct values hold one entry per field, list and model
//! values one entry per row, enum values are `|`-joined member names.

use idlgen_model::{Interface, Module, Primitive, Symbol, Type};
use serde_json::{Map, Value, json};

use crate::{MappingError, QtTypeMapper};

type Result<T> = std::result::Result<T, MappingError>;

/// Entries of a struct value, in field order.
fn struct_entries<'v>(
    filter: &'static str,
    symbol: &Symbol<'_>,
    value: &'v Value,
    fields: usize,
) -> Result<Vec<&'v Value>> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => {
            return Err(MappingError::Shape {
                filter,
                symbol: symbol.qualified_name(),
                expected: "dict or list",
            });
        }
    };
    if entries.len() != fields {
        return Err(MappingError::FieldCount {
            filter,
            symbol: symbol.qualified_name(),
            expected: fields,
            actual: entries.len(),
        });
    }
    Ok(entries)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// C++ initializer for `symbol` from an annotation `value`.
pub fn default_value(mapper: &QtTypeMapper<'_>, symbol: &Symbol<'_>, value: &Value) -> Result<String> {
    const FILTER: &str = "default_value";
    match symbol.ty {
        Type::Struct(reference) => {
            let (module, structure) = mapper
                .system()
                .structure(reference)
                .ok_or_else(|| MappingError::UnknownType {
                    filter: FILTER,
                    symbol: symbol.name.to_string(),
                    ty: symbol.ty.name().to_string(),
                })?;
            let entries = struct_entries(FILTER, symbol, value, structure.fields.len())?;
            let values = structure
                .fields
                .iter()
                .zip(entries)
                .map(|(field, entry)| default_value(mapper, &Symbol::field(module, structure, field), entry))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{}({{{}}})", structure.name, values.join(", ")))
        }
        Type::List(nested) | Type::Model(nested) => {
            let Value::Array(rows) = value else {
                return Err(MappingError::Shape {
                    filter: FILTER,
                    symbol: symbol.qualified_name(),
                    expected: "list",
                });
            };
            let row = symbol.with_type(nested);
            let wrap = symbol.ty.is_list() && nested.is_struct();
            let rows = rows
                .iter()
                .map(|entry| {
                    let literal = default_value(mapper, &row, entry)?;
                    Ok(if wrap {
                        format!("QVariant::fromValue({})", literal)
                    } else {
                        literal
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{{{}}}", rows.join(", ")))
        }
        Type::Enum(_) | Type::Flag(_) => {
            let module_name = mapper.enum_module_name(FILTER, symbol)?;
            Ok(mapper.enum_value(&plain(value), &module_name))
        }
        Type::Primitive(Primitive::Bool) => Ok(if truthy(value) { "true" } else { "false" }.to_string()),
        Type::Primitive(Primitive::String) => Ok(format!(r#"u"{}"_s"#, plain(value).replace('\\', "\\\\"))),
        Type::Primitive(Primitive::Var) => match value {
            Value::String(s) => Ok(format!(r#"QVariant(u"{}"_s)"#, s)),
            other => Ok(format!("QVariant({})", other)),
        },
        Type::Void | Type::Primitive(Primitive::Int | Primitive::Real) => Ok(plain(value)),
        Type::Interface(_) | Type::Map(_) => Err(QtTypeMapper::unknown(FILTER, symbol)),
    }
}

/// Normalize an annotation `value` of `symbol` for the simulator.
///
/// Structs become `{"type": <name>, "value": [...]}`, enum values
/// `{"type": "enum", "value": <literal>}`, rows of complex lists and models
/// are normalized one by one. Anything else is kept as is.
pub fn symbol_to_json(mapper: &QtTypeMapper<'_>, symbol: &Symbol<'_>, value: &Value) -> Result<Value> {
    const FILTER: &str = "simulationData";
    match symbol.ty {
        Type::Struct(reference) => {
            let (module, structure) = mapper
                .system()
                .structure(reference)
                .ok_or_else(|| MappingError::UnknownType {
                    filter: FILTER,
                    symbol: symbol.name.to_string(),
                    ty: symbol.ty.name().to_string(),
                })?;
            let entries = struct_entries(FILTER, symbol, value, structure.fields.len())?;
            let values = structure
                .fields
                .iter()
                .zip(entries)
                .map(|(field, entry)| symbol_to_json(mapper, &Symbol::field(module, structure, field), entry))
                .collect::<Result<Vec<_>>>()?;
            Ok(json!({ "type": structure.name, "value": values }))
        }
        Type::Enum(_) | Type::Flag(_) => {
            let module_name = mapper.enum_module_name(FILTER, symbol)?;
            Ok(json!({ "type": "enum", "value": mapper.enum_value(&plain(value), &module_name) }))
        }
        Type::List(nested) | Type::Model(nested) if nested.is_complex() => {
            let Value::Array(rows) = value else {
                return Ok(value.clone());
            };
            let row = symbol.with_type(nested);
            rows.iter()
                .map(|entry| symbol_to_json(mapper, &row, entry))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        _ => Ok(value.clone()),
    }
}

/// Zone entries of a per-zone annotation value, plus the `=` wildcard.
fn zoned(
    value: &Map<String, Value>,
    zones: &[String],
    convert: impl Fn(&Value) -> Result<Value>,
) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for zone in zones.iter().map(String::as_str).chain(["="]) {
        if let Some(entry) = value.get(zone) {
            out.insert(zone.to_string(), convert(entry)?);
        }
    }
    Ok(out)
}

fn interface_data(mapper: &QtTypeMapper<'_>, module: &Module, interface: &Interface) -> Result<Map<String, Value>> {
    let mut data = interface.config.simulator.clone().unwrap_or_default();
    let zones = interface.config.zones();

    for property in &interface.properties {
        let Some(simulation) = property.config.simulator.as_ref() else {
            continue;
        };
        let symbol = Symbol::property(module, interface, property);
        let mut entries = match data.get(&property.name) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        for (key, value) in simulation.entries() {
            let convert = |v: &Value| -> Result<Value> {
                if key == "unsupported" {
                    Ok(v.clone())
                } else {
                    symbol_to_json(mapper, &symbol, v)
                }
            };
            let entry = match value {
                Value::Object(map) if !zones.is_empty() => Value::Object(zoned(map, &zones, &convert)?),
                other => convert(other)?,
            };
            entries.insert(key.to_string(), entry);
        }
        data.insert(property.name.clone(), Value::Object(entries));
    }
    Ok(data)
}

/// Simulator annotations of every interface of `module` as pretty JSON.
pub fn simulation_data(mapper: &QtTypeMapper<'_>, module: &Module) -> Result<String> {
    let mut data = Map::new();
    for interface in &module.interfaces {
        data.insert(
            interface.name.clone(),
            Value::Object(interface_data(mapper, module, interface)?),
        );
    }
    Ok(serde_json::to_string_pretty(&Value::Object(data)).unwrap_or_default())
}

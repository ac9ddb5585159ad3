//! Names derived from model nodes, with annotation overrides.

use std::collections::BTreeSet;

use idlgen_core::upper_first;
use idlgen_model::{NodeRef, Type};

use crate::{MappingError, QtTypeMapper};

/// Getter of a property: `config.getter_name` or the property name.
pub fn getter_name(node: &NodeRef<'_>) -> String {
    match node {
        NodeRef::Property(_, _, property) => property
            .config
            .getter_name
            .clone()
            .unwrap_or_else(|| property.name.clone()),
        other => other.name().to_string(),
    }
}

/// Setter of a property: `config.setter_name` or `set<Name>`.
pub fn setter_name(node: &NodeRef<'_>) -> String {
    match node {
        NodeRef::Property(_, _, property) if property.config.setter_name.is_some() => {
            property.config.setter_name.clone().unwrap_or_default()
        }
        other => format!("set{}", upper_first(other.name())),
    }
}

/// QML name of an interface, struct or enum, the node name by default.
pub fn qml_type(node: &NodeRef<'_>) -> String {
    let configured = match node {
        NodeRef::Interface(_, interface) => interface.config.qml_type.clone(),
        NodeRef::Struct(_, structure) => structure.config.qml_type.clone(),
        NodeRef::Enum(_, enumeration) => enumeration.config.qml_type.clone(),
        other => other
            .tags()
            .get_str("config", "qml_type")
            .or_else(|| other.tags().get_str("config", "qml_name"))
            .map(str::to_string),
    };
    configured.unwrap_or_else(|| node.name().to_string())
}

/// `flag_type` of an enum node.
pub fn flag_type(node: &NodeRef<'_>) -> String {
    match node {
        NodeRef::Enum(_, enumeration) => QtTypeMapper::flag_type_of(enumeration),
        other => other.name().to_string(),
    }
}

/// `#include "<struct>.h"` lines for the structs a struct or interface uses.
///
/// Sorted, without duplicates, lowercase.
pub fn struct_includes(node: &NodeRef<'_>) -> Vec<String> {
    let mut types: Vec<&Type> = Vec::new();
    match node {
        NodeRef::Struct(_, structure) => {
            types.extend(structure.fields.iter().map(|f| &f.ty));
        }
        NodeRef::Interface(_, interface) => {
            types.extend(interface.properties.iter().map(|p| &p.ty));
            for operation in &interface.operations {
                types.extend(operation.parameters.iter().map(|p| &p.ty));
                types.push(&operation.ty);
            }
            for signal in &interface.signals {
                types.extend(signal.parameters.iter().map(|p| &p.ty));
            }
        }
        _ => {}
    }

    let includes: BTreeSet<String> = types
        .into_iter()
        .filter_map(|ty| match ty {
            Type::Struct(reference) => Some(format!("#include \"{}.h\"", reference.name).to_lowercase()),
            _ => None,
        })
        .collect();
    includes.into_iter().collect()
}

const COMMENT_START: &[&str] = &["/**", "/*!", "/*"];

/// The lines of a `/** ... */` comment without the comment markers.
///
/// An empty comment has no lines.
pub fn comment_text(comment: &str) -> Result<Vec<String>, MappingError> {
    if comment.is_empty() {
        return Ok(Vec::new());
    }
    let body = COMMENT_START
        .iter()
        .find_map(|token| comment.strip_prefix(token))
        .ok_or(MappingError::NotAComment(COMMENT_START))?;
    let body = body.strip_suffix("*/").unwrap_or(body);

    Ok(body
        .lines()
        .map(|line| line.trim_start_matches([' ', '*']).to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use idlgen_model::{Enum, Field, Interface, Module, Operation, Parameter, Property, Struct, Version};

    use super::*;

    #[test]
    fn test_property_accessors() {
        let module = Module::new("demo", Version::new(1, 0));
        let interface = Interface::new("Echo");
        let plain = Property::new("speed", Type::INT);
        let mut custom = Property::new("enabled", Type::BOOL);
        custom.config.getter_name = Some("isEnabled".into());
        custom.config.setter_name = Some("enable".into());

        let node = NodeRef::Property(&module, &interface, &plain);
        assert_eq!(getter_name(&node), "speed");
        assert_eq!(setter_name(&node), "setSpeed");

        let node = NodeRef::Property(&module, &interface, &custom);
        assert_eq!(getter_name(&node), "isEnabled");
        assert_eq!(setter_name(&node), "enable");
    }

    #[test]
    fn test_qml_type_and_flag_type() {
        let module = Module::new("demo", Version::new(1, 0));
        let mut interface = Interface::new("Echo");
        assert_eq!(qml_type(&NodeRef::Interface(&module, &interface)), "Echo");
        interface.config.qml_type = Some("EchoItem".into());
        assert_eq!(qml_type(&NodeRef::Interface(&module, &interface)), "EchoItem");

        let mut options = Enum::flag("Option", ["A", "B"]);
        assert_eq!(flag_type(&NodeRef::Enum(&module, &options)), "Options");
        options.config.flag_type = Some("OptionSet".into());
        assert_eq!(flag_type(&NodeRef::Enum(&module, &options)), "OptionSet");
    }

    #[test]
    fn test_struct_includes() {
        let module = Module::new("demo", Version::new(1, 0));
        let interface = Interface::new("Echo")
            .with_property(Property::new("origin", Type::structure("demo", "Point")))
            .with_property(Property::new("count", Type::INT))
            .with_operation(
                Operation::new("move", Type::structure("demo", "Point"))
                    .with_parameter(Parameter::new("area", Type::structure("demo", "AreaInfo"))),
            );
        assert_eq!(
            struct_includes(&NodeRef::Interface(&module, &interface)),
            vec![r#"#include "areainfo.h""#, r#"#include "point.h""#]
        );

        let structure = Struct::new("Line").with_field(Field::new("start", Type::structure("demo", "Point")));
        assert_eq!(
            struct_includes(&NodeRef::Struct(&module, &structure)),
            vec![r#"#include "point.h""#]
        );
    }

    #[test]
    fn test_comment_text() {
        assert_eq!(
            comment_text("/**\n * Speed in km/h.\n * Never negative.\n */").unwrap(),
            vec!["", "Speed in km/h.", "Never negative.", ""]
        );
        assert_eq!(comment_text("/* short */").unwrap(), vec!["short "]);
        assert!(comment_text("").unwrap().is_empty());
        assert!(matches!(
            comment_text("// nope"),
            Err(MappingError::NotAComment(_))
        ));
    }
}

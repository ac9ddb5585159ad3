//! Registration of the Qt filters with a template engine.

use std::{borrow::Cow, sync::Arc};

use idlgen_codegen::{
    FilterSet, TemplateEngine,
    objects::{Node, Typed, expect_module, expect_typed, invalid},
};
use idlgen_core::strip_qt;
use idlgen_model::{NodeRef, Symbol, System};
use minijinja::{Error, value::Value};

use crate::{
    MappingError, QtTypeMapper, literals, naming,
    namespace::{begin_namespace, end_namespace, namespace, namespace_prefix},
};

/// The Qt/C++ filter set.
///
/// ```yaml
/// # in a template
/// {{ property|return_type }} {{ property|getter_name }}() const;
/// void {{ property|setter_name }}({{ property|parameter_type }});
/// ```
#[derive(Debug, Clone, Default)]
pub struct QtFilters {
    class_prefix: Arc<str>,
}

impl QtFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix put in front of enum scopes, e.g. `Q` for `QClimate::Warm`.
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Arc::from(prefix.into());
        self
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }
}

fn node(value: &Value, filter: &str) -> Result<Arc<Node>, Error> {
    Node::from_value(value)
        .ok_or_else(|| invalid(format!("{}: Unknown symbol {} of type {}", filter, value, value.kind())))
}

fn resolved<'a>(node: &'a Node, filter: &str) -> Result<NodeRef<'a>, Error> {
    node.resolve()
        .ok_or_else(|| invalid(format!("{}: Unknown symbol {}", filter, node.name())))
}

/// Add a filter that maps a typed symbol through the [`QtTypeMapper`].
fn typed_filter(
    engine: &mut TemplateEngine,
    name: &'static str,
    prefix: &Arc<str>,
    map: fn(&QtTypeMapper<'_>, &Symbol<'_>) -> Result<String, MappingError>,
) {
    let prefix = prefix.clone();
    engine.add_filter(name, move |value: Value| -> Result<String, Error> {
        let typed = expect_typed(&value, name)?;
        let symbol = symbol(&typed, name)?;
        Ok(map(&QtTypeMapper::new(typed.system(), &prefix), &symbol)?)
    });
}

fn symbol<'a>(typed: &'a Typed, filter: &str) -> Result<Symbol<'a>, Error> {
    typed
        .symbol()
        .ok_or_else(|| invalid(format!("{}: symbol has no type", filter)))
}

fn json(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(|e| invalid(format!("not a plain annotation value: {}", e)))
}

impl FilterSet for QtFilters {
    fn name(&self) -> &'static str {
        "qt"
    }

    fn register(&self, engine: &mut TemplateEngine) {
        let prefix = self.class_prefix.clone();

        typed_filter(engine, "return_type", &prefix, |m, s| m.return_type(s));
        typed_filter(engine, "parameter_type", &prefix, |m, s| m.parameter_type(s));
        typed_filter(engine, "parameter_type_default", &prefix, |m, s| m.parameter_type_default(s));
        typed_filter(engine, "default_type_value", &prefix, |m, s| m.default_type_value(s));
        typed_filter(engine, "test_type_value", &prefix, |m, s| m.test_type_value(s));
        typed_filter(engine, "qml_info_type", &prefix, |m, s| m.qml_info_type(s));

        let p = prefix.clone();
        engine.add_filter(
            "default_value",
            move |value: Value, annotation: Option<Value>| -> Result<String, Error> {
                let typed = expect_typed(&value, "default_value")?;
                let symbol = symbol(&typed, "default_value")?;
                let mapper = QtTypeMapper::new(typed.system(), &p);
                // without an explicit value the simulator default applies
                let annotation = match annotation {
                    Some(annotation) => Some(json(&annotation)?),
                    None => symbol
                        .property_config()
                        .and_then(|config| config.simulator.as_ref())
                        .and_then(|simulation| simulation.default.clone()),
                };
                match annotation {
                    Some(annotation) => Ok(literals::default_value(&mapper, &symbol, &annotation)?),
                    None => Ok(mapper.default_type_value(&symbol)?),
                }
            },
        );

        let p = prefix.clone();
        engine.add_filter("flag_type", move |value: Value| -> Result<String, Error> {
            if let Some(typed) = Typed::from_value(&value) {
                if let Some(symbol) = typed.symbol() {
                    return Ok(QtTypeMapper::new(typed.system(), &p).flag_type(&symbol)?);
                }
            }
            let node = node(&value, "flag_type")?;
            Ok(naming::flag_type(&resolved(&node, "flag_type")?))
        });

        let p = prefix.clone();
        engine.add_filter("enum_value", move |value: Cow<'_, str>, module_name: Cow<'_, str>| {
            // plain literals, nothing to look up
            let system = System::new();
            QtTypeMapper::new(&system, &p).enum_value(&value, &module_name)
        });

        let p = prefix.clone();
        engine.add_filter("simulationData", move |module: Value| -> Result<String, Error> {
            let module = expect_module(&module)?;
            let mapper = QtTypeMapper::new(module.system(), &p);
            let module = module.module().ok_or(MappingError::NotAModule)?;
            Ok(literals::simulation_data(&mapper, module)?)
        });

        engine.add_filter("getter_name", |value: Value| -> Result<String, Error> {
            let node = node(&value, "getter_name")?;
            Ok(naming::getter_name(&resolved(&node, "getter_name")?))
        });
        engine.add_filter("setter_name", |value: Value| -> Result<String, Error> {
            let node = node(&value, "setter_name")?;
            Ok(naming::setter_name(&resolved(&node, "setter_name")?))
        });
        engine.add_filter("qml_type", |value: Value| -> Result<String, Error> {
            let node = node(&value, "qml_type")?;
            Ok(naming::qml_type(&resolved(&node, "qml_type")?))
        });
        engine.add_filter("struct_includes", |value: Value| -> Result<Vec<String>, Error> {
            let node = node(&value, "struct_includes")?;
            Ok(naming::struct_includes(&resolved(&node, "struct_includes")?))
        });
        engine.add_filter("comment_text", |comment: Cow<'_, str>| -> Result<Vec<String>, Error> {
            Ok(naming::comment_text(&comment)?)
        });
        engine.add_filter("strip_QT", |value: Cow<'_, str>| strip_qt(&value).to_string());

        engine.add_filter("namespace", |module: Value| -> Result<String, Error> {
            let node = expect_module(&module)?;
            Ok(namespace(node.module().ok_or(MappingError::NotAModule)?))
        });
        engine.add_filter("namespace_prefix", |module: Value| -> Result<String, Error> {
            let node = expect_module(&module)?;
            Ok(namespace_prefix(node.module().ok_or(MappingError::NotAModule)?))
        });
        engine.add_filter("begin_namespace", |module: Value| -> Result<String, Error> {
            let node = expect_module(&module)?;
            Ok(begin_namespace(node.module().ok_or(MappingError::NotAModule)?))
        });
        engine.add_filter("end_namespace", |module: Value| -> Result<String, Error> {
            let node = expect_module(&module)?;
            Ok(end_namespace(node.module().ok_or(MappingError::NotAModule)?))
        });
        engine.add_filter(
            "add_namespace_prefix",
            |symbol: Value, module: Option<Value>| -> Result<String, Error> {
                // a symbol node knows its module, plain strings need one passed in
                let owner = match Node::from_value(&symbol) {
                    Some(node) => node,
                    None => expect_module(module.as_ref().ok_or(MappingError::NotAModule)?)?,
                };
                let module = owner.module().ok_or(MappingError::NotAModule)?;
                Ok(format!("{}{}", namespace_prefix(module), symbol))
            },
        );

        tracing::debug!("registered qt filters (class prefix '{}')", self.class_prefix);
    }
}

//! Model validation before any output is written.

use eyre::{Result, bail};
use idlgen_model::{NodeRef, System, Type};
use serde_json::Value;

use crate::{
    Diagnostic, GenerateError,
    pipeline::{Phase, PrepareContext},
};

/// Reject type kinds the generated code cannot express.
///
/// Interfaces and maps are not allowed as property, argument, return value
/// or field types. The first offender aborts the run.
pub fn check_supported_types(src: &str, system: &System) -> Result<(), GenerateError> {
    let check = |ty: &Type, kind: &'static str| -> Result<(), GenerateError> {
        let unsupported = match ty {
            Type::Interface(_) => "interface",
            Type::Map(_) => "map",
            _ => return Ok(()),
        };
        Err(GenerateError::UnsupportedType {
            src: src.to_string(),
            kind,
            ty: unsupported,
        })
    };

    for module in system.modules() {
        for interface in &module.interfaces {
            for property in &interface.properties {
                check(&property.ty, "Properties")?;
            }
            for operation in &interface.operations {
                for parameter in &operation.parameters {
                    check(&parameter.ty, "Arguments")?;
                }
                check(&operation.ty, "Return values")?;
            }
            for signal in &interface.signals {
                for parameter in &signal.parameters {
                    check(&parameter.ty, "Arguments")?;
                }
            }
        }
        for structure in &module.structs {
            for field in &structure.fields {
                check(&field.ty, "Fields")?;
            }
        }
    }
    Ok(())
}

/// Visit every node with its qualified name, parents before children.
pub fn walk<'a>(system: &'a System, mut visit: impl FnMut(String, NodeRef<'a>)) {
    for module in system.modules() {
        visit(module.name.clone(), NodeRef::Module(module));
        for interface in &module.interfaces {
            let base = format!("{}.{}", module.name, interface.name);
            visit(base.clone(), NodeRef::Interface(module, interface));
            for property in &interface.properties {
                let name = format!("{}#{}", base, property.name);
                visit(name, NodeRef::Property(module, interface, property));
            }
            for operation in &interface.operations {
                let name = format!("{}#{}", base, operation.name);
                visit(name.clone(), NodeRef::Operation(module, interface, operation));
                for parameter in &operation.parameters {
                    let name = format!("{}.{}", name, parameter.name);
                    visit(name, NodeRef::Parameter(module, interface, parameter));
                }
            }
            for signal in &interface.signals {
                let name = format!("{}#{}", base, signal.name);
                visit(name.clone(), NodeRef::Signal(module, interface, signal));
                for parameter in &signal.parameters {
                    let name = format!("{}.{}", name, parameter.name);
                    visit(name, NodeRef::Parameter(module, interface, parameter));
                }
            }
        }
        for structure in &module.structs {
            let base = format!("{}.{}", module.name, structure.name);
            visit(base.clone(), NodeRef::Struct(module, structure));
            for field in &structure.fields {
                let name = format!("{}#{}", base, field.name);
                visit(name, NodeRef::Field(module, structure, field));
            }
        }
        for enumeration in &module.enums {
            let base = format!("{}.{}", module.name, enumeration.name);
            visit(base.clone(), NodeRef::Enum(module, enumeration));
            for member in &enumeration.members {
                let name = format!("{}#{}", base, member.name);
                visit(name, NodeRef::Member(module, enumeration, member));
            }
        }
    }
}

/// A check over the prepared model.
pub trait Lint: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, system: &System, diagnostics: &mut Vec<Diagnostic>);
}

/// An annotation scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    /// Node kind the annotation applies to, e.g. `Interface`.
    pub kind: &'static str,
    /// Dotted tag path, e.g. `config.qml_name`.
    pub annotation: String,
    pub since: String,
}

/// Warns about deprecated annotations that are set on a node.
#[derive(Debug, Clone, Default)]
pub struct DeprecatedAnnotationLint {
    deprecations: Vec<Deprecation>,
}

impl DeprecatedAnnotationLint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deprecate(
        mut self,
        kind: &'static str,
        annotation: impl Into<String>,
        since: impl Into<String>,
    ) -> Self {
        self.deprecations.push(Deprecation {
            kind,
            annotation: annotation.into(),
            since: since.into(),
        });
        self
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

impl Lint for DeprecatedAnnotationLint {
    fn name(&self) -> &'static str {
        "deprecated-annotation"
    }

    fn check(&self, system: &System, diagnostics: &mut Vec<Diagnostic>) {
        if self.deprecations.is_empty() {
            return;
        }
        walk(system, |name, node| {
            for deprecation in self.deprecations.iter().filter(|d| d.kind == node.kind()) {
                if node.tags().lookup(&deprecation.annotation).is_some_and(is_set) {
                    diagnostics.push(
                        Diagnostic::warning(
                            self.name(),
                            format!(
                                "{} is deprecated and will be removed in future Qt versions",
                                deprecation.annotation
                            ),
                        )
                        .at(name.clone()),
                    );
                }
            }
        });
    }
}

/// Rejects unsupported types, then runs lints.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// A validate phase with the default lints.
    pub fn new() -> Self {
        Self::empty().with_lint(DeprecatedAnnotationLint::new())
    }

    /// A validate phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn run(&self, ctx: &mut PrepareContext) -> Result<()> {
        check_supported_types(&ctx.src_file, &ctx.system)?;

        let start = ctx.diagnostics.len();
        for lint in &self.lints {
            lint.check(&ctx.system, &mut ctx.diagnostics);
        }
        for diagnostic in &ctx.diagnostics[start..] {
            let message = match &diagnostic.location {
                Some(location) => format!("{}: {}", location, diagnostic.message),
                None => diagnostic.message.clone(),
            };
            if diagnostic.severity.is_error() {
                tracing::error!("{}: error: {}", ctx.src_file, message);
            } else {
                ctx.reporter.warning_in(Some(&ctx.src_file), message);
            }
        }

        if ctx.has_errors() {
            bail!("validation failed with {} error(s)", ctx.error_count());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use idlgen_model::{
        Field, Interface, Module, Operation, Parameter, Property, Signal, Struct, Tags, Version,
    };
    use serde_json::json;

    use super::*;
    use crate::Reporter;

    fn module() -> Module {
        Module::new("org.example", Version::new(1, 0))
    }

    fn system(module: Module) -> System {
        System::new().with_module(module).unwrap()
    }

    fn unsupported(system: &System) -> String {
        check_supported_types("echo.yaml", system)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_supported_model_passes() {
        let echo = Interface::new("Echo")
            .with_property(Property::new("items", Type::list(Type::INT)))
            .with_operation(Operation::new("ping", Type::Void));
        assert!(check_supported_types("echo.yaml", &system(module().with_interface(echo))).is_ok());
    }

    #[test]
    fn test_unsupported_kinds() {
        let property = Interface::new("A")
            .with_property(Property::new("other", Type::interface("org.example", "B")));
        assert_eq!(
            unsupported(&system(module().with_interface(property))),
            "echo.yaml: Properties of type 'interface' are not supported"
        );

        let argument = Interface::new("A").with_signal(
            Signal::new("changed").with_parameter(Parameter::new("m", Type::map(Type::INT))),
        );
        assert_eq!(
            unsupported(&system(module().with_interface(argument))),
            "echo.yaml: Arguments of type 'map' are not supported"
        );

        let ret = Interface::new("A")
            .with_operation(Operation::new("get", Type::map(Type::STRING)));
        assert_eq!(
            unsupported(&system(module().with_interface(ret))),
            "echo.yaml: Return values of type 'map' are not supported"
        );

        let field = Struct::new("S").with_field(Field::new("f", Type::interface("org.example", "A")));
        assert_eq!(
            unsupported(&system(module().with_struct(field))),
            "echo.yaml: Fields of type 'interface' are not supported"
        );
    }

    #[test]
    fn test_deprecated_annotation_lint() {
        let echo = Interface::new("Echo")
            .with_tags(Tags::from_value(json!({ "config": { "qml_name": "EchoItem" } })));
        let quiet = Interface::new("Quiet")
            .with_tags(Tags::from_value(json!({ "config": { "qml_name": "" } })));
        let system = system(module().with_interface(echo).with_interface(quiet));

        let lint = DeprecatedAnnotationLint::new().deprecate("Interface", "config.qml_name", "6.9");
        let mut diagnostics = Vec::new();
        lint.check(&system, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_warning());
        assert_eq!(diagnostics[0].location.as_deref(), Some("org.example.Echo"));
        assert_eq!(
            diagnostics[0].message,
            "config.qml_name is deprecated and will be removed in future Qt versions"
        );
    }

    #[test]
    fn test_validate_phase_keeps_warnings() {
        let echo = Interface::new("Echo")
            .with_tags(Tags::from_value(json!({ "config": { "qml_name": "EchoItem" } })));
        let phase = ValidatePhase::empty().with_lint(
            DeprecatedAnnotationLint::new().deprecate("Interface", "config.qml_name", "6.9"),
        );
        let mut ctx =
            PrepareContext::new(system(module().with_interface(echo)), "echo.yaml", Reporter::new());

        phase.run(&mut ctx).unwrap();
        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(ctx.reporter.warning_count(), 1);
    }

    #[test]
    fn test_walk_visits_every_node() {
        let echo = Interface::new("Echo").with_operation(
            Operation::new("echo", Type::STRING).with_parameter(Parameter::new("msg", Type::STRING)),
        );
        let mut names = Vec::new();
        walk(&system(module().with_interface(echo)), |name, _| names.push(name));
        assert_eq!(
            names,
            vec![
                "org.example",
                "org.example.Echo",
                "org.example.Echo#echo",
                "org.example.Echo#echo.msg"
            ]
        );
    }
}

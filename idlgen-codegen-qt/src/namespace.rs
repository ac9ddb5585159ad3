//! C++ namespaces derived from the module `namespace` annotation.
//!
//! | `config.namespace` | namespace         | begin                 |
//! |--------------------|-------------------|-----------------------|
//! | unset or empty     | ``                | ``                    |
//! | `qt`               | ``                | `QT_BEGIN_NAMESPACE`  |
//! | `module`           | `org::example`    | `namespace org::example {` |
//! | anything else      | the literal value | `namespace <value> {` |

use idlgen_model::{Module, NamespaceMode};

/// The namespace of `module`, empty when there is none.
///
/// The implicit Qt namespace is only available from C++ and maps to empty.
pub fn namespace(module: &Module) -> String {
    match &module.config.namespace {
        NamespaceMode::None | NamespaceMode::Implicit => String::new(),
        NamespaceMode::FromModule => module.name.replace('.', "::"),
        NamespaceMode::Explicit(namespace) => namespace.clone(),
    }
}

/// `::<namespace>::`, ready to be put in front of a class name.
pub fn namespace_prefix(module: &Module) -> String {
    let namespace = namespace(module);
    if namespace.is_empty() {
        String::new()
    } else {
        format!("::{}::", namespace)
    }
}

pub fn begin_namespace(module: &Module) -> String {
    match &module.config.namespace {
        NamespaceMode::None => String::new(),
        NamespaceMode::Implicit => "QT_BEGIN_NAMESPACE".to_string(),
        NamespaceMode::FromModule => format!("namespace {} {{", module.name.replace('.', "::")),
        NamespaceMode::Explicit(namespace) => format!("namespace {} {{", namespace),
    }
}

pub fn end_namespace(module: &Module) -> String {
    match &module.config.namespace {
        NamespaceMode::None => String::new(),
        NamespaceMode::Implicit => "QT_END_NAMESPACE".to_string(),
        NamespaceMode::FromModule => format!("}}; // namespace {}", module.name.replace('.', "::")),
        NamespaceMode::Explicit(namespace) => format!("}}; // namespace {}", namespace),
    }
}

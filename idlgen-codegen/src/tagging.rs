//! Generation config tagging.
//!
//! After annotations are merged every module, interface, property,
//! operation, signal, struct, field, enum and enum member carries a `config`
//! tag namespace. Module tags additionally receive the caller's `module` and
//! `force` settings. The typed config records of each node are filled from
//! the final tags so filters never look up free-form keys.

use eyre::Result;
use idlgen_model::{
    EnumConfig, InterfaceConfig, ModuleConfig, NamespaceMode, PropertyConfig, PropertySimulation,
    StructConfig, System, Tags,
};
use serde_json::Value;

use crate::pipeline::{Phase, PrepareContext};

/// Tag namespace holding the generation config.
pub const CONFIG: &str = "config";
/// Tag namespace holding simulator metadata.
pub const CONFIG_SIMULATOR: &str = "config_simulator";

/// Settings supplied by the caller for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Target module identifier.
    pub module: Option<String>,
    /// Force overwriting of every output file.
    pub force: bool,
}

fn string(tags: &Tags, key: &str) -> Option<String> {
    tags.get_str(CONFIG, key)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn qml_type(tags: &Tags) -> Option<String> {
    string(tags, "qml_type").or_else(|| string(tags, "qml_name"))
}

/// Tag every node of `system` and fill the typed config records.
pub fn tag_system(system: &mut System, config: &GenerationConfig) {
    for module in system.modules_mut() {
        let tags = module.tags.ensure_namespace(CONFIG);
        tags.insert(
            "module".to_string(),
            config.module.clone().map(Value::String).unwrap_or(Value::Null),
        );
        tags.insert("force".to_string(), Value::Bool(config.force));
        module.config = ModuleConfig {
            module: config.module.clone(),
            force: config.force,
            namespace: NamespaceMode::from_tag(module.tags.get_str(CONFIG, "namespace")),
        };

        for interface in &mut module.interfaces {
            interface.tags.ensure_namespace(CONFIG);
            interface.config = InterfaceConfig {
                qml_type: qml_type(&interface.tags),
                simulator: interface.tags.namespace(CONFIG_SIMULATOR).cloned(),
            };
            for property in &mut interface.properties {
                property.tags.ensure_namespace(CONFIG);
                property.config = PropertyConfig {
                    getter_name: string(&property.tags, "getter_name"),
                    setter_name: string(&property.tags, "setter_name"),
                    simulator: property
                        .tags
                        .namespace(CONFIG_SIMULATOR)
                        .map(PropertySimulation::from_map),
                };
            }
            for operation in &mut interface.operations {
                operation.tags.ensure_namespace(CONFIG);
            }
            for signal in &mut interface.signals {
                signal.tags.ensure_namespace(CONFIG);
            }
        }

        for structure in &mut module.structs {
            structure.tags.ensure_namespace(CONFIG);
            structure.config = StructConfig {
                qml_type: qml_type(&structure.tags),
            };
            for field in &mut structure.fields {
                field.tags.ensure_namespace(CONFIG);
            }
        }

        for enumeration in &mut module.enums {
            enumeration.tags.ensure_namespace(CONFIG);
            enumeration.config = EnumConfig {
                flag_type: string(&enumeration.tags, "type"),
                qml_type: qml_type(&enumeration.tags),
            };
            for member in &mut enumeration.members {
                member.tags.ensure_namespace(CONFIG);
            }
        }
    }
}

/// Applies [`tag_system`] as a pipeline phase.
pub struct TagPhase {
    config: GenerationConfig,
}

impl TagPhase {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }
}

impl Phase for TagPhase {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn run(&self, ctx: &mut PrepareContext) -> Result<()> {
        tag_system(&mut ctx.system, &self.config);
        Ok(())
    }
}

//! Rule traversal.
//!
//! The engine walks the prepared model in declaration order, system first,
//! then every allowed module followed by its interfaces, structs and enums,
//! and instantiates the templates named by the matching rule at each level.
//!
//! The template context accumulates: every rule adds the current node under
//! its level name (`module`, `interface`, ...) and its own `context` values,
//! later keys win. A rule's `path` and `source` stay in effect for later
//! rules of the same document until another rule sets them.

use std::{
    collections::{BTreeSet, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use idlgen_core::WriteResult;
use idlgen_model::{Module, System};
use minijinja::value::Value;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::{
    FilterRegistry, GenerateError, TemplateEngine,
    objects::{Node, NodePath},
    rules::{Condition, LegacyRule, LegacyRules, Rule, RuleDocument, RuleSet},
    templates::{Context, template_name},
};

/// Notice printed once when a legacy rules file is used.
pub const LEGACY_NOTICE: &str = "Using the legacy Generation YAML Parser. Please consider porting to the new Rule based Generation";

/// Files touched by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub preserved: Vec<PathBuf>,
    /// Warnings reported while rendering.
    pub warnings: usize,
}

impl GenerateReport {
    fn record(&mut self, path: PathBuf, result: WriteResult) {
        match result {
            WriteResult::Written => self.written.push(path),
            WriteResult::Unchanged => self.unchanged.push(path),
            WriteResult::Preserved => self.preserved.push(path),
        }
    }

    /// Number of files rendered, whatever happened to them.
    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len() + self.preserved.len()
    }
}

/// Inputs of one traversal.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub system: Arc<System>,
    /// Names of the modules to generate, from the import-free pass.
    pub modules: Vec<String>,
    pub destination: PathBuf,
    pub features: BTreeSet<String>,
    /// Rewrite every output file.
    pub force: bool,
    /// Variables every template sees.
    pub context: Context,
}

/// Walks a model and instantiates templates according to a [`RuleSet`].
pub struct RuleEngine<'a> {
    templates: TemplateEngine,
    filters: &'a FilterRegistry,
    traversal: Traversal,
    context: Context,
    path: String,
    source: Option<String>,
    loaded: HashSet<String>,
    report: GenerateReport,
}

fn json_to_value(value: &JsonValue) -> Value {
    Value::from_serialize(value)
}

impl<'a> RuleEngine<'a> {
    /// Create an engine, installing the default filter sets of `filters`.
    pub fn new(mut templates: TemplateEngine, filters: &'a FilterRegistry, traversal: Traversal) -> Self {
        filters.install_defaults(&mut templates);
        let mut context = traversal.context.clone();
        context.insert(
            "system".to_string(),
            Node::root(traversal.system.clone()).into_value(),
        );
        Self {
            templates,
            filters,
            traversal,
            context,
            path: String::new(),
            source: None,
            loaded: HashSet::new(),
            report: GenerateReport::default(),
        }
    }

    /// Load the filter plugin called `name` once.
    pub fn load_filters(&mut self, name: &str) -> Result<(), GenerateError> {
        if self.loaded.insert(name.to_string()) {
            self.filters.install(name, &mut self.templates)?;
        }
        Ok(())
    }

    /// Run `rules` and return what was written.
    pub fn run(mut self, rules: &RuleSet) -> Result<GenerateReport, GenerateError> {
        match rules {
            RuleSet::Modern(documents) => {
                for document in documents {
                    self.process_document(document)?;
                }
            }
            RuleSet::Legacy(legacy) => self.process_legacy(legacy)?,
        }
        let mut report = self.report;
        report.warnings = self.templates.reporter().warning_count();
        Ok(report)
    }

    fn proceeds(&self, condition: &Condition) -> bool {
        condition.holds(&self.traversal.features)
    }

    fn merge_context(&mut self, values: &Map<String, JsonValue>) {
        for (key, value) in values {
            self.context.insert(key.clone(), json_to_value(value));
        }
    }

    fn allowed_modules(&self) -> Vec<usize> {
        let system = &self.traversal.system;
        system
            .modules()
            .enumerate()
            .filter(|(_, module)| self.traversal.modules.contains(&module.name))
            .map(|(index, _)| index)
            .collect()
    }

    fn check_imports(module: &Module, system: &System) -> Result<(), GenerateError> {
        match system.unresolved_imports(module).first() {
            Some(import) => Err(GenerateError::UnresolvedImport {
                import: import.to_string(),
                module: module.name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn node(&self, path: NodePath) -> Value {
        Node::new(self.traversal.system.clone(), path).into_value()
    }

    fn process_document(&mut self, document: &RuleDocument) -> Result<(), GenerateError> {
        let name = document.name.as_deref().unwrap_or("<rules>");
        self.source = None;
        if !self.proceeds(&document.when) {
            tracing::debug!("skipping {}: condition not met", name);
            return Ok(());
        }
        tracing::info!("process: {}", name);

        self.merge_context(&document.context);
        self.path = document.path.clone().unwrap_or_default();
        self.source = document.source.clone();
        for filters in &document.extra_filters {
            self.load_filters(filters)?;
        }

        let root = self.node(NodePath::System);
        self.process_rule(document.system.as_ref(), "system", root)?;

        let system = self.traversal.system.clone();
        for m in self.allowed_modules() {
            let Some(module) = system.module_at(m) else {
                continue;
            };
            tracing::debug!("generate code for module {}", module.name);
            Self::check_imports(module, &system)?;

            let node = self.node(NodePath::Module(m));
            self.process_rule(document.module.as_ref(), "module", node)?;
            for i in 0..module.interfaces.len() {
                let node = self.node(NodePath::Interface(m, i));
                self.process_rule(document.interface.as_ref(), "interface", node)?;
            }
            for s in 0..module.structs.len() {
                let node = self.node(NodePath::Struct(m, s));
                self.process_rule(document.structure.as_ref(), "struct", node)?;
            }
            for e in 0..module.enums.len() {
                let node = self.node(NodePath::Enum(m, e));
                self.process_rule(document.enumeration.as_ref(), "enum", node)?;
            }
        }
        Ok(())
    }

    fn process_rule(&mut self, rule: Option<&Rule>, level: &str, node: Value) -> Result<(), GenerateError> {
        let Some(rule) = rule else {
            return Ok(());
        };
        if !self.proceeds(&rule.when) {
            return Ok(());
        }

        self.context.insert(level.to_string(), node);
        self.merge_context(&rule.context);
        if let Some(path) = rule.path.as_ref().filter(|p| !p.is_empty()) {
            self.path = path.clone();
        }
        if let Some(source) = rule.source.as_ref().filter(|s| !s.is_empty()) {
            self.source = Some(source.clone());
        }

        for (target, template) in &rule.documents {
            self.write(target, template, false)?;
        }
        for (target, template) in &rule.preserve {
            self.write(target, template, true)?;
        }
        Ok(())
    }

    fn output_dir(&self) -> Result<PathBuf, GenerateError> {
        if self.path.is_empty() {
            return Ok(self.traversal.destination.clone());
        }
        let path = self.templates.render_str(&self.path, &self.context)?;
        Ok(self.traversal.destination.join(path))
    }

    fn write(&mut self, target: &str, template: &str, preserve: bool) -> Result<(), GenerateError> {
        if target.is_empty() || template.is_empty() {
            return Ok(());
        }
        let dir = self.output_dir()?;
        let template = template_name(self.source.as_deref(), template);
        let (path, result) = self.templates.write(
            &dir,
            target,
            &template,
            &self.context,
            preserve,
            self.traversal.force,
        )?;
        self.report.record(path, result);
        Ok(())
    }

    fn process_legacy(&mut self, rules: &LegacyRules) -> Result<(), GenerateError> {
        self.templates.reporter().warning(LEGACY_NOTICE);

        let destination = self.traversal.destination.clone();
        self.context.insert(
            "dst".to_string(),
            Value::from(destination.display().to_string()),
        );

        let system = self.traversal.system.clone();
        for m in self.allowed_modules() {
            let Some(module) = system.module_at(m) else {
                continue;
            };
            tracing::debug!("generate code for module {}", module.name);
            Self::check_imports(module, &system)?;

            let node = self.node(NodePath::Module(m));
            self.context.insert("module".to_string(), node);
            let context = self.context.clone();
            self.write_legacy(&destination, &rules.module_rules, &context)?;

            for i in 0..module.interfaces.len() {
                tracing::debug!("generate backend code for interface {}", module.interfaces[i].name);
                let node = self.node(NodePath::Interface(m, i));
                self.context.insert("interface".to_string(), node);
                let context = self.context.clone();
                self.write_legacy(&destination, &rules.interface_rules, &context)?;
            }

            let Some(struct_rules) = &rules.struct_rules else {
                continue;
            };
            for s in 0..module.structs.len() {
                tracing::debug!("generate code for struct {}", module.structs[s].name);
                let mut context = self.traversal.context.clone();
                context.insert("module".to_string(), self.node(NodePath::Module(m)));
                context.insert("struct".to_string(), self.node(NodePath::Struct(m, s)));
                self.write_legacy(&destination, struct_rules, &context)?;
            }
        }
        Ok(())
    }

    fn write_legacy(
        &mut self,
        destination: &Path,
        rules: &[LegacyRule],
        context: &Context,
    ) -> Result<(), GenerateError> {
        for rule in rules {
            let (path, result) = self.templates.write(
                destination,
                &rule.dest_file,
                &rule.template_file,
                context,
                rule.preserve,
                true,
            )?;
            self.report.record(path, result);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use idlgen_model::{Interface, Version};

    use super::*;
    use crate::Reporter;

    fn traversal(system: System, destination: &Path) -> Traversal {
        let modules = system.module_names().map(str::to_string).collect();
        Traversal {
            system: Arc::new(system),
            modules,
            destination: destination.to_path_buf(),
            features: BTreeSet::new(),
            force: false,
            context: Context::new(),
        }
    }

    #[test]
    fn test_sticky_path_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(templates.join("qt")).unwrap();
        std::fs::write(templates.join("qt/module.tpl"), "{{ module }}").unwrap();
        std::fs::write(templates.join("qt/interface.tpl"), "{{ interface }}").unwrap();

        let system = System::new()
            .with_module(Module::new("demo", Version::new(1, 0)).with_interface(Interface::new("Echo")))
            .unwrap();
        let rules = RuleSet::parse(
            r#"
doc:
  module:
    path: "{{ module }}"
    source: qt
    documents: { "module.txt": module.tpl }
  interface:
    documents: { "{{ interface|lower }}.txt": interface.tpl }
"#,
            Path::new("rules.yaml"),
        )
        .unwrap();

        let out = dir.path().join("out");
        let filters = FilterRegistry::new();
        let engine = RuleEngine::new(
            TemplateEngine::new(vec![templates], Reporter::new()),
            &filters,
            traversal(system, &out),
        );
        let report = engine.run(&rules).unwrap();

        assert_eq!(report.written, vec![out.join("demo/module.txt"), out.join("demo/echo.txt")]);
        assert_eq!(std::fs::read_to_string(out.join("demo/echo.txt")).unwrap(), "Echo");
    }

    #[test]
    fn test_document_condition_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let system = System::new()
            .with_module(Module::new("demo", Version::new(1, 0)))
            .unwrap();
        let rules = RuleSet::parse(
            "doc:\n  when: [dbus]\n  extra_filters: [missing]\n  module:\n    documents: { x: t.tpl }\n",
            Path::new("rules.yaml"),
        )
        .unwrap();

        let filters = FilterRegistry::new();
        let engine = RuleEngine::new(
            TemplateEngine::new(Vec::new(), Reporter::new()),
            &filters,
            traversal(system, dir.path()),
        );
        let report = engine.run(&rules).unwrap();
        assert_eq!(report.total(), 0);
    }
}

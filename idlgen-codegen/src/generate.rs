//! End-to-end generation.
//!
//! A run parses the model twice. The first pass reads only the requested
//! sources, without imports, and records the names of the modules they
//! declare. The second pass adds every import document so that cross-module
//! types resolve. Output is produced from the second model but only for the
//! modules of the first pass: imported modules never produce files.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use eyre::{Result, WrapErr, bail};
use idlgen_idl::collect_documents;
use idlgen_model::System;
use indexmap::IndexMap;

use crate::{
    GenerateError, GenerateReport, GenerationSession, Reporter, RuleEngine, TemplateEngine,
    Traversal,
    annotate::AnnotatePhase,
    pipeline::{Pipeline, PrepareContext},
    rules::{RuleSet, rules_path},
    tagging::{GenerationConfig, TagPhase},
    validate::ValidatePhase,
};

/// Source of the model.
pub trait Frontend {
    /// Names of the modules declared by `sources`, without resolving imports.
    fn module_names(&self, sources: &[PathBuf]) -> Result<Vec<String>>;

    /// The fully resolved model of `paths`.
    fn parse(&self, paths: &[PathBuf]) -> Result<System>;
}

/// Reads YAML/JSON model documents through `idlgen-idl`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlFrontend;

impl IdlFrontend {
    fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();
        for path in paths {
            documents.extend(collect_documents(path).map_err(|e| eyre::Report::new(*e))?);
        }
        Ok(documents)
    }
}

impl Frontend for IdlFrontend {
    fn module_names(&self, sources: &[PathBuf]) -> Result<Vec<String>> {
        let documents = Self::expand(sources)?;
        idlgen_idl::module_names(&documents).map_err(|e| eyre::Report::new(*e))
    }

    fn parse(&self, paths: &[PathBuf]) -> Result<System> {
        let documents = Self::expand(paths)?;
        idlgen_idl::parse(&documents).map_err(|e| eyre::Report::new(*e))
    }
}

/// One generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Model documents or directories to generate code for.
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    /// Template name from the search path, or path to a template directory.
    pub template: String,
    /// Directories scanned for templates.
    pub search_paths: Vec<PathBuf>,
    pub module: Option<String>,
    pub force: bool,
    /// Annotation documents, merged in order.
    pub annotations: Vec<PathBuf>,
    /// Documents or directories used only to resolve imports.
    pub imports: Vec<PathBuf>,
}

/// Templates found in `search_paths`, by name.
///
/// Every `*.yaml` file directly inside a search path names a template whose
/// directory sits next to it. Earlier search paths win.
pub fn discover_templates(search_paths: &[PathBuf]) -> IndexMap<String, PathBuf> {
    let mut found = IndexMap::new();
    for dir in search_paths {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "yaml"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        for name in names {
            let path = dir.join(&name);
            found.entry(name).or_insert(path);
        }
    }
    found
}

/// Resolve a template name or directory.
pub fn resolve_template(template: &str, search_paths: &[PathBuf]) -> Result<PathBuf, GenerateError> {
    let found = discover_templates(search_paths);
    if let Some(path) = found.get(template) {
        return Ok(path.clone());
    }
    let path = PathBuf::from(template);
    if path.exists() {
        return Ok(path);
    }
    Err(GenerateError::UnknownTemplate {
        template: template.to_string(),
        found: found.into_keys().collect(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl GenerationSession {
    /// Run a full generation.
    pub fn generate(&self, frontend: &dyn Frontend, request: &GenerateRequest) -> Result<GenerateReport> {
        let Some(first_source) = request.sources.first() else {
            bail!("no source documents given");
        };
        let template = resolve_template(&request.template, &request.search_paths)?;
        tracing::debug!("run {} {}", first_source.display(), request.destination.display());

        let modules = frontend
            .module_names(&request.sources)
            .wrap_err("failed to read the source documents")?;

        let all: Vec<PathBuf> = request
            .imports
            .iter()
            .chain(&request.sources)
            .cloned()
            .collect();
        let system = frontend
            .parse(&all)
            .wrap_err("failed to resolve the model")?;

        let src_file = file_name(first_source);
        let reporter = Reporter::new();
        reporter.set_source_file(&src_file);

        let mut ctx = PrepareContext::new(system, &src_file, reporter.clone());
        Pipeline::new()
            .phase(AnnotatePhase::new(request.annotations.clone()))
            .phase(TagPhase::new(GenerationConfig {
                module: request.module.clone(),
                force: request.force,
            }))
            .phase(ValidatePhase::new())
            .run(&mut ctx)?;

        let mut search_path = vec![template.clone()];
        if let Some(parent) = template.parent() {
            search_path.push(parent.to_path_buf());
        }
        search_path.extend(request.search_paths.iter().cloned());

        let rules = RuleSet::load(rules_path(&template))?;
        let traversal = Traversal {
            system: Arc::new(ctx.system),
            modules,
            destination: request.destination.clone(),
            features: self.config().features().clone(),
            force: request.force,
            context: self.base_context(first_source),
        };

        let mut engine = RuleEngine::new(
            TemplateEngine::new(search_path, reporter),
            self.filters(),
            traversal,
        );
        let name = file_name(&template);
        if self.filters().contains(&name) {
            engine.load_filters(&name)?;
        }

        let report = engine.run(&rules)?;
        tracing::info!(
            "generated {} file(s), {} unchanged, {} preserved",
            report.written.len(),
            report.unchanged.len(),
            report.preserved.len()
        );
        Ok(report)
    }
}

const SELFCHECK_MODEL: &str = r#"module: org.selftest
version: "1.0"
interfaces:
  - name: Echo
    properties:
      - { name: stringProperty, type: string }
      - { name: boolProperty, type: bool }
      - { name: enumProperty, type: TestEnum }
      - { name: structProperty, type: TestStruct }
    operations:
      - name: echo
        type: string
        parameters: [{ name: msg, type: string }]
enums:
  - name: TestEnum
    members: [value1, value2]
structs:
  - name: TestStruct
    fields:
      - { name: testInt, type: int }
      - { name: testString, type: string }
"#;

const SELFCHECK_RULES: &str = r#"test:
  module:
    documents:
      - "{{srcBase|lower}}": "module.tpl"
  interface:
    documents:
      - "tst_{{interface|lower}}": "interface.tpl"
"#;

/// Generate a small builtin model inside `dir` and check the output.
///
/// Exercises the whole pipeline: front end, tagging, validation, rule
/// traversal and template rendering.
pub fn selfcheck(session: &GenerationSession, dir: &Path) -> Result<GenerateReport> {
    let write = |name: &str, content: &str| -> Result<()> {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content).wrap_err_with(|| format!("failed to write {}", path.display()))
    };
    write("test.yaml", SELFCHECK_MODEL)?;
    write("selfcheck.yaml", SELFCHECK_RULES)?;
    write("selfcheck/module.tpl", "{{module.name}}\n")?;
    write("selfcheck/interface.tpl", "{{interface.name}}\n")?;

    let out = dir.join("out");
    std::fs::create_dir_all(&out)?;
    let request = GenerateRequest {
        sources: vec![dir.join("test.yaml")],
        destination: out.clone(),
        template: "selfcheck".to_string(),
        search_paths: vec![dir.to_path_buf()],
        module: Some("org.selftest".to_string()),
        force: true,
        ..GenerateRequest::default()
    };
    let report = session.generate(&IdlFrontend, &request)?;

    let module = std::fs::read_to_string(out.join("test"))?;
    let interface = std::fs::read_to_string(out.join("tst_echo"))?;
    if module != "org.selftest\n" || interface != "Echo\n" {
        bail!("unexpected selfcheck output: {:?} / {:?}", module, interface);
    }
    Ok(report)
}

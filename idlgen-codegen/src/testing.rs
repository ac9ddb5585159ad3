//! Test utilities for generation runs.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use idlgen_core::BuiltinConfig;
use tempfile::TempDir;

use crate::{FilterRegistry, GenerateReport, GenerateRequest, GenerationSession, IdlFrontend};

/// A session with the given builtin features and filters.
pub fn session(features: &[&str], filters: FilterRegistry) -> GenerationSession {
    let config = BuiltinConfig::new("6.8", features.iter().map(|f| f.to_string()));
    GenerationSession::new(config).with_filters(filters)
}

/// A temporary tree holding model documents, templates and the output.
///
/// ```text
/// <tmp>/models/...      model and annotation documents
/// <tmp>/templates/      template search path
/// <tmp>/out/            destination
/// ```
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        std::fs::create_dir_all(dir.path().join("out"))?;
        std::fs::create_dir_all(dir.path().join("templates"))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn out(&self) -> PathBuf {
        self.path().join("out")
    }

    pub fn templates(&self) -> PathBuf {
        self.path().join("templates")
    }

    /// Write a file relative to the fixture root.
    pub fn file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a model document under `models/`.
    pub fn model(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.file(&format!("models/{}", name), content)
    }

    /// Write a template: its rules file and the template files it uses.
    pub fn template(&self, name: &str, rules: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
        self.file(&format!("templates/{}.yaml", name), rules)?;
        for (file, content) in files {
            self.file(&format!("templates/{}/{}", name, file), content)?;
        }
        Ok(self.templates().join(name))
    }

    /// A request generating `sources` with `template` into the output dir.
    pub fn request(&self, template: &str, sources: &[PathBuf]) -> GenerateRequest {
        GenerateRequest {
            sources: sources.to_vec(),
            destination: self.out(),
            template: template.to_string(),
            search_paths: vec![self.templates()],
            ..GenerateRequest::default()
        }
    }

    pub fn generate(&self, session: &GenerationSession, request: &GenerateRequest) -> Result<GenerateReport> {
        session.generate(&IdlFrontend, request)
    }

    /// Read an output file.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.out().join(name);
        std::fs::read_to_string(&path).wrap_err_with(|| format!("failed to read {}", path.display()))
    }

    /// Every output file, relative to the output dir, sorted.
    pub fn outputs(&self) -> Vec<String> {
        let root = self.out();
        let mut found = Vec::new();
        let mut pending = vec![root.clone()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for path in entries.flatten().map(|e| e.path()) {
                if path.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&root) {
                    found.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        found.sort();
        found
    }
}

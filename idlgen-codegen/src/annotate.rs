//! Annotation documents merged onto the parsed model.
//!
//! An annotation document maps qualified symbol names to tag mappings:
//!
//! ```yaml
//! org.example.Echo:
//!   config: { qml_name: EchoItem }
//! org.example.Echo#text:
//!   config_simulator: { default: "hello" }
//! ```
//!
//! Documents are merged in the order given, recursively, later values win.

use std::path::{Path, PathBuf};

use eyre::Result;
use idlgen_idl::{Annotations, load_annotations};
use idlgen_model::System;
use serde_json::Value;

use crate::{
    GenerateError, Reporter,
    pipeline::{Phase, PrepareContext},
};

/// Merge one annotation document into `system`.
///
/// Keys naming no symbol are reported as warnings and skipped. Returns the
/// number of symbols that received tags.
pub fn merge_annotations(
    system: &mut System,
    annotations: &Annotations,
    origin: &str,
    reporter: &Reporter,
) -> usize {
    let mut merged = 0;
    for (name, value) in annotations {
        let Some(tags) = system.tags_mut(name) else {
            reporter.warning_in(
                Some(origin),
                format!("annotation for '{}' does not match any symbol", name),
            );
            continue;
        };
        match value {
            Value::Object(map) => {
                tags.merge(map);
                merged += 1;
            }
            Value::Null => {}
            _ => reporter.warning_in(
                Some(origin),
                format!("annotation for '{}' must be a mapping", name),
            ),
        }
    }
    merged
}

/// Merges annotation files given on the command line.
pub struct AnnotatePhase {
    files: Vec<PathBuf>,
}

impl AnnotatePhase {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    fn absolute(path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

impl Phase for AnnotatePhase {
    fn name(&self) -> &'static str {
        "annotate"
    }

    fn run(&self, ctx: &mut PrepareContext) -> Result<()> {
        for file in &self.files {
            let path = Self::absolute(file);
            tracing::debug!("merging annotations {}", path.display());
            if !path.exists() {
                return Err(GenerateError::MissingAnnotations(path).into());
            }
            let annotations = load_annotations(&path).map_err(|e| eyre::Report::new(*e))?;
            let origin = path.display().to_string();
            merge_annotations(&mut ctx.system, &annotations, &origin, &ctx.reporter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use idlgen_model::{Interface, Module, Property, Type, Version};
    use serde_json::json;

    use super::*;

    fn system() -> System {
        let echo = Interface::new("Echo").with_property(Property::new("text", Type::STRING));
        System::new()
            .with_module(Module::new("org.example", Version::new(1, 0)).with_interface(echo))
            .unwrap()
    }

    fn annotations(value: Value) -> Annotations {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_later_values_win() {
        let mut system = system();
        let reporter = Reporter::new();
        let first = annotations(json!({
            "org.example.Echo": { "config": { "qml_name": "A", "zoned": true } }
        }));
        let second = annotations(json!({
            "org.example.Echo": { "config": { "qml_name": "B" } },
            "org.example.Echo#text": { "config": { "getter_name": "label" } }
        }));

        merge_annotations(&mut system, &first, "a.yaml", &reporter);
        let merged = merge_annotations(&mut system, &second, "b.yaml", &reporter);
        assert_eq!(merged, 2);

        let echo = system.module("org.example").unwrap().interface("Echo").unwrap();
        assert_eq!(echo.tags.get_str("config", "qml_name"), Some("B"));
        assert_eq!(echo.tags.get("config", "zoned"), Some(&json!(true)));
        assert_eq!(
            echo.property("text").unwrap().tags.get_str("config", "getter_name"),
            Some("label")
        );
        assert_eq!(reporter.warning_count(), 0);
    }

    #[test]
    fn test_unknown_symbol_warns() {
        let mut system = system();
        let reporter = Reporter::new();
        let doc = annotations(json!({ "org.example.Missing": { "config": {} } }));

        assert_eq!(merge_annotations(&mut system, &doc, "a.yaml", &reporter), 0);
        assert_eq!(reporter.warning_count(), 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let phase = AnnotatePhase::new(vec![missing.clone()]);
        let mut ctx = PrepareContext::new(system(), "echo.yaml", Reporter::new());

        let err = phase.run(&mut ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("no such annotation file: {}", missing.display())
        );
    }
}

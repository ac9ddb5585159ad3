use std::path::Path;

use idlgen_core::BuiltinConfig;
use minijinja::value::Value;

use crate::{FilterRegistry, templates::Context};

/// Everything a generation run needs besides its request.
///
/// Built once per invocation and passed by reference, so the builtin
/// configuration and the filter registry are never process globals. Each
/// call to [`generate`](Self::generate) gets its own [`Reporter`](crate::Reporter), so
/// warning counts and the instantiation stack start fresh every run.
#[derive(Clone)]
pub struct GenerationSession {
    config: BuiltinConfig,
    filters: FilterRegistry,
}

impl GenerationSession {
    pub fn new(config: BuiltinConfig) -> Self {
        Self {
            config,
            filters: FilterRegistry::new(),
        }
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &BuiltinConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Variables every template sees, derived from the first source document.
    pub fn base_context(&self, first_source: &Path) -> Context {
        let src_file = first_source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let src_base = first_source
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut context = Context::new();
        // kept for templates written against older releases
        context.insert("qtASVersion".into(), Value::from(self.config.version()));
        context.insert("ifcodegenVersion".into(), Value::from(self.config.version()));
        context.insert("srcFile".into(), Value::from(src_file));
        context.insert("srcBase".into(), Value::from(src_base));
        context
    }
}

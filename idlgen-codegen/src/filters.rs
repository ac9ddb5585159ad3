//! Filter sets and their registry.
//!
//! A [`FilterSet`] adds named filters and functions to a [`TemplateEngine`].
//! Target backends ship one default set that every template sees. Rule
//! documents can pull in further sets by name through `extra_filters`; the
//! set registered under a template's own name is loaded automatically when
//! that template is used.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{GenerateError, TemplateEngine};

/// A named group of template filters.
pub trait FilterSet: Send + Sync {
    /// The name rule documents use to request this set.
    fn name(&self) -> &'static str;

    /// Add the filters of this set to `engine`.
    fn register(&self, engine: &mut TemplateEngine);
}

/// Default filter sets plus plugins loadable by name.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    defaults: Vec<Arc<dyn FilterSet>>,
    plugins: IndexMap<String, Arc<dyn FilterSet>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set installed into every template engine.
    pub fn with_default(mut self, set: impl FilterSet + 'static) -> Self {
        self.defaults.push(Arc::new(set));
        self
    }

    /// Add a set that rule documents can load by name.
    pub fn with_plugin(mut self, set: impl FilterSet + 'static) -> Self {
        self.plugins.insert(set.name().to_string(), Arc::new(set));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn install_defaults(&self, engine: &mut TemplateEngine) {
        for set in &self.defaults {
            tracing::debug!("registering filter set {}", set.name());
            set.register(engine);
        }
    }

    /// Register the plugin called `name`.
    pub fn install(&self, name: &str, engine: &mut TemplateEngine) -> Result<(), GenerateError> {
        let set = self
            .plugins
            .get(name)
            .ok_or_else(|| GenerateError::UnknownFilterSet(name.to_string()))?;
        tracing::debug!("loading extra filters {}", name);
        set.register(engine);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use minijinja::value::Value;

    use super::*;
    use crate::{Reporter, templates::Context};

    struct Shout;

    impl FilterSet for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn register(&self, engine: &mut TemplateEngine) {
            engine.add_filter("shout", |s: String| s.to_uppercase());
        }
    }

    #[test]
    fn test_install_plugin() {
        let registry = FilterRegistry::new().with_plugin(Shout);
        let mut engine = TemplateEngine::new(Vec::new(), Reporter::new());
        registry.install("shout", &mut engine).unwrap();

        let mut context = Context::new();
        context.insert("word".into(), Value::from("hi"));
        assert_eq!(engine.render_str("{{ word|shout }}", &context).unwrap(), "HI");
    }

    #[test]
    fn test_unknown_plugin() {
        let registry = FilterRegistry::new().with_default(Shout);
        let mut engine = TemplateEngine::new(Vec::new(), Reporter::new());
        let err = registry.install("shout", &mut engine).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownFilterSet(name) if name == "shout"));
        assert!(!registry.contains("shout"));
    }
}

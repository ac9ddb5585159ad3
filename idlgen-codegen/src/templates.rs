//! Template environment and output writing.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use idlgen_core::{OutputFile, Overwrite, WriteResult, lower_first, upper_first};
use indexmap::IndexMap;
use minijinja::{
    Environment, Error, ErrorKind, State,
    functions::Function,
    value::{FunctionArgs, FunctionResult, Value},
};

use crate::{GenerateError, Reporter};

/// Variables visible to a template, in insertion order.
pub type Context = IndexMap<String, Value>;

/// Message of the `deprecated_filter` helper.
pub fn deprecation_message(filter: &str) -> String {
    format!(
        "The '{}' filter is deprecated and will be removed in future Qt versions",
        filter
    )
}

/// Resolve a template reference against the current template source.
///
/// A leading `/` makes the name absolute inside the search path and ignores
/// the source.
pub fn template_name(source: Option<&str>, name: &str) -> String {
    if let Some(absolute) = name.strip_prefix('/') {
        return absolute.to_string();
    }
    match source {
        Some(source) if !source.is_empty() => {
            format!("{}/{}", source.trim_end_matches('/'), name)
        }
        _ => name.to_string(),
    }
}

fn load_template(search_path: &[PathBuf], name: &str) -> Result<Option<String>, Error> {
    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Ok(None);
    }
    for dir in search_path {
        let path = dir.join(name);
        if path.is_file() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template '{}'", path.display()),
                )
                .with_source(e)
            });
        }
    }
    Ok(None)
}

/// A template environment bound to a search path and a reporter.
///
/// Templates are looked up in the search path directories in order. The
/// environment keeps trailing newlines and trims block tags, so templates
/// can be written the way the generated code should look.
pub struct TemplateEngine {
    env: Environment<'static>,
    reporter: Reporter,
    search_path: Vec<PathBuf>,
}

impl TemplateEngine {
    pub fn new(search_path: Vec<PathBuf>, reporter: Reporter) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        let paths = search_path.clone();
        env.set_loader(move |name| load_template(&paths, name));

        env.add_filter("upperfirst", |s: Cow<'_, str>| upper_first(&s));
        env.add_filter("lowerfirst", |s: Cow<'_, str>| lower_first(&s));

        env.add_function("error", |message: String| -> Result<Value, Error> {
            Err(Error::new(ErrorKind::InvalidOperation, message))
        });
        let warnings = reporter.clone();
        env.add_function("warning", move |state: &State, message: String| {
            warnings.warning_in(Some(state.name()), message);
            String::new()
        });
        let deprecations = reporter.clone();
        env.add_function("deprecated_filter", move |state: &State, name: String| {
            deprecations.warning_in(Some(state.name()), deprecation_message(&name));
            String::new()
        });

        Self {
            env,
            reporter,
            search_path,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Find a file in the search path, e.g. a template referenced by a rule.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.search_path
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn add_filter<N, F, Rv, Args>(&mut self, name: N, filter: F)
    where
        N: Into<Cow<'static, str>>,
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.env.add_filter(name, filter);
    }

    pub fn add_function<N, F, Rv, Args>(&mut self, name: N, function: F)
    where
        N: Into<Cow<'static, str>>,
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.env.add_function(name, function);
    }

    pub fn add_global(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) {
        self.env.add_global(name, value.into());
    }

    /// Render an inline template, e.g. a file name pattern.
    pub fn render_str(&self, source: &str, context: &Context) -> Result<String, GenerateError> {
        self.env
            .render_str(source, context)
            .map_err(|e| self.reporter.template_error(&e))
    }

    /// Render a named template from the search path.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, GenerateError> {
        let _frame = self.reporter.enter(name);
        let template = self
            .env
            .get_template(name)
            .map_err(|e| self.reporter.template_error(&e))?;
        template
            .render(context)
            .map_err(|e| self.reporter.template_error(&e))
    }

    /// Render `template` into `destination/file_name`.
    ///
    /// The file name is itself a template rendered with the same context.
    /// Existing files with identical content are left alone, preserved files
    /// are only created when missing unless `force` is set.
    pub fn write(
        &self,
        destination: &Path,
        file_name: &str,
        template: &str,
        context: &Context,
        preserve: bool,
        force: bool,
    ) -> Result<(PathBuf, WriteResult), GenerateError> {
        let path = destination.join(self.render_str(file_name, context)?);
        let content = self.render(template, context)?;

        let file = OutputFile::new(&path, content).with_overwrite(Overwrite::from_flags(preserve, force));
        let result = file.write().map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;

        match result {
            WriteResult::Written => tracing::info!("create: {}", path.display()),
            WriteResult::Preserved => tracing::info!("preserve: {}", path.display()),
            WriteResult::Unchanged => tracing::debug!("unchanged: {}", path.display()),
        }
        Ok((path, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(dir: &Path) -> TemplateEngine {
        TemplateEngine::new(vec![dir.to_path_buf()], Reporter::new())
    }

    #[test]
    fn test_template_name() {
        assert_eq!(template_name(Some("qt"), "module.tpl"), "qt/module.tpl");
        assert_eq!(template_name(Some("qt"), "/common/x.tpl"), "common/x.tpl");
        assert_eq!(template_name(None, "module.tpl"), "module.tpl");
        assert_eq!(template_name(Some(""), "module.tpl"), "module.tpl");
    }

    #[test]
    fn test_render_keeps_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t.tpl"), "{{ name|upperfirst }}\n").unwrap();

        let mut context = Context::new();
        context.insert("name".into(), Value::from("echo"));
        assert_eq!(engine(dir.path()).render("t.tpl", &context).unwrap(), "Echo\n");
    }

    #[test]
    fn test_write_respects_preserve() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t.tpl"), "generated").unwrap();
        let out = dir.path().join("out");
        let engine = engine(dir.path());
        let context = Context::new();

        let (path, result) = engine
            .write(&out, "a.txt", "t.tpl", &context, true, false)
            .unwrap();
        assert_eq!(result, WriteResult::Written);

        std::fs::write(&path, "edited").unwrap();
        let (_, result) = engine
            .write(&out, "a.txt", "t.tpl", &context, true, false)
            .unwrap();
        assert_eq!(result, WriteResult::Preserved);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "edited");

        let (_, result) = engine
            .write(&out, "a.txt", "t.tpl", &context, false, false)
            .unwrap();
        assert_eq!(result, WriteResult::Written);
        let (_, result) = engine
            .write(&out, "a.txt", "t.tpl", &context, false, false)
            .unwrap();
        assert_eq!(result, WriteResult::Unchanged);
    }

    #[test]
    fn test_error_function_aborts_with_trail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t.tpl"), "{{ error('nope') }}").unwrap();
        let engine = engine(dir.path());
        engine.reporter().set_source_file("echo.yaml");

        let err = engine.render("t.tpl", &Context::new()).unwrap_err();
        assert_eq!(err.template_message(), Some("nope"));
        assert!(err.to_string().starts_with("t.tpl:1: nope"));
        assert!(err.to_string().ends_with("echo.yaml: instantiated from here"));
    }

    #[test]
    fn test_error_in_nested_include_names_every_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inc")).unwrap();
        std::fs::write(dir.path().join("a.tpl"), "a\n{% include 'inc/b.tpl' %}\n").unwrap();
        std::fs::write(dir.path().join("inc/b.tpl"), "{% include 'inc/c.tpl' %}").unwrap();
        std::fs::write(dir.path().join("inc/c.tpl"), "c\n{{ error('boom') }}\n").unwrap();
        let engine = engine(dir.path());
        engine.reporter().set_source_file("demo.yaml");

        let err = engine.render("a.tpl", &Context::new()).unwrap_err();
        assert_eq!(err.template_message(), Some("boom"));
        assert_eq!(
            err.to_string(),
            "inc/c.tpl:2: boom\n\
             inc/b.tpl:1: instantiated from here\n\
             a.tpl:2: instantiated from here\n\
             demo.yaml: instantiated from here"
        );
    }

    #[test]
    fn test_warning_function_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("t.tpl"),
            "a{{ warning('careful') }}b{{ deprecated_filter('old') }}",
        )
        .unwrap();
        let engine = engine(dir.path());

        assert_eq!(engine.render("t.tpl", &Context::new()).unwrap(), "ab");
        assert_eq!(engine.reporter().warning_count(), 2);
    }

    #[test]
    fn test_loader_rejects_parent_segments() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_template(&[dir.path().to_path_buf()], "../secret").unwrap().is_none());
    }
}

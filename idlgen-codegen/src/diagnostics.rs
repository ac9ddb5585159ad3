//! Diagnostics for a generation run.
//!
//! Two kinds live here:
//!
//! - [`Diagnostic`]s collected by validation lints before any output is
//!   produced.
//! - The [`Reporter`], which attributes errors and warnings raised while
//!   templates render to the chain of template instantiations that led to
//!   them.
//!
//! The reporter keeps an explicit instantiation stack. The template engine
//! pushes a [`Frame`] when it starts rendering a template and pops it when
//! done, so errors can name every enclosing template followed by the source
//! model file.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;

use crate::GenerateError;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// A fatal error that prevents further processing.
    Error,
    /// A warning that doesn't prevent processing but should be addressed.
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A finding produced by a lint.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The lint that produced this diagnostic.
    pub lint: &'static str,
    pub message: String,
    /// Qualified name of the offending symbol, if any.
    pub location: Option<String>,
}

impl Diagnostic {
    pub fn error(lint: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            lint,
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(lint: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            lint,
            message: message.into(),
            location: None,
        }
    }

    /// Add a location to this diagnostic.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

/// One active template instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub template: String,
    /// Line inside the template, when known.
    pub line: Option<usize>,
}

impl Frame {
    pub fn new(template: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            template: template.into(),
            line,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.template, line),
            None => write!(f, "{}", self.template),
        }
    }
}

#[derive(Debug, Default)]
struct ReporterState {
    frames: Vec<Frame>,
    warnings: usize,
    src_file: String,
}

/// Session-local error and warning reporter.
///
/// Cheap to clone, clones share the same stack and counters. Shared state
/// sits behind a mutex because template callbacks must be `Send + Sync`.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    state: Arc<Mutex<ReporterState>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the model file name appended to every error trail.
    pub fn set_source_file(&self, name: impl Into<String>) {
        self.lock().src_file = name.into();
    }

    pub fn source_file(&self) -> String {
        self.lock().src_file.clone()
    }

    /// Push a frame for `template`, popped when the guard drops.
    pub fn enter(&self, template: impl Into<String>) -> FrameGuard {
        self.lock().frames.push(Frame::new(template, None));
        FrameGuard {
            reporter: self.clone(),
        }
    }

    /// Snapshot of the active frames, outermost first.
    pub fn frames(&self) -> Vec<Frame> {
        self.lock().frames.clone()
    }

    pub fn depth(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn warning_count(&self) -> usize {
        self.lock().warnings
    }

    /// Report a warning at the innermost active frame.
    pub fn warning(&self, message: impl fmt::Display) {
        let location = self.lock().frames.last().map(Frame::to_string);
        self.emit_warning(location, message);
    }

    /// Report a warning raised inside a known template.
    pub fn warning_in(&self, template: Option<&str>, message: impl fmt::Display) {
        match template {
            Some(template) => self.emit_warning(Some(template.to_string()), message),
            None => self.warning(message),
        }
    }

    fn emit_warning(&self, location: Option<String>, message: impl fmt::Display) {
        self.lock().warnings += 1;
        match location {
            Some(location) => tracing::warn!("{}: warning: {}", location, message),
            None => tracing::warn!("<unknown-file>: warning: {}", message),
        }
    }

    /// Build an error attributed to the active instantiation stack.
    pub fn error(&self, message: impl Into<String>) -> GenerateError {
        self.attribute(Vec::new(), message.into())
    }

    /// Convert a template engine error.
    ///
    /// An error raised inside an included template (or a `super()` block)
    /// is wrapped by the engine, once per level, with the failing error kept
    /// as its source. The innermost error supplies the message and the
    /// innermost frame, every wrapping error adds an enclosing frame with
    /// the line of the include.
    pub fn template_error(&self, err: &minijinja::Error) -> GenerateError {
        let mut chain = vec![err];
        let mut current = err;
        while let Some(inner) = std::error::Error::source(current)
            .and_then(|source| source.downcast_ref::<minijinja::Error>())
        {
            chain.push(inner);
            current = inner;
        }

        let message = match current.detail() {
            Some(detail) => detail.to_string(),
            None => current.kind().to_string(),
        };
        let origin = chain
            .iter()
            .rev()
            .filter_map(|e| e.name().map(|name| Frame::new(name, e.line())))
            .collect();
        self.attribute(origin, message)
    }

    fn attribute(&self, origin: Vec<Frame>, message: String) -> GenerateError {
        let state = self.lock();
        let mut frames: Vec<Frame> = state.frames.iter().rev().cloned().collect();

        // the outermost engine location replaces the frame of the template being rendered
        if let Some(outermost) = origin.last() {
            if frames
                .first()
                .is_some_and(|top| top.template == outermost.template)
            {
                frames.remove(0);
            }
        }
        let frames: Vec<Frame> = origin.into_iter().chain(frames).collect();

        let Some((innermost, enclosing)) = frames.split_first() else {
            return GenerateError::Template {
                location: "unknown".to_string(),
                message,
                trail: Vec::new(),
            };
        };

        let mut trail: Vec<String> = enclosing
            .iter()
            .map(|frame| format!("{}: instantiated from here", frame))
            .collect();
        trail.push(format!("{}: instantiated from here", state.src_file));

        GenerateError::Template {
            location: innermost.to_string(),
            message,
            trail,
        }
    }
}

/// Pops the frame pushed by [`Reporter::enter`].
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    reporter: Reporter,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        self.reporter.lock().frames.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_without_frames_is_unknown() {
        let reporter = Reporter::new();
        let err = reporter.error("boom");
        assert_eq!(err.to_string(), "unknown: boom");
    }

    #[test]
    fn test_error_trail() {
        let reporter = Reporter::new();
        reporter.set_source_file("echo.yaml");
        let _outer = reporter.enter("module.tpl");
        let _inner = reporter.enter("interface.tpl");

        let err = reporter.error("boom");
        assert_eq!(
            err.to_string(),
            "interface.tpl: boom\nmodule.tpl: instantiated from here\necho.yaml: instantiated from here"
        );
    }

    #[test]
    fn test_frame_guard_pops() {
        let reporter = Reporter::new();
        {
            let _guard = reporter.enter("a.tpl");
            assert_eq!(reporter.depth(), 1);
        }
        assert_eq!(reporter.depth(), 0);
    }

    #[test]
    fn test_warnings_are_counted() {
        let reporter = Reporter::new();
        reporter.warning("outside any template");
        let _guard = reporter.enter("a.tpl");
        reporter.warning_in(Some("b.tpl"), "inside");
        assert_eq!(reporter.warning_count(), 2);
    }

    #[test]
    fn test_template_error_replaces_top_frame() {
        let reporter = Reporter::new();
        reporter.set_source_file("echo.yaml");
        let _guard = reporter.enter("module.tpl");

        let err = minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "bad value");
        let err = reporter.template_error(&err);
        assert_eq!(err.template_message(), Some("bad value"));
        assert_eq!(err.to_string(), "module.tpl: bad value\necho.yaml: instantiated from here");
    }

    #[test]
    fn test_template_error_follows_include_chain() {
        let reporter = Reporter::new();
        reporter.set_source_file("echo.yaml");
        let _guard = reporter.enter("module.tpl");

        let mut env = minijinja::Environment::new();
        env.add_template("module.tpl", "head\n{% include 'inc/b.tpl' %}").unwrap();
        env.add_template("inc/b.tpl", "{% include 'inc/c.tpl' %}").unwrap();
        env.add_template("inc/c.tpl", "\n{{ fail() }}").unwrap();
        env.add_function("fail", || -> Result<String, minijinja::Error> {
            Err(minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "boom"))
        });

        let err = env.get_template("module.tpl").unwrap().render(minijinja::context! {}).unwrap_err();
        let err = reporter.template_error(&err);
        assert_eq!(err.template_message(), Some("boom"));
        assert_eq!(
            err.to_string(),
            "inc/c.tpl:2: boom\n\
             inc/b.tpl:1: instantiated from here\n\
             module.tpl:2: instantiated from here\n\
             echo.yaml: instantiated from here"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("deprecated-annotation", "old tag").at("demo.Echo");
        assert!(diag.severity.is_warning());
        assert_eq!(diag.to_string(), "warning: old tag (at demo.Echo)");
    }
}

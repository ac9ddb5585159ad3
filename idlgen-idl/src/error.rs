use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for front end operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Carries the document content and filename so errors raised while
/// resolving a model document can point back into it.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Span of the first occurrence of `needle`, used to label names.
    pub fn find_span(&self, needle: &str) -> Option<SourceSpan> {
        if needle.is_empty() {
            return None;
        }
        self.src
            .find(needle)
            .map(|offset| SourceSpan::from((offset, needle.len())))
    }

    /// Create a parse error from a YAML error.
    pub fn parse_error(&self, source: serde_yaml::Error) -> Box<Error> {
        let span = source
            .location()
            .map(|location| SourceSpan::from((location.index(), 1)));
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, labelling `needle` when it can be found.
    pub fn validation_error(&self, message: impl Into<String>, needle: &str) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: self.find_span(needle),
            message: message.into(),
        })
    }

    /// Create an unknown type error.
    pub fn unknown_type_error(
        &self,
        name: impl Into<String>,
        module: impl Into<String>,
    ) -> Box<Error> {
        let name = name.into();
        Box::new(Error::UnknownType {
            src: self.named_source(),
            span: self.find_span(&name),
            name,
            module: module.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model document")]
    #[diagnostic(code(idlgen::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(idlgen::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("unknown type '{name}' in module '{module}'")]
    #[diagnostic(
        code(idlgen::unknown_type),
        help("declare the type in this module, or import the module that declares it")
    )]
    UnknownType {
        #[source_code]
        src: NamedSource<String>,
        #[label("not declared in this module or its imports")]
        span: Option<SourceSpan>,
        name: String,
        module: String,
    },

    #[error("module '{name}' is declared with conflicting versions {first} and {second}")]
    #[diagnostic(code(idlgen::version_conflict))]
    VersionConflict {
        name: String,
        first: String,
        second: String,
    },

    #[error("failed to read annotations '{path}'")]
    #[diagnostic(code(idlgen::annotations))]
    Annotations {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span() {
        let ctx = SourceContext::new("module: demo\ntype: Point\n", "demo.yaml");
        let span = ctx.find_span("Point").unwrap();
        assert_eq!(span.offset(), 19);
        assert_eq!(span.len(), 5);
        assert!(ctx.find_span("Missing").is_none());
        assert!(ctx.find_span("").is_none());
    }

    #[test]
    fn test_unknown_type_message() {
        let ctx = SourceContext::new("type: Point", "demo.yaml");
        let err = ctx.unknown_type_error("Point", "demo");
        assert_eq!(err.to_string(), "unknown type 'Point' in module 'demo'");
    }
}

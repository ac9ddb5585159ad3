use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A property, argument, return value or field uses a type kind with no target mapping.
    #[error("{src}: {kind} of type '{ty}' are not supported")]
    UnsupportedType {
        src: String,
        kind: &'static str,
        ty: &'static str,
    },

    #[error("Couldn't resolve import '{import}' of module '{module}'")]
    UnresolvedImport { import: String, module: String },

    /// Raised from a template or filter, attributed to the instantiation stack.
    #[error("{location}: {message}{}", format_trail(.trail))]
    Template {
        location: String,
        message: String,
        trail: Vec<String>,
    },

    #[error("invalid rules '{}': {message}", .path.display())]
    InvalidRules { path: PathBuf, message: String },

    #[error("unknown filter set '{0}'")]
    UnknownFilterSet(String),

    #[error("no such annotation file: {}", .0.display())]
    MissingAnnotations(PathBuf),

    #[error(
        "Invalid template '{template}'. It needs to be one of the templates found in the template search path or an existing template folder. Found templates: [{}]",
        .found.join(", ")
    )]
    UnknownTemplate { template: String, found: Vec<String> },

    #[error("failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_trail(trail: &[String]) -> String {
    trail.iter().map(|line| format!("\n{}", line)).collect()
}

impl GenerateError {
    /// The bare message of a template error, without location or trail.
    pub fn template_message(&self) -> Option<&str> {
        match self {
            GenerateError::Template { message, .. } => Some(message),
            _ => None,
        }
    }
}

//! Rule-driven template traversal for the idlgen code generator.
//!
//! This crate turns a prepared model into files. It owns the pieces that sit
//! between the front end and a target backend:
//!
//! - [`pipeline`] prepares the model: [`annotate`], [`tagging`], [`validate`]
//! - [`rules`] reads rules files and tells the two dialects apart
//! - [`engine`] walks the model and instantiates templates
//! - [`templates`] wraps the template environment and writes output files
//! - [`objects`] exposes model nodes to templates
//! - [`filters`] lets backends add their filter sets
//! - [`diagnostics`] attributes errors and warnings to template instantiations
//! - [`generate`] ties everything into one run
//!
//! Target backends (see `idlgen-codegen-qt`) implement [`FilterSet`] and are
//! registered with the [`GenerationSession`].

pub mod annotate;
pub mod diagnostics;
pub mod engine;
mod error;
pub mod filters;
pub mod generate;
pub mod objects;
pub mod pipeline;
pub mod rules;
mod session;
pub mod tagging;
pub mod templates;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use diagnostics::{Diagnostic, Frame, Reporter, Severity};
pub use engine::{GenerateReport, RuleEngine, Traversal};
pub use error::GenerateError;
pub use filters::{FilterRegistry, FilterSet};
pub use generate::{Frontend, GenerateRequest, IdlFrontend, discover_templates, selfcheck};
pub use rules::RuleSet;
pub use session::GenerationSession;
pub use templates::{Context, TemplateEngine};

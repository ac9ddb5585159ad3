//! Core utilities and types for the idlgen code generator.
//!
//! This crate provides the fundamental pieces shared by every other idlgen
//! crate: the output file writer, the builtin configuration document and a
//! handful of string helpers used by templates and filters.

mod config;
mod file;
mod utils;
mod version;

pub use config::{BuiltinConfig, CONFIG_ENV, ConfigError};
pub use file::{OutputFile, Overwrite, WriteResult};
pub use utils::{capitalize, lower_first, strip_qt, upper_first};
pub use version::Version;

//! Domain model for the idlgen code generator.
//!
//! This crate holds the typed interface-definition model the generator
//! walks: a [`System`] of [`Module`]s, each owning interfaces, structs and
//! enums. The model is produced by a front end (see `idlgen-idl`), annotated
//! and tagged once, and then treated as read-only while templates are
//! instantiated.
//!
//! # Architecture
//!
//! ```text
//! model documents → idlgen-idl (parse/resolve) → idlgen-model → idlgen-codegen
//! ```
//!
//! Type references between symbols are stored as [`SymbolRef`]s (module name
//! plus symbol name) and resolved through the owning [`System`].

mod config;
mod enums;
mod interface;
mod module;
mod structs;
mod symbol;
mod system;
mod tags;
mod types;

pub use config::{
    EnumConfig, InterfaceConfig, ModuleConfig, NamespaceMode, PropertyConfig, PropertySimulation,
    StructConfig,
};
pub use enums::{Enum, EnumMember};
pub use interface::{Interface, Operation, Parameter, Property, Signal};
pub use module::Module;
pub use structs::{Field, Struct};
pub use symbol::{Symbol, SymbolKind};
pub use system::{ModelError, NodeRef, System};
pub use tags::Tags;
pub use types::{Primitive, SymbolRef, Type};

pub use idlgen_core::Version;

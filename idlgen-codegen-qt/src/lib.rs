//! Qt/C++ target support for idlgen.
//!
//! [`QtFilters`] registers the filters Qt templates rely on: C++ spellings
//! of IDL types (`return_type`, `parameter_type`, ...), default and test
//! values, namespace helpers, accessor names and the simulator data of a
//! module. The mapping itself lives in [`QtTypeMapper`] and can be used
//! without a template engine.

mod error;
mod filters;
pub mod literals;
pub mod namespace;
pub mod naming;
mod type_mapper;

pub use error::MappingError;
pub use filters::QtFilters;
pub use type_mapper::QtTypeMapper;

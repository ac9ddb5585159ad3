//! Front end for structured model documents.
//!
//! A model document is a YAML (or JSON) file describing one module: its
//! version, imports, interfaces, structs and enums. Two entry points match
//! the two passes of a generation run:
//!
//! - [`module_names`] reads only the `module` key of each document, without
//!   imports or type resolution.
//! - [`parse`] loads every document and resolves type references across
//!   modules, producing an [`idlgen_model::System`].

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod annotations;
mod document;
mod error;
mod resolve;

use std::path::{Path, PathBuf};

pub use annotations::{Annotations, load_annotations};
pub use error::{Error, Result, SourceContext};
use idlgen_model::System;

use crate::{
    document::{RawHeader, RawModule},
    resolve::Loaded,
};

/// File extensions recognised as model documents.
pub const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

fn read(path: &Path) -> Result<SourceContext> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    Ok(SourceContext::new(content, path.display().to_string()))
}

/// Names of the modules declared by `paths`, in order, without duplicates.
///
/// Imports are not followed and types are not resolved.
pub fn module_names<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for path in paths {
        let ctx = read(path.as_ref())?;
        let header: RawHeader =
            serde_yaml::from_str(ctx.src()).map_err(|e| ctx.parse_error(e))?;
        if !names.contains(&header.module) {
            names.push(header.module);
        }
    }
    Ok(names)
}

/// Parse and resolve every document in `paths` into one system.
pub fn parse<P: AsRef<Path>>(paths: &[P]) -> Result<System> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let ctx = read(path)?;
        let raw: RawModule = serde_yaml::from_str(ctx.src()).map_err(|e| ctx.parse_error(e))?;
        documents.push(Loaded {
            ctx,
            raw,
            path: path.to_path_buf(),
        });
    }
    resolve::build_system(documents)
}

/// Expand `path` into model documents.
///
/// Files are returned as is. Directories are scanned recursively for files
/// with a known extension, sorted for a stable load order.
pub fn collect_documents(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut found = Vec::new();
    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| {
            Box::new(Error::Io {
                path: dir.clone(),
                source: e,
            })
        })?;
        for entry in entries.flatten() {
            let entry_path = entry.path();
            if entry_path.is_dir() {
                pending.push(entry_path);
            } else if entry_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| EXTENSIONS.contains(&e))
            {
                found.push(entry_path);
            }
        }
    }
    found.sort();
    Ok(found)
}

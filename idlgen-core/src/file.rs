use std::{
    io,
    path::{Path, PathBuf},
};

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had the rendered content
    Unchanged,
    /// File exists and was kept as-is because it is user owned
    Preserved,
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Always write, even if the content is identical (`--force`)
    Always,
    /// Write only when the rendered content differs from the file on disk
    IfChanged,
    /// Only create if the file doesn't exist yet (preserved documents)
    IfMissing,
}

impl Overwrite {
    /// Derive the overwrite behavior from the rule flags.
    ///
    /// `force` wins over `preserve`.
    pub fn from_flags(preserve: bool, force: bool) -> Self {
        match (preserve, force) {
            (_, true) => Overwrite::Always,
            (true, false) => Overwrite::IfMissing,
            (false, false) => Overwrite::IfChanged,
        }
    }
}

/// A rendered file waiting to be written to the destination tree
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
    content: String,
    overwrite: Overwrite,
}

impl OutputFile {
    /// Create a new file with the given path and content (default: write if changed)
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite: Overwrite::IfChanged,
        }
    }

    /// Override the overwrite behavior.
    pub fn with_overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the overwrite behavior
    pub fn overwrite(&self) -> Overwrite {
        self.overwrite
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn has_same_content(&self) -> bool {
        std::fs::read_to_string(&self.path)
            .map(|existing| existing == self.content)
            .unwrap_or(false)
    }

    /// Write the file according to its overwrite behavior
    pub fn write(&self) -> io::Result<WriteResult> {
        match self.overwrite {
            Overwrite::Always => {
                write_file(&self.path, &self.content)?;
                Ok(WriteResult::Written)
            }
            Overwrite::IfChanged => {
                if self.has_same_content() {
                    Ok(WriteResult::Unchanged)
                } else {
                    write_file(&self.path, &self.content)?;
                    Ok(WriteResult::Written)
                }
            }
            Overwrite::IfMissing => {
                if self.has_same_content() {
                    Ok(WriteResult::Unchanged)
                } else if self.exists() {
                    Ok(WriteResult::Preserved)
                } else {
                    write_file(&self.path, &self.content)?;
                    Ok(WriteResult::Written)
                }
            }
        }
    }
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

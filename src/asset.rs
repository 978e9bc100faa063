//! In-flight file contents passed between pipeline stages.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A single file moving through a pipeline.
///
/// `path` starts as the source path and is rewritten by stages that change
/// the file's identity (Sass compile swaps the extension, concatenation
/// names the merged artifact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: PathBuf,
    pub contents: String,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self { path: path.into(), contents: contents.into() }
    }

    /// Read a source file from disk.
    pub fn read(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::new(path, contents))
    }

    /// Replace the contents, keeping the path.
    pub fn with_contents(self, contents: impl Into<String>) -> Self {
        Self { path: self.path, contents: contents.into() }
    }

    /// File name used when writing the asset into an output directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

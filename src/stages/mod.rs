//! Pipeline stages
//!
//! Each stage takes the batch produced by the previous stage and returns a
//! transformed batch. The actual transformations are delegated to library
//! crates:
//!
//! - **sass**: Sass/SCSS compilation via `grass`
//! - **autoprefix** / **minify-css**: vendor prefixing and minification via
//!   `lightningcss`
//! - **concat**: merges the batch into one named artifact
//! - **uglify**: JavaScript minification via `minify-js`
//!
//! Stages either fail the whole run with a [`PipelineError`] or, for
//! per-file problems the pipeline can survive, record a [`Diagnostic`] and
//! drop the offending file.

pub mod concat;
pub mod css;
pub mod sass;
pub mod uglify;

pub use concat::Concat;
pub use css::{browser_targets, Autoprefix, MinifyCss};
pub use sass::SassCompile;
pub use uglify::Uglify;

use std::path::PathBuf;

use tracing::error;

use crate::asset::Asset;
use crate::pipeline::PipelineError;

/// One step of a pipeline.
pub trait Stage: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Transform a batch of assets.
    fn apply(
        &self,
        assets: Vec<Asset>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Asset>, PipelineError>;
}

/// A non-fatal problem with one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stage that reported the problem
    pub stage: &'static str,
    /// Path to the file containing the error
    pub file: PathBuf,
    /// Line number (1-indexed, None if unknown)
    pub line: Option<usize>,
    /// Column number (1-indexed, None if unknown)
    pub column: Option<usize>,
    /// Error message
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: &'static str, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self { stage, file: file.into(), line: None, column: None, message: message.into() }
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.stage, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(col) = self.column {
                write!(f, ":{}", col)?;
            }
        }
        write!(f, ": {}", self.message)
    }
}

/// Diagnostic sink for one pipeline run.
///
/// Every reported diagnostic is logged immediately and kept for the run's
/// report.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        error!(stage = diagnostic.stage, file = %diagnostic.file.display(), "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::new("sass", "resources/sass/styles.scss", "expected \"}\".");
        assert_eq!(diagnostic.to_string(), "[sass] resources/sass/styles.scss: expected \"}\".");

        let located = diagnostic.with_location(4, 12);
        assert_eq!(
            located.to_string(),
            "[sass] resources/sass/styles.scss:4:12: expected \"}\"."
        );
    }

    #[test]
    fn test_diagnostics_collects() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.report(Diagnostic::new("sass", "a.scss", "bad"));
        diagnostics.report(Diagnostic::new("autoprefix", "b.css", "worse"));

        assert_eq!(diagnostics.len(), 2);
        let stages: Vec<_> = diagnostics.iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec!["sass", "autoprefix"]);
        assert_eq!(diagnostics.into_vec()[1].file, PathBuf::from("b.css"));
    }
}

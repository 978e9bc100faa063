//! Concatenation stage.

use std::path::PathBuf;

use super::{Diagnostics, Stage};
use crate::asset::Asset;
use crate::pipeline::PipelineError;

/// Merges the whole batch into one asset named `file_name`, preserving
/// batch order. An empty batch stays empty.
#[derive(Debug, Clone)]
pub struct Concat {
    file_name: String,
    separator: String,
}

impl Concat {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), separator: "\n".to_string() }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Stage for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(
        &self,
        assets: Vec<Asset>,
        _diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Asset>, PipelineError> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let contents = assets
            .iter()
            .map(|a| a.contents.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator);

        Ok(vec![Asset::new(PathBuf::from(&self.file_name), contents)])
    }
}

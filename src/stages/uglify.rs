//! JavaScript minification stage, backed by `minify-js`.

use minify_js::{minify, Session, TopLevelMode};

use super::{Diagnostics, Stage};
use crate::asset::Asset;
use crate::pipeline::PipelineError;

/// Parses, compresses, and mangles each script.
///
/// A script that fails to parse fails the whole run; there is no partial
/// bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uglify {
    module: bool,
}

impl Uglify {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat input as an ES module instead of a classic script. Module
    /// top-level names are local and may be mangled.
    pub fn with_module(mut self, module: bool) -> Self {
        self.module = module;
        self
    }
}

impl Stage for Uglify {
    fn name(&self) -> &'static str {
        "uglify"
    }

    fn apply(
        &self,
        assets: Vec<Asset>,
        _diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Asset>, PipelineError> {
        assets
            .into_iter()
            .map(|asset| {
                let mode = if self.module { TopLevelMode::Module } else { TopLevelMode::Global };
                let session = Session::new();
                let mut out = Vec::with_capacity(asset.len());
                minify(&session, mode, asset.contents.as_bytes(), &mut out).map_err(|e| {
                    PipelineError::Stage {
                        stage: self.name(),
                        path: asset.path.clone(),
                        message: format!("{:?}", e),
                    }
                })?;
                let code = String::from_utf8(out).map_err(|e| PipelineError::Stage {
                    stage: self.name(),
                    path: asset.path.clone(),
                    message: e.to_string(),
                })?;
                Ok(asset.with_contents(code))
            })
            .collect()
    }
}

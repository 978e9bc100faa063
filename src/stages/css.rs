//! Vendor prefixing and CSS minification, both backed by `lightningcss`.
//!
//! Prefixes are derived from browserslist queries the same way autoprefixer
//! does: whatever the target browsers still need is added, whatever they
//! no longer need is left out.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use super::{Diagnostic, Diagnostics, Stage};
use crate::asset::Asset;
use crate::pipeline::PipelineError;

/// Resolve browserslist queries into lightningcss targets.
pub fn browser_targets(queries: &[String]) -> Result<Targets, PipelineError> {
    let browsers = Browsers::from_browserslist(queries.iter())
        .map_err(|e| PipelineError::InvalidTargets(e.to_string()))?;
    Ok(Targets { browsers, ..Targets::default() })
}

/// Parse, run lightningcss's transform pass for `targets`, and print.
fn transform(asset: &Asset, targets: Targets, compact: bool) -> Result<String, String> {
    let options = ParserOptions {
        filename: asset.path.to_string_lossy().into_owned(),
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(&asset.contents, options).map_err(|e| e.to_string())?;

    sheet
        .minify(MinifyOptions { targets, ..MinifyOptions::default() })
        .map_err(|e| e.to_string())?;

    let printed = sheet
        .to_css(PrinterOptions { minify: compact, targets, ..PrinterOptions::default() })
        .map_err(|e| e.to_string())?;
    Ok(printed.code)
}

fn apply_each(
    stage: &'static str,
    assets: Vec<Asset>,
    diagnostics: &mut Diagnostics,
    targets: Targets,
    compact: bool,
) -> Vec<Asset> {
    let mut out = Vec::with_capacity(assets.len());
    for asset in assets {
        match transform(&asset, targets, compact) {
            Ok(css) => out.push(asset.with_contents(css)),
            Err(message) => diagnostics.report(Diagnostic::new(stage, &asset.path, message)),
        }
    }
    out
}

/// Adds the vendor prefixes the target browsers need. Output stays
/// human-readable.
#[derive(Debug, Clone, Copy)]
pub struct Autoprefix {
    targets: Targets,
}

impl Autoprefix {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

impl Stage for Autoprefix {
    fn name(&self) -> &'static str {
        "autoprefix"
    }

    fn apply(
        &self,
        assets: Vec<Asset>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Asset>, PipelineError> {
        Ok(apply_each(self.name(), assets, diagnostics, self.targets, false))
    }
}

/// Minifies each stylesheet. Uses the same targets as [`Autoprefix`] so
/// prefixes added upstream survive minification.
#[derive(Debug, Clone, Copy)]
pub struct MinifyCss {
    targets: Targets,
}

impl MinifyCss {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

impl Stage for MinifyCss {
    fn name(&self) -> &'static str {
        "minify-css"
    }

    fn apply(
        &self,
        assets: Vec<Asset>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Asset>, PipelineError> {
        Ok(apply_each(self.name(), assets, diagnostics, self.targets, true))
    }
}

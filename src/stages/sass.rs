//! Sass/SCSS compilation stage.

use std::path::PathBuf;

use grass::{Options, OutputStyle};
use tracing::debug;

use super::{Diagnostic, Diagnostics, Stage};
use crate::asset::Asset;
use crate::pipeline::PipelineError;

/// Compiles each stylesheet with `grass`.
///
/// A file that fails to compile is reported and dropped; the rest of the
/// batch keeps going. Plain `.css` inputs pass through unchanged in meaning
/// since CSS is valid SCSS.
#[derive(Debug, Clone, Default)]
pub struct SassCompile {
    load_paths: Vec<PathBuf>,
}

impl SassCompile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra directories searched by `@use` / `@import`, after the
    /// directory of the file being compiled.
    pub fn with_load_paths(mut self, load_paths: Vec<PathBuf>) -> Self {
        self.load_paths = load_paths;
        self
    }

    fn options(&self, asset: &Asset) -> Options<'_> {
        let mut options = Options::default().style(OutputStyle::Expanded);
        if let Some(parent) = asset.path.parent() {
            options = options.load_path(parent);
        }
        for path in &self.load_paths {
            options = options.load_path(path);
        }
        options
    }
}

impl Stage for SassCompile {
    fn name(&self) -> &'static str {
        "sass"
    }

    fn apply(
        &self,
        assets: Vec<Asset>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Asset>, PipelineError> {
        let mut compiled = Vec::with_capacity(assets.len());

        for asset in assets {
            let options = self.options(&asset);
            match grass::from_string(asset.contents.clone(), &options) {
                Ok(css) => {
                    debug!(file = %asset.path.display(), bytes = css.len(), "compiled");
                    let path = asset.path.with_extension("css");
                    compiled.push(Asset::new(path, css));
                }
                Err(e) => {
                    diagnostics.report(Diagnostic::new(
                        self.name(),
                        &asset.path,
                        e.to_string().trim(),
                    ));
                }
            }
        }

        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compiles_variables_and_nesting() {
        let asset = Asset::new(
            "styles.scss",
            "$brand: #336699;\n.nav { a { color: $brand; } }\n",
        );
        let mut diagnostics = Diagnostics::new();

        let out = SassCompile::new().apply(vec![asset], &mut diagnostics).unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, PathBuf::from("styles.css"));
        assert!(out[0].contents.contains(".nav a"));
        assert!(out[0].contents.contains("#336699"));
        assert!(!out[0].contents.contains("$brand"));
    }

    #[test]
    fn test_syntax_error_is_reported_and_dropped() {
        let good = Asset::new("good.scss", ".ok { margin: 0; }");
        let bad = Asset::new("bad.scss", ".broken { color: red;");
        let mut diagnostics = Diagnostics::new();

        let out = SassCompile::new().apply(vec![bad, good], &mut diagnostics).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, PathBuf::from("good.css"));
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.stage, "sass");
        assert_eq!(diagnostic.file, PathBuf::from("bad.scss"));
        assert!(!diagnostic.message.is_empty());
    }

    #[test]
    fn test_imports_resolve_next_to_source() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("_colors.scss"), "$accent: #aa0000;").unwrap();
        let entry = temp.path().join("styles.scss");
        fs::write(&entry, "@import 'colors';\n.btn { color: $accent; }\n").unwrap();

        let asset = Asset::read(&entry).unwrap();
        let mut diagnostics = Diagnostics::new();
        let out = SassCompile::new().apply(vec![asset], &mut diagnostics).unwrap();

        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert!(out[0].contents.contains("#aa0000"));
    }

    #[test]
    fn test_extra_load_paths() {
        let temp = TempDir::new().unwrap();
        let shared = temp.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("_mixins.scss"), "@mixin flat { border: 0; }").unwrap();

        let asset = Asset::new(
            temp.path().join("site/styles.scss"),
            "@import 'mixins';\n.card { @include flat; }\n",
        );
        let mut diagnostics = Diagnostics::new();
        let out = SassCompile::new()
            .with_load_paths(vec![shared])
            .apply(vec![asset], &mut diagnostics)
            .unwrap();

        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert!(out[0].contents.contains("border: 0"));
    }
}

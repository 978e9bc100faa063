//! Configuration schema types for `assetflow.toml`
//!
//! Defines the structure and validation rules for the asset pipelines.
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock project layout.

use glob::Pattern;
use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where a pipeline writes its single artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Artifact file name (no directory components)
    pub file_name: String,
    /// Directory the artifact is written to
    pub dir: PathBuf,
}

impl OutputDescriptor {
    pub fn new(file_name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self { file_name: file_name.into(), dir: dir.into() }
    }

    /// Full artifact path, relative to the project root unless `dir` is absolute
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Stylesheet pipeline section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Glob pattern watched in watch mode
    #[serde(default = "default_style_watch")]
    pub watch: String,
    /// Entry stylesheets, compiled in order
    #[serde(default = "default_style_inputs")]
    pub inputs: Vec<String>,
    /// Output artifact
    #[serde(default = "default_style_output")]
    pub output: OutputDescriptor,
    /// Browserslist queries driving vendor prefixing
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,
    /// Extra directories searched by `@use` and `@import`
    #[serde(default)]
    pub load_paths: Vec<PathBuf>,
    /// Text placed between concatenated stylesheets
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            watch: default_style_watch(),
            inputs: default_style_inputs(),
            output: default_style_output(),
            browsers: default_browsers(),
            load_paths: Vec::new(),
            separator: default_separator(),
        }
    }
}

fn default_style_watch() -> String {
    "./resources/sass/*/*.scss".to_string()
}

fn default_style_inputs() -> Vec<String> {
    vec!["./resources/sass/styles.scss".to_string()]
}

fn default_style_output() -> OutputDescriptor {
    OutputDescriptor::new("style.min.css", "./public/css/")
}

fn default_browsers() -> Vec<String> {
    vec!["defaults".to_string()]
}

fn default_separator() -> String {
    "\n".to_string()
}

/// Script pipeline section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Glob pattern watched in watch mode
    #[serde(default = "default_script_watch")]
    pub watch: String,
    /// Script sources; bundle order follows this list
    #[serde(default = "default_script_inputs")]
    pub inputs: Vec<String>,
    /// Minify as an ES module rather than a classic script
    #[serde(default)]
    pub module: bool,
    /// Output artifact
    #[serde(default = "default_script_output")]
    pub output: OutputDescriptor,
    /// Text placed between concatenated scripts
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            watch: default_script_watch(),
            inputs: default_script_inputs(),
            module: false,
            output: default_script_output(),
            separator: default_separator(),
        }
    }
}

fn default_script_watch() -> String {
    "./resources/js/*/*.js".to_string()
}

// jQuery is listed twice on purpose: the stock layout keeps the duplicate so
// input resolution reports it instead of silently reproducing it.
fn default_script_inputs() -> Vec<String> {
    vec![
        "./node_modules/jquery/dist/jquery.min.js".to_string(),
        "./node_modules/jquery/dist/jquery.min.js".to_string(),
        "./resources/js/app.js".to_string(),
        "./resources/js/app/*.js".to_string(),
    ]
}

fn default_script_output() -> OutputDescriptor {
    OutputDescriptor::new("app.min.js", "./public/js/")
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

/// Complete `assetflow.toml` configuration.
///
/// Built once at startup and shared read-only with the pipelines and the
/// watcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory relative paths are resolved against. Set by the loader to
    /// the directory holding `assetflow.toml`; empty means the working
    /// directory.
    #[serde(skip)]
    pub root: PathBuf,
    /// Stylesheet pipeline
    #[serde(default)]
    pub style: StyleConfig,
    /// Script pipeline
    #[serde(default)]
    pub script: ScriptConfig,
    /// Watch mode settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "script.inputs[2]")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assetflow.toml: '{}' {}", self.field, self.message)
    }
}

impl AssetConfig {
    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        validate_section(
            "style",
            &self.style.watch,
            &self.style.inputs,
            &self.style.output,
            &mut errors,
        );
        validate_section(
            "script",
            &self.script.watch,
            &self.script.inputs,
            &self.script.output,
            &mut errors,
        );

        if self.style.browsers.is_empty() {
            errors.push(ConfigValidationError {
                field: "style.browsers".to_string(),
                message: "must contain at least one browserslist query".to_string(),
            });
        } else if let Err(e) = Browsers::from_browserslist(self.style.browsers.iter()) {
            errors.push(ConfigValidationError {
                field: "style.browsers".to_string(),
                message: format!("is not a valid browserslist query: {}", e),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn validate_section(
    section: &str,
    watch: &str,
    inputs: &[String],
    output: &OutputDescriptor,
    errors: &mut Vec<ConfigValidationError>,
) {
    if let Err(e) = Pattern::new(watch) {
        errors.push(ConfigValidationError {
            field: format!("{}.watch", section),
            message: format!("is not a valid glob: {}", e),
        });
    }

    if inputs.is_empty() {
        errors.push(ConfigValidationError {
            field: format!("{}.inputs", section),
            message: "must contain at least one path or glob".to_string(),
        });
    }

    for (i, entry) in inputs.iter().enumerate() {
        if entry.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: format!("{}.inputs[{}]", section, i),
                message: "must be a non-empty string".to_string(),
            });
        } else if let Err(e) = Pattern::new(entry) {
            errors.push(ConfigValidationError {
                field: format!("{}.inputs[{}]", section, i),
                message: format!("is not a valid glob: {}", e),
            });
        }
    }

    if output.file_name.is_empty() {
        errors.push(ConfigValidationError {
            field: format!("{}.output.file_name", section),
            message: "must be a non-empty string".to_string(),
        });
    } else if output.file_name.contains(['/', '\\']) {
        errors.push(ConfigValidationError {
            field: format!("{}.output.file_name", section),
            message: "must not contain path separators; use output.dir".to_string(),
        });
    }
}

/// Entries that appear more than once in an input list, in first-seen order.
pub fn duplicate_entries(inputs: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for entry in inputs {
        if !seen.insert(entry.as_str()) && reported.insert(entry.as_str()) {
            duplicates.push(entry.as_str());
        }
    }
    duplicates
}

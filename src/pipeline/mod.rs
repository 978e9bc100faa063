//! Asset pipelines
//!
//! A pipeline resolves its input list, reads the files, threads the batch
//! through an ordered list of [`Stage`]s, and writes whatever comes out into
//! its output directory.
//!
//! # Pipelines
//!
//! - **style**: sass → autoprefix → minify-css → concat → write
//! - **script**: concat → uglify → write
//!
//! The two share no state and write to disjoint paths, so [`run_all`] runs
//! them side by side.
//!
//! # Example
//!
//! ```ignore
//! use assetflow::config::load_config;
//! use assetflow::pipeline::run_script_pipeline;
//!
//! let config = load_config(None)?;
//! let report = run_script_pipeline(&config)?;
//! println!("{}", report.summary());
//! ```

pub mod report;
pub mod sources;

pub use report::*;
pub use sources::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::asset::Asset;
use crate::config::AssetConfig;
use crate::stages::{
    browser_targets, Autoprefix, Concat, Diagnostics, MinifyCss, SassCompile, Stage, Uglify,
};

/// Fatal error for one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input entry is not a valid glob
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: glob::PatternError },
    /// Literal input path does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    /// Input could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    /// A stage rejected its input outright
    #[error("{stage} failed on {}: {message}", path.display())]
    Stage { stage: &'static str, path: PathBuf, message: String },
    /// Output could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    /// Browserslist queries could not be resolved
    #[error("Invalid browser targets: {0}")]
    InvalidTargets(String),
}

impl PipelineError {
    /// The file the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            PipelineError::MissingInput(path)
            | PipelineError::Read { path, .. }
            | PipelineError::Stage { path, .. }
            | PipelineError::Write { path, .. } => Some(path),
            PipelineError::InvalidPattern { .. } | PipelineError::InvalidTargets(_) => None,
        }
    }
}

/// Which of the two pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Style,
    Script,
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineKind::Style => write!(f, "css"),
            PipelineKind::Script => write!(f, "js"),
        }
    }
}

/// An input list, an ordered stage list, and a destination.
pub struct Pipeline {
    kind: PipelineKind,
    root: PathBuf,
    inputs: Vec<String>,
    stages: Vec<Box<dyn Stage>>,
    out_dir: PathBuf,
}

impl Pipeline {
    /// Stylesheet pipeline: sass → autoprefix → minify-css → concat.
    pub fn style(config: &AssetConfig) -> Result<Self, PipelineError> {
        let targets = browser_targets(&config.style.browsers)?;
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(SassCompile::new().with_load_paths(
                config.style.load_paths.iter().map(|p| config.resolve(p)).collect(),
            )),
            Box::new(Autoprefix::new(targets)),
            Box::new(MinifyCss::new(targets)),
            Box::new(
                Concat::new(&config.style.output.file_name)
                    .with_separator(&config.style.separator),
            ),
        ];

        Ok(Self {
            kind: PipelineKind::Style,
            root: config.root.clone(),
            inputs: config.style.inputs.clone(),
            stages,
            out_dir: config.resolve(&config.style.output.dir),
        })
    }

    /// Script pipeline: concat → uglify.
    pub fn script(config: &AssetConfig) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(
                Concat::new(&config.script.output.file_name)
                    .with_separator(&config.script.separator),
            ),
            Box::new(Uglify::new().with_module(config.script.module)),
        ];

        Self {
            kind: PipelineKind::Script,
            root: config.root.clone(),
            inputs: config.script.inputs.clone(),
            stages,
            out_dir: config.resolve(&config.script.output.dir),
        }
    }

    /// Replace the stage list, keeping inputs and destination.
    pub fn with_stages(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages = stages;
        self
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Directory outputs are written to.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Run the pipeline once.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        let mut report = PipelineReport::new(self.kind);

        report.inputs = resolve_inputs(&self.root, &self.inputs)?;
        debug!(pipeline = %self.kind, inputs = report.inputs.len(), "resolved inputs");

        let mut assets = read_sources(&report.inputs)?;
        let mut diagnostics = Diagnostics::new();

        for stage in &self.stages {
            debug!(pipeline = %self.kind, stage = stage.name(), assets = assets.len(), "stage");
            assets = stage.apply(assets, &mut diagnostics)?;
        }

        if assets.is_empty() {
            warn!(pipeline = %self.kind, "nothing to write");
        } else {
            for asset in &assets {
                let path = write_output(asset, &self.out_dir)?;
                report.bytes_written += asset.len();
                report.outputs.push(path);
            }
        }

        report.diagnostics = diagnostics.into_vec();
        report.duration = start.elapsed();
        info!(pipeline = %self.kind, "{}", report.summary());
        Ok(report)
    }
}

/// Read every resolved input, in order.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<Asset>, PipelineError> {
    paths
        .iter()
        .map(|path| {
            Asset::read(path).map_err(|source| PipelineError::Read { path: path.clone(), source })
        })
        .collect()
}

/// Write an asset into `out_dir` under its file name, creating the directory
/// if needed.
pub fn write_output(asset: &Asset, out_dir: &Path) -> Result<PathBuf, PipelineError> {
    let path = out_dir.join(asset.file_name());
    fs::create_dir_all(out_dir)
        .map_err(|source| PipelineError::Write { path: path.clone(), source })?;
    fs::write(&path, &asset.contents)
        .map_err(|source| PipelineError::Write { path: path.clone(), source })?;
    debug!(path = %path.display(), bytes = asset.len(), "wrote");
    Ok(path)
}

/// Build and run the pipeline of the given kind.
pub fn run_pipeline(
    kind: PipelineKind,
    config: &AssetConfig,
) -> Result<PipelineReport, PipelineError> {
    match kind {
        PipelineKind::Style => run_style_pipeline(config),
        PipelineKind::Script => run_script_pipeline(config),
    }
}

/// Compile, prefix, minify, and bundle the stylesheets.
pub fn run_style_pipeline(config: &AssetConfig) -> Result<PipelineReport, PipelineError> {
    Pipeline::style(config)?.run()
}

/// Bundle and minify the scripts in list order.
pub fn run_script_pipeline(config: &AssetConfig) -> Result<PipelineReport, PipelineError> {
    Pipeline::script(config).run()
}

/// Run both pipelines concurrently.
pub fn run_all(
    config: &AssetConfig,
) -> (Result<PipelineReport, PipelineError>, Result<PipelineReport, PipelineError>) {
    rayon::join(|| run_style_pipeline(config), || run_script_pipeline(config))
}

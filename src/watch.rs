//! Watch mode for automatic rebuilds on file changes
//!
//! Each pipeline gets a [`Subscription`] on its watch pattern. A single
//! debounced watcher feeds a dispatch thread; every debounced batch that
//! touches a subscription's pattern triggers that subscription once.
//!
//! Triggered runs execute on their own thread behind a per-subscription
//! lock, so two runs of the same pipeline never overlap. A trigger that
//! lands while another run is already queued is folded into the queued run.

use glob::{MatchOptions, Pattern};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::AssetConfig;
use crate::pipeline::{
    is_glob, normalize, run_pipeline, PipelineError, PipelineKind, PipelineReport,
};

/// Error during watch mode setup
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch {}: {source}", path.display())]
    WatchPath { path: PathBuf, source: notify::Error },
    /// Static part of a watch pattern does not exist
    #[error("Watch directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
    /// Watch pattern is not a valid glob
    #[error("Invalid watch pattern '{pattern}': {source}")]
    InvalidPattern { pattern: String, source: glob::PatternError },
    /// Event channel error
    #[error("Watch channel error: {0}")]
    Channel(String),
}

/// Function used to run a pipeline when a subscription fires.
pub type PipelineRunner =
    Arc<dyn Fn(PipelineKind, &AssetConfig) -> Result<PipelineReport, PipelineError> + Send + Sync>;

/// Lifecycle of one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Waiting for changes
    Idle,
    /// A run is queued but has not started reading inputs
    Triggered,
    /// The pipeline is running
    Running,
}

/// Tracks files with errors across runs for recovery detection
#[derive(Debug, Default)]
pub struct ErrorTracker {
    files_with_errors: HashSet<PathBuf>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the files that failed in the latest run; returns files that
    /// failed before and are clean now.
    pub fn update<I: IntoIterator<Item = PathBuf>>(&mut self, current: I) -> Vec<PathBuf> {
        let current: HashSet<PathBuf> = current.into_iter().collect();
        let mut fixed: Vec<PathBuf> =
            self.files_with_errors.difference(&current).cloned().collect();
        fixed.sort();
        self.files_with_errors = current;
        fixed
    }

    pub fn has_errors(&self) -> bool {
        !self.files_with_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.files_with_errors.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A watch pattern bound to a pipeline.
#[derive(Debug)]
pub struct Subscription {
    kind: PipelineKind,
    base: PathBuf,
    pattern: Pattern,
    state: Mutex<SubscriptionState>,
    run_lock: Mutex<()>,
    tracker: Mutex<ErrorTracker>,
    runs: Mutex<usize>,
}

impl Subscription {
    /// Bind `pattern` (resolved against `root`) to the pipeline `kind`.
    ///
    /// The static prefix of the pattern must exist; it is the directory
    /// handed to the OS watcher.
    pub fn new(kind: PipelineKind, root: &Path, pattern: &str) -> Result<Self, WatchError> {
        let full = normalize(&root.join(pattern));

        let mut prefix = PathBuf::new();
        let mut rest = PathBuf::new();
        for component in full.components() {
            let globby = match component {
                Component::Normal(part) => is_glob(&part.to_string_lossy()),
                _ => false,
            };
            if globby || !rest.as_os_str().is_empty() {
                rest.push(component);
            } else {
                prefix.push(component);
            }
        }

        // A literal file pattern watches its parent directory.
        if rest.as_os_str().is_empty() {
            if let Some(name) = full.file_name() {
                rest = PathBuf::from(name);
                prefix = full.parent().map(Path::to_path_buf).unwrap_or_default();
            }
        }

        // Top-level patterns like `*.js` under an empty root
        if prefix.as_os_str().is_empty() {
            prefix = PathBuf::from(".");
        }

        let base = prefix.canonicalize().map_err(|_| WatchError::RootNotFound(prefix.clone()))?;
        let glob_str = format!(
            "{}{}{}",
            Pattern::escape(&base.to_string_lossy()),
            std::path::MAIN_SEPARATOR,
            rest.to_string_lossy()
        );
        let pattern = Pattern::new(&glob_str)
            .map_err(|source| WatchError::InvalidPattern { pattern: pattern.to_string(), source })?;

        Ok(Self {
            kind,
            base,
            pattern,
            state: Mutex::new(SubscriptionState::Idle),
            run_lock: Mutex::new(()),
            tracker: Mutex::new(ErrorTracker::new()),
            runs: Mutex::new(0),
        })
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Directory handed to the OS watcher
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn state(&self) -> SubscriptionState {
        *lock(&self.state)
    }

    /// Number of completed runs
    pub fn runs(&self) -> usize {
        *lock(&self.runs)
    }

    /// Whether a changed path falls under this subscription.
    pub fn matches(&self, path: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_path_with(path, options)
    }

    /// Queue a run of the bound pipeline.
    ///
    /// Returns `None` when a queued run already exists and will pick up this
    /// change.
    pub fn trigger(
        self: &Arc<Self>,
        config: Arc<AssetConfig>,
        runner: PipelineRunner,
    ) -> Option<JoinHandle<()>> {
        {
            let mut state = lock(&self.state);
            if *state == SubscriptionState::Triggered {
                debug!(pipeline = %self.kind, "run already queued");
                return None;
            }
            *state = SubscriptionState::Triggered;
        }

        let subscription = Arc::clone(self);
        Some(thread::spawn(move || subscription.run(&config, &runner)))
    }

    fn run(&self, config: &AssetConfig, runner: &PipelineRunner) {
        let _guard = lock(&self.run_lock);
        *lock(&self.state) = SubscriptionState::Running;

        info!(pipeline = %self.kind, "rebuilding");
        let result = runner(self.kind, config);

        let failed_files: Vec<PathBuf> = match &result {
            Ok(report) => {
                if report.diagnostics.is_empty() {
                    info!(pipeline = %self.kind, "{}", report.summary());
                } else {
                    warn!(pipeline = %self.kind, "{}", report.summary());
                }
                report.diagnostics.iter().map(|d| d.file.clone()).collect()
            }
            Err(e) => {
                error!(pipeline = %self.kind, "build failed: {}", e);
                e.path().map(Path::to_path_buf).into_iter().collect()
            }
        };

        for fixed in lock(&self.tracker).update(failed_files) {
            info!(pipeline = %self.kind, "fixed: {}", fixed.display());
        }

        *lock(&self.runs) += 1;

        let mut state = lock(&self.state);
        // A newer trigger may already be queued behind us.
        if *state == SubscriptionState::Running {
            *state = SubscriptionState::Idle;
        }
    }
}

/// Owns the subscriptions and routes change batches to them.
pub struct WatchOrchestrator {
    config: Arc<AssetConfig>,
    subscriptions: Vec<Arc<Subscription>>,
    runner: PipelineRunner,
}

impl WatchOrchestrator {
    /// Subscribe the script pipeline to the script pattern and the style
    /// pipeline to the style pattern.
    pub fn new(config: Arc<AssetConfig>) -> Result<Self, WatchError> {
        let subscriptions = vec![
            Arc::new(Subscription::new(PipelineKind::Script, &config.root, &config.script.watch)?),
            Arc::new(Subscription::new(PipelineKind::Style, &config.root, &config.style.watch)?),
        ];
        Ok(Self { config, subscriptions, runner: Arc::new(run_pipeline) })
    }

    /// Replace the function used to run pipelines.
    pub fn with_runner(mut self, runner: PipelineRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn subscriptions(&self) -> &[Arc<Subscription>] {
        &self.subscriptions
    }

    /// Trigger every subscription matched by at least one changed path.
    pub fn dispatch(&self, paths: &[PathBuf]) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for subscription in &self.subscriptions {
            let Some(changed) = paths.iter().find(|p| subscription.matches(p)) else {
                continue;
            };
            info!(pipeline = %subscription.kind(), "changed: {}", changed.display());
            if let Some(handle) =
                subscription.trigger(Arc::clone(&self.config), Arc::clone(&self.runner))
            {
                handles.push(handle);
            }
        }
        handles
    }

    /// Start the OS watcher and the dispatch thread.
    pub fn start(self) -> Result<WatchSession, WatchError> {
        let (tx, rx) = channel();

        let debounce = Duration::from_millis(u64::from(self.config.watch.debounce_ms));
        let mut debouncer = new_debouncer(debounce, tx).map_err(WatchError::WatcherInit)?;

        let bases: BTreeSet<PathBuf> =
            self.subscriptions.iter().map(|s| s.base().to_path_buf()).collect();
        for base in &bases {
            debouncer
                .watcher()
                .watch(base, RecursiveMode::Recursive)
                .map_err(|source| WatchError::WatchPath { path: base.clone(), source })?;
        }

        for subscription in &self.subscriptions {
            info!(pipeline = %subscription.kind(), "watching {}", subscription.pattern());
        }

        let dispatcher = thread::Builder::new()
            .name("assetflow-watch".to_string())
            .spawn(move || loop {
                match rx.recv() {
                    Ok(Ok(events)) => {
                        let changed: Vec<PathBuf> = events
                            .into_iter()
                            .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                            .map(|e| e.path)
                            .collect();
                        if !changed.is_empty() {
                            self.dispatch(&changed);
                        }
                    }
                    Ok(Err(e)) => {
                        // Watch backend errors are not fatal
                        warn!("watch error: {:?}", e);
                    }
                    Err(_) => {
                        debug!("watcher closed");
                        break;
                    }
                }
            })
            .map_err(|e| WatchError::Channel(e.to_string()))?;

        Ok(WatchSession { _debouncer: debouncer, dispatcher: Some(dispatcher) })
    }
}

/// A running watch. Dropping it stops the watcher.
pub struct WatchSession {
    _debouncer: Debouncer<RecommendedWatcher>,
    dispatcher: Option<JoinHandle<()>>,
}

impl WatchSession {
    /// Block for the life of the process.
    pub fn wait(mut self) -> Result<(), WatchError> {
        match self.dispatcher.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WatchError::Channel("dispatch thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

/// Watch both patterns and rebuild on change.
pub fn start_watch(config: Arc<AssetConfig>) -> Result<WatchSession, WatchError> {
    WatchOrchestrator::new(config)?.start()
}

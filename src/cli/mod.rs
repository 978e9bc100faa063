//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use crate::config::{load_project_config, CliOverrides};
use crate::logging;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_CONFIG: u8 = 2;

/// Assetflow - build stylesheet and script bundles, optionally on every change
#[derive(Parser)]
#[command(name = "assetflow")]
#[command(about = "Assetflow - compile, prefix and minify stylesheets; bundle and minify scripts")]
#[command(version)]
pub struct Cli {
    /// Operation to run; without one both pipelines run once, in parallel
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to assetflow.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root that relative paths resolve against
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the stylesheet pipeline once
    Css,
    /// Run the script pipeline once
    Js,
    /// Watch sources and rebuild the matching pipeline on change
    Watch,
}

/// Entry point for the `assetflow` binary
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::select_level(cli.log_level.as_deref(), cli.verbose, cli.quiet));

    let overrides = CliOverrides { root: cli.root.clone() };
    let config = match load_project_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_INVALID_CONFIG);
        }
    };

    match cli.command {
        None => build::run_default(&config),
        Some(Commands::Css) => build::run_css(&config),
        Some(Commands::Js) => build::run_js(&config),
        Some(Commands::Watch) => build::run_watch(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_default() {
        let cli = Cli::try_parse_from(["assetflow"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_subcommands() {
        for (arg, expected) in
            [("css", Commands::Css), ("js", Commands::Js), ("watch", Commands::Watch)]
        {
            let cli = Cli::try_parse_from(["assetflow", arg]).unwrap();
            assert_eq!(cli.command, Some(expected));
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "assetflow",
            "js",
            "--config",
            "site/assetflow.toml",
            "--root",
            "site",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("site/assetflow.toml")));
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["assetflow", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["assetflow", "sass"]).is_err());
    }
}

//! Build command implementations (default, css, js, watch)

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::AssetConfig;
use crate::pipeline::{
    run_all, run_script_pipeline, run_style_pipeline, PipelineError, PipelineReport,
};
use crate::watch::start_watch;

/// Run both pipelines once, concurrently
pub fn run_default(config: &AssetConfig) -> ExitCode {
    let (style, script) = run_all(config);
    let style_ok = report_outcome(style);
    let script_ok = report_outcome(script);
    exit_code(style_ok && script_ok)
}

/// Run the stylesheet pipeline once
pub fn run_css(config: &AssetConfig) -> ExitCode {
    exit_code(report_outcome(run_style_pipeline(config)))
}

/// Run the script pipeline once
pub fn run_js(config: &AssetConfig) -> ExitCode {
    exit_code(report_outcome(run_script_pipeline(config)))
}

/// Watch both patterns until the process is stopped
pub fn run_watch(config: AssetConfig) -> ExitCode {
    let session = match start_watch(Arc::new(config)) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    info!("press Ctrl+C to stop");
    match session.wait() {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Print the summary line for a run; returns whether it counts as a success.
fn report_outcome(result: Result<PipelineReport, PipelineError>) -> bool {
    match result {
        Ok(report) => {
            if report.is_success() {
                println!("{}", report.summary());
            } else {
                eprintln!("{}", report.summary());
                for diagnostic in &report.diagnostics {
                    eprintln!("  {}", diagnostic);
                }
            }
            report.is_success()
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

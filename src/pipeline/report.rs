//! Pipeline run results.

use std::path::PathBuf;
use std::time::Duration;

use super::PipelineKind;
use crate::stages::Diagnostic;

/// Outcome of one pipeline run that did not hit a fatal error.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Which pipeline ran
    pub kind: PipelineKind,
    /// Resolved input files, in processing order
    pub inputs: Vec<PathBuf>,
    /// Files written
    pub outputs: Vec<PathBuf>,
    /// Total bytes written across outputs
    pub bytes_written: usize,
    /// Per-file problems the run survived
    pub diagnostics: Vec<Diagnostic>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl PipelineReport {
    pub fn new(kind: PipelineKind) -> Self {
        Self {
            kind,
            inputs: vec![],
            outputs: vec![],
            bytes_written: 0,
            diagnostics: vec![],
            duration: Duration::ZERO,
        }
    }

    /// An artifact was written and nothing was reported along the way.
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty() && !self.outputs.is_empty()
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        let inputs = self.inputs.len();
        let plural = if inputs == 1 { "" } else { "s" };
        let target = match self.outputs.as_slice() {
            [] => "no output".to_string(),
            [single] => single.display().to_string(),
            many => format!("{} files", many.len()),
        };
        let mut line = format!(
            "{}: {} input{} -> {} ({}) in {}",
            self.kind,
            inputs,
            plural,
            target,
            format_bytes(self.bytes_written),
            format_duration(self.duration)
        );
        if !self.diagnostics.is_empty() {
            let count = self.diagnostics.len();
            line.push_str(&format!(", {} error{}", count, if count == 1 { "" } else { "s" }));
        }
        line
    }
}

/// Format duration for display
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
    }

    #[test]
    fn test_report_success() {
        let mut report = PipelineReport::new(PipelineKind::Script);
        assert!(!report.is_success(), "nothing written yet");

        report.outputs.push(PathBuf::from("public/js/app.min.js"));
        assert!(report.is_success());

        report.diagnostics.push(Diagnostic::new("sass", "a.scss", "bad"));
        assert!(!report.is_success());
    }

    #[test]
    fn test_summary() {
        let mut report = PipelineReport::new(PipelineKind::Style);
        report.inputs.push(PathBuf::from("resources/sass/styles.scss"));
        report.outputs.push(PathBuf::from("public/css/style.min.css"));
        report.bytes_written = 300;
        report.duration = Duration::from_millis(12);

        assert_eq!(
            report.summary(),
            "css: 1 input -> public/css/style.min.css (300 B) in 12ms"
        );

        report.diagnostics.push(Diagnostic::new("sass", "a.scss", "bad"));
        assert!(report.summary().ends_with(", 1 error"));
    }

    #[test]
    fn test_summary_without_output() {
        let report = PipelineReport::new(PipelineKind::Script);
        assert_eq!(report.summary(), "js: 0 inputs -> no output (0 B) in 0ms");
    }
}

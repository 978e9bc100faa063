//! CLI integration tests for the `assetflow` binary.
//!
//! Runs the one-shot commands against temporary projects and checks output
//! files, exit codes, and that failures are reported rather than panicking.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run assetflow with the given arguments and return (stdout, stderr, exit code).
fn run_assetflow(args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(env!("CARGO_BIN_EXE_assetflow"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute assetflow");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Stock layout: jQuery, an app entry, one app module, and the main stylesheet.
fn create_stock_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "node_modules/jquery/dist/jquery.min.js", "window.MARKER_JQ = 1;\n");
    write(temp.path(), "resources/js/app.js", "window.MARKER_APP = 2;\n");
    write(temp.path(), "resources/js/app/nav.js", "window.MARKER_NAV = 3;\n");
    write(temp.path(), "resources/sass/styles.scss", "$w: 10px;\nbody { margin: $w; }\n");
    temp
}

#[test]
fn test_default_builds_both_outputs() {
    let temp = create_stock_project();
    let root = temp.path().to_str().unwrap();

    let (stdout, stderr, code) = run_assetflow(&["--root", root]);

    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(stdout.contains("css:"), "stdout: {}", stdout);
    assert!(stdout.contains("js:"), "stdout: {}", stdout);
    assert!(temp.path().join("public/css/style.min.css").exists());
    assert!(temp.path().join("public/js/app.min.js").exists());
}

#[test]
fn test_css_command_only_builds_styles() {
    let temp = create_stock_project();
    let root = temp.path().to_str().unwrap();

    let (_, stderr, code) = run_assetflow(&["css", "--root", root]);

    assert_eq!(code, Some(0), "stderr: {}", stderr);
    let css = fs::read_to_string(temp.path().join("public/css/style.min.css")).unwrap();
    assert_eq!(css, "body{margin:10px}");
    assert!(!temp.path().join("public/js").exists());
}

#[test]
fn test_js_command_only_builds_scripts() {
    let temp = create_stock_project();
    let root = temp.path().to_str().unwrap();

    let (_, stderr, code) = run_assetflow(&["js", "--root", root]);

    assert_eq!(code, Some(0), "stderr: {}", stderr);
    let js = fs::read_to_string(temp.path().join("public/js/app.min.js")).unwrap();
    let jq = js.find("MARKER_JQ").unwrap();
    let app = js.find("MARKER_APP").unwrap();
    let nav = js.find("MARKER_NAV").unwrap();
    assert!(jq < app && app < nav, "bundle: {}", js);
    assert!(!temp.path().join("public/css").exists());
}

#[test]
fn test_sass_error_exits_nonzero_without_panic() {
    let temp = create_stock_project();
    write(temp.path(), "resources/sass/styles.scss", "body { margin: ");
    let root = temp.path().to_str().unwrap();

    let (_, stderr, code) = run_assetflow(&["css", "--root", root]);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("[sass]"), "stderr: {}", stderr);
    assert!(!stderr.contains("panicked"));
    assert!(!temp.path().join("public/css/style.min.css").exists());
}

#[test]
fn test_missing_script_input_exits_nonzero() {
    let temp = create_stock_project();
    fs::remove_file(temp.path().join("node_modules/jquery/dist/jquery.min.js")).unwrap();
    let root = temp.path().to_str().unwrap();

    let (_, stderr, code) = run_assetflow(&["js", "--root", root]);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("jquery.min.js"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_exits_with_config_code() {
    let temp = create_stock_project();
    write(temp.path(), "assetflow.toml", "[script]\ninputs = []\n");
    let config = temp.path().join("assetflow.toml");

    let (_, stderr, code) = run_assetflow(&["js", "--config", config.to_str().unwrap()]);

    assert_eq!(code, Some(2));
    assert!(stderr.contains("script.inputs"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_command_is_rejected() {
    let (_, _, code) = run_assetflow(&["deploy"]);
    assert_eq!(code, Some(2));
}

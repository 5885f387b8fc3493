#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ctx::config::FormatOptions;
use ctx::engine::RunReport;
use ctx::output::format_output;
use serde_json::Value;

/// Aggregate of a finished run as a JSON value.
pub fn aggregate_value(report: &RunReport) -> Value {
    report.aggregate.to_value()
}

/// Render a report with the given options.
pub fn render(report: &RunReport, opts: &FormatOptions) -> String {
    format_output(&report.aggregate, opts, report.session_id()).expect("formatting failed")
}

/// Write an executable `/bin/sh` script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, file_name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(file_name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// `PATH` value with `dir` first, followed by the system directories the
/// scripts need for `sleep` and `cat`.
pub fn search_path_with(dir: &Path) -> String {
    format!("{}:/usr/bin:/bin", dir.display())
}

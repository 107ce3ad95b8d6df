//! Persisting reports to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::DependencyReport;
use crate::config::OutputConfig;
use crate::error::{RefGraphError, Result};

/// Report file name for a target: `<prefix><stem>.json`.
pub fn report_file_name(target: &Path, prefix: &str) -> String {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string());
    format!("{}{}.json", prefix, stem)
}

/// Full output path for a target's report under the configured directory.
pub fn report_path(target: &Path, output: &OutputConfig) -> PathBuf {
    output
        .resolve_directory()
        .join(report_file_name(target, &output.file_prefix))
}

/// Write `report` as JSON to `path`, creating parent directories.
pub fn write_report(report: &DependencyReport, path: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let mut writer = BufWriter::new(File::create(path)?);
        let written = if pretty {
            serde_json::to_writer_pretty(&mut writer, report)
        } else {
            serde_json::to_writer(&mut writer, report)
        };
        written.map_err(|e| {
            RefGraphError::Serialization(format!("JSON serialization error: {}", e))
        })?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    info!(
        path = %path.display(),
        modules = report.modules.len(),
        "Wrote dependency report"
    );
    Ok(())
}

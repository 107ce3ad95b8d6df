//! Configuration for an analysis run.
//!
//! Provides centralized configuration for module I/O, dependency search and
//! report output, with sensible defaults. A configuration can be loaded from a
//! JSON file; missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RefGraphError, Result};
use crate::io::IoLimits;

/// Master configuration for an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// I/O limits applied to every module binary.
    pub io: IoLimits,
    /// Where dependencies are looked for on disk.
    pub search: SearchConfig,
    /// Report output settings.
    pub output: OutputConfig,
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RefGraphError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RefGraphError::Config(format!("invalid configuration: {}", e)))
    }
}

/// Dependency search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Extra directories searched after the target's own directory.
    pub paths: Vec<PathBuf>,
    /// Search the platform's standard library directories last.
    pub use_system_paths: bool,
    /// Honor RPATH/RUNPATH entries found in loaded ELF modules.
    pub follow_rpaths: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            use_system_paths: true,
            follow_rpaths: true,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; `None` selects the user's desktop or home directory.
    pub directory: Option<PathBuf>,
    /// Prefix of the report file name, followed by the target's stem.
    pub file_prefix: String,
    /// Pretty-print the JSON document.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "ReferenceAnalysis-".to_string(),
            pretty: true,
        }
    }
}

impl OutputConfig {
    /// The directory reports are written to.
    pub fn resolve_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        dirs::desktop_dir()
            .filter(|d| d.is_dir())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Standard shared-library directories for the host platform.
pub fn system_library_paths() -> Vec<PathBuf> {
    let dirs: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\System32", "C:\\Windows\\SysWOW64"]
    } else if cfg!(target_os = "macos") {
        &["/usr/lib", "/usr/local/lib", "/opt/homebrew/lib"]
    } else {
        &[
            "/lib",
            "/lib64",
            "/usr/lib",
            "/usr/lib64",
            "/usr/local/lib",
            "/lib/x86_64-linux-gnu",
            "/usr/lib/x86_64-linux-gnu",
            "/lib/aarch64-linux-gnu",
            "/usr/lib/aarch64-linux-gnu",
        ]
    };
    dirs.iter().map(PathBuf::from).collect()
}

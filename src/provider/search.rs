//! Locating dependency files from bare module names.
//!
//! Directories are consulted in a fixed order: the target's own directory,
//! runtime search directories declared by loaded modules, configured paths,
//! then system library directories. The first regular file that matches wins.

use std::path::{Path, PathBuf};
use tracing::trace;

const MACHO_PREFIXES: [&str; 3] = ["@rpath/", "@loader_path/", "@executable_path/"];

/// Ordered set of directories searched for dependencies.
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    origin: Option<PathBuf>,
    runtime: Vec<PathBuf>,
    configured: Vec<PathBuf>,
    system: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(configured: Vec<PathBuf>, system: Vec<PathBuf>) -> Self {
        Self {
            origin: None,
            runtime: Vec::new(),
            configured,
            system,
        }
    }

    /// Directory of the target module; searched first.
    pub fn set_origin<P: AsRef<Path>>(&mut self, dir: P) {
        self.origin = Some(dir.as_ref().to_path_buf());
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Record RPATH/RUNPATH/LC_RPATH entries of a module located in `module_dir`.
    pub fn add_runtime_dirs(&mut self, module_dir: &Path, raw: &[String]) {
        for entry in raw {
            let Some(dir) = self.expand(module_dir, entry) else {
                continue;
            };
            if !self.runtime.contains(&dir) {
                trace!(dir = %dir.display(), "Added runtime search directory");
                self.runtime.push(dir);
            }
        }
    }

    /// Expand `$ORIGIN`-style tokens; entries still relative afterwards are dropped.
    fn expand(&self, module_dir: &Path, entry: &str) -> Option<PathBuf> {
        let loader = module_dir.to_string_lossy();
        let executable = self
            .origin
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| loader.to_string());
        let expanded = entry
            .replace("${ORIGIN}", &loader)
            .replace("$ORIGIN", &loader)
            .replace("@loader_path", &loader)
            .replace("@executable_path", &executable);
        let path = PathBuf::from(expanded);
        path.is_absolute().then_some(path)
    }

    /// All directories in search order, without duplicates.
    pub fn directories(&self) -> Vec<&Path> {
        let mut out: Vec<&Path> = Vec::new();
        let all = self
            .origin
            .iter()
            .chain(&self.runtime)
            .chain(&self.configured)
            .chain(&self.system);
        for dir in all {
            if !out.contains(&dir.as_path()) {
                out.push(dir.as_path());
            }
        }
        out
    }

    /// Find the file for a declared module name.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_absolute() && direct.is_file() {
            return Some(direct.to_path_buf());
        }

        let stripped = MACHO_PREFIXES
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix))
            .unwrap_or(name);
        let file_name = Path::new(stripped).file_name()?.to_string_lossy().into_owned();
        let mut candidates = vec![file_name.clone()];
        if let Some(lower) = dll_fallback(&file_name) {
            candidates.push(lower);
        }

        for dir in self.directories() {
            for candidate in &candidates {
                let path = dir.join(candidate);
                if path.is_file() {
                    trace!(name, path = %path.display(), "Located module");
                    return Some(path);
                }
            }
        }
        None
    }
}

/// Lowercase form of a DLL name that differs from it. DLL names resolve
/// case-insensitively; other module names never do.
fn dll_fallback(file_name: &str) -> Option<String> {
    let lower = file_name.to_ascii_lowercase();
    (lower.ends_with(".dll") && lower != file_name).then_some(lower)
}

//! Metadata provider reading real ELF, PE and Mach-O files.

use std::path::Path;
use tracing::debug;

use super::search::SearchPaths;
use super::{LookupError, MetadataProvider, ModuleLocator, ModuleMetadata};
use crate::config::{system_library_paths, AnalysisConfig};
use crate::formats::{parse_module, FormatError, ModuleInfo};
use crate::io::{IoLimits, ModuleImage};

/// Provider that maps module files from disk and parses their headers.
///
/// Runtime search directories declared by every module it loads are
/// remembered and used for later name lookups.
#[derive(Debug, Clone)]
pub struct BinaryMetadataProvider {
    limits: IoLimits,
    search: SearchPaths,
    follow_rpaths: bool,
}

impl BinaryMetadataProvider {
    pub fn new(config: &AnalysisConfig) -> Self {
        let system = if config.search.use_system_paths {
            system_library_paths()
        } else {
            Vec::new()
        };
        Self {
            limits: config.io.clone(),
            search: SearchPaths::new(config.search.paths.clone(), system),
            follow_rpaths: config.search.follow_rpaths,
        }
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search
    }

    fn load_file(&mut self, path: &Path) -> Result<ModuleInfo, LookupError> {
        let image = ModuleImage::open(path, &self.limits).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let info = parse_module(image.bytes()).map_err(|e| match e {
            FormatError::Unsupported => LookupError::UnsupportedFormat(path.to_path_buf()),
            FormatError::Malformed(reason) => LookupError::Malformed {
                path: path.to_path_buf(),
                reason,
            },
        })?;

        debug!(
            path = %path.display(),
            format = ?info.format,
            build_type = %info.build_type,
            dependencies = info.dependencies.len(),
            "Parsed module"
        );

        if self.follow_rpaths && !info.search_dirs.is_empty() {
            let module_dir = path.parent().unwrap_or_else(|| Path::new("/"));
            self.search.add_runtime_dirs(module_dir, &info.search_dirs);
        }
        Ok(info)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl MetadataProvider for BinaryMetadataProvider {
    fn lookup(&mut self, locator: &ModuleLocator) -> Result<ModuleMetadata, LookupError> {
        match locator {
            ModuleLocator::Path(path) => {
                let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                if let Some(dir) = resolved.parent() {
                    self.search.set_origin(dir);
                }
                let info = self.load_file(&resolved)?;
                let name = info
                    .declared_name
                    .clone()
                    .unwrap_or_else(|| file_name(&resolved));
                Ok(ModuleMetadata::new(name, info.build_type, info.dependencies))
            }
            ModuleLocator::Name(name) => {
                let Some(path) = self.search.locate(name) else {
                    return Err(LookupError::NotFound(locator.clone()));
                };
                let info = self.load_file(&path)?;
                // Dependents refer to a module by the name they declared, so
                // that is the identity reported back.
                Ok(ModuleMetadata::new(name.clone(), info.build_type, info.dependencies))
            }
        }
    }
}

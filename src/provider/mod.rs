//! Module metadata providers.
//!
//! A [`MetadataProvider`] answers one question: given a module identity, what
//! is the module's declared name, how was it built, and which modules does it
//! directly depend on. The graph builder only talks to this trait.

pub mod binary;
pub mod search;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::BuildType;
use crate::io::error::IoError;

pub use binary::BinaryMetadataProvider;
pub use search::SearchPaths;

/// How a module is identified when its metadata is requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleLocator {
    /// A filesystem path; used for the target module.
    Path(PathBuf),
    /// A bare module name as declared by a dependent; used for all others.
    Name(String),
}

impl fmt::Display for ModuleLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleLocator::Path(p) => write!(f, "{}", p.display()),
            ModuleLocator::Name(n) => write!(f, "{}", n),
        }
    }
}

/// Metadata embedded in a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Declared module name; the registry key.
    pub name: String,
    /// Build classification; `Unknown` when it could not be determined.
    pub build_type: BuildType,
    /// Direct dependency names in declaration order.
    pub dependencies: Vec<String>,
}

impl ModuleMetadata {
    pub fn new<S: Into<String>>(name: S, build_type: BuildType, dependencies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            build_type,
            dependencies,
        }
    }
}

/// Reasons a module's metadata cannot be produced.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Module not found: {0}")]
    NotFound(ModuleLocator),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Unsupported binary format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Malformed module {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Source of module metadata for the graph builder.
pub trait MetadataProvider {
    /// Fetch metadata for one module.
    fn lookup(&mut self, locator: &ModuleLocator) -> Result<ModuleMetadata, LookupError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &mut P {
    fn lookup(&mut self, locator: &ModuleLocator) -> Result<ModuleMetadata, LookupError> {
        (**self).lookup(locator)
    }
}

/// In-memory provider backed by fixed tables.
///
/// Deterministic by construction; records every lookup it serves so callers
/// can verify how often each module was requested.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    by_path: HashMap<PathBuf, ModuleMetadata>,
    by_name: HashMap<String, ModuleMetadata>,
    lookups: Vec<ModuleLocator>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module that can be found by name.
    pub fn with_module(mut self, name: &str, build_type: BuildType, dependencies: &[&str]) -> Self {
        self.by_name.insert(
            name.to_string(),
            ModuleMetadata::new(name, build_type, to_owned(dependencies)),
        );
        self
    }

    /// Register a module that can be loaded from `path`.
    pub fn with_path<P: AsRef<Path>>(
        mut self,
        path: P,
        name: &str,
        build_type: BuildType,
        dependencies: &[&str],
    ) -> Self {
        self.by_path.insert(
            path.as_ref().to_path_buf(),
            ModuleMetadata::new(name, build_type, to_owned(dependencies)),
        );
        self
    }

    /// Every locator requested so far, in request order.
    pub fn lookups(&self) -> &[ModuleLocator] {
        &self.lookups
    }

    /// How many times `name` was requested by name.
    pub fn lookup_count(&self, name: &str) -> usize {
        self.lookups
            .iter()
            .filter(|l| matches!(l, ModuleLocator::Name(n) if n == name))
            .count()
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl MetadataProvider for StaticProvider {
    fn lookup(&mut self, locator: &ModuleLocator) -> Result<ModuleMetadata, LookupError> {
        self.lookups.push(locator.clone());
        let found = match locator {
            ModuleLocator::Path(path) => self.by_path.get(path),
            ModuleLocator::Name(name) => self.by_name.get(name),
        };
        found
            .cloned()
            .ok_or_else(|| LookupError::NotFound(locator.clone()))
    }
}

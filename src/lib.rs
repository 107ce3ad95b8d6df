//! Transitive dependency analysis of executable modules.
//!
//! Starting from one target module (ELF, PE or Mach-O), the crate loads the
//! module's declared dependencies, then theirs, until every reachable module
//! has been visited once. The result is a [`graph::DependencyGraph`] which can
//! be turned into a [`report::DependencyReport`] listing, for every module,
//! what it uses and what uses it.
//!
//! ```no_run
//! use refgraph::{analyze_path, AnalysisConfig};
//!
//! let report = analyze_path("/usr/bin/ls", &AnalysisConfig::default())?;
//! for module in &report.modules {
//!     println!("{} found={}", module.name(), module.identity.found);
//! }
//! # Ok::<(), refgraph::RefGraphError>(())
//! ```

/// Analysis configuration
pub mod config;
/// Module registry and node types
pub mod core;
pub mod error;
/// Binary header parsing
pub mod formats;
pub mod graph;
pub mod io;
pub mod logging;
/// Module metadata providers
pub mod provider;
pub mod report;

use std::path::Path;
use tracing::info;

pub use config::AnalysisConfig;
pub use crate::core::{BuildType, ModuleId, ModuleNode, ModuleRegistry};
pub use error::{RefGraphError, Result};
pub use graph::{build_graph, DependencyGraph, GraphBuilder};
pub use provider::{
    BinaryMetadataProvider, LookupError, MetadataProvider, ModuleLocator, ModuleMetadata,
    StaticProvider,
};
pub use report::{assemble_report, write_report, DependencyReport, ModuleEntry, ModuleIdentity};

/// Build the dependency graph of the module at `path` using `provider`.
pub fn analyze<P, M>(path: P, provider: M) -> Result<DependencyGraph>
where
    P: AsRef<Path>,
    M: MetadataProvider,
{
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(RefGraphError::InvalidInput("empty target path".to_string()));
    }
    build_graph(provider, path)
}

/// Analyze the module at `path` from disk and assemble its report.
pub fn analyze_path<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<DependencyReport> {
    let path = path.as_ref();
    let _span = crate::span_trace!("analyze", path = %path.display()).entered();
    let graph = analyze(path, BinaryMetadataProvider::new(config))?;
    let report = assemble_report(&graph);
    let missing = report.modules.iter().filter(|m| !m.identity.found).count();
    info!(
        modules = report.modules.len(),
        missing,
        "Analysis finished"
    );
    Ok(report)
}

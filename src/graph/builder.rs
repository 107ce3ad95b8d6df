//! GraphBuilder: depth-first construction of the module dependency graph.
//!
//! Resolution walks each module's dependency list in declaration order. It
//! runs on an explicit frame stack rather than the call stack, visiting
//! modules in exactly the order a recursive walk would, so a long dependency
//! chain cannot exhaust the thread's stack.

use std::path::Path;
use tracing::{debug, info, trace, warn};

use crate::core::{ModuleId, ModuleRegistry, Resolution};
use crate::error::{RefGraphError, Result};
use crate::graph::DependencyGraph;
use crate::provider::{MetadataProvider, ModuleLocator};

/// A module whose metadata is loaded and whose dependencies are still being
/// walked.
struct Frame {
    module: ModuleId,
    pending: std::vec::IntoIter<String>,
}

/// Populates a [`ModuleRegistry`] from a [`MetadataProvider`].
pub struct GraphBuilder<P> {
    provider: P,
    registry: ModuleRegistry,
}

impl<P: MetadataProvider> GraphBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            registry: ModuleRegistry::new(),
        }
    }

    /// Load the target module and everything reachable from it.
    ///
    /// This is the only fatal step of an analysis: if the target's metadata
    /// cannot be obtained, no graph exists.
    pub fn load_target(&mut self, path: &Path) -> Result<ModuleId> {
        if self.registry.target().is_some() {
            return Err(RefGraphError::InvalidInput(
                "a target module was already loaded for this analysis".to_string(),
            ));
        }

        let metadata = self
            .provider
            .lookup(&ModuleLocator::Path(path.to_path_buf()))
            .map_err(|source| RefGraphError::TargetLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let id = match self.registry.resolve(&metadata.name) {
            Resolution::Created(id) => id,
            Resolution::Existing(_) => {
                return Err(RefGraphError::InvalidInput(format!(
                    "target module {} is already registered as a dependency",
                    metadata.name
                )));
            }
        };
        self.registry.set_target(id);
        self.registry.node_mut(id).begin_resolving(metadata.build_type);
        debug!(
            module = %metadata.name,
            build_type = %metadata.build_type,
            dependencies = metadata.dependencies.len(),
            "Loaded target module"
        );

        let mut stack = vec![Frame {
            module: id,
            pending: metadata.dependencies.into_iter(),
        }];
        self.drain(&mut stack);

        info!(
            module = %self.registry.node(id).name(),
            modules = self.registry.len(),
            "Dependency graph complete"
        );
        Ok(id)
    }

    /// Resolve one dependency by name, loading it (and its own dependencies)
    /// the first time the name is seen.
    ///
    /// Never fails: a module that cannot be loaded becomes a `NotFound` node.
    pub fn resolve_dependency(&mut self, name: &str) -> ModuleId {
        let mut stack = Vec::new();
        let id = self.visit(name, &mut stack);
        self.drain(&mut stack);
        id
    }

    /// Registry built so far.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Finish construction. Requires a loaded target.
    pub fn finish(self) -> Result<DependencyGraph> {
        let target = self.registry.target().ok_or_else(|| {
            RefGraphError::InvalidInput("no target module was loaded".to_string())
        })?;
        Ok(DependencyGraph::new(self.registry, target))
    }

    /// Registry lookup plus, on first sight, a metadata lookup. A loaded
    /// module leaves a frame on the stack for its dependencies.
    fn visit(&mut self, name: &str, stack: &mut Vec<Frame>) -> ModuleId {
        let id = match self.registry.resolve(name) {
            Resolution::Existing(id) => {
                trace!(module = %name, "Already registered");
                return id;
            }
            Resolution::Created(id) => id,
        };

        match self.provider.lookup(&ModuleLocator::Name(name.to_string())) {
            Ok(metadata) => {
                debug!(
                    module = %name,
                    build_type = %metadata.build_type,
                    dependencies = metadata.dependencies.len(),
                    "Loaded module"
                );
                self.registry
                    .node_mut(id)
                    .begin_resolving(metadata.build_type);
                stack.push(Frame {
                    module: id,
                    pending: metadata.dependencies.into_iter(),
                });
            }
            Err(err) => {
                warn!(module = %name, error = %err, "Dependency could not be loaded");
                self.registry.node_mut(id).mark_not_found();
            }
        }
        id
    }

    fn drain(&mut self, stack: &mut Vec<Frame>) {
        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(dependency) => {
                    let parent = frame.module;
                    let child = self.visit(&dependency, stack);
                    self.registry.node_mut(parent).push_reference(child);
                }
                None => {
                    let module = frame.module;
                    stack.pop();
                    self.registry.node_mut(module).finish_resolving();
                }
            }
        }
    }
}

/// Build the dependency graph of the module at `path`.
pub fn build_graph<P: MetadataProvider>(provider: P, path: &Path) -> Result<DependencyGraph> {
    let mut builder = GraphBuilder::new(provider);
    builder.load_target(path)?;
    builder.finish()
}

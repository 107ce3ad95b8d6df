//! Dependency graph construction.

pub mod builder;

pub use builder::{build_graph, GraphBuilder};

use crate::core::{ModuleId, ModuleNode, ModuleRegistry};

/// A completed, read-only dependency graph rooted at the target module.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    registry: ModuleRegistry,
    target: ModuleId,
}

impl DependencyGraph {
    pub(crate) fn new(registry: ModuleRegistry, target: ModuleId) -> Self {
        Self { registry, target }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn target(&self) -> ModuleId {
        self.target
    }

    pub fn target_node(&self) -> &ModuleNode {
        self.registry.node(self.target)
    }

    /// Look up a module by exact name.
    pub fn module(&self, name: &str) -> Option<&ModuleNode> {
        self.registry.by_name(name)
    }

    /// Names of a module's direct dependencies, in declaration order.
    pub fn dependency_names(&self, name: &str) -> Option<Vec<&str>> {
        let node = self.module(name)?;
        Some(
            node.references()
                .iter()
                .map(|&id| self.registry.node(id).name())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

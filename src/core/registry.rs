//! ModuleRegistry: the per-analysis store of module nodes.
//!
//! The registry owns every [`ModuleNode`] of one analysis in an arena, keyed
//! by exact module name. Insertion order is first-discovery order and is what
//! the report follows.

use std::collections::HashMap;

use crate::core::module::{ModuleId, ModuleNode};

/// Outcome of [`ModuleRegistry::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The name was already registered; the node must not be populated again.
    Existing(ModuleId),
    /// A fresh node was inserted; the caller is responsible for populating it.
    Created(ModuleId),
}

impl Resolution {
    pub fn id(self) -> ModuleId {
        match self {
            Resolution::Existing(id) | Resolution::Created(id) => id,
        }
    }

    pub fn is_created(self) -> bool {
        matches!(self, Resolution::Created(_))
    }
}

/// Deduplicated store of one node per distinct module name.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    nodes: Vec<ModuleNode>,
    by_name: HashMap<String, ModuleId>,
    target: Option<ModuleId>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized resolve-or-create.
    ///
    /// A new node is inserted before anyone populates it, so a dependency
    /// chain that leads back to this name finds the node instead of recursing.
    pub fn resolve(&mut self, name: &str) -> Resolution {
        if let Some(&id) = self.by_name.get(name) {
            return Resolution::Existing(id);
        }
        let id = ModuleId(self.nodes.len());
        self.nodes.push(ModuleNode::new(name.to_string()));
        self.by_name.insert(name.to_string(), id);
        Resolution::Created(id)
    }

    /// Look up a node by exact name.
    pub fn get(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Access a node by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another registry.
    pub fn node(&self, id: ModuleId) -> &ModuleNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: ModuleId) -> &mut ModuleNode {
        &mut self.nodes[id.0]
    }

    /// Convenience lookup by name.
    pub fn by_name(&self, name: &str) -> Option<&ModuleNode> {
        self.get(name).map(|id| self.node(id))
    }

    pub(crate) fn set_target(&mut self, id: ModuleId) {
        debug_assert!(self.target.is_none(), "target registered twice");
        self.nodes[id.0].mark_target();
        self.target = Some(id);
    }

    /// The module originally requested, once loaded.
    pub fn target(&self) -> Option<ModuleId> {
        self.target
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in first-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &ModuleNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (ModuleId(i), node))
    }

    /// Names in first-discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }
}

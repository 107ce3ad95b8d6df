//! ModuleNode type: one distinct module encountered during an analysis.
//!
//! Nodes live in the [`ModuleRegistry`](crate::core::registry::ModuleRegistry)
//! arena and refer to each other through [`ModuleId`] handles, so a module
//! depended on by many others is stored once and shared by every edge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build configuration a module was compiled with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    /// Not determinable, or the module was never loaded.
    #[default]
    Unknown,
    /// Compiled with debug information.
    Debug,
    /// Compiled without debug information.
    Release,
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Unknown => write!(f, "Unknown"),
            BuildType::Debug => write!(f, "Debug"),
            BuildType::Release => write!(f, "Release"),
        }
    }
}

/// Handle to a node owned by a registry. Only meaningful for the registry
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Position of the node in first-discovery order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolution progress of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionState {
    /// Inserted into the registry, metadata not requested yet.
    Unresolved,
    /// Metadata loaded, dependencies still being resolved.
    Resolving,
    /// Fully populated.
    Resolved,
    /// Metadata could not be obtained.
    NotFound,
}

impl ResolutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ResolutionState::Resolved | ResolutionState::NotFound)
    }
}

/// One distinct module in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    name: String,
    state: ResolutionState,
    build_type: BuildType,
    references: Vec<ModuleId>,
    is_target: bool,
}

impl ModuleNode {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            state: ResolutionState::Unresolved,
            build_type: BuildType::Unknown,
            references: Vec::new(),
            is_target: false,
        }
    }

    /// Canonical module name, unique within one analysis.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether metadata for this module was obtained.
    pub fn found(&self) -> bool {
        matches!(
            self.state,
            ResolutionState::Resolving | ResolutionState::Resolved
        )
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// Direct dependencies in declaration order.
    pub fn references(&self) -> &[ModuleId] {
        &self.references
    }

    pub fn is_target(&self) -> bool {
        self.is_target
    }

    pub(crate) fn mark_target(&mut self) {
        self.is_target = true;
    }

    /// Metadata arrived; dependencies follow through `push_reference`.
    pub(crate) fn begin_resolving(&mut self, build_type: BuildType) {
        debug_assert_eq!(self.state, ResolutionState::Unresolved);
        self.state = ResolutionState::Resolving;
        self.build_type = build_type;
    }

    pub(crate) fn push_reference(&mut self, id: ModuleId) {
        debug_assert_eq!(self.state, ResolutionState::Resolving);
        self.references.push(id);
    }

    pub(crate) fn finish_resolving(&mut self) {
        debug_assert_eq!(self.state, ResolutionState::Resolving);
        self.state = ResolutionState::Resolved;
    }

    pub(crate) fn mark_not_found(&mut self) {
        debug_assert_eq!(self.state, ResolutionState::Unresolved);
        self.state = ResolutionState::NotFound;
        self.build_type = BuildType::Unknown;
        self.references.clear();
    }
}

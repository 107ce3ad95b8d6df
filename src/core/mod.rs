//! Core data types for dependency analysis.
//!
//! The graph is an arena: the registry owns every node and edges are
//! `ModuleId` handles into it.

pub mod module;
pub mod registry;

pub use module::{BuildType, ModuleId, ModuleNode, ResolutionState};
pub use registry::{ModuleRegistry, Resolution};

//! Dependency report types.
//!
//! The report is the persisted form of an analysis: one entry per distinct
//! module in discovery order, each listing its direct dependencies and its
//! direct dependents as identity-only records. Nested records are never
//! expanded further, so report size is bounded by V + 2E regardless of graph
//! depth or cycles.

pub mod assemble;
pub mod writer;

pub use assemble::{assemble_report, assemble_report_at, ReportAssembler, TIMESTAMP_FORMAT};
pub use writer::{report_file_name, report_path, write_report};

use serde::{Deserialize, Serialize};

use crate::core::{BuildType, ModuleNode};
use crate::error::{RefGraphError, Result};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Identity fields of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIdentity {
    pub name: String,
    pub found: bool,
    pub build_type: BuildType,
}

impl From<&ModuleNode> for ModuleIdentity {
    fn from(node: &ModuleNode) -> Self {
        Self {
            name: node.name().to_string(),
            found: node.found(),
            build_type: node.build_type(),
        }
    }
}

/// One module of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    #[serde(flatten)]
    pub identity: ModuleIdentity,
    /// Set on exactly one entry: the module the analysis started from.
    #[serde(default, skip_serializing_if = "is_false")]
    pub target: bool,
    /// Direct dependencies in declaration order.
    pub depends_on: Vec<ModuleIdentity>,
    /// Direct dependents in their discovery order.
    pub referenced_by: Vec<ModuleIdentity>,
}

impl ModuleEntry {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn dependency_names(&self) -> Vec<&str> {
        self.depends_on.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn dependent_names(&self) -> Vec<&str> {
        self.referenced_by.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Root record of a dependency report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Generation timestamp, `dd/mm/YYYY HH:MM:SS` local time.
    pub generated: String,
    pub modules: Vec<ModuleEntry>,
}

impl DependencyReport {
    /// Entry for a module by exact name.
    pub fn entry(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.identity.name == name)
    }

    /// The entry flagged as target.
    pub fn target(&self) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.target)
    }

    /// Module names in report order.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RefGraphError::Serialization(format!("JSON serialization error: {}", e)))
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RefGraphError::Serialization(format!("JSON serialization error: {}", e)))
    }

    pub fn from_json_str(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| {
            RefGraphError::Serialization(format!("JSON deserialization error: {}", e))
        })
    }
}

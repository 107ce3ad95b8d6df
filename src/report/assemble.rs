//! Turning a finished dependency graph into a report.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use tracing::debug;

use super::{DependencyReport, ModuleEntry, ModuleIdentity};
use crate::core::{ModuleId, ModuleRegistry};
use crate::graph::DependencyGraph;

/// Format of the report's `generated` field.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Reverse-edge index over a populated registry.
pub struct ReportAssembler<'a> {
    registry: &'a ModuleRegistry,
    dependents: Vec<Vec<ModuleId>>,
}

impl<'a> ReportAssembler<'a> {
    /// Derive dependents for every module in a single pass over all edges.
    ///
    /// Walking dependents in registry order yields each module's dependents in
    /// their discovery order. A dependent listing the same module twice is
    /// recorded once.
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        let mut dependents: Vec<Vec<ModuleId>> = vec![Vec::new(); registry.len()];
        for (id, node) in registry.iter() {
            for &dep in node.references() {
                let list = &mut dependents[dep.index()];
                if list.last() != Some(&id) {
                    list.push(id);
                }
            }
        }
        Self {
            registry,
            dependents,
        }
    }

    /// Modules that reference `id` directly.
    pub fn dependents_of(&self, id: ModuleId) -> &[ModuleId] {
        self.dependents
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn identity(&self, id: ModuleId) -> ModuleIdentity {
        ModuleIdentity::from(self.registry.node(id))
    }

    /// Build the report with the given `generated` stamp.
    pub fn assemble(&self, generated: String) -> DependencyReport {
        let target = self.registry.target();
        let modules: Vec<ModuleEntry> = self
            .registry
            .iter()
            .map(|(id, node)| ModuleEntry {
                identity: ModuleIdentity::from(node),
                target: target == Some(id),
                depends_on: node.references().iter().map(|&d| self.identity(d)).collect(),
                referenced_by: self
                    .dependents_of(id)
                    .iter()
                    .map(|&d| self.identity(d))
                    .collect(),
            })
            .collect();

        debug!(modules = modules.len(), "Assembled dependency report");
        DependencyReport { generated, modules }
    }
}

/// Assemble a report stamped with the current local time.
pub fn assemble_report(graph: &DependencyGraph) -> DependencyReport {
    assemble_report_at(graph, &Local::now())
}

/// Assemble a report stamped with `generated`.
pub fn assemble_report_at<Tz>(graph: &DependencyGraph, generated: &DateTime<Tz>) -> DependencyReport
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ReportAssembler::new(graph.registry()).assemble(generated.format(TIMESTAMP_FORMAT).to_string())
}

//! Patch registry and execution engine

use super::{Patch, PatchStats};
use crate::{registry::CriteriaRegistry, Error, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, info};

/// Registry of patches with dependency-aware execution
pub struct PatchRegistry {
    patches: Vec<Box<dyn Patch>>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self {
            patches: Vec::new(),
        }
    }

    /// Registry with the standard reconciliation steps
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add(Box::new(super::CodeListPatch));
        registry.add(Box::new(super::VariableNamePatch));
        registry.add(Box::new(super::VariableSubsetsPatch));
        registry.add(Box::new(super::VariableDataCriteriaPatch));
        registry.add(Box::new(super::DescriptionsPatch));
        registry
    }

    pub fn add(&mut self, patch: Box<dyn Patch>) {
        debug!("Registering patch: {}", patch.name());
        self.patches.push(patch);
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Patch every criteria in registration order
    ///
    /// Each criteria runs through all patches before the next one starts, so
    /// later criteria see the patched state of earlier ones.
    pub fn apply_all(&self, references: &mut CriteriaRegistry) -> Result<PatchStats> {
        if self.patches.is_empty() {
            debug!("No patches registered, skipping patch pass");
            return Ok(PatchStats::new());
        }

        let ordered = self.topological_sort()?;
        info!(
            "Patching {} criteria with {} patches",
            references.len(),
            ordered.len()
        );

        let mut total_stats = PatchStats::new();
        for id in references.ids() {
            let Some(mut criteria) = references.get(&id).cloned() else {
                continue;
            };
            for patch in &ordered {
                let stats = patch.apply(&mut criteria, references)?;
                if stats.has_changes() {
                    debug!("Patch '{}' changed {}: {}", patch.name(), id, stats);
                }
                total_stats.merge(&stats);
            }
            if let Some(slot) = references.get_mut(&id) {
                *slot = criteria;
            }
        }

        info!("Patch pass complete: {}", total_stats);
        Ok(total_stats)
    }

    /// Sort patches so every run_before/run_after constraint holds
    fn topological_sort(&self) -> Result<Vec<&dyn Patch>> {
        let name_to_idx: HashMap<&str, usize> = self
            .patches
            .iter()
            .enumerate()
            .map(|(idx, patch)| (patch.name(), idx))
            .collect();

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.patches.len()).map(|idx| graph.add_node(idx)).collect();

        for (idx, patch) in self.patches.iter().enumerate() {
            for before in patch.run_before() {
                if let Some(&other) = name_to_idx.get(before) {
                    graph.add_edge(nodes[idx], nodes[other], ());
                    debug!("Dependency: {} must run before {}", patch.name(), before);
                }
            }
            for after in patch.run_after() {
                if let Some(&other) = name_to_idx.get(after) {
                    graph.add_edge(nodes[other], nodes[idx], ());
                    debug!("Dependency: {} must run after {}", patch.name(), after);
                }
            }
        }

        let sorted = toposort(&graph, None).map_err(|cycle| {
            Error::Config(format!(
                "Circular dependency detected in patch graph at node {:?}",
                cycle.node_id()
            ))
        })?;

        let result: Vec<&dyn Patch> = sorted
            .into_iter()
            .map(|node| self.patches[graph[node]].as_ref())
            .collect();

        debug!(
            "Patch execution order: {:?}",
            result.iter().map(|p| p.name()).collect::<Vec<_>>()
        );
        Ok(result)
    }
}

impl Default for PatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

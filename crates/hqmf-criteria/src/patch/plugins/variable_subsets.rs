//! Turn verbose references into variable groupers

use crate::{
    extractor::QDM_VARIABLE_MARKER,
    models::{DataCriteria, DerivationOperator, GROUP_PREFIX},
    patch::{Patch, PatchStats},
    registry::CriteriaRegistry,
    Result,
};

/// A grouper wrapping a single variable is itself a variable over the
/// variable's grouper form
pub struct VariableSubsetsPatch;

impl Patch for VariableSubsetsPatch {
    fn name(&self) -> &str {
        "variable-subsets"
    }

    fn run_after(&self) -> Vec<&str> {
        vec!["variable-name"]
    }

    fn apply(&self, criteria: &mut DataCriteria, _references: &CriteriaRegistry) -> Result<PatchStats> {
        let mut stats = PatchStats::new();
        if !criteria.verbose_reference {
            return Ok(stats);
        }

        criteria.variable = true;
        for child in &mut criteria.children_criteria {
            if !child.starts_with(GROUP_PREFIX) && child.contains(QDM_VARIABLE_MARKER) {
                *child = format!("{GROUP_PREFIX}{child}");
                stats.record_child_rewrite();
            }
        }
        criteria.derivation_operator = Some(DerivationOperator::Union);
        Ok(stats)
    }
}

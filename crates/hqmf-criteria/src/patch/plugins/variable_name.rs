//! Describe variables by their id extension

use crate::{
    models::DataCriteria,
    patch::{Patch, PatchStats},
    registry::CriteriaRegistry,
    Result,
};

/// The variable's real name is not in the document; the id extension is the
/// closest thing to it
pub struct VariableNamePatch;

impl Patch for VariableNamePatch {
    fn name(&self) -> &str {
        "variable-name"
    }

    fn run_after(&self) -> Vec<&str> {
        vec!["code-list"]
    }

    fn apply(&self, criteria: &mut DataCriteria, _references: &CriteriaRegistry) -> Result<PatchStats> {
        let mut stats = PatchStats::new();
        if criteria.variable {
            criteria.description = criteria.id_extension.clone();
            stats.record_description();
        }
        Ok(stats)
    }
}

//! Embed the grouper of source variables

use crate::{
    models::{DataCriteria, Definition, DerivationOperator},
    patch::{Patch, PatchStats},
    registry::CriteriaRegistry,
    Result,
};

/// A source variable without composition stands for a single criteria and
/// becomes a union over its own grouper
pub struct VariableDataCriteriaPatch;

impl Patch for VariableDataCriteriaPatch {
    fn name(&self) -> &str {
        "variable-data-criteria"
    }

    fn run_after(&self) -> Vec<&str> {
        vec!["variable-subsets"]
    }

    fn apply(&self, criteria: &mut DataCriteria, _references: &CriteriaRegistry) -> Result<PatchStats> {
        let mut stats = PatchStats::new();
        if !criteria.variable
            || !criteria.is_source_data_criteria
            || criteria.derivation_operator.is_some()
        {
            return Ok(stats);
        }

        criteria.derivation_operator = Some(DerivationOperator::Union);
        criteria.definition = Some(Definition::Derived);
        criteria.status = None;
        criteria.children_criteria = vec![criteria.grouper_id()];
        stats.record_grouper();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeds_grouper() {
        let mut criteria = DataCriteria::new("qdm_var_Visit_12");
        criteria.variable = true;
        criteria.is_source_data_criteria = true;
        criteria.definition = Some(Definition::Encounter);
        criteria.status = Some("performed".to_string());

        VariableDataCriteriaPatch.apply(&mut criteria, &CriteriaRegistry::new()).unwrap();
        assert_eq!(criteria.definition, Some(Definition::Derived));
        assert!(criteria.status.is_none());
        assert_eq!(criteria.children_criteria, vec!["GROUP_qdm_var_Visit_12"]);
    }

    #[test]
    fn test_keeps_existing_composition() {
        let mut criteria = DataCriteria::new("qdm_var_Visit_12");
        criteria.variable = true;
        criteria.is_source_data_criteria = true;
        criteria.derivation_operator = Some(DerivationOperator::Intersect);

        let stats = VariableDataCriteriaPatch.apply(&mut criteria, &CriteriaRegistry::new()).unwrap();
        assert!(!stats.has_changes());
        assert!(criteria.children_criteria.is_empty());
    }
}

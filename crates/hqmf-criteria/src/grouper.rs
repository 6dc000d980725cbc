//! Variable grouper split
//!
//! A variable is registered as two entities: the inner criteria under
//! `GROUP_<id>`, and a wrapper under the original id that unions exactly the
//! inner one. Other criteria keep referencing the original id and get the
//! wrapper.

use crate::{
    models::{DataCriteria, Definition, DerivationOperator, GROUP_PREFIX},
    registry::CriteriaRegistry,
};
use indexmap::IndexMap;
use tracing::debug;

/// Entities to register for one built criteria
#[derive(Debug, Clone, PartialEq)]
pub enum VariableSplit {
    /// Not a variable, or a do-not-group alias; registered as is
    Single(DataCriteria),
    /// Variable split into its inner criteria and the wrapping grouper
    Grouped {
        inner: DataCriteria,
        wrapper: DataCriteria,
    },
}

impl VariableSplit {
    /// Entities in registration order
    pub fn into_entities(self) -> Vec<DataCriteria> {
        match self {
            VariableSplit::Single(criteria) => vec![criteria],
            VariableSplit::Grouped { inner, wrapper } => vec![inner, wrapper],
        }
    }
}

/// Split a variable into inner criteria and wrapper
pub fn split_variable(mut criteria: DataCriteria, references: &CriteriaRegistry) -> VariableSplit {
    if !criteria.variable {
        return VariableSplit::Single(criteria);
    }

    if criteria.do_not_group {
        alias_single_child(&mut criteria, references);
        return VariableSplit::Single(criteria);
    }

    let wrapper = as_wrapper(criteria.clone());

    let mut inner = criteria;
    inner.variable = false;
    inner.id = inner.grouper_id();
    if let Some(child) = single_child(&inner).filter(|c| c.contains(GROUP_PREFIX)) {
        match references.get(&child) {
            Some(reference) => {
                debug!("Flattening {} onto {}", inner.id, reference.id);
                inner.duplicate_child_info(reference);
                inner.definition = reference.definition;
                inner.status = reference.status.clone();
                inner.children_criteria.clear();
            }
            None => debug!("Grouped child {} of {} not registered", child, inner.id),
        }
    }
    inner.specific_occurrence = None;
    inner.specific_occurrence_const = None;

    VariableSplit::Grouped { inner, wrapper }
}

/// Wrapper keeping the variable's id: a union of exactly its inner criteria
fn as_wrapper(mut wrapper: DataCriteria) -> DataCriteria {
    wrapper.field_values = IndexMap::new();
    wrapper.temporal_references.clear();
    wrapper.subset_operators.clear();
    wrapper.derivation_operator = Some(DerivationOperator::Union);
    wrapper.definition = Some(Definition::Derived);
    wrapper.status = None;
    wrapper.children_criteria = vec![wrapper.grouper_id()];
    wrapper.source_data_criteria = Some(wrapper.id.clone());
    wrapper
}

/// A do-not-group variable points at its single child directly
fn alias_single_child(criteria: &mut DataCriteria, references: &CriteriaRegistry) {
    let Some(child) = single_child(criteria).filter(|c| !c.is_empty()) else {
        return;
    };

    let grouped = format!("{GROUP_PREFIX}{child}");
    if references.contains(&grouped) {
        criteria.children_criteria = vec![grouped];
    } else if let Some(reference) = references.get(&child) {
        criteria.duplicate_child_info(reference);
        criteria.children_criteria = reference.children_criteria.clone();
    }
}

fn single_child(criteria: &DataCriteria) -> Option<String> {
    match criteria.children_criteria.as_slice() {
        [child] => Some(child.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubsetOperator, TemporalReference};

    fn variable(id: &str) -> DataCriteria {
        let mut criteria = DataCriteria::new(id);
        criteria.variable = true;
        criteria.definition = Some(Definition::Encounter);
        criteria.status = Some("performed".to_string());
        criteria.specific_occurrence = Some('A');
        criteria.subset_operators.push(SubsetOperator {
            kind: "FIRST".to_string(),
            value: None,
        });
        criteria.temporal_references.push(TemporalReference {
            type_code: "DURING".to_string(),
            reference: "MeasurePeriod".to_string(),
            range: None,
        });
        criteria
    }

    #[test]
    fn test_non_variable_untouched() {
        let criteria = DataCriteria::new("Plain_12");
        let split = split_variable(criteria.clone(), &CriteriaRegistry::new());
        assert_eq!(split, VariableSplit::Single(criteria));
    }

    #[test]
    fn test_split_produces_distinct_entities() {
        let split = split_variable(variable("qdm_var_Visit_12"), &CriteriaRegistry::new());
        let VariableSplit::Grouped { inner, wrapper } = split else {
            panic!("expected a split");
        };

        assert_eq!(inner.id, "GROUP_qdm_var_Visit_12");
        assert!(!inner.variable);
        assert_eq!(inner.definition, Some(Definition::Encounter));
        assert_eq!(inner.subset_operators.len(), 1);
        assert!(inner.specific_occurrence.is_none());

        assert_eq!(wrapper.id, "qdm_var_Visit_12");
        assert!(wrapper.variable);
        assert_eq!(wrapper.definition, Some(Definition::Derived));
        assert_eq!(wrapper.derivation_operator, Some(DerivationOperator::Union));
        assert_eq!(wrapper.children_criteria, vec!["GROUP_qdm_var_Visit_12"]);
        assert_eq!(wrapper.source_data_criteria.as_deref(), Some("qdm_var_Visit_12"));
        assert!(wrapper.status.is_none());
        assert!(wrapper.subset_operators.is_empty());
        assert!(wrapper.temporal_references.is_empty());
    }

    #[test]
    fn test_single_grouped_child_flattens() {
        let mut references = CriteriaRegistry::new();
        let mut grouped = DataCriteria::new("GROUP_qdm_var_Dx_12");
        grouped.definition = Some(Definition::Diagnosis);
        grouped.status = Some("active".to_string());
        references.insert(grouped);

        let mut criteria = variable("qdm_var_Outer_12");
        criteria.definition = Some(Definition::Derived);
        criteria.status = None;
        criteria.children_criteria = vec!["GROUP_qdm_var_Dx_12".to_string()];

        let VariableSplit::Grouped { inner, .. } = split_variable(criteria, &references) else {
            panic!("expected a split");
        };
        assert_eq!(inner.definition, Some(Definition::Diagnosis));
        assert_eq!(inner.status.as_deref(), Some("active"));
        assert!(inner.children_criteria.is_empty());
    }

    #[test]
    fn test_do_not_group_rewrites_to_grouped_child() {
        let mut references = CriteriaRegistry::new();
        references.insert(DataCriteria::new("GROUP_qdm_var_Dx_12"));

        let mut criteria = variable("occAof_qdm_var_Dx_12");
        criteria.do_not_group = true;
        criteria.children_criteria = vec!["qdm_var_Dx_12".to_string()];

        let entities = split_variable(criteria, &references).into_entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].children_criteria, vec!["GROUP_qdm_var_Dx_12"]);
    }

    #[test]
    fn test_do_not_group_copies_child_info() {
        let mut references = CriteriaRegistry::new();
        let mut child = DataCriteria::new("Dx_12");
        child.definition = Some(Definition::Diagnosis);
        child.code_list_id = Some("2.16.9".to_string());
        references.insert(child);

        let mut criteria = DataCriteria::new("occAof_qdm_var_Dx_12");
        criteria.variable = true;
        criteria.do_not_group = true;
        criteria.children_criteria = vec!["Dx_12".to_string()];

        let VariableSplit::Single(aliased) = split_variable(criteria, &references) else {
            panic!("do-not-group never splits");
        };
        assert_eq!(aliased.definition, Some(Definition::Diagnosis));
        assert_eq!(aliased.code_list_id.as_deref(), Some("2.16.9"));
        assert!(aliased.children_criteria.is_empty());
    }
}

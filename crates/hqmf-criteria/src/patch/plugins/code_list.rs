//! Copy code lists onto specific occurrences

use crate::{
    models::DataCriteria,
    patch::{resolve, Patch, PatchStats},
    registry::CriteriaRegistry,
    tokens, Result,
};

/// A specific occurrence carries the code list of the criteria it is an
/// occurrence of
pub struct CodeListPatch;

impl Patch for CodeListPatch {
    fn name(&self) -> &str {
        "code-list"
    }

    fn apply(&self, criteria: &mut DataCriteria, references: &CriteriaRegistry) -> Result<PatchStats> {
        let mut stats = PatchStats::new();
        if criteria.specific_occurrence.is_none() {
            return Ok(stats);
        }

        let source_id = tokens::normalize(criteria.source_data_criteria.as_deref().unwrap_or_default());
        if let Some(code_list_id) = resolve(criteria, references, &source_id).map(DataCriteria::code_list_id) {
            criteria.code_list_id = code_list_id;
            stats.record_code_list();
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_from_source() {
        let mut references = CriteriaRegistry::new();
        let mut source = DataCriteria::new("Visit_12");
        source.code_list.value_set = Some("2.16.840.1.113883.3.464.1003.101.12.1001".to_string());
        references.insert(source);

        let mut occurrence = DataCriteria::new("OccurrenceA_Visit_12");
        occurrence.specific_occurrence = Some('A');
        occurrence.source_data_criteria = Some("Visit_12".to_string());
        occurrence.code_list_id = Some("stale".to_string());

        let stats = CodeListPatch.apply(&mut occurrence, &references).unwrap();
        assert_eq!(stats.code_lists_copied, 1);
        assert_eq!(
            occurrence.code_list_id.as_deref(),
            Some("2.16.840.1.113883.3.464.1003.101.12.1001")
        );
    }

    #[test]
    fn test_ignores_plain_criteria() {
        let mut criteria = DataCriteria::new("Visit_12");
        criteria.source_data_criteria = Some("Other_12".to_string());
        let stats = CodeListPatch.apply(&mut criteria, &CriteriaRegistry::new()).unwrap();
        assert!(!stats.has_changes());
    }
}

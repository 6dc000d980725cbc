//! Replace generated titles with the referenced criteria's

use crate::{
    models::DataCriteria,
    patch::{resolve, Patch, PatchStats},
    registry::CriteriaRegistry,
    tokens, Result,
};
use regex::Regex;
use std::sync::LazyLock;

static OCCURRENCE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Occurrence[A-Z]_").unwrap());

const OCCURRENCE: &str = "Occurrence";

/// Titles containing `_` or `-` were generated from ids; take the title and
/// description of the criteria this one refers to instead
pub struct DescriptionsPatch;

impl Patch for DescriptionsPatch {
    fn name(&self) -> &str {
        "descriptions"
    }

    fn run_after(&self) -> Vec<&str> {
        vec!["variable-data-criteria"]
    }

    fn apply(&self, criteria: &mut DataCriteria, references: &CriteriaRegistry) -> Result<PatchStats> {
        let mut stats = PatchStats::new();
        let title = criteria.title();
        if !title.contains('_') && !title.contains('-') {
            return Ok(stats);
        }

        let base = criteria
            .source_data_criteria
            .clone()
            .unwrap_or_else(|| criteria.id.clone());

        let occurrence = criteria
            .specific_occurrence
            .filter(|_| !criteria.id.contains(OCCURRENCE));
        let reference_id = match occurrence {
            Some(tag) if !base.starts_with(OCCURRENCE) => {
                tokens::normalize(&format!("{OCCURRENCE}{tag}_{base}"))
            }
            Some(_) => base,
            None => tokens::normalize(&base),
        };

        let Some((title, description, id)) = Self::follow(criteria, references, &reference_id)
        else {
            return Ok(stats);
        };

        criteria.title = Some(title);
        criteria.description = description;
        stats.record_title();
        stats.record_description();
        if occurrence.is_some() {
            criteria.source_data_criteria = Some(id);
        }
        Ok(stats)
    }
}

impl DescriptionsPatch {
    /// Dereference `id`, walking from an occurrence to its root criteria
    fn follow(
        criteria: &DataCriteria,
        references: &CriteriaRegistry,
        id: &str,
    ) -> Option<(String, Option<String>, String)> {
        if id.is_empty() {
            return None;
        }
        let mut reference = resolve(criteria, references, id)?;

        if reference.specific_occurrence.is_some() && reference.id.starts_with(OCCURRENCE) {
            let root_id = OCCURRENCE_PREFIX.replace_all(&reference.id, "").into_owned();
            if root_id.is_empty() {
                return None;
            }
            reference = resolve(criteria, references, &root_id)?;
        }

        Some((
            reference.title(),
            reference.description.clone(),
            reference.id.clone(),
        ))
    }
}

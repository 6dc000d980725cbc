//! Child criteria extractor

use super::CriteriaExtractor;
use crate::{models::DataCriteria, tokens, xml::Element, Result};

/// Reads the ids referenced by `COMP` relationships
pub struct ChildrenExtractor;

impl CriteriaExtractor for ChildrenExtractor {
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()> {
        criteria.children_criteria = entry
            .select("./*/cda:outboundRelationship[@typeCode='COMP']/cda:criteriaReference/cda:id")?
            .into_iter()
            .map(|id| tokens::reference_id(id.attr("extension"), id.attr("root")))
            .collect();
        Ok(())
    }
}

//! Temporal reference extractor

use super::{CriteriaExtractor, ValueParser};
use crate::{
    models::{DataCriteria, TemporalReference, Value},
    tokens,
    xml::Element,
    Result,
};

/// Reads `temporallyRelatedInformation` relationships
pub struct TemporalExtractor;

impl CriteriaExtractor for TemporalExtractor {
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()> {
        criteria.temporal_references = entry
            .select("./*/cda:temporallyRelatedInformation")?
            .into_iter()
            .map(Self::temporal_reference)
            .collect();
        Ok(())
    }
}

impl TemporalExtractor {
    fn temporal_reference(related: &Element) -> TemporalReference {
        let id = related.child("criteriaReference").and_then(|r| r.child("id"));
        let reference = tokens::reference_id(
            id.and_then(|id| id.attr("extension")),
            id.and_then(|id| id.attr("root")),
        );
        // pauseQuantity is always an interval whatever its declared type
        let range = related
            .child("pauseQuantity")
            .map(|pause| Value::Interval(ValueParser::interval(pause)));

        TemporalReference {
            type_code: related.attr("typeCode").unwrap_or_default().to_string(),
            reference,
            range,
        }
    }
}

//! Negation extractor

use super::CriteriaExtractor;
use crate::{models::DataCriteria, xml::Element, Result};
use tracing::debug;

/// Relationship code carrying the negation rationale
pub const NEGATION_REASON_CODE: &str = "410666004";

/// Reads `actionNegationInd` and, when negated, the rationale code list
pub struct NegationExtractor;

impl CriteriaExtractor for NegationExtractor {
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()> {
        criteria.negation = entry.value_at("./*/@actionNegationInd")? == Some("true");

        criteria.negation_code_list_id = if criteria.negation {
            let path = format!(
                "./*/cda:outboundRelationship[*/cda:code/@code='{NEGATION_REASON_CODE}']/*/cda:value/@valueSet"
            );
            let reason = entry.value_at(&path)?.map(str::to_string);
            debug!("Negated criteria, reason code list {:?}", reason);
            reason
        } else {
            None
        };

        Ok(())
    }
}

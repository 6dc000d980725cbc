//! Subset operator extractor

use super::{CriteriaExtractor, ValueParser};
use crate::{
    models::{DataCriteria, SubsetOperator, Value},
    xml::Element,
    Result,
};

/// Reads `excerpt` elements, skipping the boolean UNION/XPRODUCT ones
pub struct SubsetExtractor;

impl CriteriaExtractor for SubsetExtractor {
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()> {
        criteria.subset_operators = entry
            .select("./*/cda:excerpt")?
            .into_iter()
            .map(Self::subset_operator)
            .filter(|operator| !operator.is_boolean())
            .collect();
        Ok(())
    }
}

impl SubsetExtractor {
    fn subset_operator(excerpt: &Element) -> SubsetOperator {
        let code = excerpt
            .child("subsetCode")
            .and_then(|code| code.attr("code"))
            .unwrap_or_default();

        // repeatNumber sits on the excerpt or on its criteria
        let repeat = excerpt.child("repeatNumber").or_else(|| {
            excerpt
                .children()
                .find_map(|child| child.child("repeatNumber"))
        });

        SubsetOperator {
            kind: SubsetOperator::normalize_kind(code),
            value: repeat.map(|r| Value::Interval(ValueParser::interval(r))),
        }
    }
}

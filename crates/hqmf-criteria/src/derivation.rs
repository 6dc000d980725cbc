//! Derivation operator resolution
//!
//! Boolean composition is declared by the conjunction codes on `COMP`
//! relationships. OR composes as a union, AND as a cross product, which is
//! later treated as an intersection.

use crate::{
    models::{DataCriteria, DerivationOperator},
    xml::Element,
    Error, Result,
};
use tracing::debug;

pub struct DerivationResolver;

impl DerivationResolver {
    /// Read the derivation operator from an entry's conjunction codes
    ///
    /// Fails when the entry mixes OR and AND. Unknown codes are ignored.
    pub fn extract(entry: &Element, id: &str) -> Result<Option<DerivationOperator>> {
        let mut operator: Option<DerivationOperator> = None;

        for code in entry
            .select("./*/cda:outboundRelationship[@typeCode='COMP']/cda:conjunctionCode")?
            .into_iter()
            .filter_map(|c| c.attr("code"))
        {
            let Some(next) = DerivationOperator::from_conjunction(code) else {
                debug!("Ignoring conjunction code {} on {}", code, id);
                continue;
            };
            match operator {
                Some(current) if current != next => {
                    return Err(Error::ConflictingConjunction {
                        id: id.to_string(),
                        first: current.to_string(),
                        second: next.to_string(),
                    });
                }
                _ => operator = Some(next),
            }
        }

        Ok(operator)
    }

    /// Normalize composition of entries without template ids
    ///
    /// Their boolean structure is implicit, so a cross product becomes an
    /// intersection and a missing description names the operator.
    pub fn set_intersection(criteria: &mut DataCriteria) {
        if !criteria.template_ids.is_empty() {
            return;
        }
        if criteria.derivation_operator == Some(DerivationOperator::XProduct) {
            criteria.derivation_operator = Some(DerivationOperator::Intersect);
        }
        if criteria.description.is_none() {
            let name = if criteria.derivation_operator == Some(DerivationOperator::Intersect) {
                "Intersect"
            } else {
                "Union"
            };
            criteria.description = Some(name.to_string());
        }
    }
}

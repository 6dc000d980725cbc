//! Field value extractor
//!
//! Field values come from three relationship shapes:
//!
//! - an outbound relationship whose criteria has a `code`, keyed by that code
//! - a participation role, keyed by the role's `classCode`
//! - a fulfills (`FLFS`) reference, stored as a typed reference

use super::{CriteriaExtractor, ValueParser};
use crate::{
    models::{DataCriteria, FieldValue, TypedReference, Value},
    registry::{FieldRegistry, REASON_FIELD},
    tokens,
    xml::Element,
    Result,
};
use tracing::debug;

/// Key of the fulfills reference
pub const FULFILLS_FIELD: &str = "FLFS";

/// Reads field values; REASON is dropped for negated criteria because the
/// rationale is already captured as the negation code list
pub struct FieldExtractor<'a> {
    fields: &'a FieldRegistry,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(fields: &'a FieldRegistry) -> Self {
        Self { fields }
    }
}

impl CriteriaExtractor for FieldExtractor<'_> {
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()> {
        let mut fields = indexmap::IndexMap::new();

        for relationship in entry.select("./*/cda:outboundRelationship[*/cda:code]")? {
            let Some(code) = relationship.value_at("./*/cda:code/@code")? else {
                continue;
            };
            let Some(key) = self.fields.field_for(code) else {
                continue;
            };
            if criteria.negation && key == REASON_FIELD {
                debug!("Suppressing {} field on negated criteria", key);
                continue;
            }

            let value = match ValueParser::parse(relationship, "./*/cda:value")? {
                Some(value) => Some(value),
                None => ValueParser::parse(relationship, "./*/cda:effectiveTime")?,
            };
            if let Some(value) = value {
                fields.insert(key.to_string(), FieldValue::from(value));
            }
        }

        for relationship in entry.select("./*/cda:outboundRelationship[*/cda:participation]")? {
            let class_code = relationship.value_at("./*/cda:participation/cda:role/@classCode")?;
            let Some(key) = class_code.and_then(|code| self.fields.field_for(code)) else {
                continue;
            };
            if let Some(role_code) = relationship.select_first("./*/cda:participation/cda:role/cda:code")? {
                fields.insert(
                    key.to_string(),
                    FieldValue::from(Value::Coded(ValueParser::coded(role_code))),
                );
            }
        }

        if let Some(fulfills) = entry
            .select_first("./*/cda:outboundRelationship[@typeCode='FLFS']/cda:criteriaReference")?
        {
            let id = fulfills.child("id");
            fields.insert(
                FULFILLS_FIELD.to_string(),
                FieldValue::Reference(TypedReference {
                    type_code: FULFILLS_FIELD.to_string(),
                    reference: tokens::reference_id(
                        id.and_then(|id| id.attr("extension")),
                        id.and_then(|id| id.attr("root")),
                    ),
                }),
            );
        }

        criteria.field_values = fields;
        Ok(())
    }
}

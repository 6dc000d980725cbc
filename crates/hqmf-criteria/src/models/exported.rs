//! Immutable export model handed to downstream consumers

use super::{
    DerivationOperator, Definition, FieldValue, SubsetOperator, TemporalReference, Value,
};
use indexmap::IndexMap;
use serde::Serialize;

/// Read-only data criteria as produced by [`DataCriteria::export`]
///
/// Empty collections are exported as absent rather than empty.
///
/// [`DataCriteria::export`]: super::DataCriteria::export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedDataCriteria {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_criteria: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation_operator: Option<DerivationOperator>,
    pub definition: Definition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_values: Option<IndexMap<String, FieldValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_code_list: Option<IndexMap<String, Vec<String>>>,
    pub negation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negation_code_list_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub temporal_references: Vec<TemporalReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subset_operators: Vec<SubsetOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_occurrence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_occurrence_const: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_data_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    pub variable: bool,
}

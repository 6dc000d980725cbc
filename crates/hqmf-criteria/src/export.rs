//! Export to the read-only model

use crate::models::{
    Coded, DataCriteria, Definition, ExportedDataCriteria, FieldValue, Value,
};
use regex::Regex;
use std::sync::LazyLock;

static VALUE_SET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*) \w+ [Vv]alue [Ss]et").unwrap());

/// Number of trailing title words naming the value set kind
const VALUE_SET_WORDS: usize = 3;

impl DataCriteria {
    /// Produce the read-only model handed to downstream consumers
    ///
    /// Leaf criteria get a description qualified by their value set name and
    /// a title without the "... Value Set" suffix. Group nodes never carry a
    /// code list.
    pub fn export(&self) -> ExportedDataCriteria {
        let mut title = self.title();
        let mut description = self.description.clone().unwrap_or_default();
        let mut code_list_id = self.code_list_id();
        let mut field_values = self.field_values.clone();
        let definition = self.definition.unwrap_or(Definition::Variable);

        if definition.is_transfer() {
            let coded = Coded::for_code_list(code_list_id.take(), title.clone());
            field_values.insert(
                definition.as_str().to_uppercase(),
                FieldValue::from(Value::Coded(coded)),
            );
        }

        if !self.variable && self.derivation_operator.is_none() {
            let words: Vec<&str> = title.split(' ').collect();
            let exact = if definition.is_patient_characteristic() && !title.ends_with("Value Set") {
                title.clone()
            } else {
                words[..words.len().saturating_sub(VALUE_SET_WORDS)].join(" ")
            };
            if let Some(prefix) = VALUE_SET_SUFFIX.captures(&title).and_then(|c| c.get(1)) {
                title = prefix.as_str().to_string();
            }
            description = format!("{description}: {exact}");
        }

        if self.derivation_operator.is_some() {
            code_list_id = None;
        }

        ExportedDataCriteria {
            id: self.id.clone(),
            title,
            description,
            code_list_id,
            children_criteria: non_empty(self.children_criteria.clone()),
            derivation_operator: self.derivation_operator,
            definition,
            status: self.status.clone(),
            value: self.value.clone(),
            field_values: (!field_values.is_empty()).then_some(field_values),
            inline_code_list: self.code_list.inline_code_list(),
            negation: self.negation,
            negation_code_list_id: self.negation_code_list_id.clone(),
            temporal_references: self.temporal_references.clone(),
            subset_operators: self.subset_operators.clone(),
            specific_occurrence: self.specific_occurrence.map(String::from),
            specific_occurrence_const: self.specific_occurrence_const.clone(),
            source_data_criteria: self.source_data_criteria.clone(),
            comments: non_empty(self.comments.clone()),
            variable: self.variable,
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

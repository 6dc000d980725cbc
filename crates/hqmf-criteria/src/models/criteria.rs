//! The mutable data criteria entity built from one document entry

use super::{
    DerivationOperator, Definition, FieldValue, SubsetOperator, TemporalReference, Value,
};
use indexmap::IndexMap;

/// Prefix of the inner entity split off a variable
pub const GROUP_PREFIX: &str = "GROUP_";

/// Data read from the node that carries a criteria's code list
///
/// Which node that is depends on the entry's templates, so it is resolved
/// once during construction and kept here for title and code list lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeListNode {
    pub display_name: Option<String>,
    pub value_set: Option<String>,
    pub code: Option<String>,
    pub code_system: Option<String>,
    pub code_system_name: Option<String>,
}

impl CodeListNode {
    /// `{code system name: [code]}` when the node carries a single inline code
    pub fn inline_code_list(&self) -> Option<IndexMap<String, Vec<String>>> {
        let system = match &self.code_system {
            Some(oid) => Some(code_system_name(oid).to_string()),
            None => self.code_system_name.clone(),
        };
        match (system, &self.code) {
            (Some(system), Some(code)) => {
                let mut codes = IndexMap::new();
                codes.insert(system, vec![code.clone()]);
                Some(codes)
            }
            _ => None,
        }
    }
}

/// Well-known code system OIDs
fn code_system_name(oid: &str) -> &str {
    match oid {
        "2.16.840.1.113883.6.1" => "LOINC",
        "2.16.840.1.113883.6.96" => "SNOMED-CT",
        "2.16.840.1.113883.6.88" => "RxNorm",
        "2.16.840.1.113883.6.12" => "CPT",
        "2.16.840.1.113883.6.103" => "ICD-9-CM",
        "2.16.840.1.113883.6.104" => "ICD-9-PCS",
        "2.16.840.1.113883.6.90" => "ICD-10-CM",
        "2.16.840.1.113883.6.4" => "ICD-10-PCS",
        "2.16.840.1.113883.6.285" => "HCPCS",
        "2.16.840.1.113883.12.292" => "CVX",
        "2.16.840.1.113883.6.238" => "CDC Race",
        "2.16.840.1.113883.5.1" => "AdministrativeGender",
        "2.16.840.1.113883.3.221.5" => "Source of Payment Typology",
        other => other,
    }
}

/// A data criteria under construction or patching
///
/// Lives in the reference registry from the moment it is built until the
/// session exports it; the patch pass mutates it in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataCriteria {
    pub id: String,
    pub definition: Option<Definition>,
    pub status: Option<String>,
    pub negation: bool,
    pub negation_code_list_id: Option<String>,
    pub value: Option<Value>,
    pub field_values: IndexMap<String, FieldValue>,
    pub temporal_references: Vec<TemporalReference>,
    pub subset_operators: Vec<SubsetOperator>,
    pub children_criteria: Vec<String>,
    pub derivation_operator: Option<DerivationOperator>,
    pub specific_occurrence: Option<char>,
    pub specific_occurrence_const: Option<String>,
    pub source_data_criteria: Option<String>,
    pub variable: bool,
    pub description: Option<String>,
    pub title: Option<String>,
    pub code_list_id: Option<String>,
    pub comments: Vec<String>,

    /// Template ids in document order
    pub template_ids: Vec<String>,
    pub local_variable_name: Option<String>,
    /// Raw `id/@extension` of the criteria element
    pub id_extension: Option<String>,
    pub code_list: CodeListNode,
    /// Grouper entry wrapping exactly one registered variable
    pub verbose_reference: bool,
    /// Derived criteria that alias their single child instead of wrapping it
    pub do_not_group: bool,
    /// Entry came from the source data criteria section
    pub is_source_data_criteria: bool,
}

impl DataCriteria {
    /// Create an empty criteria with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Human readable title: explicit title, code list display name,
    /// description, then id
    pub fn title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.code_list.display_name.clone())
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| self.id.clone())
    }

    /// Code list OID: explicit, then the value set on the code list node
    pub fn code_list_id(&self) -> Option<String> {
        self.code_list_id
            .clone()
            .or_else(|| self.code_list.value_set.clone())
    }

    pub fn is_derived(&self) -> bool {
        self.definition == Some(Definition::Derived)
    }

    /// Id of the inner entity split off this criteria
    pub fn grouper_id(&self) -> String {
        format!("{GROUP_PREFIX}{}", self.id)
    }

    /// Fill unset fields from a referenced criteria
    ///
    /// Used when a criteria stands in for a single other criteria and should
    /// look like it.
    pub fn duplicate_child_info(&mut self, child: &DataCriteria) {
        if self.title.is_none() {
            self.title = Some(child.title());
        }
        if self.definition.is_none() {
            self.definition = child.definition;
        }
        if self.status.is_none() {
            self.status = child.status.clone();
        }
        if self.code_list_id.is_none() {
            self.code_list_id = child.code_list_id();
        }
        if self.temporal_references.is_empty() {
            self.temporal_references = child.temporal_references.clone();
        }
        if self.subset_operators.is_empty() {
            self.subset_operators = child.subset_operators.clone();
        }
        self.variable = self.variable || child.variable;
        if self.value.is_none() {
            self.value = child.value.clone();
        }
    }
}

//! Relationship value objects: temporal references, subset operators,
//! typed references and field values

use super::Value;
use serde::Serialize;
use std::fmt;

/// Boolean composition of child criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DerivationOperator {
    Union,
    Intersect,
    /// Raw meaning of an AND conjunction; intersect-equivalent
    #[serde(rename = "INTERSECT")]
    XProduct,
}

impl DerivationOperator {
    /// Operator for an HQMF conjunction code
    pub fn from_conjunction(code: &str) -> Option<Self> {
        match code {
            "OR" => Some(DerivationOperator::Union),
            "AND" => Some(DerivationOperator::XProduct),
            _ => None,
        }
    }

    /// Whether the operator composes as an intersection
    pub fn is_intersect(&self) -> bool {
        matches!(self, DerivationOperator::Intersect | DerivationOperator::XProduct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivationOperator::Union => "UNION",
            DerivationOperator::Intersect => "INTERSECT",
            DerivationOperator::XProduct => "XPRODUCT",
        }
    }
}

impl fmt::Display for DerivationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A temporal relationship to another criteria (`SBE`, `EAS`, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalReference {
    #[serde(rename = "type")]
    pub type_code: String,
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Value>,
}

/// A non-boolean set operator applied to a criteria (`FIRST`, `RECENT`, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetOperator {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl SubsetOperator {
    /// Map a raw `subsetCode` to the operator name
    pub fn normalize_kind(code: &str) -> String {
        match code.strip_prefix("QDM_").unwrap_or(code) {
            "LATEST" => "RECENT".to_string(),
            "EARLIEST" => "FIRST".to_string(),
            other => other.to_string(),
        }
    }

    /// Boolean grouping operators are not subset operators
    pub fn is_boolean(&self) -> bool {
        self.kind == "UNION" || self.kind == "XPRODUCT"
    }
}

/// A reference to another criteria together with the relationship type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedReference {
    #[serde(rename = "type")]
    pub type_code: String,
    pub reference: String,
}

/// The value of a field role
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Value(Value),
    Reference(TypedReference),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

//! Value variants carried by data criteria and their field values

use serde::Serialize;

/// A value attached to a criteria or one of its fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Value {
    /// Physical quantity (`PQ`)
    #[serde(rename = "PQ")]
    Quantity(Quantity),

    /// Point in time (`TS`)
    #[serde(rename = "TS")]
    Timestamp { value: Option<String> },

    /// Interval over quantities or integers (`IVL_PQ`, `IVL_INT`)
    #[serde(rename = "IVL_PQ")]
    Interval(Interval),

    /// Coded concept (`CD`)
    #[serde(rename = "CD")]
    Coded(Coded),

    /// Any value present
    #[serde(rename = "ANYNonNull")]
    Any,
}

/// A numeric value with an optional unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One end of an interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub inclusive: bool,
}

/// An interval with optional bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Bound>,
}

/// A code, or a reference to a value set of codes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Coded {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,
}

impl Coded {
    /// A coded value pointing at a value set, with a display title
    pub fn for_code_list(value_set: Option<String>, title: impl Into<String>) -> Self {
        Self {
            code: None,
            code_system: None,
            display: Some(title.into()),
            value_set,
        }
    }
}

impl Value {
    /// Short discriminator name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Quantity(_) => "PQ",
            Value::Timestamp { .. } => "TS",
            Value::Interval(_) => "IVL",
            Value::Coded(_) => "CD",
            Value::Any => "ANY",
        }
    }
}

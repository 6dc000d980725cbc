//! Relationship code → field key

use crate::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;

const BUILTIN: &str = include_str!("../../data/fields.json");

/// Field key used for the negation rationale
pub const REASON_FIELD: &str = "REASON";

/// Maps the code on an outbound relationship (or a participation role class)
/// to the field key its value is stored under
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, String>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let fields = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid field registry: {e}")))?;
        Ok(Self { fields })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&super::read_file(path)?)
    }

    pub fn insert(&mut self, code: impl Into<String>, field: impl Into<String>) {
        self.fields.insert(code.into(), field.into());
    }

    pub fn field_for(&self, code: &str) -> Option<&str> {
        self.fields.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

//! Template id → code list and result value locations
//!
//! Different templates keep their coded value at different places inside
//! the criteria element (a procedure's code list is on `code`, a diagnosis's
//! on `value`), so the locations are looked up per template.

use crate::{xml::Path, Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;

const BUILTIN: &str = include_str!("../../data/value_paths.json");

#[derive(Debug, Deserialize)]
struct RawMapping {
    valueset_path: Option<String>,
    result_path: Option<String>,
}

/// Parsed locations for one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePathMapping {
    /// Node carrying the code list (`@valueSet`, `displayName`, inline code)
    pub valueset_path: Option<Path>,
    /// Node carrying the result value
    pub result_path: Option<Path>,
}

#[derive(Debug, Clone, Default)]
pub struct ValuePathRegistry {
    mappings: IndexMap<String, ValuePathMapping>,
}

impl ValuePathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    /// Parse a `{"<template id>": {"valueset_path": ..., "result_path": ...}}` table
    ///
    /// Every path is validated up front so a bad override fails at load time.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: IndexMap<String, RawMapping> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid value path registry: {e}")))?;

        let mut mappings = IndexMap::with_capacity(raw.len());
        for (template_id, mapping) in raw {
            let valueset_path = mapping.valueset_path.as_deref().map(Path::parse).transpose()?;
            let result_path = mapping.result_path.as_deref().map(Path::parse).transpose()?;
            mappings.insert(
                template_id,
                ValuePathMapping {
                    valueset_path,
                    result_path,
                },
            );
        }
        Ok(Self { mappings })
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        Self::from_json(&super::read_file(path)?)
    }

    pub fn lookup(&self, template_id: &str) -> Option<&ValuePathMapping> {
        self.mappings.get(template_id)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

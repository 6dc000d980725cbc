//! Template id → (definition, status)

use crate::{models::Definition, Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const BUILTIN: &str = include_str!("../../data/templates.json");

/// Classification attached to a known template id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateDefinition {
    pub definition: Definition,
    /// Empty when the template implies no status
    #[serde(default)]
    pub status: String,
}

impl TemplateDefinition {
    pub fn status(&self) -> Option<&str> {
        (!self.status.is_empty()).then_some(self.status.as_str())
    }
}

/// Known-template registry
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, TemplateDefinition>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded default table
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    /// Parse a `{"<template id>": {"definition": ..., "status": ...}}` table
    pub fn from_json(json: &str) -> Result<Self> {
        let templates = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid template registry: {e}")))?;
        Ok(Self { templates })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&super::read_file(path)?)
    }

    pub fn insert(&mut self, template_id: impl Into<String>, definition: TemplateDefinition) {
        self.templates.insert(template_id.into(), definition);
    }

    pub fn lookup(&self, template_id: &str) -> Option<&TemplateDefinition> {
        self.templates.get(template_id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

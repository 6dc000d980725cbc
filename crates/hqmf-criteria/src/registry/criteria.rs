//! Per-document store of built criteria
//!
//! Entries are keyed by normalized id and kept in insertion order, which is
//! document order. The builder reads earlier entries while constructing later
//! ones and the patch pass mutates entries in place.

use crate::models::DataCriteria;
use indexmap::IndexMap;
use tracing::debug;

/// Reference registry for one document
#[derive(Debug, Clone, Default)]
pub struct CriteriaRegistry {
    criteria: IndexMap<String, DataCriteria>,
}

impl CriteriaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a criteria under its id
    ///
    /// An id that is already taken is only replaced when the existing entry
    /// carries no code list; returns whether the criteria was stored.
    pub fn register(&mut self, criteria: DataCriteria) -> bool {
        if let Some(existing) = self.criteria.get(&criteria.id) {
            if existing.code_list_id().is_some() {
                debug!("Keeping existing criteria {} with code list", criteria.id);
                return false;
            }
            debug!("Replacing criteria {} without code list", criteria.id);
        }
        self.criteria.insert(criteria.id.clone(), criteria);
        true
    }

    /// Store a criteria unconditionally
    pub fn insert(&mut self, criteria: DataCriteria) {
        self.criteria.insert(criteria.id.clone(), criteria);
    }

    pub fn get(&self, id: &str) -> Option<&DataCriteria> {
        self.criteria.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut DataCriteria> {
        self.criteria.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.criteria.contains_key(id)
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<String> {
        self.criteria.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataCriteria> {
        self.criteria.values()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

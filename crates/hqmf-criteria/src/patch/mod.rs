//! Cross-reference patch pass
//!
//! Runs once after every entry of a document has been built. Some fields can
//! only be settled with the whole document in view (code lists of specific
//! occurrences, titles of criteria that reference later ones), so each
//! registered criteria is patched in place against the full registry.
//!
//! ## Architecture
//!
//! - **Patch Trait**: one reconciliation step with declared ordering
//! - **PatchRegistry**: runs patches in dependency order over every criteria
//! - **PatchStats**: counts what the pass changed

pub mod plugins;
pub mod registry;
pub mod stats;

pub use plugins::*;
pub use registry::*;
pub use stats::*;

use crate::{models::DataCriteria, registry::CriteriaRegistry, Result};

/// A single reconciliation step
pub trait Patch {
    /// Unique name of this patch
    fn name(&self) -> &str;

    /// Patches that must run after this one
    fn run_before(&self) -> Vec<&str> {
        vec![]
    }

    /// Patches that must run before this one
    fn run_after(&self) -> Vec<&str> {
        vec![]
    }

    /// Patch `criteria`, which has been taken out of `references` for the
    /// duration of the pass
    ///
    /// Look other criteria up with [`resolve`] so a reference back to the
    /// criteria itself sees the patched copy.
    fn apply(&self, criteria: &mut DataCriteria, references: &CriteriaRegistry) -> Result<PatchStats>;
}

/// Look up `id`, preferring the working copy when it names the criteria itself
pub fn resolve<'a>(
    criteria: &'a DataCriteria,
    references: &'a CriteriaRegistry,
    id: &str,
) -> Option<&'a DataCriteria> {
    if criteria.id == id {
        Some(criteria)
    } else {
        references.get(id)
    }
}

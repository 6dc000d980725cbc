//! Lookup tables injected into a parse session
//!
//! Three tables drive classification and extraction:
//!
//! - [`TemplateRegistry`]: template id → definition and status
//! - [`ValuePathRegistry`]: template id → where the code list and result value live
//! - [`FieldRegistry`]: relationship code → field key (`REASON`, `ORDINAL`, ...)
//!
//! Each table ships with an embedded JSON default and can be replaced by a
//! JSON file of the same shape. The per-document [`CriteriaRegistry`] holds
//! the criteria built so far.

pub mod criteria;
pub mod fields;
pub mod templates;
pub mod value_paths;

pub use criteria::*;
pub use fields::*;
pub use templates::*;
pub use value_paths::*;

use crate::{Error, Result};
use std::path::Path;

/// The injected lookup tables used by a parse session
#[derive(Debug, Clone)]
pub struct Registries {
    pub templates: TemplateRegistry,
    pub value_paths: ValuePathRegistry,
    pub fields: FieldRegistry,
}

impl Registries {
    /// Registries built from the embedded defaults
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            templates: TemplateRegistry::builtin()?,
            value_paths: ValuePathRegistry::builtin()?,
            fields: FieldRegistry::builtin()?,
        })
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

//! HQMF data criteria extraction
//!
//! Converts the data criteria entries of an HQMF R2 quality measure document
//! into normalized, typed [`DataCriteria`](models::DataCriteria) records.
//!
//! A [`ParseSession`] owns the per-document registries. Entries are built in
//! document order, variables are split into a grouper and its inner criteria,
//! a patch pass reconciles cross references once the whole document is known,
//! and the result is exported as [`ExportedDataCriteria`](models::ExportedDataCriteria).
//!
//! ```no_run
//! use hqmf_criteria::{xml::Element, ParseSession, Registries};
//!
//! # fn main() -> hqmf_criteria::Result<()> {
//! let document = Element::parse(&std::fs::read_to_string("measure.xml").unwrap())?;
//! let registries = Registries::builtin()?;
//! let mut session = ParseSession::new(&registries);
//! session.parse_document(&document)?;
//! for criteria in session.finish()? {
//!     println!("{} ({})", criteria.id, criteria.definition);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod classifier;
pub mod derivation;
pub mod error;
pub mod export;
pub mod extractor;
pub mod grouper;
pub mod models;
pub mod occurrence;
pub mod patch;
pub mod registry;
pub mod session;
pub mod tokens;
pub mod xml;

pub use builder::DataCriteriaBuilder;
pub use error::{Error, Result};
pub use occurrence::OccurrenceRegistry;
pub use registry::{CriteriaRegistry, Registries};
pub use session::ParseSession;

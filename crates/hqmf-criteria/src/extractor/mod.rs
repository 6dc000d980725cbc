//! Extractors read one concern of an entry into a [`DataCriteria`]
//!
//! - ValueParser: typed value nodes
//! - identity: template ids, local variable name, id, status, variable check
//! - DescriptionExtractor: human readable description
//! - NegationExtractor: negation flag and rationale code list
//! - TemporalExtractor: temporally related information
//! - FieldExtractor: field values keyed by the field registry
//! - ChildrenExtractor: COMP child references
//! - CommentExtractor: author comments
//! - SubsetExtractor: subset operators from excerpts

pub mod children;
pub mod comments;
pub mod description;
pub mod fields;
pub mod identity;
pub mod negation;
pub mod subsets;
pub mod temporal;
pub mod value;

use crate::{models::DataCriteria, xml::Element, Result};

// Re-exports
pub use children::*;
pub use comments::*;
pub use description::*;
pub use fields::*;
pub use identity::*;
pub use negation::*;
pub use subsets::*;
pub use temporal::*;
pub use value::*;

/// Trait for criteria extractors
pub trait CriteriaExtractor {
    /// Read this extractor's concern from `entry` into `criteria`
    ///
    /// Extractors may consult fields set by extractors that ran before them.
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()>;
}

/// The criteria element of an entry (`observationCriteria`, `grouperCriteria`, ...)
pub fn criteria_element(entry: &Element) -> Option<&Element> {
    entry.children().find(|child| child.name().ends_with("Criteria"))
}

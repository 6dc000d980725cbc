//! Specific occurrence resolution
//!
//! Repeated appearances of the same source criteria are tagged with a letter
//! (`A`, `B`, ...). Authoring tools encode the letter in the entry id, in the
//! local variable name or in the source id, with different conventions for
//! variables and plain criteria; the resolver tries each in priority order.

use crate::{
    extractor::{is_variable, QDM_VARIABLE_MARKER},
    models::DataCriteria,
    registry::CriteriaRegistry,
    tokens,
    xml::Element,
    Error, Result,
};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static VARIABLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^occ[A-Z]of_").unwrap());
static OCCURRENCE_ID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Occurrence[A-Z]_").unwrap());
static OCCURRENCE_NAME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Occurrence[A-Z]of").unwrap());

/// Tag used when nothing else resolves
const DEFAULT_TAG: char = 'A';

/// Occurrence letters per source criteria, first writer wins
///
/// A `None` entry is a placeholder registered by a variable that carried no
/// letter. It is never overwritten: entries that cannot read their own letter
/// fall back to the default tag, as the variable did.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceRegistry {
    occurrences: IndexMap<String, Option<char>>,
}

impl OccurrenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a letter for a source unless it already has an entry
    ///
    /// Returns the canonical letter, `None` when a placeholder holds the slot.
    pub fn record(&mut self, source_id: &str, tag: char) -> Option<char> {
        *self
            .occurrences
            .entry(source_id.to_string())
            .or_insert(Some(tag))
    }

    /// Register a placeholder if the source has no entry yet
    pub fn reserve(&mut self, source_id: &str) {
        self.occurrences.entry(source_id.to_string()).or_insert(None);
    }

    /// `None` when the source is unknown, `Some(None)` for a placeholder
    pub fn get(&self, source_id: &str) -> Option<Option<char>> {
        self.occurrences.get(source_id).copied()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Naming convention an entry is expected to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Convention {
    /// `occ<L>of_...`
    Variable,
    /// `Occurrence<L>_...` ids, `Occurrence<L>of...` names
    Criteria,
}

impl Convention {
    fn id_prefix(self) -> &'static Regex {
        match self {
            Convention::Variable => &*VARIABLE_PREFIX,
            Convention::Criteria => &*OCCURRENCE_ID_PREFIX,
        }
    }

    fn name_prefix(self) -> &'static Regex {
        match self {
            Convention::Variable => &*VARIABLE_PREFIX,
            Convention::Criteria => &*OCCURRENCE_NAME_PREFIX,
        }
    }

    /// Position of the letter once a prefix matched
    fn offset(self) -> usize {
        match self {
            Convention::Variable => 3,
            Convention::Criteria => 10,
        }
    }
}

/// The normalized names an occurrence tag is searched in
struct Candidates {
    id: String,
    name: String,
    source: String,
}

impl Candidates {
    /// Tag from the first matcher that succeeds
    fn extract(&self, convention: Convention) -> Option<char> {
        let offset = convention.offset();
        let tag_at = |value: &str| value.chars().nth(offset);
        let prefixed = |prefix: &Regex, value: &str, rest: &str| {
            prefix
                .find(value)
                .is_some_and(|m| value[m.end()..].starts_with(rest))
        };

        if prefixed(convention.id_prefix(), &self.id, &self.source) {
            return tag_at(&self.id);
        }
        if prefixed(convention.name_prefix(), &self.name, &self.source) {
            return tag_at(&self.name);
        }
        if convention == Convention::Variable {
            if prefixed(convention.id_prefix(), &self.id, QDM_VARIABLE_MARKER) {
                return tag_at(&self.id);
            }
            if prefixed(convention.name_prefix(), &self.name, "qdm_var") {
                return tag_at(&self.name);
            }
        }
        if self.id.starts_with(&self.source) {
            if let Some(tag) = tag_at(&self.id) {
                return Some(tag);
            }
        }
        if convention.id_prefix().is_match(&self.source)
            || convention.name_prefix().is_match(&self.source)
        {
            return tag_at(&self.source);
        }
        None
    }
}

pub struct OccurrenceResolver;

impl OccurrenceResolver {
    /// Resolve the occurrence or source linkage of an entry
    ///
    /// Runs before the id is normalized: `criteria.id` holds the raw composite
    /// id and `source_data_criteria` is set to the raw composite source id.
    pub fn resolve(
        entry: &Element,
        criteria: &mut DataCriteria,
        references: &CriteriaRegistry,
        occurrences: &mut OccurrenceRegistry,
    ) -> Result<()> {
        let occurrence = entry.select_first("./*/cda:outboundRelationship[@typeCode='OCCR']")?;
        let Some(occurrence) = occurrence else {
            if let Some(source) = entry
                .select_first("./*/cda:outboundRelationship[cda:subsetCode/@code='SOURCE']")?
            {
                criteria.source_data_criteria = Some(Self::referenced_id(source).0);
            }
            return Ok(());
        };

        let (source_id, source_extension, source_root) = Self::referenced_id(occurrence);
        if let Some(name) = occurrence.child("localVariableName") {
            criteria.specific_occurrence_const =
                name.attr("controlInformationRoot").map(str::to_string);
            criteria.specific_occurrence = name
                .attr("controlInformationExtension")
                .and_then(|tag| tag.chars().next());
        }

        let source_key = tokens::normalize(&source_id);
        if !references.contains(&source_key) {
            debug!("Occurrence source {} of {} not parsed yet", source_key, criteria.id);
            return Ok(());
        }

        let variable = is_variable(criteria.local_variable_name.as_deref(), &criteria.id);
        let convention = if variable {
            Convention::Variable
        } else {
            Convention::Criteria
        };
        let candidates = Candidates {
            id: tokens::normalize(&criteria.id),
            name: tokens::normalize(criteria.local_variable_name.as_deref().unwrap_or_default()),
            source: tokens::normalize(&source_extension),
        };

        criteria.source_data_criteria = Some(source_id.clone());
        match candidates.extract(convention) {
            Some(tag) => {
                let canonical = occurrences.record(&source_key, tag);
                debug!("Occurrence {} of {} (canonical {:?})", tag, source_key, canonical);
                criteria.specific_occurrence.get_or_insert(tag);
                criteria.specific_occurrence_const = Some(source_id.to_uppercase());
            }
            None => {
                if variable {
                    occurrences.reserve(&source_key);
                }
                match occurrences.get(&source_key) {
                    None => {
                        return Err(Error::MissingOccurrenceMapping {
                            source_id,
                            root: source_root,
                        });
                    }
                    Some(Some(tag)) => {
                        criteria.specific_occurrence.get_or_insert(tag);
                    }
                    Some(None) => {}
                }
            }
        }

        criteria.specific_occurrence.get_or_insert(DEFAULT_TAG);
        criteria
            .specific_occurrence_const
            .get_or_insert_with(|| source_id.to_uppercase());
        Ok(())
    }

    /// `(composite id, extension, root)` of a relationship's criteria reference
    fn referenced_id(relationship: &Element) -> (String, String, String) {
        let id = relationship.child("criteriaReference").and_then(|r| r.child("id"));
        let extension = id.and_then(|id| id.attr("extension")).unwrap_or_default();
        let root = id.and_then(|id| id.attr("root")).unwrap_or_default();
        (
            tokens::composite_id(Some(extension), Some(root)),
            extension.to_string(),
            root.to_string(),
        )
    }
}

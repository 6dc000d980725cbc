//! Description extraction
//!
//! Variables carry an encoded name in `localVariableName` that authoring
//! tools decorate with a `qdm_var_` prefix, an occurrence marker and a
//! numeric suffix. Everything else uses the criteria's text or title.

use super::criteria_element;
use crate::{xml::Element, Result};
use regex::Regex;
use std::sync::LazyLock;

static QDM_VAR_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^qdm_var_").unwrap());
static OCCURRENCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Occurrence[A-Z]of").unwrap());
static TRAILING_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_[^_]+$").unwrap());
static GROUPING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(SATISFIES ALL|SATISFIES ANY|UNION|INTERSECTION)").unwrap());

const LOCAL_VAR_PREFIX: &str = "localVar_";

pub struct DescriptionExtractor;

impl DescriptionExtractor {
    pub fn extract(entry: &Element, variable: bool) -> Result<Option<String>> {
        let criteria = criteria_element(entry);
        let attr_of = |name: &str| {
            criteria
                .and_then(|c| c.child(name))
                .and_then(|e| e.attr(name_attr(name)))
                .map(str::to_string)
        };

        if variable {
            if let Some(encoded) = entry.value_at("./cda:localVariableName/@value")? {
                if let Some(name) = Self::decode_variable_name(encoded) {
                    return Ok(Some(name));
                }
            }
            return Ok(attr_of("id"));
        }

        Ok(attr_of("text").or_else(|| attr_of("title")).or_else(|| attr_of("id")))
    }

    /// Strip the decorations from an encoded variable name
    ///
    /// Names predating the numeric suffix start with a grouping keyword and
    /// keep their last segment.
    pub fn decode_variable_name(encoded: &str) -> Option<String> {
        if QDM_VAR_PREFIX.is_match(encoded) {
            let name = QDM_VAR_PREFIX.replace(encoded, "");
            let name = OCCURRENCE_MARKER.replace_all(&name, "").into_owned();
            if GROUPING_NAME.is_match(&name) {
                return Some(name);
            }
            return Some(TRAILING_SUFFIX.replace(&name, "").into_owned());
        }
        encoded.strip_prefix(LOCAL_VAR_PREFIX).map(str::to_string)
    }
}

fn name_attr(element: &str) -> &'static str {
    match element {
        "id" => "extension",
        _ => "value",
    }
}

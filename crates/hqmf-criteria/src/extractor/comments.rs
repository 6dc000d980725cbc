//! Author comments

use super::{criteria_element, CriteriaExtractor};
use crate::{models::DataCriteria, xml::Element, Result};

pub struct CommentExtractor;

impl CriteriaExtractor for CommentExtractor {
    fn extract(&self, entry: &Element, criteria: &mut DataCriteria) -> Result<()> {
        criteria.comments = match criteria_element(entry) {
            Some(element) => element
                .select("./cda:text/cda:xml/cda:qdmUserComments/cda:item")?
                .into_iter()
                .map(|item| item.text().to_string())
                .collect(),
            None => Vec::new(),
        };
        Ok(())
    }
}

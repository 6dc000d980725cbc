//! Restricted path expressions over the element tree
//!
//! Supports the subset of XPath that template mappings and the extractors
//! rely on:
//!
//! - `./` prefix (optional), `*` and named steps (`cda:` prefixes are ignored)
//! - one predicate per step: `[@attr='v']`, `[child/@attr='v']`, `[child]`
//! - a trailing `@attr` selecting attribute values
//!
//! ```text
//! ./*/cda:outboundRelationship[@typeCode='COMP']/cda:criteriaReference/cda:id/@extension
//! ```

use super::Element;
use crate::{Error, Result};

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Step>,
    attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    name: NameTest,
    predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    path: Path,
    equals: Option<String>,
}

impl Path {
    /// Parse a path expression
    pub fn parse(expression: &str) -> Result<Path> {
        let trimmed = expression.trim();
        let body = trimmed.strip_prefix("./").unwrap_or(trimmed);
        if body.is_empty() || body == "." {
            return Ok(Path {
                steps: Vec::new(),
                attribute: None,
            });
        }

        let segments = split_top_level(body, '/').ok_or_else(|| invalid(expression, "unbalanced brackets"))?;

        let mut steps = Vec::new();
        let mut attribute = None;
        let last = segments.len() - 1;

        for (idx, segment) in segments.iter().enumerate() {
            if let Some(attr) = segment.strip_prefix('@') {
                if idx != last {
                    return Err(invalid(expression, "attribute must be the final step"));
                }
                if attr.is_empty() {
                    return Err(invalid(expression, "empty attribute name"));
                }
                attribute = Some(attr.to_string());
                continue;
            }
            steps.push(Self::parse_step(expression, segment)?);
        }

        Ok(Path { steps, attribute })
    }

    fn parse_step(expression: &str, segment: &str) -> Result<Step> {
        let (name_part, predicate) = match segment.find('[') {
            Some(open) => {
                let inner = segment[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| invalid(expression, "predicate must close the step"))?;
                (&segment[..open], Some(Self::parse_predicate(expression, inner)?))
            }
            None => (segment, None),
        };

        let name = match strip_prefix(name_part) {
            "" => return Err(invalid(expression, "empty step")),
            "*" => NameTest::Any,
            name => NameTest::Named(name.to_string()),
        };

        Ok(Step { name, predicate })
    }

    fn parse_predicate(expression: &str, inner: &str) -> Result<Predicate> {
        let parts = split_top_level(inner, '=').ok_or_else(|| invalid(expression, "unbalanced predicate"))?;
        match parts.as_slice() {
            [path] => Ok(Predicate {
                path: Path::parse(path)?,
                equals: None,
            }),
            [path, literal] => {
                let literal = literal.trim();
                let unquoted = literal
                    .strip_prefix('\'')
                    .and_then(|l| l.strip_suffix('\''))
                    .or_else(|| literal.strip_prefix('"').and_then(|l| l.strip_suffix('"')))
                    .ok_or_else(|| invalid(expression, "predicate literal must be quoted"))?;
                Ok(Predicate {
                    path: Path::parse(path)?,
                    equals: Some(unquoted.to_string()),
                })
            }
            _ => Err(invalid(expression, "predicate has more than one '='")),
        }
    }

    /// Elements matched by the step sequence (the trailing attribute, if any, is ignored)
    pub fn select<'a>(&self, context: &'a Element) -> Vec<&'a Element> {
        let mut current = vec![context];
        for step in &self.steps {
            current = current
                .into_iter()
                .flat_map(|element| element.children())
                .filter(|child| step.matches(child))
                .collect();
        }
        current
    }

    /// Attribute values when the path ends in `@attr`, text content otherwise
    pub fn values<'a>(&self, context: &'a Element) -> Vec<&'a str> {
        let elements = self.select(context);
        match &self.attribute {
            Some(attr) => elements.into_iter().filter_map(|e| e.attr(attr)).collect(),
            None => elements.into_iter().map(Element::text).collect(),
        }
    }

    /// Whether the path ends in an attribute selector
    pub fn selects_attribute(&self) -> bool {
        self.attribute.is_some()
    }
}

impl Step {
    fn matches(&self, element: &Element) -> bool {
        let name_matches = match &self.name {
            NameTest::Any => true,
            NameTest::Named(name) => element.name() == name,
        };
        name_matches && self.predicate.as_ref().is_none_or(|p| p.matches(element))
    }
}

impl Predicate {
    fn matches(&self, element: &Element) -> bool {
        match &self.equals {
            Some(expected) => self.path.values(element).contains(&expected.as_str()),
            None if self.path.selects_attribute() => !self.path.values(element).is_empty(),
            None => !self.path.select(element).is_empty(),
        }
    }
}

fn strip_prefix(name: &str) -> &str {
    name.trim().rsplit_once(':').map_or(name.trim(), |(_, local)| local)
}

fn invalid(path: &str, message: &str) -> Error {
    Error::InvalidPath {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Split on `separator` outside of brackets and quotes; `None` when unbalanced
fn split_top_level(input: &str, separator: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    parts.push(&input[start..]);
    Some(parts)
}

//! Value parser
//!
//! Turns a typed value node (`<value xsi:type="PQ" value="18" unit="a"/>`)
//! into a [`Value`]. The `xsi:type` discriminator is a closed set; anything
//! outside it aborts the document.

use crate::{
    models::{Bound, Coded, Interval, Quantity, Value},
    xml::{Element, Path},
    Error, Result,
};
use tracing::debug;

const ANY_NON_NULL: &str = "ANY.NONNULL";

/// Parses typed value nodes
pub struct ValueParser;

impl ValueParser {
    /// Parse the first node matched by `path` under `context`
    ///
    /// A missing node, or a node without `xsi:type`, yields `Ok(None)`.
    pub fn parse(context: &Element, path: &str) -> Result<Option<Value>> {
        Self::parse_path(context, &Path::parse(path)?)
    }

    /// Same as [`ValueParser::parse`] with a pre-parsed path
    pub fn parse_path(context: &Element, path: &Path) -> Result<Option<Value>> {
        match path.select(context).into_iter().next() {
            Some(node) => Self::parse_node(node),
            None => Ok(None),
        }
    }

    /// Parse a value node
    pub fn parse_node(node: &Element) -> Result<Option<Value>> {
        if node.attr("flavorId") == Some(ANY_NON_NULL) {
            return Ok(Some(Value::Any));
        }

        let Some(value_type) = node.attr("xsi:type") else {
            debug!("Value node <{}> has no xsi:type, ignoring", node.name());
            return Ok(None);
        };

        let value = match value_type {
            "PQ" => Value::Quantity(Quantity {
                value: node.attr("value").map(str::to_string),
                unit: node.attr("unit").map(str::to_string),
            }),
            "TS" => Value::Timestamp {
                value: node.attr("value").map(str::to_string),
            },
            "IVL_PQ" | "IVL_INT" => Value::Interval(Self::interval(node)),
            "CD" => Value::Coded(Self::coded(node)),
            // IVL_TS bounds are not modelled; any value satisfies it
            "ANY" | "IVL_TS" => Value::Any,
            other => return Err(Error::UnrecognizedValueType(other.to_string())),
        };

        Ok(Some(value))
    }

    /// Read `low`/`high` children as an interval regardless of the declared type
    ///
    /// Bounds are inclusive unless `lowClosed`/`highClosed` say otherwise.
    pub fn interval(node: &Element) -> Interval {
        let bound = |name: &str, closed_attr: &str| {
            node.child(name).map(|bound| Bound {
                value: bound.attr("value").map(str::to_string),
                unit: bound.attr("unit").map(str::to_string),
                inclusive: node.attr(closed_attr) != Some("false"),
            })
        };

        Interval {
            low: bound("low", "lowClosed"),
            high: bound("high", "highClosed"),
        }
    }

    /// Read a coded node
    pub fn coded(node: &Element) -> Coded {
        Coded {
            code: node.attr("code").map(str::to_string),
            code_system: node.attr("codeSystem").map(str::to_string),
            display: node
                .child("displayName")
                .and_then(|d| d.attr("value"))
                .or_else(|| node.attr("displayName"))
                .map(str::to_string),
            value_set: node.attr("valueSet").map(str::to_string),
        }
    }
}

//! Identity fields read before anything else

use crate::{tokens, xml::Element, Result};

/// Marker of an authoring tool's QDM variable naming
pub const QDM_VARIABLE_MARKER: &str = "qdm_var_";

/// Template ids in document order
pub fn template_ids(entry: &Element) -> Result<Vec<String>> {
    Ok(entry
        .select("./*/cda:templateId/cda:item")?
        .into_iter()
        .filter_map(|item| item.attr("root"))
        .map(str::to_string)
        .collect())
}

pub fn local_variable_name(entry: &Element) -> Result<Option<String>> {
    Ok(entry
        .value_at("./cda:localVariableName/@value")?
        .map(str::to_string))
}

pub fn status(entry: &Element) -> Result<Option<String>> {
    Ok(entry.value_at("./*/cda:statusCode/@code")?.map(str::to_string))
}

/// `(extension, root)` of the criteria id
pub fn criteria_id(entry: &Element) -> Result<(Option<String>, Option<String>)> {
    let extension = entry.value_at("./*/cda:id/@extension")?.map(str::to_string);
    let root = entry.value_at("./*/cda:id/@root")?.map(str::to_string);
    Ok((extension, root))
}

/// Raw composite id, normalized later in construction
pub fn raw_id(extension: Option<&str>, root: Option<&str>) -> String {
    tokens::composite_id(extension, root)
}

/// Whether the local variable name or the id uses the QDM variable convention
pub fn is_variable(local_variable_name: Option<&str>, id: &str) -> bool {
    local_variable_name.is_some_and(|name| name.contains(QDM_VARIABLE_MARKER))
        || id.contains(QDM_VARIABLE_MARKER)
}

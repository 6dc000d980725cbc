//! Identifier normalization
//!
//! Every id stored in or looked up from the reference and occurrence
//! registries goes through [`normalize`] first.

/// Prefix applied to identifiers that would otherwise start with a digit
pub const DIGIT_PREFIX: &str = "prefix_";

/// Canonicalize a raw document identifier into a registry key
///
/// Drops every character outside `[A-Za-z0-9_]` and prefixes ids that start
/// with a digit (HQMF roots are OIDs, extensions are often GUIDs).
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if stripped.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{DIGIT_PREFIX}{stripped}")
    } else {
        stripped
    }
}

/// Build the composite `<extension>_<root>` id used for criteria references
pub fn composite_id(extension: Option<&str>, root: Option<&str>) -> String {
    format!("{}_{}", extension.unwrap_or_default(), root.unwrap_or_default())
}

/// Normalized composite id
pub fn reference_id(extension: Option<&str>, root: Option<&str>) -> String {
    normalize(&composite_id(extension, root))
}

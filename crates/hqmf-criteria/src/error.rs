//! Error types for data criteria extraction

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for data criteria extraction
///
/// Every variant aborts the parse of the whole document. Recoverable
/// conditions (missing optional values, unresolved references) are logged
/// instead and never reach this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown value type [{0}]")]
    UnrecognizedValueType(String),

    #[error("Unknown data criteria template identifier [{0}]")]
    UnknownDefinition(String),

    #[error("Unknown demographic identifier [{0}]")]
    UnknownDemographic(String),

    #[error("More than one derivation operator in data criteria {id}: {first} and {second}")]
    ConflictingConjunction {
        id: String,
        first: String,
        second: String,
    },

    #[error("Could not find occurrence mapping for {source_id}, {root}")]
    MissingOccurrenceMapping { source_id: String, root: String },

    #[error("Invalid path expression '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_messages_name_offending_value() {
        let err = Error::UnrecognizedValueType("IVL_XYZ".to_string());
        assert_eq!(err.to_string(), "Unknown value type [IVL_XYZ]");

        let err = Error::MissingOccurrenceMapping {
            source_id: "Encounter_1_2".to_string(),
            root: "1.2".to_string(),
        };
        assert!(err.to_string().contains("Encounter_1_2"));
    }

    #[test]
    fn test_conflicting_conjunction_message() {
        let err = Error::ConflictingConjunction {
            id: "Group_1".to_string(),
            first: "UNION".to_string(),
            second: "XPRODUCT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "More than one derivation operator in data criteria Group_1: UNION and XPRODUCT"
        );
    }
}

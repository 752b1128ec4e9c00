/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process tree result
///
/// # Must Use
/// Construction and backfill failures are fatal to startup and must be handled
pub type TreeResult<T> = Result<T, TreeError>;

/// Process tree errors with serialization support
///
/// Lookup misses are not errors: `get`, `get_annotation` and
/// `export_annotations` return `None` for unknown pids.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TreeError {
    #[error("Failed to collect process snapshot: {0}")]
    #[diagnostic(
        code(tree::collection_failed),
        help("The process enumeration source could not list running processes. Check /proc access and permissions.")
    )]
    Collection(String),

    #[error("Invalid annotator: {0}")]
    #[diagnostic(
        code(tree::invalid_annotator),
        help("An annotation producer rejected its own configuration during tree construction.")
    )]
    InvalidAnnotator(String),

    #[error("Multiple annotators of the same type: {0}")]
    #[diagnostic(
        code(tree::duplicate_annotator),
        help("Each annotation type can only have one producer. Register it once.")
    )]
    DuplicateAnnotator(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(tree::invalid_config),
        help("Check PROCESS_TREE_WINDOW and the values passed to the tree builder.")
    )]
    InvalidConfig(String),
}

#[cfg(target_os = "linux")]
impl From<procfs::ProcError> for TreeError {
    fn from(err: procfs::ProcError) -> Self {
        TreeError::Collection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = TreeError::Collection("permission denied".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(
            json,
            r#"{"error_type":"collection","details":"permission denied"}"#
        );
    }

    #[test]
    fn test_error_display() {
        let err = TreeError::DuplicateAnnotator("OriginatorAnnotator".into());
        assert_eq!(
            err.to_string(),
            "Multiple annotators of the same type: OriginatorAnnotator"
        );
    }
}

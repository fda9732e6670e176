//! Task document parsing

use crate::document::schema::validate_shape;
use crate::document::types::TaskDocument;
use crate::error::{DocumentError, DocumentResult};
use std::fs;
use std::path::Path;

/// Parse a task document from a file
pub fn parse_document_file(path: &Path) -> DocumentResult<TaskDocument> {
    let contents = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_document(&contents)
}

/// Parse and validate a task document from a string
pub fn parse_document(yaml: &str) -> DocumentResult<TaskDocument> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| DocumentError::Syntax(e.to_string()))?;

    validate_shape(&value)?;

    serde_yaml::from_value(value).map_err(|e| DocumentError::Schema(e.to_string()))
}

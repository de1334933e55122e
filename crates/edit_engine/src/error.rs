//! Error types for editing operations

use doc_model::DocModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Failed to parse content: {0}")]
    Parse(String),

    #[error("Content analysis failed: {0}")]
    StructureAnalysis(String),

    /// Heading absent, or present at a different level than requested
    #[error("{0}")]
    SectionNotFound(String),

    #[error("Macro integrity violation: {0}")]
    MacroIntegrity(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    #[error("Content too complex: {0}")]
    ContentTooComplex(String),

    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),

    #[error("{0}")]
    TargetNotFound(String),

    #[error("Document model error: {0}")]
    DocModel(DocModelError),
}

impl EditError {
    pub fn section_not_found(heading: &str) -> Self {
        EditError::SectionNotFound(format!("Section with heading '{}' not found", heading))
    }

    pub fn heading_level_mismatch(heading: &str, found: u8, required: u8) -> Self {
        EditError::SectionNotFound(format!(
            "Found heading '{}' but level {} doesn't match required level {}",
            heading, found, required
        ))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::Parse(_) => ErrorKind::Parse,
            EditError::StructureAnalysis(_) => ErrorKind::StructureAnalysis,
            EditError::SectionNotFound(_) => ErrorKind::SectionNotFound,
            EditError::MacroIntegrity(_) => ErrorKind::MacroIntegrity,
            EditError::Validation(_) => ErrorKind::Validation,
            EditError::ContentTooComplex(_) => ErrorKind::ContentTooComplex,
            EditError::InvalidPattern(_) => ErrorKind::InvalidPattern,
            EditError::TargetNotFound(_) => ErrorKind::TargetNotFound,
            EditError::DocModel(_) => ErrorKind::DocModel,
        }
    }
}

impl From<DocModelError> for EditError {
    fn from(err: DocModelError) -> Self {
        match err {
            DocModelError::EmptyContent | DocModelError::XmlParse(_) => {
                EditError::Parse(err.to_string())
            }
            DocModelError::StructureAnalysis(msg) => EditError::StructureAnalysis(msg),
            other => EditError::DocModel(other),
        }
    }
}

/// Serializable error category carried on failed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    StructureAnalysis,
    SectionNotFound,
    MacroIntegrity,
    Validation,
    ContentTooComplex,
    InvalidPattern,
    TargetNotFound,
    DocModel,
}

pub type Result<T> = std::result::Result<T, EditError>;

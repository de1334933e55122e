//! Error types for document model operations

use crate::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Content is empty")]
    EmptyContent,

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Structure analysis failed: {0}")]
    StructureAnalysis(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;

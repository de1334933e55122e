//! Operation results

use crate::{EditError, ErrorKind, OperationKind};
use serde::{Deserialize, Serialize};

/// Outcome of one edit, success or failure.
///
/// `backup_content` always holds the input exactly as given, so a caller can
/// restore it whatever happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub operation_type: OperationKind,
    /// Edited markup; present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
    pub changes: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub backup_content: String,
}

impl OperationResult {
    pub fn success(
        operation_type: OperationKind,
        original: &str,
        new_content: String,
        changes: Vec<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            operation_type,
            new_content: Some(new_content),
            changes,
            warnings,
            error_message: None,
            error_kind: None,
            backup_content: original.to_string(),
        }
    }

    pub fn failure(operation_type: OperationKind, original: &str, error: &EditError) -> Self {
        Self {
            success: false,
            operation_type,
            new_content: None,
            changes: Vec::new(),
            warnings: Vec::new(),
            error_message: Some(error.to_string()),
            error_kind: Some(error.kind()),
            backup_content: original.to_string(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// The edited content on success, the untouched input otherwise
    pub fn content(&self) -> &str {
        self.new_content.as_deref().unwrap_or(&self.backup_content)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.success {
            write!(f, "{} succeeded: {}", self.operation_type, self.changes.join("; "))
        } else {
            write!(
                f,
                "{} failed: {}",
                self.operation_type,
                self.error_message.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

//! Operation execution engine

use crate::{
    analyzer_for, run_command, EditError, EditorConfig, Operation, OperationKind, OperationResult,
};
use doc_model::{ContentStructure, StructureAnalyzer};

/// Runs operations of any kind against storage-format content.
///
/// Holds only configuration, so one executor can serve any number of calls
/// and be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct EditExecutor {
    analyzer: StructureAnalyzer,
    config: EditorConfig,
}

impl EditExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            analyzer: analyzer_for(&config),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Validate and apply one operation
    pub fn execute(&self, content: &str, operation: &Operation) -> OperationResult {
        run_command(operation.command(), content, &self.analyzer, &self.config)
    }

    /// Apply an operation given in its JSON form
    pub fn execute_json(&self, content: &str, operation: &str) -> OperationResult {
        match Operation::from_json(operation) {
            Ok(op) => self.execute(content, &op),
            Err(e) => {
                let kind = operation_type_of(operation).unwrap_or(OperationKind::Unknown);
                tracing::error!("Rejected operation: {}", e);
                OperationResult::failure(kind, content, &e)
            }
        }
    }

    /// Apply operations in order, each to the previous result. Stops at the
    /// first failure, whose result is last in the returned list.
    pub fn execute_all(&self, content: &str, operations: &[Operation]) -> Vec<OperationResult> {
        let mut results = Vec::with_capacity(operations.len());
        let mut current = content.to_string();
        for operation in operations {
            let result = self.execute(&current, operation);
            let failed = !result.success;
            if let Some(next) = &result.new_content {
                current = next.clone();
            }
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Analyze content without editing it
    pub fn analyze(&self, content: &str) -> Result<ContentStructure, EditError> {
        self.analyzer.analyze(content).map_err(EditError::from)
    }
}

/// Best-effort read of the `operation_type` tag of a malformed request.
/// An unrecognized tag reads as [`OperationKind::Unknown`].
fn operation_type_of(json: &str) -> Option<OperationKind> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    serde_json::from_value(value.get("operation_type")?.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AppendToEnd, ErrorKind, PrependToBeginning, ReplaceSection, ReplaceTextPattern,
        UpdateListItem,
    };

    #[test]
    fn test_dispatch() {
        let executor = EditExecutor::new();
        let op = Operation::from(ReplaceTextPattern::new("a", "b"));
        let result = executor.execute("<p>a</p>", &op);
        assert!(result.success);
        assert_eq!(result.operation_type, OperationKind::ReplaceTextPattern);
        assert_eq!(result.content(), "<p>b</p>");
    }

    #[test]
    fn test_execute_json() {
        let executor = EditExecutor::new();
        let result = executor.execute_json(
            "<ul><li>a</li></ul>",
            r#"{"operation_type": "update_list_item", "list_index": 0, "item_index": 0, "new_content": "z"}"#,
        );
        assert_eq!(result.content(), "<ul><li>z</li></ul>");

        let result = executor.execute_json(
            "<p/>",
            r#"{"operation_type": "update_table_cell", "table_index": 0}"#,
        );
        assert!(!result.success);
        assert_eq!(result.operation_type, OperationKind::UpdateTableCell);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));
        assert_eq!(result.backup_content, "<p/>");
    }

    #[test]
    fn test_execute_json_unknown_type() {
        let executor = EditExecutor::new();
        let result = executor.execute_json("<p>a</p>", r#"{"operation_type": "delete_page"}"#);
        assert!(!result.success);
        assert_eq!(result.operation_type, OperationKind::Unknown);
        assert_eq!(result.error_kind, Some(ErrorKind::Validation));

        let result = executor.execute_json("<p>a</p>", r#"{"heading": "A"}"#);
        assert_eq!(result.operation_type, OperationKind::Unknown);

        let result = executor.execute_json("<p>a</p>", "not json");
        assert_eq!(result.operation_type, OperationKind::Unknown);
        assert_eq!(result.backup_content, "<p>a</p>");
    }

    #[test]
    fn test_page_operations_dispatch() {
        let executor = EditExecutor::new();
        let ops = vec![
            Operation::from(AppendToEnd::new("<p>last</p>")),
            Operation::from(PrependToBeginning::new("<p>first</p>")),
        ];
        let results = executor.execute_all("<p>mid</p>", &ops);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].operation_type, OperationKind::AppendToEnd);
        assert_eq!(results[1].operation_type, OperationKind::PrependToBeginning);
        assert_eq!(results[1].content(), "<p>first</p><p>mid</p><p>last</p>");
    }

    #[test]
    fn test_execute_all_chains_and_stops() {
        let executor = EditExecutor::new();
        let ops = vec![
            Operation::from(ReplaceSection::new("A", "<p>new</p>")),
            Operation::from(UpdateListItem::new(0, 0, "x")),
            Operation::from(ReplaceTextPattern::new("new", "newer")),
        ];
        let results = executor.execute_all("<h1>A</h1><p>old</p>", &ops);
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[1].backup_content, "<h1>A</h1><p>new</p>");
    }

    #[test]
    fn test_analyze() {
        let structure = EditExecutor::new().analyze("<h1>A</h1><h2>B</h2>").unwrap();
        assert_eq!(structure.headings.len(), 2);
        assert!(EditExecutor::new().analyze("").is_err());
    }
}

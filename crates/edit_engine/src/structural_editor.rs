//! Index-addressed table and list editing

use crate::{
    analyzer_for, run_command, AddListItem, AddTableRow, EditorConfig, OperationResult,
    ReorderListItems, Result, UpdateListItem, UpdateTableCell, UpdateTableColumn,
};
use doc_model::{DocumentTree, NodeId, StructureAnalyzer};

/// Replace everything inside an element, attributes included, with literal text
pub(crate) fn replace_with_text(tree: &mut DocumentTree, id: NodeId, text: &str) -> Result<()> {
    tree.clear_content(id)?;
    let el = tree.element_mut(id)?;
    el.attributes.clear();
    el.self_closing = false;
    el.text = text.to_string();
    Ok(())
}

/// Table and list edits over storage-format content
#[derive(Debug, Clone, Default)]
pub struct StructuralEditor {
    analyzer: StructureAnalyzer,
    config: EditorConfig,
}

impl StructuralEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            analyzer: analyzer_for(&config),
            config,
        }
    }

    pub fn update_table_cell(&self, content: &str, params: &UpdateTableCell) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn add_table_row(&self, content: &str, params: &AddTableRow) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn update_table_column(&self, content: &str, params: &UpdateTableColumn) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn add_list_item(&self, content: &str, params: &AddListItem) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn update_list_item(&self, content: &str, params: &UpdateListItem) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn reorder_list_items(&self, content: &str, params: &ReorderListItems) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }
}

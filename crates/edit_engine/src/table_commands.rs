//! Table editing commands
//!
//! This module implements commands addressed by table, row and column index:
//! - UpdateTableCell: Replace the text of one cell
//! - AddTableRow: Insert a row of plain-text cells
//! - UpdateTableColumn: Replace the text of one column, row by row

use crate::operation::require_non_empty;
use crate::structural_editor::replace_with_text;
use crate::{Command, CommandResult, EditContext, EditError, OperationKind, Result};
use doc_model::{DocumentTree, Element, ElementKind, NodeId, StorageParser};
use serde::{Deserialize, Serialize};

fn locate_table(tree: &DocumentTree, table_index: usize) -> Result<NodeId> {
    tree.table_at(table_index).ok_or_else(|| {
        EditError::TargetNotFound(format!(
            "Table index {} out of range ({} table(s) found)",
            table_index,
            tree.tables().len()
        ))
    })
}

/// Closest enclosing `table` of an element
fn owning_table(tree: &DocumentTree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(id);
    while let Some(node) = current {
        if tree.get(node).is_some_and(|e| e.kind == ElementKind::Table) {
            return Some(node);
        }
        current = tree.parent(node);
    }
    None
}

// =============================================================================
// UpdateTableCell Command
// =============================================================================

/// Replace the content of one cell with plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTableCell {
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    /// Literal text; may be empty to blank the cell
    pub new_content: String,
}

impl UpdateTableCell {
    pub fn new(
        table_index: usize,
        row_index: usize,
        column_index: usize,
        new_content: impl Into<String>,
    ) -> Self {
        Self {
            table_index,
            row_index,
            column_index,
            new_content: new_content.into(),
        }
    }

    fn locate_cell(&self, tree: &DocumentTree) -> Result<NodeId> {
        let not_found = |detail: String| {
            EditError::TargetNotFound(format!(
                "Failed to update table cell at table[{}], row[{}], column[{}]: {}",
                self.table_index, self.row_index, self.column_index, detail
            ))
        };

        let table = locate_table(tree, self.table_index).map_err(|e| not_found(e.to_string()))?;
        let rows = tree.table_rows(table);
        let row = *rows.get(self.row_index).ok_or_else(|| {
            not_found(format!("row index out of range ({} row(s))", rows.len()))
        })?;
        let cells = tree.row_cells(row);
        cells.get(self.column_index).copied().ok_or_else(|| {
            not_found(format!("column index out of range ({} cell(s))", cells.len()))
        })
    }
}

impl Command for UpdateTableCell {
    fn kind(&self) -> OperationKind {
        OperationKind::UpdateTableCell
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let mut tree = ctx.working_tree();
        let cell = self.locate_cell(&tree)?;
        replace_with_text(&mut tree, cell, &self.new_content)?;

        let changes = vec![format!(
            "Updated table[{}] row[{}] column[{}] with new content",
            self.table_index, self.row_index, self.column_index
        )];
        Ok(CommandResult::from_tree(&tree, changes))
    }

    fn apply_to_empty(&self, _content: &str, _parser: &StorageParser) -> Result<CommandResult> {
        Err(EditError::Parse("Cannot update table cell in empty content".to_string()))
    }
}

// =============================================================================
// AddTableRow Command
// =============================================================================

/// Add a row with one `td` per value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTableRow {
    pub table_index: usize,
    /// Cell texts, inserted literally
    pub row_data: Vec<String>,
    /// Insert before the row at this index; append when absent or past the end
    #[serde(default)]
    pub insert_position: Option<usize>,
}

impl AddTableRow {
    pub fn new(table_index: usize, row_data: Vec<String>) -> Self {
        Self {
            table_index,
            row_data,
            insert_position: None,
        }
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.insert_position = Some(position);
        self
    }
}

impl Command for AddTableRow {
    fn kind(&self) -> OperationKind {
        OperationKind::AddTableRow
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("row_data", &self.row_data)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let mut tree = ctx.working_tree();
        let table = locate_table(&tree, self.table_index)?;
        let rows = tree.table_rows(table);

        let row = tree.create(Element::new("tr"));
        for value in &self.row_data {
            tree.append_text_element(row, "td", value)?;
        }

        let before = self.insert_position.and_then(|p| rows.get(p).copied());
        let (parent, index) = match before {
            Some(existing) => (
                tree.parent(existing).unwrap_or(table),
                tree.index_in_parent(existing).unwrap_or(0),
            ),
            None => {
                let last_own_row = rows
                    .iter()
                    .rev()
                    .copied()
                    .find(|&r| owning_table(&tree, r) == Some(table));
                match last_own_row.and_then(|r| Some((tree.parent(r)?, tree.index_in_parent(r)?))) {
                    Some((parent, index)) => (parent, index + 1),
                    None => (table, tree.children(table).len()),
                }
            }
        };
        tree.insert_child(parent, index, row)?;

        let placement = match (before, self.insert_position) {
            (Some(_), Some(position)) => format!("at position {}", position),
            _ => "at end".to_string(),
        };
        let changes = vec![format!(
            "Added new row to table[{}] {} with {} cells",
            self.table_index,
            placement,
            self.row_data.len()
        )];
        Ok(CommandResult::from_tree(&tree, changes))
    }
}

// =============================================================================
// UpdateTableColumn Command
// =============================================================================

/// Replace one column: value i goes into row i's cell at `column_index`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTableColumn {
    pub table_index: usize,
    pub column_index: usize,
    pub column_data: Vec<String>,
}

impl UpdateTableColumn {
    pub fn new(table_index: usize, column_index: usize, column_data: Vec<String>) -> Self {
        Self {
            table_index,
            column_index,
            column_data,
        }
    }
}

impl Command for UpdateTableColumn {
    fn kind(&self) -> OperationKind {
        OperationKind::UpdateTableColumn
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("column_data", &self.column_data)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let mut tree = ctx.working_tree();
        let table = locate_table(&tree, self.table_index)?;
        let rows = tree.table_rows(table);

        let mut updated = 0;
        for (&row, value) in rows.iter().zip(&self.column_data) {
            if let Some(&cell) = tree.row_cells(row).get(self.column_index) {
                replace_with_text(&mut tree, cell, value)?;
                updated += 1;
            }
        }

        let mut warnings = Vec::new();
        let skipped = self.column_data.len() - updated;
        if skipped > 0 {
            warnings.push(format!(
                "{} value(s) had no cell at column[{}] in table[{}]",
                skipped, self.column_index, self.table_index
            ));
        }

        let changes = vec![format!(
            "Updated column[{}] in table[{}] with {} cells",
            self.column_index, self.table_index, updated
        )];
        Ok(CommandResult::from_tree(&tree, changes).with_warnings(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, StructuralEditor};

    const TWO_TABLES: &str = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table><table><tbody><tr><th>h</th></tr></tbody></table>";

    fn editor() -> StructuralEditor {
        StructuralEditor::new()
    }

    #[test]
    fn test_update_cell() {
        let result = editor().update_table_cell(
            "<table><tr><td>1</td><td>2</td></tr></table>",
            &UpdateTableCell::new(0, 0, 1, "9"),
        );
        assert!(result.success);
        assert_eq!(result.content(), "<table><tr><td>1</td><td>9</td></tr></table>");
        assert_eq!(result.changes, vec!["Updated table[0] row[0] column[1] with new content"]);
    }

    #[test]
    fn test_update_cell_clears_markup_and_attributes() {
        let result = editor().update_table_cell(
            r#"<table><tr><td class="x"><strong>old</strong> tail</td></tr></table>"#,
            &UpdateTableCell::new(0, 0, 0, "<b>new</b>"),
        );
        assert_eq!(
            result.content(),
            "<table><tr><td>&lt;b&gt;new&lt;/b&gt;</td></tr></table>"
        );
    }

    #[test]
    fn test_update_cell_out_of_range() {
        let result = editor().update_table_cell(TWO_TABLES, &UpdateTableCell::new(0, 0, 5, "x"));
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::TargetNotFound));
        assert!(result
            .error_message
            .unwrap()
            .starts_with("Failed to update table cell at table[0], row[0], column[5]"));

        let result = editor().update_table_cell(TWO_TABLES, &UpdateTableCell::new(2, 0, 0, "x"));
        assert_eq!(result.error_kind, Some(ErrorKind::TargetNotFound));
    }

    #[test]
    fn test_update_cell_in_empty_content() {
        let result = editor().update_table_cell("  ", &UpdateTableCell::new(0, 0, 0, "x"));
        assert!(!result.success);
        assert_eq!(
            result.error_message.as_deref(),
            Some("Failed to parse content: Cannot update table cell in empty content")
        );
    }

    #[test]
    fn test_second_table_addressing() {
        let result = editor().update_table_cell(TWO_TABLES, &UpdateTableCell::new(1, 0, 0, "H"));
        assert!(result.content().starts_with(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>"
        ));
        assert!(result.content().ends_with("<tr><th>H</th></tr></tbody></table>"));
    }

    #[test]
    fn test_add_row_at_end_and_position() {
        let params = AddTableRow::new(0, vec!["e".into(), "f".into()]);
        let result = editor().add_table_row(TWO_TABLES, &params);
        assert!(result.content().starts_with(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr><tr><td>e</td><td>f</td></tr></table>"
        ));
        assert_eq!(result.changes, vec!["Added new row to table[0] at end with 2 cells"]);

        let result = editor().add_table_row(TWO_TABLES, &params.clone().at_position(0));
        assert!(result
            .content()
            .starts_with("<table><tr><td>e</td><td>f</td></tr><tr><td>a</td>"));
        assert_eq!(result.changes, vec!["Added new row to table[0] at position 0 with 2 cells"]);
    }

    #[test]
    fn test_add_row_inside_tbody() {
        let params = AddTableRow::new(1, vec!["x".into()]);
        let result = editor().add_table_row(TWO_TABLES, &params);
        assert!(result
            .content()
            .ends_with("<tbody><tr><th>h</th></tr><tr><td>x</td></tr></tbody></table>"));
    }

    #[test]
    fn test_add_row_to_empty_table() {
        let result = editor().add_table_row("<table></table>", &AddTableRow::new(0, vec!["1".into()]));
        assert_eq!(result.content(), "<table><tr><td>1</td></tr></table>");
    }

    #[test]
    fn test_add_row_skips_nested_table_rows_when_appending() {
        let content = "<table><tr><td><table><tr><td>in</td></tr></table></td></tr></table>";
        let result = editor().add_table_row(content, &AddTableRow::new(0, vec!["new".into()]));
        assert_eq!(
            result.content(),
            "<table><tr><td><table><tr><td>in</td></tr></table></td></tr><tr><td>new</td></tr></table>"
        );
    }

    #[test]
    fn test_update_column() {
        let params = UpdateTableColumn::new(0, 1, vec!["B".into(), "D".into(), "extra".into()]);
        let result = editor().update_table_column(TWO_TABLES, &params);
        assert!(result.success);
        assert!(result.content().starts_with(
            "<table><tr><td>a</td><td>B</td></tr><tr><td>c</td><td>D</td></tr></table>"
        ));
        assert_eq!(result.changes, vec!["Updated column[1] in table[0] with 2 cells"]);
        assert_eq!(result.warnings, vec!["1 value(s) had no cell at column[1] in table[0]"]);
    }
}

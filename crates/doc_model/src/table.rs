//! Table addressing
//!
//! Tables are addressed positionally. Table and row indices count matches of a
//! depth-first, document-order walk, so rows of a nested table also belong to
//! the outer table's row sequence. Cells are the `td`/`th` children of a row.

use crate::{DocumentTree, ElementKind, NodeId};

impl DocumentTree {
    /// Every `table` element, in document order
    pub fn tables(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, e)| e.kind == ElementKind::Table)
            .map(|(id, _)| id)
            .collect()
    }

    /// The `index`th table, counting from zero
    pub fn table_at(&self, index: usize) -> Option<NodeId> {
        self.tables().get(index).copied()
    }

    /// Every `tr` below `table`, in document order
    pub fn table_rows(&self, table: NodeId) -> Vec<NodeId> {
        self.descendants(table)
            .into_iter()
            .skip(1)
            .filter(|&id| self.get(id).is_some_and(|e| e.kind == ElementKind::TableRow))
            .collect()
    }

    /// The `td`/`th` children of `row`
    pub fn row_cells(&self, row: NodeId) -> Vec<NodeId> {
        self.children(row)
            .iter()
            .copied()
            .filter(|&id| self.get(id).is_some_and(|e| e.kind.is_cell()))
            .collect()
    }

    /// Row count and widest row of a table
    pub fn table_dimensions(&self, table: NodeId) -> (usize, usize) {
        let rows = self.table_rows(table);
        let columns = rows.iter().map(|&row| self.row_cells(row).len()).max().unwrap_or(0);
        (rows.len(), columns)
    }
}

//! List addressing
//!
//! Lists (`ul` and `ol`) are addressed by document order; items are the
//! direct `li` children of a list, so nested lists keep their own items.

use crate::{DocumentTree, ElementKind, NodeId};

impl DocumentTree {
    /// Every `ul`/`ol` element, in document order
    pub fn lists(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, e)| e.kind.is_list())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn list_at(&self, index: usize) -> Option<NodeId> {
        self.lists().get(index).copied()
    }

    /// The `li` children of `list`
    pub fn list_items(&self, list: NodeId) -> Vec<NodeId> {
        self.children(list)
            .iter()
            .copied()
            .filter(|&id| self.get(id).is_some_and(|e| e.kind == ElementKind::ListItem))
            .collect()
    }

    pub fn is_ordered_list(&self, list: NodeId) -> bool {
        matches!(
            self.get(list).map(|e| e.kind),
            Some(ElementKind::List { ordered: true })
        )
    }
}

//! List editing commands
//!
//! This module implements commands addressed by list and item index:
//! - AddListItem: Insert a plain-text item
//! - UpdateListItem: Replace the text of one item
//! - ReorderListItems: Rebuild a list's items in a new order

use crate::operation::{require_non_empty, require_text};
use crate::structural_editor::replace_with_text;
use crate::{Command, CommandResult, EditContext, EditError, OperationKind, Result};
use doc_model::{DocumentTree, Element, NodeId};
use serde::{Deserialize, Serialize};

fn locate_list(tree: &DocumentTree, list_index: usize) -> Result<NodeId> {
    tree.list_at(list_index).ok_or_else(|| {
        EditError::TargetNotFound(format!(
            "List index {} out of range ({} list(s) found)",
            list_index,
            tree.lists().len()
        ))
    })
}

// =============================================================================
// AddListItem Command
// =============================================================================

/// Add an `li` holding plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddListItem {
    pub list_index: usize,
    pub item_content: String,
    /// Insert before the item at this index; append when absent or past the end
    #[serde(default)]
    pub insert_position: Option<usize>,
}

impl AddListItem {
    pub fn new(list_index: usize, item_content: impl Into<String>) -> Self {
        Self {
            list_index,
            item_content: item_content.into(),
            insert_position: None,
        }
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.insert_position = Some(position);
        self
    }
}

impl Command for AddListItem {
    fn kind(&self) -> OperationKind {
        OperationKind::AddListItem
    }

    fn validate(&self) -> Result<()> {
        require_text("item_content", &self.item_content)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let mut tree = ctx.working_tree();
        let list = locate_list(&tree, self.list_index)?;
        let items = tree.list_items(list);

        let item = tree.create(Element::new("li").with_text(self.item_content.as_str()));
        let before = self.insert_position.and_then(|p| items.get(p).copied());
        let index = match before.and_then(|existing| tree.index_in_parent(existing)) {
            Some(index) => index,
            None => tree.children(list).len(),
        };
        tree.insert_child(list, index, item)?;

        let placement = match (before, self.insert_position) {
            (Some(_), Some(position)) => format!("at position {}", position),
            _ => "at end".to_string(),
        };
        let changes = vec![format!("Added new item to list[{}] {}", self.list_index, placement)];
        Ok(CommandResult::from_tree(&tree, changes))
    }
}

// =============================================================================
// UpdateListItem Command
// =============================================================================

/// Replace the content of one item with plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateListItem {
    pub list_index: usize,
    pub item_index: usize,
    pub new_content: String,
}

impl UpdateListItem {
    pub fn new(list_index: usize, item_index: usize, new_content: impl Into<String>) -> Self {
        Self {
            list_index,
            item_index,
            new_content: new_content.into(),
        }
    }
}

impl Command for UpdateListItem {
    fn kind(&self) -> OperationKind {
        OperationKind::UpdateListItem
    }

    fn validate(&self) -> Result<()> {
        require_text("new_content", &self.new_content)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let mut tree = ctx.working_tree();
        let list = locate_list(&tree, self.list_index)?;
        let items = tree.list_items(list);
        let item = *items.get(self.item_index).ok_or_else(|| {
            EditError::TargetNotFound(format!(
                "Item index {} out of range for list[{}] ({} item(s))",
                self.item_index,
                self.list_index,
                items.len()
            ))
        })?;
        replace_with_text(&mut tree, item, &self.new_content)?;

        let changes = vec![format!("Updated item[{}] in list[{}]", self.item_index, self.list_index)];
        Ok(CommandResult::from_tree(&tree, changes))
    }
}

// =============================================================================
// ReorderListItems Command
// =============================================================================

/// Rebuild a list from its current items in the given order.
///
/// Repeated indices produce deep copies and omitted items are dropped, unless
/// strict reordering is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderListItems {
    pub list_index: usize,
    pub new_order: Vec<usize>,
}

impl ReorderListItems {
    pub fn new(list_index: usize, new_order: Vec<usize>) -> Self {
        Self {
            list_index,
            new_order,
        }
    }

    fn is_permutation(&self, len: usize) -> bool {
        let mut seen = vec![false; len];
        self.new_order.len() == len
            && self
                .new_order
                .iter()
                .all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
    }
}

impl Command for ReorderListItems {
    fn kind(&self) -> OperationKind {
        OperationKind::ReorderListItems
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("new_order", &self.new_order)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let mut tree = ctx.working_tree();
        let list = locate_list(&tree, self.list_index)?;
        let items = tree.list_items(list);

        if let Some(&bad) = self.new_order.iter().find(|&&i| i >= items.len()) {
            return Err(EditError::TargetNotFound(format!(
                "Invalid order index {} for list[{}] with {} item(s)",
                bad,
                self.list_index,
                items.len()
            )));
        }

        let mut warnings = Vec::new();
        if !self.is_permutation(items.len()) {
            if ctx.config.strict_reorder {
                return Err(EditError::Validation(format!(
                    "new_order must be a permutation of 0..{}",
                    items.len()
                )));
            }
            tracing::warn!("Reorder of list[{}] is not a permutation", self.list_index);
            warnings.push(format!(
                "new_order is not a permutation of the {} item(s); repeated items were copied and missing items removed",
                items.len()
            ));
        }

        let mut used = vec![false; items.len()];
        let mut ordered = Vec::with_capacity(self.new_order.len());
        for &i in &self.new_order {
            let id = if std::mem::replace(&mut used[i], true) {
                tree.duplicate(items[i])?
            } else {
                items[i]
            };
            ordered.push(id);
        }

        let dropped = tree.children(list).len() - items.len();
        if dropped > 0 {
            warnings.push(format!("Removed {} non-item element(s) from list[{}]", dropped, self.list_index));
        }
        for child in tree.children(list).to_vec() {
            tree.detach(child)?;
        }
        for id in ordered {
            tree.append_child(list, id)?;
        }

        let changes = vec![format!(
            "Reordered {} items in list[{}]",
            self.new_order.len(),
            self.list_index
        )];
        Ok(CommandResult::from_tree(&tree, changes).with_warnings(warnings))
    }
}

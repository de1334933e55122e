//! Content blocks and insertion points

use crate::{DocumentTree, ElementKind, NodeId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Content Blocks
// =============================================================================

/// Coarse classification of an element for callers choosing what to edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    Heading,
    Table,
    List,
    Macro,
    Layout,
    Image,
    Link,
    CodeBlock,
    Quote,
    Unknown,
}

impl BlockType {
    /// Map an element to a block type. Otherwise-unclassified elements count
    /// as paragraphs when they render any text.
    pub fn classify(tree: &DocumentTree, id: NodeId) -> Self {
        let Some(el) = tree.get(id) else {
            return BlockType::Unknown;
        };
        match el.kind {
            ElementKind::SyntheticRoot => BlockType::Unknown,
            ElementKind::Heading(_) => BlockType::Heading,
            ElementKind::Paragraph | ElementKind::Division => BlockType::Paragraph,
            ElementKind::Table
            | ElementKind::TableSection
            | ElementKind::TableRow
            | ElementKind::TableCell
            | ElementKind::TableHeader => BlockType::Table,
            ElementKind::List { .. } | ElementKind::ListItem => BlockType::List,
            ElementKind::Image => BlockType::Image,
            ElementKind::Link => BlockType::Link,
            ElementKind::Code => BlockType::CodeBlock,
            ElementKind::Quote => BlockType::Quote,
            ElementKind::Macro => BlockType::Macro,
            ElementKind::Layout => BlockType::Layout,
            ElementKind::MacroParameter | ElementKind::Resource | ElementKind::Generic => {
                if tree.text_content(id).is_empty() {
                    BlockType::Unknown
                } else {
                    BlockType::Paragraph
                }
            }
        }
    }
}

/// Extra facts about a block's element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
}

impl BlockMetadata {
    pub fn extract(tree: &DocumentTree, id: NodeId) -> Self {
        let Some(el) = tree.get(id) else {
            return Self::default();
        };
        let mut meta = Self {
            tag: el.tag(),
            attributes: el.attributes.clone(),
            ..Self::default()
        };
        match el.kind {
            ElementKind::Macro => meta.macro_name = el.macro_name().map(str::to_string),
            ElementKind::Table => {
                let rows = tree.table_rows(id);
                meta.row_count = Some(rows.len());
                meta.column_count = rows.first().map(|&row| tree.row_cells(row).len());
            }
            ElementKind::List { .. } => meta.item_count = Some(tree.list_items(id).len()),
            _ => {}
        }
        meta
    }
}

/// A classified element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub block_type: BlockType,
    pub node: NodeId,
    pub position: usize,
    pub text: String,
    pub metadata: BlockMetadata,
}

impl std::fmt::Display for ContentBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.text.chars().take(50).collect();
        let ellipsis = if self.text.chars().count() > 50 { "..." } else { "" };
        write!(f, "{:?}: {}{}", self.block_type, preview, ellipsis)
    }
}

// =============================================================================
// Insertion Points
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionKind {
    StartOfPage,
    AfterHeading,
    EndOfSection,
    EndOfPage,
}

/// A suggested place to add new content. Advisory only; editors address
/// content by heading or index, not by insertion point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionPoint {
    pub kind: InsertionKind,
    pub position: usize,
    pub description: String,
    /// Text of the heading the point is anchored to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

impl InsertionPoint {
    pub fn start_of_page() -> Self {
        Self {
            kind: InsertionKind::StartOfPage,
            position: 0,
            description: "Beginning of page content".to_string(),
            heading: None,
        }
    }

    pub fn after_heading(heading: &str, position: usize) -> Self {
        Self {
            kind: InsertionKind::AfterHeading,
            position,
            description: format!("After heading: {}", heading),
            heading: Some(heading.to_string()),
        }
    }

    pub fn end_of_section(heading: &str, position: usize) -> Self {
        Self {
            kind: InsertionKind::EndOfSection,
            position,
            description: format!("End of section: {}", heading),
            heading: Some(heading.to_string()),
        }
    }

    pub fn end_of_page(position: usize) -> Self {
        Self {
            kind: InsertionKind::EndOfPage,
            position,
            description: "End of page content".to_string(),
            heading: None,
        }
    }
}

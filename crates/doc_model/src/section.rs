//! Heading and section model
//!
//! Storage-format markup has no section element. A section is derived: a
//! heading plus everything after it up to the next heading of the same or a
//! higher level. Positions are pre-order indices over the whole tree, root
//! included.

use crate::{DocumentTree, NodeId};
use serde::{Deserialize, Serialize};

/// A heading element found during analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1 through 6
    pub level: u8,
    /// Rendered text of the heading
    pub text: String,
    /// Pre-order position in the analyzed tree
    pub position: usize,
    /// Arena id of the heading element
    pub node: NodeId,
}

impl Heading {
    /// Compare heading text, optionally folding case
    pub fn matches(&self, text: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.text == text
        } else {
            self.text.to_lowercase() == text.to_lowercase()
        }
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "H{}: {} (pos: {})", self.level, self.text, self.position)
    }
}

/// A heading together with the span of content it governs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: Heading,
    /// Elements in `start..end`, in pre-order
    pub content: Vec<NodeId>,
    /// First position after the heading's own subtree
    pub start: usize,
    /// Position of the next heading at the same or a higher level, or the
    /// end of the enclosing span
    pub end: usize,
    /// Directly nested sections of deeper headings
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn level(&self) -> u8 {
        self.heading.level
    }

    pub fn contains_position(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    /// Own text and tail of every content element, trimmed and space-joined
    pub fn text(&self, tree: &DocumentTree) -> String {
        self.content
            .iter()
            .filter_map(|&id| tree.get(id))
            .flat_map(|el| [el.text.trim(), el.tail.trim()])
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// This section and all nested subsections, depth first
    pub fn flatten(&self) -> Vec<&Section> {
        let mut out = vec![self];
        for sub in &self.subsections {
            out.extend(sub.flatten());
        }
        out
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Section: {} ({} elements)", self.heading.text, self.content.len())
    }
}

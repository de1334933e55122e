//! Section editing commands
//!
//! This module implements commands addressed by heading text:
//! - ReplaceSection: Replace the content under a heading
//! - InsertAfterHeading: Add content directly after a heading
//! - UpdateSectionHeading: Rename a heading and optionally change its level

use crate::operation::{require_heading_level, require_text};
use crate::{
    analyzer_for, run_command, Command, CommandResult, EditContext, EditError, EditorConfig,
    OperationKind, OperationResult, Result,
};
use doc_model::{
    ContentStructure, DocumentTree, Element, Heading, NodeId, Section, StorageParser,
    StructureAnalyzer,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared helpers
// =============================================================================

/// Find the section for a heading, checking its level when one is required
fn resolve_section<'s>(
    structure: &'s ContentStructure,
    heading: &str,
    level: Option<u8>,
    case_sensitive: bool,
) -> Result<&'s Section> {
    let section = structure
        .section_by_heading(heading, case_sensitive)
        .ok_or_else(|| EditError::section_not_found(heading))?;

    match level {
        Some(required) if required != section.level() => Err(EditError::heading_level_mismatch(
            heading,
            section.level(),
            required,
        )),
        _ => Ok(section),
    }
}

fn heading_parent(tree: &DocumentTree, heading: &Heading) -> Result<NodeId> {
    tree.parent(heading.node).ok_or_else(|| {
        EditError::TargetNotFound(format!(
            "Heading '{}' has no parent element to insert content into",
            heading.text
        ))
    })
}

/// Parse `markup` and insert its top-level nodes right after `anchor`.
///
/// Top-level text before the first node joins the anchor's tail. Markup that
/// does not parse is inserted as the text of a single paragraph instead.
fn splice_fragment(
    tree: &mut DocumentTree,
    parser: &StorageParser,
    parent: NodeId,
    anchor: NodeId,
    markup: &str,
    warnings: &mut Vec<String>,
) -> Result<Vec<NodeId>> {
    let index = tree
        .index_in_parent(anchor)
        .map(|i| i + 1)
        .ok_or_else(|| EditError::TargetNotFound(format!("Node {} is not attached", anchor)))?;

    match parser.parse_fragment(markup) {
        Ok(fragment) => {
            let (leading, nodes) = fragment.fragment_parts();
            tree.element_mut(anchor)?.tail.push_str(&leading);

            let mut inserted = Vec::with_capacity(nodes.len());
            for (offset, node) in nodes.into_iter().enumerate() {
                let copy = tree.import_subtree(&fragment, node)?;
                tree.insert_child(parent, index + offset, copy)?;
                inserted.push(copy);
            }
            Ok(inserted)
        }
        Err(e) => {
            tracing::warn!("New content is not valid markup, inserting as a paragraph: {}", e);
            warnings.push(format!(
                "New content could not be parsed as markup and was inserted as text: {}",
                e
            ));
            let paragraph = tree.create(Element::new("p").with_text(markup));
            tree.insert_child(parent, index, paragraph)?;
            Ok(vec![paragraph])
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

// =============================================================================
// ReplaceSection Command
// =============================================================================

/// Replace the content under a heading, keeping the heading itself.
///
/// Only the heading's own content is replaced unless
/// `include_subsections` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceSection {
    pub heading: String,
    /// Storage-format markup to put under the heading
    pub new_content: String,
    /// Only match a heading at this level
    #[serde(default)]
    pub heading_level: Option<u8>,
    #[serde(default)]
    pub case_sensitive: bool,
    /// When false (the default) removal stops at the first heading of any
    /// level, so nested subsections are kept. When true it runs to the next
    /// heading at the same or a higher level, removing nested subsections.
    #[serde(default)]
    pub include_subsections: bool,
}

impl ReplaceSection {
    pub fn new(heading: impl Into<String>, new_content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            new_content: new_content.into(),
            heading_level: None,
            case_sensitive: false,
            include_subsections: false,
        }
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = Some(level);
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    pub fn include_subsections(mut self, value: bool) -> Self {
        self.include_subsections = value;
        self
    }

    /// Whether a sibling after the heading still belongs to the replaced run
    fn removes(&self, tree: &DocumentTree, id: NodeId, level: u8) -> bool {
        match tree.get(id).and_then(|el| el.heading_level()) {
            Some(sibling_level) => self.include_subsections && sibling_level > level,
            None => true,
        }
    }
}

impl Command for ReplaceSection {
    fn kind(&self) -> OperationKind {
        OperationKind::ReplaceSection
    }

    fn validate(&self) -> Result<()> {
        require_text("heading", &self.heading)?;
        require_text("new_content", &self.new_content)?;
        require_heading_level("heading_level", self.heading_level)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let section = resolve_section(
            ctx.structure,
            &self.heading,
            self.heading_level,
            self.case_sensitive,
        )?;
        let heading = section.heading.node;
        let level = section.level();

        let mut tree = ctx.working_tree();
        let parent = heading_parent(&tree, &section.heading)?;

        let removed: Vec<NodeId> = tree
            .following_siblings(heading)
            .into_iter()
            .take_while(|&id| self.removes(&tree, id, level))
            .collect();

        // Whitespace that closed the removed run moves onto the new content
        let trailing = removed
            .last()
            .and_then(|&id| tree.get(id))
            .map(|el| el.tail.clone())
            .filter(|tail| is_blank(tail))
            .unwrap_or_default();

        let heading_el = tree.element_mut(heading)?;
        if !is_blank(&heading_el.tail) {
            heading_el.tail.clear();
        }
        for &id in &removed {
            tree.detach(id)?;
        }

        let mut warnings = Vec::new();
        let inserted = splice_fragment(
            &mut tree,
            ctx.parser,
            parent,
            heading,
            &self.new_content,
            &mut warnings,
        )?;

        if let Some(&last) = inserted.last() {
            let last_el = tree.element_mut(last)?;
            if !trailing.is_empty() && is_blank(&last_el.tail) {
                last_el.tail = trailing;
            }
        }

        tracing::debug!(
            "Replaced {} node(s) under '{}' with {} node(s)",
            removed.len(),
            section.heading.text,
            inserted.len()
        );

        let changes = vec![format!("Replaced content under heading '{}'", section.heading.text)];
        Ok(CommandResult::from_tree(&tree, changes).with_warnings(warnings))
    }
}

// =============================================================================
// InsertAfterHeading Command
// =============================================================================

/// Insert content immediately after a heading, before its existing content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertAfterHeading {
    pub heading: String,
    /// Storage-format markup to insert
    pub content: String,
    #[serde(default)]
    pub heading_level: Option<u8>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl InsertAfterHeading {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
            heading_level: None,
            case_sensitive: false,
        }
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = Some(level);
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }
}

impl Command for InsertAfterHeading {
    fn kind(&self) -> OperationKind {
        OperationKind::InsertAfterHeading
    }

    fn validate(&self) -> Result<()> {
        require_text("heading", &self.heading)?;
        require_text("content", &self.content)?;
        require_heading_level("heading_level", self.heading_level)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let section = resolve_section(
            ctx.structure,
            &self.heading,
            self.heading_level,
            self.case_sensitive,
        )?;
        let heading = section.heading.node;

        let mut tree = ctx.working_tree();
        let parent = heading_parent(&tree, &section.heading)?;

        // Text directly after the heading belongs after the inserted content
        let heading_el = tree.element_mut(heading)?;
        let layout_tail = is_blank(&heading_el.tail);
        let moved_tail = if layout_tail {
            heading_el.tail.clone()
        } else {
            std::mem::take(&mut heading_el.tail)
        };

        let mut warnings = Vec::new();
        let inserted = splice_fragment(
            &mut tree,
            ctx.parser,
            parent,
            heading,
            &self.content,
            &mut warnings,
        )?;

        match inserted.last() {
            Some(&last) => {
                let last_el = tree.element_mut(last)?;
                if !layout_tail {
                    last_el.tail.push_str(&moved_tail);
                } else if is_blank(&last_el.tail) {
                    last_el.tail = moved_tail;
                }
            }
            None if !layout_tail => tree.element_mut(heading)?.tail.push_str(&moved_tail),
            None => {}
        }

        let changes = vec![format!("Inserted content after heading '{}'", section.heading.text)];
        Ok(CommandResult::from_tree(&tree, changes).with_warnings(warnings))
    }
}

// =============================================================================
// UpdateSectionHeading Command
// =============================================================================

/// Change a heading's text and optionally its level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSectionHeading {
    pub old_heading: String,
    pub new_heading: String,
    /// New level; values outside 1 through 6 are ignored with a warning
    #[serde(default)]
    pub new_level: Option<u8>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl UpdateSectionHeading {
    pub fn new(old_heading: impl Into<String>, new_heading: impl Into<String>) -> Self {
        Self {
            old_heading: old_heading.into(),
            new_heading: new_heading.into(),
            new_level: None,
            case_sensitive: false,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.new_level = Some(level);
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }
}

impl Command for UpdateSectionHeading {
    fn kind(&self) -> OperationKind {
        OperationKind::UpdateSectionHeading
    }

    fn validate(&self) -> Result<()> {
        require_text("old_heading", &self.old_heading)?;
        require_text("new_heading", &self.new_heading)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let section = resolve_section(ctx.structure, &self.old_heading, None, self.case_sensitive)?;
        let heading = section.heading.node;
        let current = section.level();

        let mut tree = ctx.working_tree();
        tree.clear_content(heading)?;
        let el = tree.element_mut(heading)?;
        el.text = self.new_heading.clone();

        let mut changes = vec![format!(
            "Updated heading from '{}' to '{}'",
            section.heading.text, self.new_heading
        )];
        let mut warnings = Vec::new();

        match self.new_level {
            Some(level) if (1..=6).contains(&level) => {
                if level != current {
                    el.rename(&format!("h{}", level));
                    changes.push(format!("Changed heading level from {} to {}", current, level));
                }
            }
            Some(level) => {
                tracing::warn!("Ignoring heading level {} outside 1-6", level);
                warnings.push(format!(
                    "Invalid heading level {}, keeping original level {}",
                    level, current
                ));
            }
            None => {}
        }

        Ok(CommandResult::from_tree(&tree, changes).with_warnings(warnings))
    }
}

// =============================================================================
// Section Editor
// =============================================================================

/// Heading-addressed edits over storage-format content
#[derive(Debug, Clone, Default)]
pub struct SectionEditor {
    analyzer: StructureAnalyzer,
    config: EditorConfig,
}

impl SectionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            analyzer: analyzer_for(&config),
            config,
        }
    }

    pub fn replace_section(&self, content: &str, params: &ReplaceSection) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn insert_after_heading(&self, content: &str, params: &InsertAfterHeading) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn update_section_heading(
        &self,
        content: &str,
        params: &UpdateSectionHeading,
    ) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }
}

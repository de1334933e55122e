//! Page-level commands
//!
//! This module implements commands that add content at either end of a page:
//! - AppendToEnd: Add content after everything else
//! - PrependToBeginning: Add content before everything else
//!
//! The existing markup is kept byte for byte; only the new content is checked.

use crate::operation::require_text;
use crate::{
    analyzer_for, run_command, Command, CommandResult, EditContext, EditorConfig, OperationKind,
    OperationResult, Result,
};
use doc_model::{
    element_to_string, serialize, DocumentTree, Element, ParseMethod, StorageParser,
    StructureAnalyzer,
};
use serde::{Deserialize, Serialize};

/// Markup to place on the page for `content`.
///
/// Markup that only parses after repairs is written in its repaired form.
/// Anything unparseable becomes the escaped text of one paragraph.
fn page_markup(parser: &StorageParser, content: &str, warnings: &mut Vec<String>) -> String {
    match parser.parse_fragment(content) {
        Ok(fragment) if fragment.repaired => {
            warnings.extend(fragment.warnings.iter().cloned());
            serialize(&fragment, false)
        }
        Ok(_) => content.to_string(),
        Err(e) => {
            tracing::warn!("New content is not valid markup, adding it as a paragraph: {}", e);
            warnings.push(format!(
                "New content could not be parsed as markup and was added as text: {}",
                e
            ));
            let paragraph =
                DocumentTree::with_root(Element::new("p").with_text(content), ParseMethod::Direct);
            element_to_string(&paragraph, paragraph.root())
        }
    }
}

/// Join the page and the new markup, dropping the separator on a blank page
fn join(first: &str, separator: &str, second: &str) -> String {
    if first.trim().is_empty() {
        return second.to_string();
    }
    if second.trim().is_empty() {
        return first.to_string();
    }
    format!("{}{}{}", first, separator, second)
}

// =============================================================================
// AppendToEnd Command
// =============================================================================

/// Add content after the last node of the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendToEnd {
    /// Storage-format markup to add
    pub content: String,
    /// Written between the existing page and the new content
    #[serde(default)]
    pub separator: Option<String>,
}

impl AppendToEnd {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            separator: None,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    fn build(&self, page: &str, parser: &StorageParser) -> CommandResult {
        let mut warnings = Vec::new();
        let markup = page_markup(parser, &self.content, &mut warnings);
        let separator = self.separator.as_deref().unwrap_or_default();
        CommandResult {
            content: join(page, separator, &markup),
            changes: vec!["Appended content to end of page".to_string()],
            warnings,
        }
    }
}

impl Command for AppendToEnd {
    fn kind(&self) -> OperationKind {
        OperationKind::AppendToEnd
    }

    fn validate(&self) -> Result<()> {
        require_text("content", &self.content)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        Ok(self.build(ctx.content, ctx.parser))
    }

    fn apply_to_empty(&self, content: &str, parser: &StorageParser) -> Result<CommandResult> {
        Ok(self.build(content, parser))
    }
}

// =============================================================================
// PrependToBeginning Command
// =============================================================================

/// Add content before the first node of the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrependToBeginning {
    /// Storage-format markup to add
    pub content: String,
    /// Written between the new content and the existing page
    #[serde(default)]
    pub separator: Option<String>,
}

impl PrependToBeginning {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            separator: None,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    fn build(&self, page: &str, parser: &StorageParser) -> CommandResult {
        let mut warnings = Vec::new();
        let markup = page_markup(parser, &self.content, &mut warnings);
        let separator = self.separator.as_deref().unwrap_or_default();
        CommandResult {
            content: join(&markup, separator, page),
            changes: vec!["Prepended content to beginning of page".to_string()],
            warnings,
        }
    }
}

impl Command for PrependToBeginning {
    fn kind(&self) -> OperationKind {
        OperationKind::PrependToBeginning
    }

    fn validate(&self) -> Result<()> {
        require_text("content", &self.content)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        Ok(self.build(ctx.content, ctx.parser))
    }

    fn apply_to_empty(&self, content: &str, parser: &StorageParser) -> Result<CommandResult> {
        Ok(self.build(content, parser))
    }
}

// =============================================================================
// Page Editor
// =============================================================================

/// Whole-page additions over storage-format content
#[derive(Debug, Clone, Default)]
pub struct PageEditor {
    analyzer: StructureAnalyzer,
    config: EditorConfig,
}

impl PageEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            analyzer: analyzer_for(&config),
            config,
        }
    }

    pub fn append_to_end(&self, content: &str, params: &AppendToEnd) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn prepend_to_beginning(
        &self,
        content: &str,
        params: &PrependToBeginning,
    ) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }
}

//! Command system for storage-format editing
//!
//! Every edit kind is a parameter struct implementing [`Command`]. Running a
//! command always follows the same path: validate the parameters, analyze the
//! content, apply the edit to a clone of the analyzed tree, and serialize.
//! The analyzed tree itself is never mutated, so a failed edit leaves nothing
//! half-done.

use crate::{EditError, EditorConfig, OperationKind, OperationResult, Result};
use doc_model::{serialize, ContentStructure, DocumentTree, StorageParser, StructureAnalyzer};

/// What an edit produced
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The new markup
    pub content: String,
    /// Human-readable summary lines
    pub changes: Vec<String>,
    /// Advisory messages raised while editing
    pub warnings: Vec<String>,
}

impl CommandResult {
    /// Serialize an edited tree in the same shape it was parsed from
    pub fn from_tree(tree: &DocumentTree, changes: Vec<String>) -> Self {
        Self {
            content: serialize(tree, false),
            changes,
            warnings: Vec::new(),
        }
    }

    /// The input returned as is
    pub fn unchanged(content: &str, changes: Vec<String>) -> Self {
        Self {
            content: content.to_string(),
            changes,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Everything a command may read while applying itself
#[derive(Debug, Clone, Copy)]
pub struct EditContext<'a> {
    /// The input exactly as given
    pub content: &'a str,
    pub structure: &'a ContentStructure,
    /// Parser for fragments of new markup
    pub parser: &'a StorageParser,
    pub config: &'a EditorConfig,
}

impl<'a> EditContext<'a> {
    /// A private copy of the analyzed tree to mutate
    pub fn working_tree(&self) -> DocumentTree {
        self.structure.tree().clone()
    }
}

/// Trait for all editing commands
pub trait Command: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> OperationKind;

    /// Check parameters. Must not look at any content.
    fn validate(&self) -> Result<()>;

    /// Apply the edit. Implementations clone the analyzed tree before
    /// mutating it.
    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult>;

    /// Outcome for empty or whitespace-only content, which has no tree
    fn apply_to_empty(&self, _content: &str, _parser: &StorageParser) -> Result<CommandResult> {
        Err(EditError::Parse("Content is empty".to_string()))
    }
}

/// Analyzer whose parser follows the editor settings
pub fn analyzer_for(config: &EditorConfig) -> StructureAnalyzer {
    StructureAnalyzer::with_parser(StorageParser::with_config(config.parser.clone()))
}

/// Run a command against content and package the outcome
pub fn run_command(
    command: &dyn Command,
    content: &str,
    analyzer: &StructureAnalyzer,
    config: &EditorConfig,
) -> OperationResult {
    let kind = command.kind();

    if let Err(e) = command.validate() {
        tracing::error!("{} rejected: {}", kind, e);
        return OperationResult::failure(kind, content, &e);
    }

    if content.trim().is_empty() {
        return match command.apply_to_empty(content, analyzer.parser()) {
            Ok(result) => {
                OperationResult::success(kind, content, result.content, result.changes, result.warnings)
            }
            Err(e) => {
                tracing::error!("{} failed: {}", kind, e);
                OperationResult::failure(kind, content, &e)
            }
        };
    }

    let outcome = analyzer
        .analyze(content)
        .map_err(EditError::from)
        .and_then(|structure| {
            let ctx = EditContext {
                content,
                structure: &structure,
                parser: analyzer.parser(),
                config,
            };
            let mut result = command.apply(&ctx)?;
            let mut warnings = structure.warnings().to_vec();
            warnings.append(&mut result.warnings);
            result.warnings = warnings;
            Ok(result)
        });

    match outcome {
        Ok(result) => {
            tracing::debug!("{} succeeded: {}", kind, result.changes.join("; "));
            OperationResult::success(kind, content, result.content, result.changes, result.warnings)
        }
        Err(e) => {
            tracing::error!("{} failed: {}", kind, e);
            OperationResult::failure(kind, content, &e)
        }
    }
}

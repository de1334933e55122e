//! Find and replace over the text of storage-format content
//!
//! Substitution only ever touches text runs: the leading text and the tail of
//! each element. Tag names, attribute values and the text of macro
//! parameters are never rewritten.

use crate::operation::{require_cap, require_text};
use crate::{
    analyzer_for, run_command, Command, CommandResult, EditContext, EditError, EditorConfig,
    OperationKind, OperationResult, Result,
};
use doc_model::{
    serialize, DocumentTree, ElementKind, NodeId, ParseMethod, StorageParser, StructureAnalyzer,
};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Regex flag bits accepted in `regex_flags`
pub mod flags {
    pub const IGNORECASE: u32 = 2;
    pub const MULTILINE: u32 = 8;
    pub const DOTALL: u32 = 16;
    /// Unicode classes, word boundaries and case folding are always on; the
    /// bit is accepted and ignored
    pub const UNICODE: u32 = 32;
    pub const VERBOSE: u32 = 64;

    pub(crate) const SUPPORTED: u32 = IGNORECASE | MULTILINE | DOTALL | UNICODE | VERBOSE;
}

// =============================================================================
// Substitution engine
// =============================================================================

#[derive(Debug, Clone)]
enum Replacement {
    /// Inserted as written
    Literal(String),
    /// May reference capture groups as `$1` or `${name}`
    Template(String),
}

/// A compiled pattern with its replacement and optional cap
#[derive(Debug, Clone)]
pub struct Substitution {
    regex: Regex,
    replacement: Replacement,
    cap: Option<usize>,
}

impl Substitution {
    /// Match `pattern` literally
    pub fn literal(
        pattern: &str,
        replacement: &str,
        case_sensitive: bool,
        whole_words: bool,
        cap: Option<usize>,
    ) -> Result<Self> {
        let escaped = regex::escape(pattern);
        let source = if whole_words {
            format!(r"\b{}\b", escaped)
        } else {
            escaped
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| EditError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            regex,
            replacement: Replacement::Literal(replacement.to_string()),
            cap,
        })
    }

    /// Compile a regular expression. `replacement` may use `$1`, `${name}`,
    /// `\1` or `\g<name>` group references.
    pub fn regex(pattern: &str, replacement: &str, flag_bits: u32, cap: Option<usize>) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flag_bits & flags::IGNORECASE != 0)
            .multi_line(flag_bits & flags::MULTILINE != 0)
            .dot_matches_new_line(flag_bits & flags::DOTALL != 0)
            .ignore_whitespace(flag_bits & flags::VERBOSE != 0)
            .build()
            .map_err(|e| EditError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            regex,
            replacement: Replacement::Template(translate_replacement(replacement)),
            cap,
        })
    }

    pub fn count_in(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    /// Replace up to `budget` matches (all when `None`) in one string
    fn replace_in(&self, text: &str, budget: Option<usize>) -> Option<(String, usize)> {
        let found = self.count_in(text);
        let n = budget.map_or(found, |b| found.min(b));
        // replacen treats a limit of zero as unlimited
        if n == 0 {
            return None;
        }
        let replaced = match &self.replacement {
            Replacement::Literal(r) => self.regex.replacen(text, n, NoExpand(r.as_str())),
            Replacement::Template(t) => self.regex.replacen(text, n, t.as_str()),
        };
        Some((replaced.into_owned(), n))
    }

    fn remaining(&self, applied: usize) -> Option<usize> {
        self.cap.map(|cap| cap.saturating_sub(applied))
    }

    fn replace_field(&self, field: &mut String, applied: usize) -> usize {
        let budget = self.remaining(applied);
        if budget == Some(0) {
            return 0;
        }
        match self.replace_in(field, budget) {
            Some((replaced, n)) => {
                *field = replaced;
                n
            }
            None => 0,
        }
    }

    /// Substitute in every text run of the tree in document order, stopping
    /// once the cap is reached. Returns the number of substitutions made.
    pub fn apply_to_tree(&self, tree: &mut DocumentTree) -> Result<usize> {
        let order: Vec<NodeId> = tree.iter().map(|(id, _)| id).collect();
        let mut applied = 0;

        for id in order {
            let el = tree.element_mut(id)?;
            if !matches!(el.kind, ElementKind::MacroParameter) {
                let n = self.replace_field(&mut el.text, applied);
                applied += n;
            }
            let n = self.replace_field(&mut el.tail, applied);
            applied += n;

            if self.remaining(applied) == Some(0) {
                break;
            }
        }
        Ok(applied)
    }

    /// Substitute over a whole string with no regard for markup
    pub fn apply_to_raw(&self, text: &str) -> (String, usize) {
        self.replace_in(text, self.cap)
            .unwrap_or_else(|| (text.to_string(), 0))
    }
}

/// Rewrite `\1`, `\g<name>` and backslash escapes into `${..}` template
/// syntax. A `$` that does not start a group reference is kept literal.
pub fn translate_replacement(replacement: &str) -> String {
    let chars: Vec<char> = replacement.chars().collect();
    let mut out = String::with_capacity(replacement.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                let next = chars[i + 1];
                if next.is_ascii_digit() && next != '0' {
                    let mut end = i + 2;
                    if end < chars.len() && chars[end].is_ascii_digit() {
                        end += 1;
                    }
                    let group: String = chars[i + 1..end].iter().collect();
                    out.push_str(&format!("${{{}}}", group));
                    i = end;
                    continue;
                }
                if next == 'g' && chars.get(i + 2) == Some(&'<') {
                    if let Some(close) = chars[i + 3..].iter().position(|&c| c == '>') {
                        let name: String = chars[i + 3..i + 3 + close].iter().collect();
                        out.push_str(&format!("${{{}}}", name));
                        i += 4 + close;
                        continue;
                    }
                }
                match next {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '\\' => out.push('\\'),
                    '$' => out.push_str("$$"),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
                i += 2;
            }
            '$' => {
                match chars.get(i + 1) {
                    Some(&c) if c == '{' || c == '_' || c.is_ascii_alphanumeric() => out.push('$'),
                    _ => out.push_str("$$"),
                }
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Run a substitution against analyzed content and describe the outcome
fn substitute(
    ctx: &EditContext<'_>,
    substitution: &Substitution,
) -> Result<(String, usize, Vec<String>)> {
    let mut warnings = Vec::new();

    let (output, applied) = if ctx.structure.tree().method == ParseMethod::TextFallback {
        if !ctx.config.raw_text_fallback {
            return Err(EditError::Parse(
                "Content could not be parsed as markup and raw text substitution is disabled"
                    .to_string(),
            ));
        }
        tracing::warn!("Markup could not be parsed, substituting over raw text");
        warnings.push("Markup could not be parsed; substitution was applied to the raw text".to_string());
        substitution.apply_to_raw(ctx.content)
    } else {
        let mut tree = ctx.working_tree();
        let applied = substitution.apply_to_tree(&mut tree)?;
        if applied == 0 {
            (ctx.content.to_string(), 0)
        } else {
            (serialize(&tree, false), applied)
        }
    };

    // Net change in occurrences, which can undercount when the replacement
    // itself contains the pattern
    let before = substitution.count_in(ctx.content);
    let after = substitution.count_in(&output);
    let mut reported = before.saturating_sub(after);
    if let Some(cap) = substitution.cap {
        reported = reported.min(cap);
    }

    tracing::debug!("Applied {} substitution(s), reporting {}", applied, reported);
    Ok((output, reported, warnings))
}

// =============================================================================
// ReplaceTextPattern Command
// =============================================================================

/// Replace literal text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceTextPattern {
    pub search_pattern: String,
    /// Inserted literally; may be empty
    pub replacement: String,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub whole_words_only: bool,
    #[serde(default)]
    pub max_replacements: Option<usize>,
}

fn default_case_sensitive() -> bool {
    true
}

impl ReplaceTextPattern {
    pub fn new(search_pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            search_pattern: search_pattern.into(),
            replacement: replacement.into(),
            case_sensitive: true,
            whole_words_only: false,
            max_replacements: None,
        }
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    pub fn whole_word(mut self, value: bool) -> Self {
        self.whole_words_only = value;
        self
    }

    pub fn with_max_replacements(mut self, max: usize) -> Self {
        self.max_replacements = Some(max);
        self
    }

    fn no_match_message(&self) -> String {
        format!("No occurrences of '{}' found", self.search_pattern)
    }
}

impl Command for ReplaceTextPattern {
    fn kind(&self) -> OperationKind {
        OperationKind::ReplaceTextPattern
    }

    fn validate(&self) -> Result<()> {
        if self.search_pattern.is_empty() {
            return Err(EditError::Validation("search_pattern must not be empty".to_string()));
        }
        require_cap(self.max_replacements)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let substitution = Substitution::literal(
            &self.search_pattern,
            &self.replacement,
            self.case_sensitive,
            self.whole_words_only,
            self.max_replacements,
        )?;
        let (content, count, warnings) = substitute(ctx, &substitution)?;

        let change = if count > 0 {
            format!(
                "Replaced {} occurrence(s) of '{}' with '{}'",
                count, self.search_pattern, self.replacement
            )
        } else {
            self.no_match_message()
        };
        Ok(CommandResult {
            content,
            changes: vec![change],
            warnings,
        })
    }

    fn apply_to_empty(&self, content: &str, _parser: &StorageParser) -> Result<CommandResult> {
        Ok(CommandResult::unchanged(content, vec![self.no_match_message()]))
    }
}

// =============================================================================
// ReplaceRegexPattern Command
// =============================================================================

/// Replace matches of a regular expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRegexPattern {
    pub regex_pattern: String,
    pub replacement: String,
    /// Bit set of [`flags`]
    #[serde(default)]
    pub regex_flags: u32,
    #[serde(default)]
    pub max_replacements: Option<usize>,
}

impl ReplaceRegexPattern {
    pub fn new(regex_pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            regex_pattern: regex_pattern.into(),
            replacement: replacement.into(),
            regex_flags: 0,
            max_replacements: None,
        }
    }

    pub fn with_flags(mut self, flag_bits: u32) -> Self {
        self.regex_flags = flag_bits;
        self
    }

    pub fn with_max_replacements(mut self, max: usize) -> Self {
        self.max_replacements = Some(max);
        self
    }

    fn no_match_message(&self) -> String {
        format!("No matches found for regex pattern '{}'", self.regex_pattern)
    }
}

impl Command for ReplaceRegexPattern {
    fn kind(&self) -> OperationKind {
        OperationKind::ReplaceRegexPattern
    }

    fn validate(&self) -> Result<()> {
        require_text("regex_pattern", &self.regex_pattern)?;
        require_cap(self.max_replacements)
    }

    fn apply(&self, ctx: &EditContext<'_>) -> Result<CommandResult> {
        let substitution = Substitution::regex(
            &self.regex_pattern,
            &self.replacement,
            self.regex_flags,
            self.max_replacements,
        )?;
        let (content, count, mut warnings) = substitute(ctx, &substitution)?;

        let unsupported = self.regex_flags & !flags::SUPPORTED;
        if unsupported != 0 {
            warnings.push(format!("Ignoring unsupported regex flags: {}", unsupported));
        }

        let change = if count > 0 {
            format!(
                "Replaced {} occurrence(s) matching regex pattern '{}'",
                count, self.regex_pattern
            )
        } else {
            self.no_match_message()
        };
        Ok(CommandResult {
            content,
            changes: vec![change],
            warnings,
        })
    }

    fn apply_to_empty(&self, content: &str, _parser: &StorageParser) -> Result<CommandResult> {
        Substitution::regex(&self.regex_pattern, &self.replacement, self.regex_flags, None)?;
        Ok(CommandResult::unchanged(content, vec![self.no_match_message()]))
    }
}

// =============================================================================
// Pattern Editor
// =============================================================================

/// Literal and regular expression replacement over storage-format content
#[derive(Debug, Clone, Default)]
pub struct PatternEditor {
    analyzer: StructureAnalyzer,
    config: EditorConfig,
}

impl PatternEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            analyzer: analyzer_for(&config),
            config,
        }
    }

    pub fn replace_text_pattern(&self, content: &str, params: &ReplaceTextPattern) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }

    pub fn replace_regex_pattern(
        &self,
        content: &str,
        params: &ReplaceRegexPattern,
    ) -> OperationResult {
        run_command(params, content, &self.analyzer, &self.config)
    }
}

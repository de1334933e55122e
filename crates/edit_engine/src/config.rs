//! Editor configuration

use doc_model::ParserConfig;
use serde::{Deserialize, Serialize};

/// Settings shared by every editor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub parser: ParserConfig,
    /// Reject list reorders that are not a permutation of the current items
    pub strict_reorder: bool,
    /// Substitute over the raw string when markup cannot be parsed at all
    pub raw_text_fallback: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            strict_reorder: false,
            raw_text_fallback: true,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_strict_reorder(mut self, enabled: bool) -> Self {
        self.strict_reorder = enabled;
        self
    }

    pub fn with_raw_text_fallback(mut self, enabled: bool) -> Self {
        self.raw_text_fallback = enabled;
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse editor settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

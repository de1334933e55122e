//! Parser configuration

use serde::{Deserialize, Serialize};

/// Settings controlling parsing and advisory validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Run depth, size and macro checks after a successful parse
    pub validate_on_parse: bool,
    /// Nesting depth above which a warning is recorded
    pub max_depth: usize,
    /// Element count above which a warning is recorded
    pub max_elements: usize,
    /// Retry once with heuristic repairs before falling back to text
    pub repair_markup: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validate_on_parse: true,
            max_depth: 20,
            max_elements: 10_000,
            repair_markup: true,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_on_parse = enabled;
        self
    }

    pub fn with_limits(mut self, max_depth: usize, max_elements: usize) -> Self {
        self.max_depth = max_depth;
        self.max_elements = max_elements;
        self
    }

    pub fn with_repair(mut self, enabled: bool) -> Self {
        self.repair_markup = enabled;
        self
    }
}

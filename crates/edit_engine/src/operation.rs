//! Operation model
//!
//! An [`Operation`] is one edit request: a kind plus its parameters. It is
//! exchanged as JSON with an `operation_type` tag, for example
//! `{"operation_type": "replace_section", "heading": "Intro", "new_content": "<p>x</p>"}`.

use crate::{
    AddListItem, AddTableRow, AppendToEnd, Command, InsertAfterHeading, PrependToBeginning,
    ReorderListItems, ReplaceRegexPattern, ReplaceSection, ReplaceTextPattern, Result,
    UpdateListItem, UpdateSectionHeading, UpdateTableCell, UpdateTableColumn,
};
use serde::{Deserialize, Serialize};

/// Edit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    AppendToEnd,
    PrependToBeginning,
    ReplaceSection,
    InsertAfterHeading,
    UpdateSectionHeading,
    ReplaceTextPattern,
    ReplaceRegexPattern,
    UpdateTableCell,
    AddTableRow,
    UpdateTableColumn,
    AddListItem,
    UpdateListItem,
    ReorderListItems,
    /// Label for a request whose `operation_type` is missing or not
    /// recognized. Never produced by an [`Operation`].
    #[serde(other)]
    Unknown,
}

impl OperationKind {
    /// Every kind an [`Operation`] can have
    pub const ALL: [OperationKind; 13] = [
        OperationKind::AppendToEnd,
        OperationKind::PrependToBeginning,
        OperationKind::ReplaceSection,
        OperationKind::InsertAfterHeading,
        OperationKind::UpdateSectionHeading,
        OperationKind::ReplaceTextPattern,
        OperationKind::ReplaceRegexPattern,
        OperationKind::UpdateTableCell,
        OperationKind::AddTableRow,
        OperationKind::UpdateTableColumn,
        OperationKind::AddListItem,
        OperationKind::UpdateListItem,
        OperationKind::ReorderListItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::AppendToEnd => "append_to_end",
            OperationKind::PrependToBeginning => "prepend_to_beginning",
            OperationKind::ReplaceSection => "replace_section",
            OperationKind::InsertAfterHeading => "insert_after_heading",
            OperationKind::UpdateSectionHeading => "update_section_heading",
            OperationKind::ReplaceTextPattern => "replace_text_pattern",
            OperationKind::ReplaceRegexPattern => "replace_regex_pattern",
            OperationKind::UpdateTableCell => "update_table_cell",
            OperationKind::AddTableRow => "add_table_row",
            OperationKind::UpdateTableColumn => "update_table_column",
            OperationKind::AddListItem => "add_list_item",
            OperationKind::UpdateListItem => "update_list_item",
            OperationKind::ReorderListItems => "reorder_list_items",
            OperationKind::Unknown => "unknown",
        }
    }

    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            OperationKind::AppendToEnd | OperationKind::PrependToBeginning => &["content"],
            OperationKind::ReplaceSection => &["heading", "new_content"],
            OperationKind::InsertAfterHeading => &["heading", "content"],
            OperationKind::UpdateSectionHeading => &["old_heading", "new_heading"],
            OperationKind::ReplaceTextPattern => &["search_pattern", "replacement"],
            OperationKind::ReplaceRegexPattern => &["regex_pattern", "replacement"],
            OperationKind::UpdateTableCell => {
                &["table_index", "row_index", "column_index", "new_content"]
            }
            OperationKind::AddTableRow => &["table_index", "row_data"],
            OperationKind::UpdateTableColumn => &["table_index", "column_index", "column_data"],
            OperationKind::AddListItem => &["list_index", "item_content"],
            OperationKind::UpdateListItem => &["list_index", "item_index", "new_content"],
            OperationKind::ReorderListItems => &["list_index", "new_order"],
            OperationKind::Unknown => &[],
        }
    }

    pub fn optional_parameters(&self) -> &'static [&'static str] {
        match self {
            OperationKind::AppendToEnd | OperationKind::PrependToBeginning => &["separator"],
            OperationKind::ReplaceSection => {
                &["heading_level", "case_sensitive", "include_subsections"]
            }
            OperationKind::InsertAfterHeading => &["heading_level", "case_sensitive"],
            OperationKind::UpdateSectionHeading => &["new_level", "case_sensitive"],
            OperationKind::ReplaceTextPattern => {
                &["case_sensitive", "whole_words_only", "max_replacements"]
            }
            OperationKind::ReplaceRegexPattern => &["regex_flags", "max_replacements"],
            OperationKind::AddTableRow | OperationKind::AddListItem => &["insert_position"],
            OperationKind::UpdateTableCell
            | OperationKind::UpdateTableColumn
            | OperationKind::UpdateListItem
            | OperationKind::ReorderListItems
            | OperationKind::Unknown => &[],
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = crate::EditError;

    fn from_str(s: &str) -> Result<Self> {
        OperationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::EditError::Validation(format!("Unknown operation type: {}", s)))
    }
}

/// A single edit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation_type", rename_all = "snake_case")]
pub enum Operation {
    AppendToEnd(AppendToEnd),
    PrependToBeginning(PrependToBeginning),
    ReplaceSection(ReplaceSection),
    InsertAfterHeading(InsertAfterHeading),
    UpdateSectionHeading(UpdateSectionHeading),
    ReplaceTextPattern(ReplaceTextPattern),
    ReplaceRegexPattern(ReplaceRegexPattern),
    UpdateTableCell(UpdateTableCell),
    AddTableRow(AddTableRow),
    UpdateTableColumn(UpdateTableColumn),
    AddListItem(AddListItem),
    UpdateListItem(UpdateListItem),
    ReorderListItems(ReorderListItems),
}

impl Operation {
    /// Parse an operation from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::EditError::Validation(format!("Malformed operation: {}", e)))
    }

    pub fn command(&self) -> &dyn Command {
        match self {
            Operation::AppendToEnd(op) => op,
            Operation::PrependToBeginning(op) => op,
            Operation::ReplaceSection(op) => op,
            Operation::InsertAfterHeading(op) => op,
            Operation::UpdateSectionHeading(op) => op,
            Operation::ReplaceTextPattern(op) => op,
            Operation::ReplaceRegexPattern(op) => op,
            Operation::UpdateTableCell(op) => op,
            Operation::AddTableRow(op) => op,
            Operation::UpdateTableColumn(op) => op,
            Operation::AddListItem(op) => op,
            Operation::UpdateListItem(op) => op,
            Operation::ReorderListItems(op) => op,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.command().kind()
    }

    /// Check parameters without touching any content
    pub fn validate(&self) -> Result<()> {
        self.command().validate()
    }

    pub fn required_parameters(&self) -> &'static [&'static str] {
        self.kind().required_parameters()
    }

    pub fn optional_parameters(&self) -> &'static [&'static str] {
        self.kind().optional_parameters()
    }
}

macro_rules! impl_from_params {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Operation {
                fn from(op: $variant) -> Self {
                    Operation::$variant(op)
                }
            }
        )*
    };
}

impl_from_params!(
    AppendToEnd,
    PrependToBeginning,
    ReplaceSection,
    InsertAfterHeading,
    UpdateSectionHeading,
    ReplaceTextPattern,
    ReplaceRegexPattern,
    UpdateTableCell,
    AddTableRow,
    UpdateTableColumn,
    AddListItem,
    UpdateListItem,
    ReorderListItems,
);

/// Reject an empty or whitespace-only required string
pub(crate) fn require_text(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(crate::EditError::Validation(format!("{} must not be empty", name)));
    }
    Ok(())
}

pub(crate) fn require_non_empty<T>(name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(crate::EditError::Validation(format!("{} must not be empty", name)));
    }
    Ok(())
}

pub(crate) fn require_heading_level(name: &str, level: Option<u8>) -> Result<()> {
    match level {
        Some(l) if !(1..=6).contains(&l) => Err(crate::EditError::Validation(format!(
            "{} must be between 1 and 6, got {}",
            name, l
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn require_cap(max_replacements: Option<usize>) -> Result<()> {
    if max_replacements == Some(0) {
        return Err(crate::EditError::Validation(
            "max_replacements must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!("delete_page".parse::<OperationKind>().is_err());
        assert!("unknown".parse::<OperationKind>().is_err());
        assert!(!OperationKind::ALL.contains(&OperationKind::Unknown));
    }

    #[test]
    fn test_unrecognized_kind_deserializes_as_unknown() {
        let kind: OperationKind = serde_json::from_str("\"delete_page\"").unwrap();
        assert_eq!(kind, OperationKind::Unknown);
        assert_eq!(kind.to_string(), "unknown");
    }

    #[test]
    fn test_page_operations_from_json() {
        let op = Operation::from_json(
            r#"{"operation_type": "append_to_end", "content": "<p>x</p>", "separator": "\n"}"#,
        )
        .unwrap();
        assert_eq!(op.kind(), OperationKind::AppendToEnd);
        assert_eq!(op, Operation::from(AppendToEnd::new("<p>x</p>").with_separator("\n")));
        assert_eq!(op.required_parameters(), &["content"]);
        assert_eq!(op.optional_parameters(), &["separator"]);

        let op = Operation::from_json(r#"{"operation_type": "prepend_to_beginning", "content": "<p>y</p>"}"#)
            .unwrap();
        assert_eq!(op, Operation::from(PrependToBeginning::new("<p>y</p>")));
    }

    #[test]
    fn test_parameter_tables() {
        assert_eq!(
            OperationKind::UpdateTableCell.required_parameters(),
            &["table_index", "row_index", "column_index", "new_content"]
        );
        assert!(OperationKind::ReplaceTextPattern
            .optional_parameters()
            .contains(&"whole_words_only"));
        assert!(OperationKind::ReorderListItems.optional_parameters().is_empty());
    }

    #[test]
    fn test_operation_from_json_defaults() {
        let op = Operation::from_json(
            r#"{"operation_type": "replace_text_pattern", "search_pattern": "foo", "replacement": "bar"}"#,
        )
        .unwrap();
        assert_eq!(op.kind(), OperationKind::ReplaceTextPattern);
        match op {
            Operation::ReplaceTextPattern(p) => {
                assert!(p.case_sensitive);
                assert!(!p.whole_words_only);
                assert_eq!(p.max_replacements, None);
            }
            other => panic!("unexpected operation {:?}", other),
        }
    }

    #[test]
    fn test_operation_json_tag() {
        let op = Operation::from(ReorderListItems::new(0, vec![1, 0]));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["operation_type"], "reorder_list_items");
        assert_eq!(json["new_order"], serde_json::json!([1, 0]));
    }

    #[test]
    fn test_malformed_operation() {
        let err = Operation::from_json(r#"{"operation_type": "replace_section"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_validation_rules() {
        assert!(Operation::from(ReplaceSection::new("", "<p>x</p>")).validate().is_err());
        assert!(Operation::from(ReplaceSection::new("A", "<p>x</p>").with_heading_level(7))
            .validate()
            .is_err());
        assert!(Operation::from(ReplaceTextPattern::new("a", "").with_max_replacements(0))
            .validate()
            .is_err());
        assert!(Operation::from(ReplaceTextPattern::new("a", "")).validate().is_ok());
        assert!(Operation::from(UpdateTableCell::new(0, 0, 0, "")).validate().is_ok());
        assert!(Operation::from(AddTableRow::new(0, vec![])).validate().is_err());
        assert!(Operation::from(ReorderListItems::new(0, vec![])).validate().is_err());
        assert!(Operation::from(AppendToEnd::new("")).validate().is_err());
        assert!(Operation::from(PrependToBeginning::new("<p>x</p>")).validate().is_ok());
    }
}

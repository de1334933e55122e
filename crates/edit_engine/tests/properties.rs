//! Property tests for editing invariants

use edit_engine::{
    AppendToEnd, EditExecutor, Operation, PatternEditor, PrependToBeginning, ReplaceRegexPattern,
    ReplaceSection, ReplaceTextPattern, UpdateListItem, UpdateTableCell,
};
use proptest::prelude::*;

/// Lowercase words without the letters used as search and replacement
fn word() -> impl Strategy<Value = String> {
    "[a-wy]{1,6}"
}

/// Paragraph markup with a varying number of `x` tokens between words
fn paragraphs() -> impl Strategy<Value = (String, usize)> {
    paragraphs_of(word(), "x")
}

/// Paragraph markup with a varying number of `token`s after each word
fn paragraphs_of(
    words: impl Strategy<Value = String>,
    token: &'static str,
) -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec((words, 0usize..4), 1..6).prop_map(move |parts| {
        let mut total = 0;
        let body: String = parts
            .iter()
            .map(|(w, n)| {
                total += n;
                let tokens = vec![token; *n].join(" ");
                format!("<p>{} {}</p>", w, tokens)
            })
            .collect();
        (body, total)
    })
}

fn any_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (word(), word()).prop_map(|(h, c)| Operation::from(ReplaceSection::new(h, format!("<p>{}</p>", c)))),
        (word(), word()).prop_map(|(p, r)| Operation::from(ReplaceTextPattern::new(p, r))),
        ("[a-z(\\[]{1,4}", word()).prop_map(|(p, r)| Operation::from(ReplaceRegexPattern::new(p, r))),
        (0usize..3, 0usize..3, 0usize..3, word())
            .prop_map(|(t, r, c, v)| Operation::from(UpdateTableCell::new(t, r, c, v))),
        (0usize..3, 0usize..3, word()).prop_map(|(l, i, v)| Operation::from(UpdateListItem::new(l, i, v))),
        word().prop_map(|c| Operation::from(AppendToEnd::new(format!("<p>{}</p>", c)))),
        word().prop_map(|c| Operation::from(PrependToBeginning::new(c))),
    ]
}

fn any_content() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("<p>unterminated<div>".to_string()),
        Just("<h1>abc</h1><p>abc</p><table><tr><td>abc</td></tr></table>".to_string()),
        Just("<ul><li>a</li><li>b</li></ul>".to_string()),
        paragraphs().prop_map(|(body, _)| body),
    ]
}

proptest! {
    #[test]
    fn cap_is_never_exceeded((content, total) in paragraphs(), cap in 1usize..5) {
        let result = PatternEditor::new().replace_text_pattern(
            &content,
            &ReplaceTextPattern::new("x", "z").with_max_replacements(cap),
        );
        prop_assert!(result.success);
        let applied = result.content().matches('z').count();
        prop_assert_eq!(applied, total.min(cap));
        prop_assert_eq!(result.content().matches('x').count(), total - applied);
    }

    #[test]
    fn regex_cap_is_never_exceeded((content, total) in paragraphs(), cap in 1usize..5) {
        let result = PatternEditor::new().replace_regex_pattern(
            &content,
            &ReplaceRegexPattern::new(r"\bx\b", "z").with_max_replacements(cap),
        );
        prop_assert!(result.success);
        prop_assert!(result.content().matches('z').count() <= cap);
        prop_assert_eq!(result.content().matches('z').count(), total.min(cap));
    }

    #[test]
    fn accented_tokens_fold_and_stay_whole(
        (content, total) in paragraphs_of("[a-wyéèà]{1,6}", "ÉÇÀ"),
        cap in 1usize..5,
    ) {
        let params = ReplaceTextPattern::new("éçà", "z")
            .case_sensitive(false)
            .whole_word(true)
            .with_max_replacements(cap);
        let result = PatternEditor::new().replace_text_pattern(&content, &params);
        prop_assert!(result.success);
        let applied = result.content().matches('z').count();
        prop_assert_eq!(applied, total.min(cap));
        prop_assert_eq!(result.content().matches("ÉÇÀ").count(), total - applied);
    }

    #[test]
    fn accented_suffix_blocks_whole_word_match(stem in "[a-w]{1,4}", suffix in "[éïü]{1,2}") {
        let content = format!("<p>{0}{1} {1}{0}</p>", stem, suffix);
        let params = ReplaceTextPattern::new(stem.as_str(), "z").whole_word(true);
        let result = PatternEditor::new().replace_text_pattern(&content, &params);
        prop_assert_eq!(result.content(), content.as_str());
    }

    #[test]
    fn backup_always_equals_input(content in any_content(), op in any_operation()) {
        let result = EditExecutor::new().execute(&content, &op);
        prop_assert_eq!(&result.backup_content, &content);
        prop_assert_eq!(result.operation_type, op.kind());
        prop_assert_eq!(result.new_content.is_some(), result.success);
        prop_assert_eq!(result.error_message.is_some(), !result.success);
    }
}

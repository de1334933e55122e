//! Parse and serialize round trips

use doc_model::{serialize, ParseMethod, StorageParser, StructureAnalyzer};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Block {
    Heading(u8, String),
    Paragraph(String),
    Macro(String),
    List(Vec<String>),
}

impl Block {
    fn markup(&self) -> String {
        match self {
            Block::Heading(level, text) => format!("<h{0}>{1}</h{0}>", level, text),
            Block::Paragraph(text) => format!("<p>{}</p>", text),
            Block::Macro(name) => format!(
                r#"<ac:structured-macro ac:name="{}"><ac:parameter ac:name="title">t</ac:parameter></ac:structured-macro>"#,
                name
            ),
            Block::List(items) => format!(
                "<ul>{}</ul>",
                items.iter().map(|i| format!("<li>{}</li>", i)).collect::<String>()
            ),
        }
    }
}

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 &<>]{1,12}".prop_map(|s| {
        s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    })
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (1u8..=6, text()).prop_map(|(l, t)| Block::Heading(l, t)),
        text().prop_map(Block::Paragraph),
        "[a-z]{1,8}".prop_map(Block::Macro),
        prop::collection::vec(text(), 1..4).prop_map(Block::List),
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(block(), 1..8)
        .prop_map(|blocks| blocks.iter().map(Block::markup).collect::<Vec<_>>().join("\n"))
}

fn heading_sequence(content: &str) -> Vec<(u8, String)> {
    StructureAnalyzer::new()
        .analyze(content)
        .unwrap()
        .headings
        .into_iter()
        .map(|h| (h.level, h.text))
        .collect()
}

proptest! {
    #[test]
    fn serialized_output_reparses_with_same_headings(content in document()) {
        let parser = StorageParser::new();
        let tree = parser.parse(&content).unwrap();
        prop_assert_ne!(tree.method, ParseMethod::TextFallback);

        let out = serialize(&tree, false);
        let again = parser.parse(&out).unwrap();
        prop_assert_ne!(again.method, ParseMethod::TextFallback);
        prop_assert_eq!(heading_sequence(&out), heading_sequence(&content));
    }

    #[test]
    fn serialization_is_stable(content in document()) {
        let parser = StorageParser::new();
        let once = serialize(&parser.parse(&content).unwrap(), false);
        let twice = serialize(&parser.parse(&once).unwrap(), false);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn parse_never_fails_on_non_empty_input(content in "\\PC{1,40}") {
        prop_assume!(!content.trim().is_empty());
        prop_assert!(StorageParser::new().parse(&content).is_ok());
    }
}

#[test]
fn whole_document_round_trip() {
    let content = concat!(
        "<h1>Release</h1>\n",
        r#"<ac:layout><ac:layout-section ac:type="two_equal"><ac:layout-cell><p>left</p></ac:layout-cell>"#,
        r#"<ac:layout-cell><ac:image><ri:attachment ri:filename="a.png"/></ac:image></ac:layout-cell></ac:layout-section></ac:layout>"#,
        "\n<table><tbody><tr><th>k</th><td>v &amp; w</td></tr></tbody></table>",
    );
    let tree = StorageParser::new().parse(content).unwrap();
    assert_eq!(tree.method, ParseMethod::Wrapped);
    assert_eq!(serialize(&tree, false), content);
}

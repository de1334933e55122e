//! Storage-format markup parser
//!
//! Parsing never fails on non-empty input. It is a chain of attempts:
//! - parse the content as written (wrapping multiple top-level nodes)
//! - parse again after heuristic repairs of common HTML-isms
//! - keep the whole input as text inside one flagged `div`
//!
//! Named HTML entities such as `&nbsp;` are resolved while reading.

use crate::{
    element_to_string, DocModelError, DocumentTree, Element, ElementKind, KnownNamespace, NodeId,
    ParseMethod, ParserConfig, Result,
};
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex_lite::{Captures, Regex};

/// Attribute marking the text-fallback container
pub const FALLBACK_ATTRIBUTE: &str = "data-parse-method";
pub const FALLBACK_VALUE: &str = "text-fallback";

/// Warning recorded when the input could not be parsed at all
pub const FALLBACK_WARNING: &str = "XML parsing failed, using text fallback";

/// Parser for storage-format page bodies
#[derive(Debug, Clone, Default)]
pub struct StorageParser {
    config: ParserConfig,
}

impl StorageParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a page body.
    ///
    /// Only empty or whitespace-only input is an error; anything else yields
    /// a tree, at worst a [`ParseMethod::TextFallback`] one.
    pub fn parse(&self, content: &str) -> Result<DocumentTree> {
        if content.trim().is_empty() {
            return Err(DocModelError::EmptyContent);
        }

        let mut tree = match self.parse_markup(content) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Markup parsing failed even after repairs: {}", e);
                text_fallback(content)
            }
        };
        tree.namespaces = KnownNamespace::detect(content);

        if self.config.validate_on_parse && tree.method != ParseMethod::TextFallback {
            self.validate(&mut tree);
        }
        Ok(tree)
    }

    /// Parse caller-supplied markup meant to be spliced into a document.
    ///
    /// Unlike [`parse`](Self::parse) this reports failure instead of falling
    /// back to text.
    pub fn parse_fragment(&self, content: &str) -> Result<DocumentTree> {
        if content.trim().is_empty() {
            return Err(DocModelError::EmptyContent);
        }
        let mut tree = self.parse_markup(content)?;
        tree.namespaces = KnownNamespace::detect(content);
        Ok(tree)
    }

    fn parse_markup(&self, content: &str) -> Result<DocumentTree> {
        match build_tree(content) {
            Ok(tree) => Ok(tree),
            Err(first) if self.config.repair_markup => {
                tracing::warn!("Initial markup parsing failed, retrying with repairs: {}", first);
                let repaired = repair_markup(content);
                let mut tree = build_tree(&repaired)?;
                tree.repaired = true;
                tree.warnings.push(format!("Markup repaired before parsing: {}", first));
                Ok(tree)
            }
            Err(e) => Err(e),
        }
    }

    fn validate(&self, tree: &mut DocumentTree) {
        let depth = tree.max_depth();
        if depth > self.config.max_depth {
            tree.warnings.push(format!("Very deep nesting detected: {} levels", depth));
        }

        let count = tree.element_count();
        if count > self.config.max_elements {
            tree.warnings.push(format!("Very large number of elements: {}", count));
        }

        let unnamed: Vec<NodeId> = tree
            .iter()
            .filter(|(_, e)| e.kind == ElementKind::Macro && e.macro_name().is_none())
            .map(|(id, _)| id)
            .collect();
        for id in unnamed {
            let markup: String = element_to_string(tree, id).chars().take(100).collect();
            tree.warnings.push(format!("Macro missing name attribute: {}...", markup));
        }
    }
}

// =============================================================================
// Tree building
// =============================================================================

fn build_tree(content: &str) -> Result<DocumentTree> {
    let mut tree = DocumentTree::with_root(Element::synthetic("root"), ParseMethod::Wrapped);
    let container = tree.root();
    let mut stack = vec![container];

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    loop {
        let current = *stack.last().unwrap_or(&container);
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = tree.create(open_element(&e)?);
                tree.append_child(current, id)?;
                stack.push(id);
            }
            Ok(Event::Empty(e)) => {
                let mut element = open_element(&e)?;
                element.self_closing = true;
                let id = tree.create(element);
                tree.append_child(current, id)?;
            }
            Ok(Event::End(e)) => {
                let name = decode(e.name().as_ref())?;
                if stack.len() <= 1 {
                    return Err(DocModelError::XmlParse(format!("unmatched end tag </{}>", name)));
                }
                let open = tree.element(current)?.tag();
                if open != name {
                    return Err(DocModelError::XmlParse(format!(
                        "expected </{}>, found </{}>",
                        open, name
                    )));
                }
                stack.pop();
            }
            Ok(Event::Text(e)) => {
                let raw = decode(&e[..])?;
                push_text(&mut tree, current, &unescape(&raw)?, false)?;
            }
            Ok(Event::CData(e)) => {
                let raw = decode(&e[..])?;
                push_text(&mut tree, current, &raw, true)?;
            }
            Ok(Event::Eof) => break,
            // Comments, processing instructions, declarations and doctypes
            // carry nothing the editors address
            Ok(_) => {}
            Err(e) => {
                return Err(DocModelError::XmlParse(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    if stack.len() > 1 {
        let open = tree.element(stack[stack.len() - 1])?.tag();
        return Err(DocModelError::XmlParse(format!("unclosed element <{}>", open)));
    }

    promote_single_root(&mut tree)?;
    Ok(tree)
}

/// Drop the synthetic wrapper when the input had exactly one root element
fn promote_single_root(tree: &mut DocumentTree) -> Result<()> {
    let container = tree.root();
    let (leading, children) = {
        let el = tree.element(container)?;
        (el.text.clone(), el.children().to_vec())
    };
    if children.len() != 1 || !leading.trim().is_empty() {
        return Ok(());
    }
    let only = children[0];
    if !tree.element(only)?.tail.trim().is_empty() {
        return Ok(());
    }
    tree.set_root(only)?;
    tree.leading_text = leading;
    tree.method = ParseMethod::Direct;
    Ok(())
}

fn open_element(start: &BytesStart) -> Result<Element> {
    let name = decode(start.name().as_ref())?;
    let mut element = Element::new(&name);
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| DocModelError::XmlParse(format!("bad attribute in <{}>: {}", name, e)))?;
        let key = decode(attr.key.as_ref())?;
        let value = unescape(&decode(&attr.value)?)?;
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Route text to the leading run of `parent`, or the tail of its last child
fn push_text(tree: &mut DocumentTree, parent: NodeId, text: &str, cdata: bool) -> Result<()> {
    match tree.children(parent).last().copied() {
        Some(last) => tree.element_mut(last)?.tail.push_str(text),
        None => {
            let el = tree.element_mut(parent)?;
            el.text.push_str(text);
            el.cdata |= cdata;
        }
    }
    Ok(())
}

fn decode(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| DocModelError::XmlParse(format!("invalid UTF-8: {}", e)))
}

fn unescape(raw: &str) -> Result<String> {
    unescape_with(raw, resolve_html5_entity)
        .map(|text| text.into_owned())
        .map_err(|e| DocModelError::XmlParse(e.to_string()))
}

fn text_fallback(content: &str) -> DocumentTree {
    let root = Element::synthetic("div")
        .with_attribute(FALLBACK_ATTRIBUTE, FALLBACK_VALUE)
        .with_text(content);
    let mut tree = DocumentTree::with_root(root, ParseMethod::TextFallback);
    tree.warnings.push(FALLBACK_WARNING.to_string());
    tree
}

// =============================================================================
// Repairs
// =============================================================================

/// Apply heuristic fixes for markup that is valid HTML but not well-formed:
/// unclosed void elements, bare ampersands and unquoted attribute values
pub fn repair_markup(content: &str) -> String {
    let void_closer = Regex::new(r"</(?i:br|hr|img|col|input|wbr)\s*>").ok();
    let void_opener = Regex::new(r"<((?i:br|hr|img|col|input|wbr))\b([^>]*?)\s*/?>").ok();
    let ampersand = Regex::new(r"&([A-Za-z0-9#]+;)?").ok();
    let tag = Regex::new(r"<[A-Za-z][^<>]*>").ok();
    let unquoted = Regex::new(r#"("[^"]*"|'[^']*')|(\s[\w:.-]+)=([^"'\s>]*[^"'\s>/])"#).ok();

    let mut fixed = content.to_string();

    if let (Some(closer), Some(opener)) = (void_closer, void_opener) {
        fixed = closer.replace_all(&fixed, "").into_owned();
        fixed = opener
            .replace_all(&fixed, |caps: &Captures| format!("<{}{}/>", &caps[1], &caps[2]))
            .into_owned();
    }

    if let Some(ampersand) = ampersand {
        fixed = ampersand
            .replace_all(&fixed, |caps: &Captures| match caps.get(1) {
                Some(_) => caps[0].to_string(),
                None => "&amp;".to_string(),
            })
            .into_owned();
    }

    if let (Some(tag), Some(unquoted)) = (tag, unquoted) {
        fixed = tag
            .replace_all(&fixed, |caps: &Captures| {
                unquoted
                    .replace_all(&caps[0], |inner: &Captures| match inner.get(1) {
                        Some(quoted) => quoted.as_str().to_string(),
                        None => format!("{}=\"{}\"", &inner[2], &inner[3]),
                    })
                    .into_owned()
            })
            .into_owned();
    }

    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize;

    #[test]
    fn test_empty_content_rejected() {
        let parser = StorageParser::new();
        assert!(matches!(parser.parse(""), Err(DocModelError::EmptyContent)));
        assert!(matches!(parser.parse("  \n "), Err(DocModelError::EmptyContent)));
    }

    #[test]
    fn test_single_root_is_direct() {
        let tree = StorageParser::new().parse("<div><p>a</p></div>").unwrap();
        assert_eq!(tree.method, ParseMethod::Direct);
        assert_eq!(tree.get(tree.root()).unwrap().tag(), "div");
    }

    #[test]
    fn test_multiple_roots_are_wrapped() {
        let tree = StorageParser::new().parse("<h1>A</h1><p>x</p>").unwrap();
        assert_eq!(tree.method, ParseMethod::Wrapped);
        let root = tree.get(tree.root()).unwrap();
        assert!(root.synthetic);
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_top_level_text_is_wrapped() {
        let tree = StorageParser::new().parse("intro <p>x</p>").unwrap();
        assert_eq!(tree.method, ParseMethod::Wrapped);
        assert_eq!(tree.get(tree.root()).unwrap().text, "intro ");
    }

    #[test]
    fn test_text_and_tail() {
        let tree = StorageParser::new().parse("<p>Hello <b>big</b> world</p>").unwrap();
        let p = tree.root();
        let b = tree.children(p)[0];
        assert_eq!(tree.get(p).unwrap().text, "Hello ");
        assert_eq!(tree.get(b).unwrap().text, "big");
        assert_eq!(tree.get(b).unwrap().tail, " world");
    }

    #[test]
    fn test_namespaced_elements() {
        let content = r#"<ac:structured-macro ac:name="info"><ac:parameter ac:name="title">T</ac:parameter><ac:rich-text-body><p>x</p></ac:rich-text-body></ac:structured-macro>"#;
        let tree = StorageParser::new().parse(content).unwrap();
        assert_eq!(tree.method, ParseMethod::Direct);
        assert_eq!(tree.namespaces, vec![KnownNamespace::Ac]);
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.kind, ElementKind::Macro);
        assert_eq!(root.macro_name(), Some("info"));
        assert!(tree.warnings.is_empty());
    }

    #[test]
    fn test_html_entities_resolved() {
        let tree = StorageParser::new().parse("<p>a&nbsp;b &amp; c</p>").unwrap();
        assert_eq!(tree.get(tree.root()).unwrap().text, "a\u{a0}b & c");
    }

    #[test]
    fn test_cdata_flagged() {
        let content = r#"<ac:plain-text-body><![CDATA[if a < b {}]]></ac:plain-text-body>"#;
        let tree = StorageParser::new().parse(content).unwrap();
        let body = tree.get(tree.root()).unwrap();
        assert!(body.cdata);
        assert_eq!(body.text, "if a < b {}");
    }

    #[test]
    fn test_repairs_void_elements() {
        let tree = StorageParser::new().parse("<p>line<br>next</p><p>x</p>").unwrap();
        assert!(tree.repaired);
        assert_eq!(tree.method, ParseMethod::Wrapped);
        assert_eq!(tree.find_by_tag("br").len(), 1);
        assert!(!tree.warnings.is_empty());
    }

    #[test]
    fn test_repairs_ampersand_and_attributes() {
        let repaired = repair_markup(r#"<p class=note data-x="a b">Fish & Chips &amp; more</p>"#);
        assert_eq!(repaired, r#"<p class="note" data-x="a b">Fish &amp; Chips &amp; more</p>"#);

        let tree = StorageParser::new().parse("<p>R&D</p>").unwrap();
        assert!(tree.repaired);
        assert_eq!(tree.get(tree.root()).unwrap().text, "R&D");
    }

    #[test]
    fn test_repair_keeps_self_closed_voids() {
        assert_eq!(repair_markup("<br/><hr />x</br>"), "<br/><hr/>x");
        assert_eq!(repair_markup(r#"<img src="a.png">"#), r#"<img src="a.png"/>"#);
    }

    #[test]
    fn test_unparseable_falls_back_to_text() {
        let content = "<p>unterminated<div>";
        let tree = StorageParser::new().parse(content).unwrap();
        assert_eq!(tree.method, ParseMethod::TextFallback);
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.text, content);
        assert_eq!(root.attribute(FALLBACK_ATTRIBUTE), Some(FALLBACK_VALUE));
        assert!(tree.warnings.iter().any(|w| w == FALLBACK_WARNING));
        assert!(serialize(&tree, false).contains("unterminated"));
    }

    #[test]
    fn test_fragment_does_not_fall_back() {
        let parser = StorageParser::new();
        assert!(parser.parse_fragment("<p>open").is_err());
        assert!(parser.parse_fragment("<p>ok</p>").is_ok());
    }

    #[test]
    fn test_mismatched_end_tag_fails_build() {
        assert!(build_tree("<p><b>x</p></b>").is_err());
        assert!(build_tree("</p>").is_err());
    }

    #[test]
    fn test_validation_warnings() {
        let parser = StorageParser::with_config(ParserConfig::default().with_limits(1, 2));
        let tree = parser
            .parse("<div><ac:structured-macro><p>x</p></ac:structured-macro></div>")
            .unwrap();
        assert!(tree.warnings.iter().any(|w| w == "Very deep nesting detected: 2 levels"));
        assert!(tree.warnings.iter().any(|w| w == "Very large number of elements: 3"));
        assert!(tree.warnings.iter().any(|w| w.starts_with("Macro missing name attribute: <ac:structured-macro>")));
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let parser = StorageParser::with_config(ParserConfig::default().with_validation(false));
        let tree = parser.parse("<ac:structured-macro/>").unwrap();
        assert!(tree.warnings.is_empty());
    }
}

//! Element nodes and their parse-time classification

use crate::{KnownNamespace, Namespace, NodeId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Qualified Names
// =============================================================================

/// A possibly prefixed element or attribute name, such as `ac:structured-macro`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Split a raw name on its first colon
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            _ => Self {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }

    /// The name as written in markup
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified())
    }
}

// =============================================================================
// Element Kind
// =============================================================================

/// Normalized element classification, computed once from the namespace and
/// local name when an element is created or renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// `h1`..`h6`
    Heading(u8),
    Paragraph,
    Division,
    Table,
    /// `thead`, `tbody`, `tfoot`
    TableSection,
    TableRow,
    TableCell,
    TableHeader,
    List { ordered: bool },
    ListItem,
    Image,
    Link,
    Code,
    Quote,
    Macro,
    /// `ac:parameter`, whose text configures the enclosing macro
    MacroParameter,
    Layout,
    /// Any `ri:` resource reference
    Resource,
    Generic,
    /// Wrapper or fallback container introduced by the parser
    SyntheticRoot,
}

impl ElementKind {
    /// Classify a tag by namespace and local name
    pub fn classify(namespace: &Namespace, local: &str) -> Self {
        match namespace {
            Namespace::Html => Self::classify_html(&local.to_ascii_lowercase()),
            Namespace::Known(KnownNamespace::Ac) => match local {
                "structured-macro" | "macro" => ElementKind::Macro,
                "parameter" => ElementKind::MacroParameter,
                "image" => ElementKind::Image,
                "link" => ElementKind::Link,
                l if l.contains("layout") => ElementKind::Layout,
                l if l.contains("macro") => ElementKind::Macro,
                _ => ElementKind::Generic,
            },
            Namespace::Known(KnownNamespace::Ri) => ElementKind::Resource,
            Namespace::Known(KnownNamespace::At) | Namespace::Other(_) => {
                if local.contains("macro") {
                    ElementKind::Macro
                } else if local.contains("layout") {
                    ElementKind::Layout
                } else {
                    ElementKind::Generic
                }
            }
        }
    }

    fn classify_html(local: &str) -> Self {
        match local {
            "h1" => ElementKind::Heading(1),
            "h2" => ElementKind::Heading(2),
            "h3" => ElementKind::Heading(3),
            "h4" => ElementKind::Heading(4),
            "h5" => ElementKind::Heading(5),
            "h6" => ElementKind::Heading(6),
            "p" => ElementKind::Paragraph,
            "div" => ElementKind::Division,
            "table" => ElementKind::Table,
            "thead" | "tbody" | "tfoot" => ElementKind::TableSection,
            "tr" => ElementKind::TableRow,
            "td" => ElementKind::TableCell,
            "th" => ElementKind::TableHeader,
            "ul" => ElementKind::List { ordered: false },
            "ol" => ElementKind::List { ordered: true },
            "li" => ElementKind::ListItem,
            "img" => ElementKind::Image,
            "a" => ElementKind::Link,
            "code" | "pre" => ElementKind::Code,
            "blockquote" => ElementKind::Quote,
            _ => ElementKind::Generic,
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            ElementKind::Heading(level) => Some(*level),
            _ => None,
        }
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, ElementKind::TableCell | ElementKind::TableHeader)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementKind::List { .. })
    }
}

// =============================================================================
// Element
// =============================================================================

/// One element of the arena tree.
///
/// `text` is the run before the first child; `tail` is the run after this
/// element's end tag and before its next sibling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: QName,
    pub namespace: Namespace,
    pub kind: ElementKind,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub tail: String,
    /// Leading text came from a CDATA section and is written back as one
    pub cdata: bool,
    /// Written as `<x/>` while it has no content
    pub self_closing: bool,
    /// Introduced by the parser rather than present in the source
    pub synthetic: bool,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl Element {
    /// Create a detached element from a raw tag name
    pub fn new(raw_name: &str) -> Self {
        let name = QName::parse(raw_name);
        let namespace = Namespace::from_prefix(name.prefix.as_deref());
        let kind = ElementKind::classify(&namespace, &name.local);
        Self {
            name,
            namespace,
            kind,
            attributes: Vec::new(),
            text: String::new(),
            tail: String::new(),
            cdata: false,
            self_closing: false,
            synthetic: false,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Create a parser-introduced container
    pub fn synthetic(raw_name: &str) -> Self {
        let mut element = Self::new(raw_name);
        element.kind = ElementKind::SyntheticRoot;
        element.synthetic = true;
        element
    }

    /// Set the leading text (builder style)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute (builder style)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn tag(&self) -> String {
        self.name.qualified()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value in place
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Change the tag name and reclassify
    pub fn rename(&mut self, raw_name: &str) {
        self.name = QName::parse(raw_name);
        self.namespace = Namespace::from_prefix(self.name.prefix.as_deref());
        if !self.synthetic {
            self.kind = ElementKind::classify(&self.namespace, &self.name.local);
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        self.kind.heading_level()
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// Macro name from `ac:name`, falling back to a bare `name`
    pub fn macro_name(&self) -> Option<&str> {
        self.attribute("ac:name").or_else(|| self.attribute("name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_parse() {
        let q = QName::parse("ac:structured-macro");
        assert_eq!(q.prefix.as_deref(), Some("ac"));
        assert_eq!(q.local, "structured-macro");
        assert_eq!(q.qualified(), "ac:structured-macro");

        let plain = QName::parse("p");
        assert!(plain.prefix.is_none());
        assert_eq!(plain.to_string(), "p");
    }

    #[test]
    fn test_classification() {
        assert_eq!(Element::new("h3").kind, ElementKind::Heading(3));
        assert_eq!(Element::new("H2").kind, ElementKind::Heading(2));
        assert_eq!(Element::new("ac:structured-macro").kind, ElementKind::Macro);
        assert_eq!(Element::new("ac:layout-section").kind, ElementKind::Layout);
        assert_eq!(Element::new("ac:parameter").kind, ElementKind::MacroParameter);
        assert_eq!(Element::new("ri:page").kind, ElementKind::Resource);
        assert_eq!(Element::new("ol").kind, ElementKind::List { ordered: true });
        assert_eq!(Element::new("span").kind, ElementKind::Generic);
        // Prefixed headings are not headings
        assert_eq!(Element::new("x:h1").kind, ElementKind::Generic);
    }

    #[test]
    fn test_rename_reclassifies() {
        let mut el = Element::new("h2");
        el.rename("h4");
        assert_eq!(el.heading_level(), Some(4));
    }

    #[test]
    fn test_attributes() {
        let mut el = Element::new("ac:structured-macro").with_attribute("ac:name", "info");
        assert_eq!(el.macro_name(), Some("info"));
        el.set_attribute("ac:name", "note");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.macro_name(), Some("note"));
    }
}

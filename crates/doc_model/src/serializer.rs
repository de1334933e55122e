//! Storage-format markup writer

use crate::{DocumentTree, Element, NodeId, ParseMethod};
use quick_xml::escape::{escape, partial_escape};

/// Write a tree back to markup.
///
/// Without `include_root` the output mirrors the input shape: a wrapped tree
/// writes only its contents, and a text-fallback tree returns the original
/// string untouched. With it, the synthetic container is written too.
pub fn serialize(tree: &DocumentTree, include_root: bool) -> String {
    let mut out = String::new();
    let root = tree.root();
    let Some(root_el) = tree.get(root) else {
        return out;
    };

    match tree.method {
        ParseMethod::TextFallback if !include_root => out.push_str(&root_el.text),
        ParseMethod::TextFallback => write_element(tree, root, &mut out),
        ParseMethod::Wrapped if include_root => {
            out.push('<');
            out.push_str(&root_el.tag());
            for ns in &tree.namespaces {
                out.push_str(&format!(" xmlns:{}=\"{}\"", ns.prefix(), ns.uri()));
            }
            write_attributes(root_el, &mut out);
            out.push('>');
            write_contents(tree, root, &mut out);
            out.push_str("</");
            out.push_str(&root_el.tag());
            out.push('>');
        }
        ParseMethod::Wrapped => write_contents(tree, root, &mut out),
        ParseMethod::Direct => {
            out.push_str(&tree.leading_text);
            write_element(tree, root, &mut out);
            out.push_str(&partial_escape(root_el.tail.as_str()));
        }
    }
    out
}

/// Write one element and its subtree, without its tail
pub fn element_to_string(tree: &DocumentTree, id: NodeId) -> String {
    let mut out = String::new();
    write_element(tree, id, &mut out);
    out
}

fn write_element(tree: &DocumentTree, id: NodeId, out: &mut String) {
    let Some(el) = tree.get(id) else { return };
    let tag = el.tag();
    out.push('<');
    out.push_str(&tag);
    write_attributes(el, out);

    if el.self_closing && el.text.is_empty() && el.children().is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    write_contents(tree, id, out);
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn write_attributes(el: &Element, out: &mut String) {
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
}

fn write_contents(tree: &DocumentTree, id: NodeId, out: &mut String) {
    let Some(el) = tree.get(id) else { return };
    if el.cdata && !el.text.is_empty() {
        out.push_str("<![CDATA[");
        out.push_str(&el.text.replace("]]>", "]]]]><![CDATA[>"));
        out.push_str("]]>");
    } else {
        out.push_str(&partial_escape(el.text.as_str()));
    }
    for &child in el.children() {
        write_element(tree, child, out);
        if let Some(child_el) = tree.get(child) {
            out.push_str(&partial_escape(child_el.tail.as_str()));
        }
    }
}

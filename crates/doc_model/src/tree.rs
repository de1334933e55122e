//! Arena document tree storage and traversal

use crate::{DocModelError, Element, KnownNamespace, NodeId, Result};
use serde::{Deserialize, Serialize};

/// How the parser obtained a tree from its input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMethod {
    /// Single root element, parsed as written
    Direct,
    /// Multiple top-level nodes held under a synthetic `root`
    Wrapped,
    /// Unparseable input held verbatim in one flagged `div`
    TextFallback,
}

/// Arena of elements with a designated root.
///
/// Removing an element only detaches it; arena slots are never reused, so a
/// `NodeId` taken from one tree stays valid in any clone of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    nodes: Vec<Element>,
    root: NodeId,
    pub method: ParseMethod,
    /// Heuristic markup repairs were needed to parse
    pub repaired: bool,
    /// Well-known namespace prefixes found in the source
    pub namespaces: Vec<KnownNamespace>,
    /// Whitespace before a direct root element
    pub leading_text: String,
    /// Advisory messages from parsing and validation
    pub warnings: Vec<String>,
}

impl DocumentTree {
    /// Create a tree holding a single root element
    pub fn with_root(root: Element, method: ParseMethod) -> Self {
        Self {
            nodes: vec![root],
            root: NodeId::from_index(0),
            method,
            repaired: false,
            namespaces: Vec::new(),
            leading_text: String::new(),
            warnings: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Point the tree at a different root, detaching it from any parent
    pub(crate) fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        self.root = id;
        Ok(())
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())
    }

    /// Like [`get`](Self::get) but with a typed error
    pub fn element(&self, id: NodeId) -> Result<&Element> {
        self.get(id).ok_or(DocModelError::NodeNotFound(id))
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.get_mut(id).ok_or(DocModelError::NodeNotFound(id))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|e| e.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|e| e.parent())
    }

    /// Position of an element among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Siblings after `id`, in document order
    pub fn following_siblings(&self, id: NodeId) -> Vec<NodeId> {
        match (self.parent(id), self.index_in_parent(id)) {
            (Some(parent), Some(index)) => self.children(parent)[index + 1..].to_vec(),
            _ => Vec::new(),
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// `id` and everything below it, in pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.get(current).is_none() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every attached element in pre-order, starting at the root
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Element)> + '_ {
        self.descendants(self.root)
            .into_iter()
            .filter_map(move |id| self.get(id).map(|e| (id, e)))
    }

    /// Number of attached elements, root included
    pub fn element_count(&self) -> usize {
        self.descendants(self.root).len()
    }

    /// Top-level content as it appeared in the source: text before the first
    /// top-level element, and the top-level elements themselves
    pub fn fragment_parts(&self) -> (String, Vec<NodeId>) {
        let Some(root) = self.get(self.root) else {
            return (String::new(), Vec::new());
        };
        match self.method {
            ParseMethod::Direct => (self.leading_text.clone(), vec![self.root]),
            ParseMethod::Wrapped => (root.text.clone(), root.children().to_vec()),
            ParseMethod::TextFallback => (root.text.clone(), Vec::new()),
        }
    }

    /// Deepest nesting below the root; a lone root has depth 0
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for &child in self.children(id) {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }

    /// All attached elements whose qualified tag equals `tag`
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, e)| e.tag() == tag)
            .map(|(id, _)| id)
            .collect()
    }

    /// All attached elements carrying `key="value"`
    pub fn find_by_attribute(&self, key: &str, value: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, e)| e.attribute(key) == Some(value))
            .map(|(id, _)| id)
            .collect()
    }

    /// Rendered text of an element: its own text plus every descendant's text
    /// and tail, each trimmed, joined by single spaces. The element's own tail
    /// is not part of it.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(el) = self.get(id) {
            parts.push(el.text.trim());
        }
        for &child in self.children(id) {
            self.collect_text(child, &mut parts);
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, id: NodeId, parts: &mut Vec<&'a str>) {
        let Some(el) = self.get(id) else { return };
        parts.push(el.text.trim());
        for &child in el.children() {
            self.collect_text(child, parts);
        }
        parts.push(el.tail.trim());
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add a detached element to the arena
    pub fn create(&mut self, element: Element) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let mut element = element;
        element.parent = None;
        element.children.clear();
        self.nodes.push(element);
        id
    }

    /// Create an element with literal text and append it under `parent`
    pub fn append_text_element(&mut self, parent: NodeId, tag: &str, text: &str) -> Result<NodeId> {
        let id = self.create(Element::new(tag).with_text(text));
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` under `parent`, detaching it first
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.element(child)?;
        if self.descendants(child).contains(&parent) {
            return Err(DocModelError::InvalidOperation(format!(
                "cannot insert {} beneath itself",
                child
            )));
        }
        self.detach(child)?;
        let parent_el = self.element_mut(parent)?;
        let index = index.min(parent_el.children.len());
        parent_el.children.insert(index, child);
        parent_el.self_closing = false;
        self.element_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Remove an element from its parent; its subtree stays in the arena
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.element(id)?.parent;
        if let Some(parent) = parent {
            self.element_mut(parent)?.children.retain(|&c| c != id);
            self.element_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Drop the children and leading text of an element, keeping its name,
    /// attributes and tail
    pub fn clear_content(&mut self, id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.element_mut(id)?.children);
        for child in children {
            if let Some(el) = self.get_mut(child) {
                el.parent = None;
            }
        }
        let el = self.element_mut(id)?;
        el.text.clear();
        el.cdata = false;
        Ok(())
    }

    /// Deep-copy a subtree of `source` into this arena, returning the detached
    /// copy of `id`
    pub fn import_subtree(&mut self, source: &DocumentTree, id: NodeId) -> Result<NodeId> {
        let original = source.element(id)?;
        let copy = self.create(original.clone());
        for &child in original.children() {
            let child_copy = self.import_subtree(source, child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Deep-copy a subtree within this arena
    pub fn duplicate(&mut self, id: NodeId) -> Result<NodeId> {
        let snapshot = self.clone();
        self.import_subtree(&snapshot, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementKind;

    fn sample() -> (DocumentTree, NodeId, NodeId, NodeId) {
        let mut tree = DocumentTree::with_root(Element::synthetic("root"), ParseMethod::Wrapped);
        let root = tree.root();
        let h = tree.append_text_element(root, "h1", "Title").unwrap();
        let p = tree.append_text_element(root, "p", "Hello").unwrap();
        let b = tree.append_text_element(p, "b", "bold").unwrap();
        tree.get_mut(b).unwrap().tail = " world ".into();
        (tree, h, p, b)
    }

    #[test]
    fn test_structure_and_order() {
        let (tree, h, p, b) = sample();
        assert_eq!(tree.children(tree.root()), &[h, p]);
        assert_eq!(tree.parent(b), Some(p));
        assert_eq!(tree.index_in_parent(p), Some(1));
        let order: Vec<NodeId> = tree.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![tree.root(), h, p, b]);
        assert_eq!(tree.element_count(), 4);
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.get(h).unwrap().kind, ElementKind::Heading(1));
    }

    #[test]
    fn test_text_content() {
        let (tree, _, p, b) = sample();
        assert_eq!(tree.text_content(p), "Hello bold world");
        assert_eq!(tree.text_content(b), "bold");
    }

    #[test]
    fn test_detach_and_insert() {
        let (mut tree, h, p, _) = sample();
        tree.detach(h).unwrap();
        assert_eq!(tree.children(tree.root()), &[p]);
        assert_eq!(tree.element_count(), 3);
        tree.insert_child(tree.root(), 5, h).unwrap();
        assert_eq!(tree.children(tree.root()), &[p, h]);
    }

    #[test]
    fn test_insert_beneath_itself_rejected() {
        let (mut tree, _, p, b) = sample();
        assert!(tree.insert_child(b, 0, p).is_err());
    }

    #[test]
    fn test_clone_keeps_ids() {
        let (tree, _, p, _) = sample();
        let mut copy = tree.clone();
        copy.get_mut(p).unwrap().text = "Changed".into();
        assert_eq!(tree.get(p).unwrap().text, "Hello");
        assert_eq!(copy.get(p).unwrap().text, "Changed");
    }

    #[test]
    fn test_duplicate_and_clear() {
        let (mut tree, _, p, _) = sample();
        let copy = tree.duplicate(p).unwrap();
        assert_eq!(tree.text_content(copy), "Hello bold world");
        assert!(tree.parent(copy).is_none());

        tree.clear_content(p).unwrap();
        assert!(tree.children(p).is_empty());
        assert_eq!(tree.text_content(p), "");
        assert_eq!(tree.text_content(copy), "Hello bold world");
    }

    #[test]
    fn test_find_helpers() {
        let (mut tree, h, _, _) = sample();
        tree.get_mut(h).unwrap().set_attribute("id", "top");
        assert_eq!(tree.find_by_tag("b").len(), 1);
        assert_eq!(tree.find_by_attribute("id", "top"), vec![h]);
    }
}

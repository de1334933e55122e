//! Structure analysis: headings, sections, blocks and insertion points

use crate::{
    BlockMetadata, BlockType, ContentBlock, DocModelError, DocumentTree, ElementKind, Heading,
    InsertionPoint, NodeId, Result, Section, StorageParser,
};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Heading Hierarchy
// =============================================================================

/// A heading with the headings nested beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingNode {
    pub text: String,
    pub level: u8,
    pub position: usize,
    pub children: Vec<HeadingNode>,
}

/// Headings grouped by level and arranged as an outline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadingHierarchy {
    pub levels: BTreeMap<u8, Vec<Heading>>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub outline: Vec<HeadingNode>,
}

impl HeadingHierarchy {
    pub fn build(headings: &[Heading]) -> Self {
        let mut levels: BTreeMap<u8, Vec<Heading>> = BTreeMap::new();
        for heading in headings {
            levels.entry(heading.level).or_default().push(heading.clone());
        }
        Self {
            min_level: levels.keys().next().copied(),
            max_level: levels.keys().next_back().copied(),
            levels,
            outline: Self::build_outline(headings),
        }
    }

    fn build_outline(headings: &[Heading]) -> Vec<HeadingNode> {
        let mut roots = Vec::new();
        let mut stack: Vec<HeadingNode> = Vec::new();

        for heading in headings {
            while stack.last().is_some_and(|top| top.level >= heading.level) {
                Self::attach(&mut stack, &mut roots);
            }
            stack.push(HeadingNode {
                text: heading.text.clone(),
                level: heading.level,
                position: heading.position,
                children: Vec::new(),
            });
        }
        while !stack.is_empty() {
            Self::attach(&mut stack, &mut roots);
        }
        roots
    }

    /// Pop the top node and hang it under its parent, or make it a root
    fn attach(stack: &mut Vec<HeadingNode>, roots: &mut Vec<HeadingNode>) {
        if let Some(node) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }
    }
}

// =============================================================================
// Content Structure
// =============================================================================

/// Result of analyzing one document. Owns the tree it describes, so every
/// `NodeId` in it resolves against [`tree`](Self::tree) and against any clone
/// of that tree.
#[derive(Debug, Clone, Serialize)]
pub struct ContentStructure {
    #[serde(skip)]
    tree: DocumentTree,
    pub headings: Vec<Heading>,
    /// One section per heading, in document order
    pub sections: Vec<Section>,
    pub content_blocks: Vec<ContentBlock>,
    pub insertion_points: Vec<InsertionPoint>,
    pub hierarchy: HeadingHierarchy,
    pub total_elements: usize,
    pub has_macros: bool,
    pub has_layouts: bool,
}

impl ContentStructure {
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn into_tree(self) -> DocumentTree {
        self.tree
    }

    /// Parser warnings for the analyzed content
    pub fn warnings(&self) -> &[String] {
        &self.tree.warnings
    }

    /// First section whose heading text equals `text` exactly, optionally
    /// ignoring case. Surrounding whitespace is significant.
    pub fn section_by_heading(&self, text: &str, case_sensitive: bool) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.heading.matches(text, case_sensitive))
    }

    pub fn sections_by_level(&self, level: u8) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.level() == level).collect()
    }

    pub fn min_heading_level(&self) -> Option<u8> {
        self.sections.iter().map(|s| s.level()).min()
    }

    /// Sections at the highest heading level present
    pub fn top_level_sections(&self) -> Vec<&Section> {
        match self.min_heading_level() {
            Some(level) => self.sections_by_level(level),
            None => Vec::new(),
        }
    }

    pub fn blocks_of_type(&self, block_type: BlockType) -> Vec<&ContentBlock> {
        self.content_blocks
            .iter()
            .filter(|b| b.block_type == block_type)
            .collect()
    }

    /// Headings, sections, blocks and insertion points as JSON, without the tree
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Analyzer
// =============================================================================

/// Derives headings, sections and blocks from storage-format content
#[derive(Debug, Clone, Default)]
pub struct StructureAnalyzer {
    parser: StorageParser,
}

impl StructureAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: StorageParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &StorageParser {
        &self.parser
    }

    /// Parse and analyze. Empty content is reported as
    /// [`DocModelError::EmptyContent`]; anything else that goes wrong as
    /// [`DocModelError::StructureAnalysis`].
    pub fn analyze(&self, content: &str) -> Result<ContentStructure> {
        let tree = self.parser.parse(content)?;
        self.analyze_tree(tree)
    }

    /// Analyze an already parsed tree
    pub fn analyze_tree(&self, tree: DocumentTree) -> Result<ContentStructure> {
        Self::build(tree).map_err(|e| match e {
            DocModelError::StructureAnalysis(_) => e,
            other => DocModelError::StructureAnalysis(format!("Content analysis failed: {}", other)),
        })
    }

    fn build(tree: DocumentTree) -> Result<ContentStructure> {
        let order: Vec<NodeId> = tree.iter().map(|(id, _)| id).collect();
        let total = order.len();

        let headings = Self::find_headings(&tree, &order);
        let sections = (0..headings.len())
            .map(|i| Self::build_section(&tree, &order, &headings, i, total))
            .collect::<Result<Vec<_>>>()?;

        let content_blocks = order
            .iter()
            .enumerate()
            .filter_map(|(position, &id)| {
                let block_type = BlockType::classify(&tree, id);
                (block_type != BlockType::Unknown).then(|| ContentBlock {
                    block_type,
                    node: id,
                    position,
                    text: tree.text_content(id),
                    metadata: BlockMetadata::extract(&tree, id),
                })
            })
            .collect();

        let insertion_points = Self::insertion_points(&headings, &sections, total);
        let hierarchy = HeadingHierarchy::build(&headings);
        let has_macros = tree.iter().any(|(_, e)| e.kind == ElementKind::Macro);
        let has_layouts = tree.iter().any(|(_, e)| e.kind == ElementKind::Layout);

        Ok(ContentStructure {
            tree,
            headings,
            sections,
            content_blocks,
            insertion_points,
            hierarchy,
            total_elements: total,
            has_macros,
            has_layouts,
        })
    }

    fn find_headings(tree: &DocumentTree, order: &[NodeId]) -> Vec<Heading> {
        order
            .iter()
            .enumerate()
            .filter_map(|(position, &id)| {
                let level = tree.get(id)?.heading_level()?;
                Some(Heading {
                    level,
                    text: tree.text_content(id),
                    position,
                    node: id,
                })
            })
            .collect()
    }

    /// Build the section for `headings[index]`, confined to positions below
    /// `bound`
    fn build_section(
        tree: &DocumentTree,
        order: &[NodeId],
        headings: &[Heading],
        index: usize,
        bound: usize,
    ) -> Result<Section> {
        let heading = headings
            .get(index)
            .ok_or_else(|| DocModelError::StructureAnalysis(format!("no heading at index {}", index)))?;

        let end = headings[index + 1..]
            .iter()
            .find(|h| h.level <= heading.level)
            .map(|h| h.position)
            .unwrap_or(bound)
            .min(bound);
        let start = (heading.position + tree.descendants(heading.node).len()).min(end);

        // Only headings not already nested under a shallower in-span heading
        let mut subsections = Vec::new();
        let mut shallowest = u8::MAX;
        for (offset, candidate) in headings[index + 1..].iter().enumerate() {
            if candidate.position >= end {
                break;
            }
            if candidate.level <= heading.level {
                continue;
            }
            if candidate.level <= shallowest {
                subsections.push(Self::build_section(tree, order, headings, index + 1 + offset, end)?);
            }
            shallowest = shallowest.min(candidate.level);
        }

        Ok(Section {
            heading: heading.clone(),
            content: order[start..end].to_vec(),
            start,
            end,
            subsections,
        })
    }

    fn insertion_points(headings: &[Heading], sections: &[Section], total: usize) -> Vec<InsertionPoint> {
        let mut points = vec![InsertionPoint::start_of_page()];
        points.extend(
            headings
                .iter()
                .map(|h| InsertionPoint::after_heading(&h.text, h.position + 1)),
        );
        points.extend(
            sections
                .iter()
                .map(|s| InsertionPoint::end_of_section(&s.heading.text, s.end)),
        );
        points.push(InsertionPoint::end_of_page(total));
        points.sort_by_key(|p| p.position);
        points
    }
}

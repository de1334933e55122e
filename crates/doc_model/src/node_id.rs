//! Node identifiers for the element arena

use serde::{Deserialize, Serialize};

/// Index of an element inside a [`DocumentTree`](crate::DocumentTree) arena.
///
/// Ids are positions in the arena, so a cloned tree resolves the same ids to
/// the corresponding elements of the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw arena index
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the underlying arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_index() {
        let id = NodeId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "#7");
        assert_eq!(NodeId::from(7), id);
    }
}

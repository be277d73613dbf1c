//! Arena node types.

use compact_str::CompactString;
use contentlist_core::{ContentPath, Entry};
use indexmap::IndexMap;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root directory node.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One directory, file or other node.
///
/// Children are keyed by name in insertion order. `parent` is the index of
/// the containing directory; the root is its own parent.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: CompactString,
    pub(crate) path: ContentPath,
    pub(crate) parent: NodeId,
    pub(crate) directory: bool,
    pub(crate) children: IndexMap<CompactString, NodeId>,
    pub(crate) entry: Option<Entry>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self {
            name: CompactString::default(),
            path: ContentPath::absolute_root(),
            parent: NodeId::ROOT,
            directory: true,
            children: IndexMap::new(),
            entry: None,
        }
    }

    pub(crate) fn child(parent: NodeId, path: ContentPath, directory: bool) -> Self {
        let name = CompactString::new(path.name().unwrap_or_default());
        Self {
            name,
            path,
            parent,
            directory,
            children: IndexMap::new(),
            entry: None,
        }
    }

    /// Whether this node was synthesized and has not been filled yet.
    pub(crate) fn is_placeholder(&self) -> bool {
        self.entry.is_none()
    }
}

//! The virtual filesystem tree.

use std::collections::HashSet;
use std::io::BufRead;

use contentlist_codec::{CodecError, EntryReader};
use contentlist_core::{ContentPath, Entry, EntryType};
use tracing::{debug, trace};

use crate::node::{Node, NodeId};

const CURRENT_LINK: &str = ".";
const PARENT_LINK: &str = "..";

/// A directory tree rebuilt from manifest entries.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. A child is
/// always allocated after its parent. Query paths are resolved from the
/// root whether or not they are absolute; `.` and `..` segments are
/// followed, and `..` at the root stays at the root.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    nodes: Vec<Node>,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// An empty tree holding only the root directory.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// Build a tree from any sequence of entries.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut vfs = Self::new();
        for entry in entries {
            vfs.insert(entry);
        }
        vfs
    }

    /// Build a tree from a manifest stream.
    ///
    /// `on_entry` sees every entry read together with whether it was
    /// accepted into the tree.
    pub fn from_reader<R, F>(reader: EntryReader<R>, mut on_entry: F) -> Result<Self, CodecError>
    where
        R: BufRead,
        F: FnMut(&Entry, bool),
    {
        let mut vfs = Self::new();
        for entry in reader {
            let entry = entry?;
            let accepted = vfs.insert_with(entry, &mut on_entry);
            trace!(accepted, "Loaded entry");
        }
        debug!(nodes = vfs.node_count(), "Loaded manifest");
        Ok(vfs)
    }

    fn insert_with<F: FnMut(&Entry, bool)>(&mut self, entry: Entry, on_entry: &mut F) -> bool {
        let snapshot = entry.clone();
        let accepted = self.insert(entry);
        on_entry(&snapshot, accepted);
        accepted
    }

    /// Number of nodes, the root and placeholders included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add one entry.
    ///
    /// Missing intermediate directories are created as placeholders. The
    /// entry is dropped, returning `false`, when an intermediate segment is
    /// not a directory, when its node already holds an entry, or when the
    /// existing node's directory flag disagrees with the entry's type.
    pub fn insert(&mut self, entry: Entry) -> bool {
        let path = entry.path().clone();
        let mut current = NodeId::ROOT;

        let count = path.segment_count();
        for (index, segment) in path.segments().enumerate() {
            let last = index + 1 == count;
            match self.node(current).children.get(segment).copied() {
                Some(id) if last => current = id,
                Some(id) => {
                    if !self.node(id).directory {
                        debug!(path = %path, "Dropping entry below a non-directory");
                        return false;
                    }
                    current = id;
                }
                None => {
                    let directory = !last || entry.is_dir();
                    current = self.add_child(current, path.prefix(index + 1), directory);
                }
            }
        }

        let node = &mut self.nodes[current.index()];
        if node.entry.is_none() && node.directory == entry.is_dir() {
            node.entry = Some(entry);
            true
        } else {
            debug!(path = %path, "Dropping conflicting entry");
            false
        }
    }

    fn add_child(&mut self, parent: NodeId, path: ContentPath, directory: bool) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let node = Node::child(parent, path, directory);
        let name = node.name.clone();
        self.nodes.push(node);
        self.nodes[parent.index()].children.insert(name, id);
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Resolve a path to its node.
    pub fn resolve(&self, path: &ContentPath) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for segment in path.segments() {
            current = match segment {
                CURRENT_LINK => current,
                PARENT_LINK => self.node(current).parent,
                name => *self.node(current).children.get(name)?,
            };
        }
        Some(current)
    }

    pub fn exists(&self, path: &ContentPath) -> bool {
        self.resolve(path).is_some()
    }

    /// Whether the path names a directory, placeholder or not.
    pub fn is_directory(&self, path: &ContentPath) -> bool {
        self.resolve(path)
            .is_some_and(|id| self.node(id).directory)
    }

    /// Whether the path names anything other than a directory.
    pub fn is_file(&self, path: &ContentPath) -> bool {
        self.resolve(path)
            .is_some_and(|id| !self.node(id).directory)
    }

    /// The clean absolute path of the node a path resolves to.
    pub fn to_real_path(&self, path: &ContentPath) -> Option<ContentPath> {
        self.resolve(path).map(|id| self.node(id).path.clone())
    }

    /// The stored entry, or `None` for a placeholder or missing path.
    pub fn get_entry(&self, path: &ContentPath) -> Option<&Entry> {
        self.resolve(path)
            .and_then(|id| self.node(id).entry.as_ref())
    }

    /// Whether the node exists but has not received its own entry.
    pub fn is_placeholder(&self, path: &ContentPath) -> bool {
        self.resolve(path)
            .is_some_and(|id| self.node(id).is_placeholder())
    }

    /// Full paths of a directory's children in insertion order.
    ///
    /// With `include_special_links`, `..` and `.` come first. Returns
    /// `None` if the path is missing or not a directory.
    pub fn list_files(
        &self,
        path: &ContentPath,
        include_special_links: bool,
    ) -> Option<Vec<ContentPath>> {
        let id = self.resolve(path)?;
        let node = self.node(id);
        if !node.directory {
            return None;
        }

        let mut paths = Vec::with_capacity(node.children.len() + 2);
        if include_special_links {
            paths.push(node.path.join(&ContentPath::parent_link()));
            paths.push(node.path.join(&ContentPath::current_link()));
        }
        paths.extend(
            node.children
                .values()
                .map(|child| self.node(*child).path.clone()),
        );
        Some(paths)
    }

    /// Expand each path into itself and its descendants, depth-first.
    ///
    /// Nodes reached twice, through overlapping or aliased paths, are
    /// yielded once. Placeholders contribute no entry but are still
    /// descended into.
    pub fn list_entries(&self, paths: &[ContentPath]) -> Vec<&Entry> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut entries = Vec::new();

        for path in paths {
            let Some(start) = self.resolve(path) else {
                continue;
            };
            let mut stack = vec![start];
            while let Some(id) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                let node = self.node(id);
                if let Some(entry) = &node.entry {
                    entries.push(entry);
                }
                stack.extend(node.children.values().rev().copied());
            }
        }
        entries
    }

    /// Every stored entry in arena order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.nodes.iter().filter_map(|node| node.entry.as_ref())
    }

    /// Recompute directory aggregates from the leaves up.
    ///
    /// Placeholders receive synthesized `Directory` entries. Every
    /// directory's size, files and directories become the recursive totals
    /// of its children; non-directories get zero counts.
    pub fn recompute_aggregates(&mut self) {
        let mut totals = vec![(0u64, 0u64, 0u64); self.nodes.len()];

        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            let (mut size, mut files, mut directories) = (0, 0, 0);

            if node.directory {
                for child in node.children.values() {
                    let child_node = &self.nodes[child.index()];
                    let (child_size, child_files, child_dirs) = totals[child.index()];
                    if child_node.directory {
                        size += child_size;
                        files += child_files;
                        directories += child_dirs + 1;
                    } else if child_node
                        .entry
                        .as_ref()
                        .is_some_and(|entry| entry.entry_type() == EntryType::File)
                    {
                        size += child_size;
                        files += 1;
                    }
                }
            } else if let Some(entry) = &node.entry {
                size = entry.size;
            }
            totals[index] = (size, files, directories);

            let node = &mut self.nodes[index];
            if node.entry.is_none() {
                let synthesized = if index == NodeId::ROOT.index() {
                    Ok(Entry::root())
                } else {
                    Entry::new(node.path.clone(), EntryType::Directory)
                };
                node.entry = synthesized.ok();
            }
            let directory = node.directory;
            let Some(entry) = node.entry.as_mut() else {
                continue;
            };
            if directory {
                entry.size = size;
            }
            entry.files = files;
            entry.directories = directories;
        }
    }
}

impl FromIterator<Entry> for VirtualFileSystem {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl Extend<Entry> for VirtualFileSystem {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> ContentPath {
        ContentPath::parse(text).unwrap()
    }

    fn file(path: &str, size: u64) -> Entry {
        let mut entry = Entry::new(p(path), EntryType::File).unwrap();
        entry.size = size;
        entry
    }

    fn dir(path: &str) -> Entry {
        Entry::new(p(path), EntryType::Directory).unwrap()
    }

    #[test]
    fn test_placeholders_and_backfill() {
        let mut vfs = VirtualFileSystem::new();
        assert!(vfs.insert(file("/a/b/c.txt", 3)));
        assert!(vfs.is_directory(&p("/a/b")));
        assert!(vfs.is_placeholder(&p("/a")));
        assert!(vfs.get_entry(&p("/a")).is_none());

        let before = vfs.resolve(&p("/a")).unwrap();
        assert!(vfs.insert(dir("/a")));
        assert_eq!(vfs.resolve(&p("/a")), Some(before));
        assert!(vfs.get_entry(&p("/a")).is_some());
        assert!(!vfs.is_placeholder(&p("/a")));
    }

    #[test]
    fn test_conflicts_are_dropped() {
        let mut vfs = VirtualFileSystem::new();
        assert!(vfs.insert(file("/x", 1)));
        assert!(!vfs.insert(file("/x/y", 1)));
        assert!(!vfs.insert(dir("/x")));
        assert!(!vfs.insert(file("/x", 2)));
        assert_eq!(vfs.get_entry(&p("/x")).unwrap().size, 1);

        assert!(vfs.insert(file("/d/f", 1)));
        assert!(!vfs.insert(file("/d", 0)));
        assert!(vfs.is_directory(&p("/d")));
    }

    #[test]
    fn test_root_entry() {
        let mut vfs = VirtualFileSystem::new();
        assert!(vfs.get_entry(&ContentPath::absolute_root()).is_none());
        assert!(vfs.insert(Entry::root()));
        assert!(!vfs.insert(Entry::root()));
        assert!(vfs.get_entry(&ContentPath::absolute_root()).is_some());
    }

    #[test]
    fn test_special_link_resolution() {
        let vfs = VirtualFileSystem::from_entries([file("/a/b/c", 1)]);
        assert_eq!(vfs.to_real_path(&p("/a/./b/../b/c")), Some(p("/a/b/c")));
        assert_eq!(vfs.to_real_path(&p("/../..")), Some(ContentPath::absolute_root()));
        assert_eq!(vfs.to_real_path(&p("a/b")), Some(p("/a/b")));
        assert!(vfs.to_real_path(&p("/a/missing")).is_none());
        assert!(vfs.is_file(&p("/a/b/c")));
        assert!(!vfs.is_file(&p("/a/b")));
        assert!(!vfs.is_file(&p("/nope")));
    }

    #[test]
    fn test_list_files() {
        let vfs = VirtualFileSystem::from_entries([file("/d/z", 1), dir("/d/a"), file("/d/m", 1)]);
        assert_eq!(
            vfs.list_files(&p("/d"), false).unwrap(),
            vec![p("/d/z"), p("/d/a"), p("/d/m")]
        );

        let with_links = vfs.list_files(&p("/d"), true).unwrap();
        assert_eq!(with_links[0].to_string(), "/d/..");
        assert_eq!(with_links[1].to_string(), "/d/.");
        assert_eq!(with_links.len(), 5);

        assert!(vfs.list_files(&p("/d/z"), false).is_none());
        assert!(vfs.list_files(&p("/missing"), false).is_none());
    }

    #[test]
    fn test_list_entries_deduplicates() {
        let vfs = VirtualFileSystem::from_entries([
            dir("/d"),
            file("/d/a", 1),
            dir("/d/s"),
            file("/d/s/b", 1),
        ]);
        let entries = vfs.list_entries(&[p("/d/s"), p("/d"), p("/d/s/../s")]);
        let paths: Vec<String> = entries.iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, vec!["/d/s", "/d/s/b", "/d", "/d/a"]);
    }

    #[test]
    fn test_recompute_aggregates() {
        let mut vfs = VirtualFileSystem::from_entries([
            file("/a/one", 10),
            file("/a/b/two", 5),
            dir("/a/b/empty"),
            Entry::new(p("/a/link"), EntryType::SymbolicLink).unwrap(),
        ]);
        vfs.recompute_aggregates();

        let a = vfs.get_entry(&p("/a")).unwrap();
        assert!(a.is_dir());
        assert_eq!((a.size, a.files, a.directories), (15, 2, 2));

        let b = vfs.get_entry(&p("/a/b")).unwrap();
        assert_eq!((b.size, b.files, b.directories), (5, 1, 1));

        let root = vfs.get_entry(&ContentPath::absolute_root()).unwrap();
        assert!(root.path().is_root());
        assert_eq!((root.size, root.files, root.directories), (15, 2, 3));

        let one = vfs.get_entry(&p("/a/one")).unwrap();
        assert_eq!((one.size, one.files, one.directories), (10, 0, 0));
    }
}

//! Name search over a subtree.

use contentlist_core::{ContentPath, compare_ignore_case};
use serde::{Deserialize, Serialize};

use crate::node::NodeId;
use crate::tree::VirtualFileSystem;

/// How [`VirtualFileSystem::search`] matches names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Compare names case-sensitively.
    pub case_sensitive: bool,
    /// Require the whole name to match instead of a substring.
    pub exact_match: bool,
    /// Directories first, then files, each ordered by name ignoring case.
    pub sort: bool,
}

impl SearchOptions {
    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn exact_match(mut self, yes: bool) -> Self {
        self.exact_match = yes;
        self
    }

    pub fn sort(mut self, yes: bool) -> Self {
        self.sort = yes;
        self
    }

    fn matches(&self, name: &str, needle: &str) -> bool {
        match (self.case_sensitive, self.exact_match) {
            (true, true) => name == needle,
            (true, false) => name.contains(needle),
            (false, true) => name.to_lowercase() == needle,
            (false, false) => name.to_lowercase().contains(needle),
        }
    }
}

impl VirtualFileSystem {
    /// Find every node below `path` whose own name matches `text`.
    ///
    /// The start node itself is not a candidate. Results are in depth-first
    /// order unless sorting is requested. Returns `None` if `path` does not
    /// resolve to a directory.
    pub fn search(
        &self,
        path: &ContentPath,
        text: &str,
        options: &SearchOptions,
    ) -> Option<Vec<ContentPath>> {
        let start = self.resolve(path)?;
        if !self.node(start).directory {
            return None;
        }
        let needle = if options.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        };

        let mut hits: Vec<NodeId> = Vec::new();
        let mut stack: Vec<NodeId> = self.node(start).children.values().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if options.matches(&node.name, &needle) {
                hits.push(id);
            }
            stack.extend(node.children.values().rev().copied());
        }

        if options.sort {
            hits.sort_by(|a, b| {
                let (a, b) = (self.node(*a), self.node(*b));
                b.directory
                    .cmp(&a.directory)
                    .then_with(|| compare_ignore_case(&a.name, &b.name))
            });
        }

        Some(
            hits.into_iter()
                .map(|id| self.node(id).path.clone())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentlist_core::{Entry, EntryType};

    fn p(text: &str) -> ContentPath {
        ContentPath::parse(text).unwrap()
    }

    fn vfs() -> VirtualFileSystem {
        [
            ("/Music/report.txt", EntryType::File),
            ("/Music/Reports", EntryType::Directory),
            ("/Music/Reports/annual REPORT.pdf", EntryType::File),
            ("/Docs/report", EntryType::File),
            ("/Docs/notes.md", EntryType::File),
        ]
        .into_iter()
        .map(|(path, entry_type)| Entry::new(p(path), entry_type).unwrap())
        .collect()
    }

    fn found(hits: Option<Vec<ContentPath>>) -> Vec<String> {
        hits.unwrap().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_substring_ignoring_case() {
        let hits = vfs().search(&ContentPath::absolute_root(), "report", &SearchOptions::default());
        assert_eq!(
            found(hits),
            vec![
                "/Music/report.txt",
                "/Music/Reports",
                "/Music/Reports/annual REPORT.pdf",
                "/Docs/report",
            ]
        );
    }

    #[test]
    fn test_case_sensitive_exact() {
        let options = SearchOptions::default().case_sensitive(true).exact_match(true);
        let hits = vfs().search(&ContentPath::absolute_root(), "report", &options);
        assert_eq!(found(hits), vec!["/Docs/report"]);

        let hits = vfs().search(&ContentPath::absolute_root(), "Report", &options);
        assert!(found(hits).is_empty());
    }

    #[test]
    fn test_sorted_directories_first() {
        let options = SearchOptions::default().sort(true);
        let hits = vfs().search(&ContentPath::absolute_root(), "re", &options);
        assert_eq!(
            found(hits),
            vec![
                "/Music/Reports",
                "/Music/Reports/annual REPORT.pdf",
                "/Docs/report",
                "/Music/report.txt",
            ]
        );
    }

    #[test]
    fn test_start_node_excluded() {
        let hits = vfs().search(&p("/Music/Reports"), "reports", &SearchOptions::default());
        assert!(found(hits).is_empty());
        assert!(vfs().search(&p("/nowhere"), "x", &SearchOptions::default()).is_none());
    }

    #[test]
    fn test_file_start_is_not_searchable() {
        let tree = vfs();
        assert!(tree.search(&p("/Docs/report"), "report", &SearchOptions::default()).is_none());
        assert!(tree.search(&p("/Docs"), "report", &SearchOptions::default()).is_some());
    }
}

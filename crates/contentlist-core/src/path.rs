//! Manifest path type.
//!
//! A [`ContentPath`] is an immutable list of name segments plus an
//! absolute flag. Both `/` and `\` are accepted as separators when
//! parsing; `/` is always used when formatting.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::PathError;

const CURRENT_LINK: &str = ".";
const PARENT_LINK: &str = "..";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Compare two names ignoring case, the way listings and searches order them.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// A path inside a manifest.
///
/// Equality and ordering are case-sensitive and compare the segments
/// first, then the absolute flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentPath {
    segments: Vec<CompactString>,
    absolute: bool,
}

impl ContentPath {
    /// The absolute root, `/`.
    pub const fn absolute_root() -> Self {
        Self {
            segments: Vec::new(),
            absolute: true,
        }
    }

    /// The relative root, the empty path.
    pub const fn relative_root() -> Self {
        Self {
            segments: Vec::new(),
            absolute: false,
        }
    }

    /// The relative path `.`.
    pub fn current_link() -> Self {
        Self {
            segments: vec![CompactString::new(CURRENT_LINK)],
            absolute: false,
        }
    }

    /// The relative path `..`.
    pub fn parent_link() -> Self {
        Self {
            segments: vec![CompactString::new(PARENT_LINK)],
            absolute: false,
        }
    }

    /// Build a path from already split segments.
    ///
    /// Every segment must be non-empty and free of separators and null
    /// characters.
    pub fn from_segments<I, S>(segments: I, absolute: bool) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let segment = segment.as_ref();
                validate_segment(index, segment)?;
                Ok(CompactString::new(segment))
            })
            .collect::<Result<Vec<_>, PathError>>()?;

        Ok(Self { segments, absolute })
    }

    /// Parse a textual path.
    ///
    /// The empty string is the relative root and a lone separator is the
    /// absolute root. A leading separator makes the path absolute and a
    /// single trailing separator is ignored. Consecutive separators and
    /// null characters are rejected.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Ok(Self::relative_root());
        }
        if text == "/" || text == "\\" {
            return Ok(Self::absolute_root());
        }
        if let Some(index) = text.find('\0') {
            return Err(PathError::NullCharacter { index });
        }

        let (absolute, body) = match text.strip_prefix(is_separator) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let body = body.strip_suffix(is_separator).unwrap_or(body);

        let segments = body
            .split(is_separator)
            .enumerate()
            .map(|(index, segment)| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment { index })
                } else {
                    Ok(CompactString::new(segment))
                }
            })
            .collect::<Result<Vec<_>, PathError>>()?;

        Ok(Self { segments, absolute })
    }

    /// Number of segments in this path.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(CompactString::as_str)
    }

    /// Iterate over the segments.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.segments.iter().map(CompactString::as_str)
    }

    /// Last segment, or `None` for a root path.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(CompactString::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_relative(&self) -> bool {
        !self.absolute
    }

    /// Whether any segment is `.` or `..`.
    pub fn has_special_links(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.as_str() == CURRENT_LINK || s.as_str() == PARENT_LINK)
    }

    /// Root flagged the same way as this path.
    pub fn root(&self) -> Self {
        if self.absolute {
            Self::absolute_root()
        } else {
            Self::relative_root()
        }
    }

    /// Drop the last segment. Paths with at most one segment yield the root.
    pub fn parent(&self) -> Self {
        if self.segments.len() <= 1 {
            return self.root();
        }
        Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            absolute: self.absolute,
        }
    }

    /// The first `count` segments, keeping the absolute flag.
    pub fn prefix(&self, count: usize) -> Self {
        let count = count.min(self.segments.len());
        Self {
            segments: self.segments[..count].to_vec(),
            absolute: self.absolute,
        }
    }

    pub fn to_relative(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            absolute: false,
        }
    }

    pub fn to_absolute(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            absolute: true,
        }
    }

    /// Concatenate `other` onto this path. Absoluteness follows `self` only.
    pub fn join(&self, other: &ContentPath) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend(self.segments.iter().cloned());
        segments.extend(other.segments.iter().cloned());
        Self {
            segments,
            absolute: self.absolute,
        }
    }

    /// Parse `other` and concatenate it onto this path.
    pub fn join_str(&self, other: &str) -> Result<Self, PathError> {
        Ok(self.join(&Self::parse(other)?))
    }

    /// Append a single name segment.
    pub fn child(&self, name: &str) -> Result<Self, PathError> {
        validate_segment(self.segments.len(), name)?;
        let mut segments = self.segments.clone();
        segments.push(CompactString::new(name));
        Ok(Self {
            segments,
            absolute: self.absolute,
        })
    }

    /// Replace the last segment, or append one to a root path.
    pub fn rename(&self, name: &str) -> Result<Self, PathError> {
        if self.is_root() {
            return self.child(name);
        }
        let index = self.segments.len() - 1;
        validate_segment(index, name)?;
        let mut segments = self.segments.clone();
        segments[index] = CompactString::new(name);
        Ok(Self {
            segments,
            absolute: self.absolute,
        })
    }

    /// Strip `root` off the front of this path.
    ///
    /// Returns `None` unless this path's segments start with all of
    /// `root`'s segments. The absolute flags of both paths are ignored and
    /// the remainder is always relative.
    pub fn relative_to(&self, root: &ContentPath) -> Option<Self> {
        if self.segments.len() < root.segments.len() {
            return None;
        }
        if self.segments[..root.segments.len()] != root.segments[..] {
            return None;
        }
        Some(Self {
            segments: self.segments[root.segments.len()..].to_vec(),
            absolute: false,
        })
    }

    /// Resolve this path under a native anchor directory.
    pub fn to_native(&self, anchor: &Path) -> PathBuf {
        let mut native = anchor.to_path_buf();
        for segment in &self.segments {
            native.push(segment.as_str());
        }
        native
    }

    /// Case-insensitive ordering, used only for sorting listings.
    pub fn cmp_ignore_case(&self, other: &ContentPath) -> Ordering {
        let mut left = self.segments.iter();
        let mut right = other.segments.iter();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match compare_ignore_case(a, b) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return self.absolute.cmp(&other.absolute),
            }
        }
    }
}

fn validate_segment(index: usize, segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment { index });
    }
    if segment.contains(|c: char| c == '\0' || is_separator(c)) {
        return Err(PathError::IllegalCharacter {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

impl Default for ContentPath {
    fn default() -> Self {
        Self::relative_root()
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return if self.absolute { f.write_str("/") } else { Ok(()) };
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 || self.absolute {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentPath> for String {
    fn from(path: ContentPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> ContentPath {
        ContentPath::parse(text).unwrap()
    }

    #[test]
    fn test_parse_roots() {
        assert_eq!(p(""), ContentPath::relative_root());
        assert_eq!(p("/"), ContentPath::absolute_root());
        assert_eq!(p("\\"), ContentPath::absolute_root());
        assert!(p("/").is_root());
        assert!(p("").is_relative());
    }

    #[test]
    fn test_parse_segments() {
        let path = p("/a/b\\c/");
        assert!(path.is_absolute());
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(path.to_string(), "/a/b/c");

        let rel = p("x/y");
        assert!(rel.is_relative());
        assert_eq!(rel.to_string(), "x/y");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ContentPath::parse("a//b"),
            Err(PathError::EmptySegment { index: 1 })
        ));
        assert!(matches!(
            ContentPath::parse("//a"),
            Err(PathError::EmptySegment { index: 0 })
        ));
        assert!(matches!(
            ContentPath::parse("a/b\0"),
            Err(PathError::NullCharacter { index: 3 })
        ));
    }

    #[test]
    fn test_round_trip() {
        for text in ["", "/", "/a", "a", "/a/b/c", "a/../b", "./x", "/sp ace/ü"] {
            let parsed = p(text);
            let reparsed = p(&parsed.to_string());
            assert_eq!(parsed, reparsed, "round trip of {text:?}");
            assert_eq!(reparsed.to_string(), parsed.to_string());
        }
    }

    #[test]
    fn test_special_links() {
        assert!(p("/a/../b").has_special_links());
        assert!(p("./b").has_special_links());
        assert!(!p("/a/.b/..c").has_special_links());
    }

    #[test]
    fn test_parent() {
        assert_eq!(p("/a/b/c").parent(), p("/a/b"));
        assert_eq!(p("/a").parent(), ContentPath::absolute_root());
        assert_eq!(p("a").parent(), ContentPath::relative_root());
        assert_eq!(p("/").parent(), ContentPath::absolute_root());
    }

    #[test]
    fn test_join_follows_left_absoluteness() {
        assert_eq!(p("/a").join(&p("/b/c")), p("/a/b/c"));
        assert_eq!(p("a").join(&p("/b")), p("a/b"));
    }

    #[test]
    fn test_rename() {
        assert_eq!(p("/a/b/file.txt").rename("music.ogg").unwrap(), p("/a/b/music.ogg"));
        assert_eq!(p("/").rename("documents").unwrap(), p("/documents"));
        assert!(p("/a").rename("x/y").is_err());
        assert!(p("/a").rename("x\\y").is_err());
        assert!(p("/a").rename("").is_err());
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(p("/a/b/c/file.txt").relative_to(&p("/a/b/c")), Some(p("file.txt")));
        assert_eq!(p("/a/b").relative_to(&p("a")), Some(p("b")));
        assert_eq!(p("/a/b").relative_to(&p("/a/b")), Some(ContentPath::relative_root()));
        assert_eq!(p("/a/b").relative_to(&p("/A")), None);
        assert_eq!(p("/a").relative_to(&p("/a/b")), None);
    }

    #[test]
    fn test_to_native() {
        let anchor = Path::new("/tmp/anchor");
        assert_eq!(p("/").to_native(anchor), PathBuf::from("/tmp/anchor"));
        assert_eq!(p("/a/b").to_native(anchor), anchor.join("a").join("b"));
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        assert_ne!(p("/A"), p("/a"));
        assert_ne!(p("/a"), p("a"));
        assert_eq!(p("/A").cmp_ignore_case(&p("/a")), Ordering::Equal);
        assert_eq!(p("/apple").cmp_ignore_case(&p("/Banana")), Ordering::Less);
    }

    #[test]
    fn test_from_segments_validation() {
        assert!(ContentPath::from_segments(["a", "b"], true).is_ok());
        assert!(ContentPath::from_segments(["a", ""], true).is_err());
        assert!(ContentPath::from_segments(["a/b"], true).is_err());
        assert!(ContentPath::from_segments(["a\0"], false).is_err());
    }

    #[test]
    fn test_compare_ignore_case() {
        assert_eq!(compare_ignore_case("abc", "ABD"), Ordering::Less);
        assert_eq!(compare_ignore_case("Zeta", "alpha"), Ordering::Greater);
        assert_eq!(compare_ignore_case("Same", "sAME"), Ordering::Equal);
    }
}

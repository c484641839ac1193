//! Document data paths
//!
//! Provides [`DocPath`] for hierarchical addressing of document instances.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path addressing a document instance within a data model
///
/// Hierarchical structure using string segments, each segment naming an
/// entity-set element, optionally with a key predicate.
///
/// # Examples
/// - `["SalesOrder(42)", "Items(7)"]` → `SalesOrder(42)/Items(7)`
/// - `["Customer('A-1')"]` → `Customer('A-1')`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Empty path (model root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(|s| s.as_str())
    }

    /// Get first segment (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|s| s.as_str())
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Check if this path is a prefix of another
    ///
    /// # Examples
    /// - `SalesOrder(42)` is prefix of `SalesOrder(42)/Items(7)`
    /// - `SalesOrder(42)` is NOT prefix of `SalesOrder(43)`
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Check if this path is an ancestor of another (strict prefix)
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Get common prefix of two paths
    #[inline]
    #[must_use]
    pub fn common_prefix(&self, other: &Self) -> Self {
        let common: Vec<_> = self
            .0
            .iter()
            .zip(&other.0)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.clone())
            .collect();
        Self(common)
    }

    /// Get relative path from ancestor
    ///
    /// # Errors
    /// Returns error if `self` is not a descendant of `ancestor`
    pub fn relative_to(&self, ancestor: &Self) -> Result<Self, PathError> {
        if !ancestor.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(Self(self.0[ancestor.0.len()..].to_vec()))
    }

    /// Rebase this path from one ancestor onto another
    ///
    /// The suffix below `from` is re-attached under `onto`, preserving
    /// segment order. Used when remapping navigation history onto a sibling
    /// document.
    ///
    /// # Errors
    /// Returns error if `self` is not a descendant of `from`
    pub fn rebase(&self, from: &Self, onto: &Self) -> Result<Self, PathError> {
        let suffix = self.relative_to(from)?;
        let mut segments = onto.0.clone();
        segments.extend(suffix.0);
        Ok(Self(segments))
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('/').unwrap_or(s);
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = s
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.contains(|c: char| {
                    !c.is_alphanumeric() && !matches!(c, '_' | '(' | ')' | '\'' | '=' | ',' | '-')
                }) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for DocPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl Default for DocPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to document paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0}")]
    InvalidSegment(String),

    /// Not a descendant path
    #[error("path '{path}' is not a descendant of '{ancestor}'")]
    NotDescendant { path: String, ancestor: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_new_and_segments() {
        let path = DocPath::new(vec!["SalesOrder(1)".to_string(), "Items(2)".to_string()]);
        assert_eq!(path.segments(), &["SalesOrder(1)", "Items(2)"]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn path_root_is_empty() {
        let path = DocPath::root();
        assert!(path.is_empty());
        assert!(path.parent().is_none());
    }

    #[test]
    fn path_parent_and_last() {
        let path: DocPath = "SalesOrder(1)/Items(2)/Schedules(3)".parse().unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "SalesOrder(1)/Items(2)");
        assert_eq!(path.last(), Some("Schedules(3)"));
        assert_eq!(path.first(), Some("SalesOrder(1)"));
    }

    #[test]
    fn path_child() {
        let root = DocPath::single("SalesOrder(1)");
        let child = root.child("Items(2)");
        assert_eq!(child.to_string(), "SalesOrder(1)/Items(2)");
    }

    #[test]
    fn path_is_prefix_of() {
        let a: DocPath = "SalesOrder(1)".parse().unwrap();
        let b: DocPath = "SalesOrder(1)/Items(2)".parse().unwrap();
        assert!(a.is_prefix_of(&b));
        assert!(a.is_prefix_of(&a));
        assert!(!b.is_prefix_of(&a));
    }

    #[test]
    fn path_is_ancestor_of_excludes_self() {
        let a: DocPath = "SalesOrder(1)".parse().unwrap();
        let b: DocPath = "SalesOrder(1)/Items(2)".parse().unwrap();
        assert!(a.is_ancestor_of(&b));
        assert!(!a.is_ancestor_of(&a));
    }

    #[test]
    fn path_sibling_key_is_not_prefix() {
        let a: DocPath = "SalesOrder(1)".parse().unwrap();
        let b: DocPath = "SalesOrder(10)".parse().unwrap();
        assert!(!a.is_prefix_of(&b));
    }

    #[test]
    fn path_common_prefix() {
        let a: DocPath = "SalesOrder(1)/Items(2)".parse().unwrap();
        let b: DocPath = "SalesOrder(1)/Partners(9)".parse().unwrap();
        assert_eq!(a.common_prefix(&b).to_string(), "SalesOrder(1)");
    }

    #[test]
    fn path_relative_to() {
        let full: DocPath = "SalesOrder(1)/Items(2)/Schedules(3)".parse().unwrap();
        let ancestor: DocPath = "SalesOrder(1)".parse().unwrap();
        let rel = full.relative_to(&ancestor).unwrap();
        assert_eq!(rel.to_string(), "Items(2)/Schedules(3)");
    }

    #[test]
    fn path_relative_to_fails_for_non_descendant() {
        let path: DocPath = "SalesOrder(1)".parse().unwrap();
        let other: DocPath = "Customer(2)".parse().unwrap();
        assert!(matches!(
            path.relative_to(&other),
            Err(PathError::NotDescendant { .. })
        ));
    }

    #[test]
    fn path_rebase() {
        let path: DocPath = "SalesOrder(1)/Items(2)".parse().unwrap();
        let from: DocPath = "SalesOrder(1)".parse().unwrap();
        let onto: DocPath = "SalesOrder(77)".parse().unwrap();
        let rebased = path.rebase(&from, &onto).unwrap();
        assert_eq!(rebased.to_string(), "SalesOrder(77)/Items(2)");
    }

    #[test]
    fn path_from_str_leading_slash() {
        let path: DocPath = "/SalesOrder(1)/Items(2)".parse().unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn path_from_str_empty_segment() {
        let result: Result<DocPath, _> = "SalesOrder(1)//Items(2)".parse();
        assert!(matches!(result, Err(PathError::EmptySegment)));
    }

    #[test]
    fn path_from_str_invalid_chars() {
        let result: Result<DocPath, _> = "Sales Order".parse();
        assert!(matches!(result, Err(PathError::InvalidSegment(_))));
    }

    #[test]
    fn path_key_predicate_chars_accepted() {
        let path: DocPath = "Customer('A-1')/Orders(ID=7,IsActiveEntity=true)".parse().unwrap();
        assert_eq!(path.len(), 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = String> {
            "[A-Za-z0-9_]{1,8}(\\([A-Za-z0-9=',-]{1,8}\\))?"
        }

        proptest! {
            #[test]
            fn prop_display_parse_round_trip(segments in prop::collection::vec(segment(), 0..5)) {
                let path = DocPath::new(segments);
                let parsed: DocPath = path.to_string().parse().unwrap();
                prop_assert_eq!(parsed, path);
            }

            #[test]
            fn prop_child_is_descendant(segments in prop::collection::vec(segment(), 0..4), extra in segment()) {
                let parent = DocPath::new(segments);
                let child = parent.child(extra);
                prop_assert!(parent.is_prefix_of(&child));
                prop_assert_eq!(child.parent().unwrap(), parent);
            }
        }
    }
}

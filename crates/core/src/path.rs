//! Field paths inside nested records
//!
//! A [`FieldPath`] is an ordered list of object keys from the record root.
//! The empty path addresses the whole record.
//!
//! Paths are compared segment by segment, so `["a.b"]` and `["a", "b"]` are
//! distinct even though both display as `a.b`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Location of a value inside a record, as a sequence of object keys.
///
/// # Examples
///
/// ```
/// use deltaguard_core::FieldPath;
///
/// let title = FieldPath::root().child("meta").child("title");
/// assert_eq!(title.to_string(), "meta.title");
/// assert!(FieldPath::from_segments(["meta"]).is_strict_prefix_of(&title));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(SmallVec<[String; 4]>);

impl FieldPath {
    /// The empty path (whole record)
    pub fn root() -> Self {
        FieldPath(SmallVec::new())
    }

    /// Build a path from its segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath(segments.into_iter().map(Into::into).collect())
    }

    /// Is this the whole-record path?
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Same as [`FieldPath::is_root`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the segments
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// New path with `key` appended
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(key.into());
        next
    }

    /// Split into the parent path and the final key.
    ///
    /// Returns `None` for the root path.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.0
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }

    /// `self` equals `other` or is an ancestor of it
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.0.len() <= other.0.len() && self.0[..] == other.0[..self.0.len()]
    }

    /// `self` is an ancestor of `other` (and not equal to it)
    pub fn is_strict_prefix_of(&self, other: &FieldPath) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Two paths overlap when they are equal or one nests inside the other.
    ///
    /// Writes to overlapping paths cannot be reordered safely.
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    /// Dot-joined form, empty string for the root
    pub fn joined(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "$")
        } else {
            write!(f, "{}", self.joined())
        }
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FieldPath::from_segments(iter)
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(segments: Vec<String>) -> Self {
        FieldPath(SmallVec::from_vec(segments))
    }
}

impl From<&[&str]> for FieldPath {
    fn from(segments: &[&str]) -> Self {
        FieldPath::from_segments(segments.iter().copied())
    }
}

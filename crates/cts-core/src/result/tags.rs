use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Delimiter used by the canonical string form of [`Tags`].
pub const TAG_DELIMITER: &str = ",";

/// A sorted set of configuration tags, such as `os-linux` or `gpu-nvidia`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    pub fn add(&mut self, tag: impl Into<String>) {
        self.0.insert(tag.into());
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.remove(tag)
    }

    pub fn remove_all(&mut self, other: &Tags) {
        self.0.retain(|t| !other.contains(t));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// True if every tag of `other` is in `self`.
    pub fn contains_all(&self, other: &Tags) -> bool {
        other.0.is_subset(&self.0)
    }

    /// True if at least one tag of `other` is in `self`.
    pub fn contains_any(&self, other: &Tags) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    /// Tags present in both sets.
    pub fn intersection(&self, other: &Tags) -> Tags {
        Tags(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn retain(&mut self, f: impl FnMut(&String) -> bool) {
        self.0.retain(f);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tags_to_string(self))
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Tags::new(iter)
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Tags {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Joins the sorted tags with [`TAG_DELIMITER`].
pub fn tags_to_string(tags: &Tags) -> String {
    tags.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(TAG_DELIMITER)
}

/// Splits a [`TAG_DELIMITER`]-separated string. Empty segments are skipped.
pub fn string_to_tags(s: &str) -> Tags {
    s.split(TAG_DELIMITER).filter(|t| !t.is_empty()).collect()
}

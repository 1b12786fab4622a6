//! Observed test results.
//!
//! A [`Result`] is a single `(query, tags, status)` observation. A [`List`]
//! holds many of them and provides the bulk operations used when reconciling
//! results with expectations: sorting, filtering, tag transformation,
//! duplicate resolution and variant minimization ([`List::minimal_variant_tags`]).
//!
//! Results have a line format, `query [tags] status`, where `tags` is the
//! comma-joined tag set and is omitted when empty.

mod mvt;
mod status;
mod tags;

#[cfg(test)]
mod result_tests;
#[cfg(test)]
mod tags_tests;

pub use status::Status;
pub use tags::{TAG_DELIMITER, Tags, string_to_tags, tags_to_string};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tree::Tree;
use crate::{Error, Query};

/// A single test result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Result {
    pub query: Query,
    #[serde(default)]
    pub tags: Tags,
    pub status: Status,
    /// How long the test took. Zero when unknown.
    #[serde(
        default,
        rename = "duration_ms",
        with = "duration_ms",
        skip_serializing_if = "Duration::is_zero"
    )]
    pub duration: Duration,
    /// The result may be ignored when deciding whether a change is safe.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub may_exonerate: bool,
}

impl Result {
    pub fn new(query: Query, tags: Tags, status: Status) -> Self {
        Self {
            query,
            tags,
            status,
            duration: Duration::ZERO,
            may_exonerate: false,
        }
    }

    /// Parses a result from the line format produced by `Display`.
    pub fn parse(line: &str) -> crate::Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (query, tags, status) = match fields.as_slice() {
            [query, status] => (*query, "", *status),
            [query, tags, status] => (*query, *tags, *status),
            _ => {
                return Err(Error::ParseResult {
                    line: line.to_string(),
                });
            }
        };
        Ok(Self::new(
            Query::parse(query),
            string_to_tags(tags),
            status.parse()?,
        ))
    }
}

impl fmt::Display for Result {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            write!(f, "{} {}", self.query, self.status)
        } else {
            write!(f, "{} {} {}", self.query, self.tags, self.status)
        }
    }
}

impl FromStr for Result {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Result::parse(s)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// A list of results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct List(Vec<Result>);

impl List {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses one result per line. Blank lines and `#` comments are skipped.
    pub fn parse_lines(text: &str) -> crate::Result<Self> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Result::parse)
            .collect()
    }

    pub fn into_inner(self) -> Vec<Result> {
        self.0
    }

    /// Sorts by query, then tags, then status.
    pub fn sort(&mut self) {
        self.0
            .sort_by_cached_key(|r| (r.query.clone(), tags_to_string(&r.tags), r.status));
    }

    pub fn filter(&self, mut f: impl FnMut(&Result) -> bool) -> List {
        self.0.iter().filter(|r| f(r)).cloned().collect()
    }

    pub fn filter_by_status(&self, status: Status) -> List {
        self.filter(|r| r.status == status)
    }

    /// Results whose tags include all of `tags`.
    pub fn filter_by_tags(&self, tags: &Tags) -> List {
        self.filter(|r| r.tags.contains_all(tags))
    }

    /// Results whose tags are exactly `variant`.
    pub fn filter_by_variant(&self, variant: &Tags) -> List {
        self.filter(|r| r.tags == *variant)
    }

    /// The distinct tag sets in the list, sorted by their string form.
    pub fn unique_tags(&self) -> Vec<Tags> {
        let unique: BTreeMap<String, &Tags> = self
            .0
            .iter()
            .map(|r| (tags_to_string(&r.tags), &r.tags))
            .collect();
        unique.into_values().cloned().collect()
    }

    /// The distinct configurations the results were produced on.
    pub fn variants(&self) -> Vec<Tags> {
        self.unique_tags()
    }

    /// Replaces each result's tags with `f(tags)`.
    ///
    /// `f` is called once per distinct tag set.
    pub fn transform_tags(&self, mut f: impl FnMut(&Tags) -> Tags) -> List {
        let mut cache: HashMap<&Tags, Tags> = HashMap::new();
        let mut out = Vec::with_capacity(self.0.len());
        for r in &self.0 {
            let tags = cache.entry(&r.tags).or_insert_with(|| f(&r.tags)).clone();
            out.push(Result { tags, ..r.clone() });
        }
        List(out)
    }

    /// Collapses results sharing a query and tags into one.
    ///
    /// The collapsed result takes the status returned by `resolve`, which is
    /// given the duplicates in list order. Output keeps first-appearance order.
    pub fn replace_duplicates(&self, mut resolve: impl FnMut(&List) -> Status) -> List {
        let mut groups: IndexMap<(&Query, &Tags), Vec<&Result>> = IndexMap::new();
        for r in &self.0 {
            groups.entry((&r.query, &r.tags)).or_default().push(r);
        }

        groups
            .into_values()
            .map(|group| {
                let mut out = group[0].clone();
                if group.len() > 1 {
                    let list: List = group.into_iter().cloned().collect();
                    out.status = resolve(&list);
                }
                out
            })
            .collect()
    }

    /// The status to use for a group of duplicate results.
    ///
    /// A unanimous group keeps its status. Otherwise the most severe of
    /// `Crash`, `Abort`, `Failure` and `Slow` wins, defaulting to `Failure`.
    pub fn resolve_priority(group: &List) -> Status {
        let statuses = group.statuses();
        if statuses.len() == 1 {
            if let Some(status) = statuses.first() {
                return *status;
            }
        }
        [Status::Crash, Status::Abort, Status::Failure, Status::Slow]
            .into_iter()
            .find(|s| statuses.contains(s))
            .unwrap_or(Status::Failure)
    }

    /// Drops results that repeat an earlier `(query, tags, status)`.
    pub fn merge(&self) -> List {
        let mut seen = HashSet::new();
        self.filter(|r| seen.insert((r.query.clone(), r.tags.clone(), r.status)))
    }

    pub fn statuses(&self) -> BTreeSet<Status> {
        self.0.iter().map(|r| r.status).collect()
    }

    /// Builds a tree mapping each result's query to its status.
    ///
    /// Fails with [`Error::DuplicateData`] if a query appears twice.
    pub fn status_tree(&self) -> crate::Result<Tree<Status>> {
        let mut tree = Tree::new();
        for r in &self.0 {
            tree.add(r.query.clone(), r.status)?;
        }
        Ok(tree)
    }
}

impl Deref for List {
    type Target = Vec<Result>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for List {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Result>> for List {
    fn from(results: Vec<Result>) -> Self {
        Self(results)
    }
}

impl FromIterator<Result> for List {
    fn from_iter<I: IntoIterator<Item = Result>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for List {
    type Item = Result;
    type IntoIter = std::vec::IntoIter<Result>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Result;
    type IntoIter = std::slice::Iter<'a, Result>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.0 {
            writeln!(f, "{r}")?;
        }
        Ok(())
    }
}

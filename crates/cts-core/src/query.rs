//! Hierarchical test queries.
//!
//! A query has the form `suite:files:tests:cases` where:
//! - `files` and `tests` are comma-separated path segments
//! - `cases` is a semicolon-separated list of `key=value` parameters
//!
//! Any level may be terminated by a `*` wildcard, which matches everything
//! at and below that level. Empty trailing levels are omitted when rendered.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Delimiter between query levels.
pub const TARGET_DELIMITER: &str = ":";
/// Delimiter between file path segments.
pub const FILE_DELIMITER: &str = ",";
/// Delimiter between test path segments.
pub const TEST_DELIMITER: &str = ",";
/// Delimiter between case parameters.
pub const CASE_DELIMITER: &str = ";";

const WILDCARD: &str = "*";

/// The level of a query, in order of increasing specificity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    Suite,
    Files,
    Tests,
    Cases,
}

impl Target {
    fn delimiter(self) -> &'static str {
        match self {
            Target::Suite => TARGET_DELIMITER,
            Target::Files => FILE_DELIMITER,
            Target::Tests => TEST_DELIMITER,
            Target::Cases => CASE_DELIMITER,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::Suite => "suite",
            Target::Files => "files",
            Target::Tests => "tests",
            Target::Cases => "cases",
        };
        f.write_str(name)
    }
}

/// A parsed test query.
///
/// Ordering is lexicographic over the level strings, from suite to cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Query {
    pub suite: String,
    pub files: String,
    pub tests: String,
    pub cases: String,
}

/// One step of a [`Query::walk`]: the query prefix up to and including `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub query: Query,
    pub target: Target,
    pub name: String,
}

impl Query {
    /// Parses a query string. Never fails: missing levels are left empty.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(4, TARGET_DELIMITER);
        let mut next = || parts.next().unwrap_or_default().to_string();
        Self {
            suite: next(),
            files: next(),
            tests: next(),
            cases: next(),
        }
    }

    /// The deepest level present in the query.
    pub fn target(&self) -> Target {
        if self.files.is_empty() {
            Target::Suite
        } else if self.tests.is_empty() {
            Target::Files
        } else if self.cases.is_empty() {
            Target::Tests
        } else {
            Target::Cases
        }
    }

    /// Returns the string of the given level.
    pub fn level(&self, target: Target) -> &str {
        match target {
            Target::Suite => &self.suite,
            Target::Files => &self.files,
            Target::Tests => &self.tests,
            Target::Cases => &self.cases,
        }
    }

    fn level_mut(&mut self, target: Target) -> &mut String {
        match target {
            Target::Suite => &mut self.suite,
            Target::Files => &mut self.files,
            Target::Tests => &mut self.tests,
            Target::Cases => &mut self.cases,
        }
    }

    /// True if the deepest level ends with a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.level(self.target()).ends_with(WILDCARD)
    }

    /// Returns a new query with `name` appended to the `target` level.
    pub fn append(&self, target: Target, name: &str) -> Query {
        let mut out = self.clone();
        let level = out.level_mut(target);
        if level.is_empty() || target == Target::Suite {
            *level = name.to_string();
        } else {
            level.push_str(target.delimiter());
            level.push_str(name);
        }
        out
    }

    /// Splits the query into the sequence of levels visited by [`Query::walk`].
    pub fn levels(&self) -> Vec<Level> {
        let mut out = Vec::new();
        let mut prefix = Query {
            suite: self.suite.clone(),
            ..Query::default()
        };
        out.push(Level {
            query: prefix.clone(),
            target: Target::Suite,
            name: self.suite.clone(),
        });

        for (target, level) in [(Target::Files, &self.files), (Target::Tests, &self.tests)] {
            if level.is_empty() {
                continue;
            }
            for segment in level.split(target.delimiter()) {
                prefix = prefix.append(target, segment);
                out.push(Level {
                    query: prefix.clone(),
                    target,
                    name: segment.to_string(),
                });
            }
        }

        if !self.cases.is_empty() {
            prefix.cases = self.cases.clone();
            out.push(Level {
                query: prefix,
                target: Target::Cases,
                name: self.cases.clone(),
            });
        }
        out
    }

    /// Calls `visit` once per level, from the suite down to the cases.
    ///
    /// Files and tests are visited one segment at a time; the cases string is
    /// visited as a single step. Stops at the first error.
    pub fn walk<E>(&self, mut visit: impl FnMut(&Query, Target, &str) -> Result<(), E>) -> Result<(), E> {
        for level in self.levels() {
            visit(&level.query, level.target, &level.name)?;
        }
        Ok(())
    }

    /// True if `other` is equal to, or nested under, this query.
    pub fn contains(&self, other: &Query) -> bool {
        if self.suite != other.suite && self.suite != WILDCARD {
            return false;
        }
        if self.files.is_empty() {
            return true;
        }

        for (target, deeper) in [
            (Target::Files, !self.tests.is_empty()),
            (Target::Tests, !self.cases.is_empty()),
        ] {
            match contains_segments(self.level(target), other.level(target), target.delimiter(), deeper) {
                Segments::Contains => return true,
                Segments::Mismatch => return false,
                Segments::Continue => {}
            }
        }

        if other.cases.is_empty() {
            return false;
        }
        contains_cases(&self.cases, &other.cases)
    }

    /// The query as written in an expectations file.
    ///
    /// Test-level queries without a wildcard gain a trailing `:` so that they
    /// are not confused with a wildcard over the test's cases.
    pub fn expectation_file_string(&self) -> String {
        let mut s = self.to_string();
        if self.target() == Target::Tests && !self.is_wildcard() {
            s.push_str(TARGET_DELIMITER);
        }
        s
    }
}

enum Segments {
    /// `self` covers everything below this level.
    Contains,
    /// Segments agree; comparison continues at the next level.
    Continue,
    Mismatch,
}

fn contains_segments(ours: &str, theirs: &str, delimiter: &str, deeper: bool) -> Segments {
    let theirs: Vec<&str> = if theirs.is_empty() {
        Vec::new()
    } else {
        theirs.split(delimiter).collect()
    };

    let mut count = 0;
    for (i, segment) in ours.split(delimiter).enumerate() {
        if segment == WILDCARD {
            return if theirs.len() >= i {
                Segments::Contains
            } else {
                Segments::Mismatch
            };
        }
        if theirs.get(i) != Some(&segment) {
            return Segments::Mismatch;
        }
        count = i + 1;
    }

    if !deeper {
        return Segments::Contains;
    }
    if theirs.len() == count {
        Segments::Continue
    } else {
        Segments::Mismatch
    }
}

/// Case parameters keyed by name. Parameters without `=` have no value.
fn case_params(cases: &str) -> BTreeMap<&str, Option<&str>> {
    cases
        .split(CASE_DELIMITER)
        .filter(|p| !p.is_empty() && *p != WILDCARD)
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (p, None),
        })
        .collect()
}

fn contains_cases(ours: &str, theirs: &str) -> bool {
    let our_params = case_params(ours);
    let their_params = case_params(theirs);

    if ours.ends_with(WILDCARD) {
        // A wildcard matches any case whose parameters don't contradict ours.
        return our_params
            .iter()
            .all(|(k, v)| their_params.get(k).is_none_or(|theirs| theirs == v));
    }
    !theirs.ends_with(WILDCARD) && our_params == their_params
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suite)?;
        if self.files.is_empty() {
            return Ok(());
        }
        write!(f, "{TARGET_DELIMITER}{}", self.files)?;
        if self.tests.is_empty() {
            return Ok(());
        }
        write!(f, "{TARGET_DELIMITER}{}", self.tests)?;
        if self.cases.is_empty() {
            return Ok(());
        }
        write!(f, "{TARGET_DELIMITER}{}", self.cases)
    }
}

impl FromStr for Query {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Query::parse(s))
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        Query::parse(s)
    }
}

impl serde::Serialize for Query {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Query {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Query::parse(&s))
    }
}

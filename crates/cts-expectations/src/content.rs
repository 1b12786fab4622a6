//! The in-memory form of an expectation document.
//!
//! A document is a sequence of [`Chunk`]s. A chunk is a block of comment lines
//! followed by expectation lines. A blank line in the source is a chunk with
//! neither, which keeps the document layout when it is written back.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};

use cts_core::{Tags, tags_to_string};

use crate::tags::TagHeader;

/// Prefix of the first line of the tag header block.
pub const TAG_HEADER_START: &str = "# BEGIN TAG HEADER";
/// Prefix of the last line of the tag header block.
pub const TAG_HEADER_END: &str = "# END TAG HEADER";

/// Comment marking a chunk the updater regenerates from scratch.
pub const ROLLER_DISCARD_AND_REWRITE: &str = "# ##ROLLER_DISCARD_AND_REWRITE##";
/// Comment marking the chunk that receives autogenerated failures.
pub const ROLLER_AUTOGENERATED_FAILURES: &str = "# ##ROLLER_AUTOGENERATED_FAILURES##";
/// Substring of a comment marking a chunk the updater must not rewrite.
pub const KEEP: &str = "KEEP";

pub const NEW_FLAKES_COMMENT: &str =
    "# New flakes. Please triage - will be discarded/regenerated by the next roll:";
pub const NEW_FAILURES_COMMENT: &str =
    "# New failures. Please triage - will be discarded/regenerated by the next roll:";
pub const AUTOGENERATED_FAILURES_COMMENT: &str =
    "# Autogenerated Failure expectations. Please triage.";

pub(crate) const BANNER_RULE: &str =
    "################################################################################";

/// One expectation line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    /// 1-based line in the source document, or 0 for generated expectations.
    pub line: usize,
    pub bug: String,
    pub tags: Tags,
    /// The query as written. Kept verbatim, trailing `:` included.
    pub query: String,
    pub status: Vec<String>,
    /// Trailing comment including its leading `#`, or empty.
    pub comment: String,
}

impl Expectation {
    /// The line as written to an expectation file.
    pub fn as_expectation_file_string(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(5);
        if !self.bug.is_empty() {
            parts.push(self.bug.clone());
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            parts.push(format!("[ {} ]", tags.join(" ")));
        }
        parts.push(self.query.clone());
        parts.push(format!("[ {} ]", self.status.join(" ")));
        if !self.comment.is_empty() {
            parts.push(self.comment.clone());
        }
        parts.join(" ")
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.status.iter().any(|s| s == status)
    }

    /// Identity used to drop repeated expectations within a chunk.
    pub(crate) fn key(&self) -> (String, String, Vec<String>) {
        (tags_to_string(&self.tags), self.query.clone(), self.status.clone())
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_expectation_file_string())
    }
}

/// A list of expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectations(pub Vec<Expectation>);

impl Expectations {
    /// Sorts by bug, then tags, then query, then status.
    pub fn sort(&mut self) {
        self.0.sort_by_cached_key(|e| {
            (
                e.bug.clone(),
                tags_to_string(&e.tags),
                e.query.clone(),
                e.status.clone(),
            )
        });
    }

    /// Sorts by query, then tags, then bug, then status.
    pub fn sort_prioritize_query(&mut self) {
        self.0.sort_by_cached_key(|e| {
            (
                e.query.clone(),
                tags_to_string(&e.tags),
                e.bug.clone(),
                e.status.clone(),
            )
        });
    }
}

impl Deref for Expectations {
    type Target = Vec<Expectation>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Expectations {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Expectation>> for Expectations {
    fn from(expectations: Vec<Expectation>) -> Self {
        Self(expectations)
    }
}

impl FromIterator<Expectation> for Expectations {
    fn from_iter<I: IntoIterator<Item = Expectation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Comment lines followed by expectation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub comments: Vec<String>,
    pub expectations: Expectations,
}

impl Chunk {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.comments.is_empty() && self.expectations.is_empty()
    }

    pub fn is_comment_only(&self) -> bool {
        !self.comments.is_empty() && self.expectations.is_empty()
    }

    /// True if any comment line contains `token`.
    pub fn has_comment(&self, token: &str) -> bool {
        self.comments.iter().any(|c| c.contains(token))
    }

    /// A chunk headed by the given banner line.
    pub(crate) fn with_banner(banner: &str, token: &str, expectations: Expectations) -> Self {
        Self {
            comments: vec![
                BANNER_RULE.to_string(),
                banner.to_string(),
                token.to_string(),
                BANNER_RULE.to_string(),
            ],
            expectations,
        }
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            return writeln!(f);
        }
        for comment in &self.comments {
            writeln!(f, "{comment}")?;
        }
        for expectation in self.expectations.iter() {
            writeln!(f, "{expectation}")?;
        }
        Ok(())
    }
}

/// A parsed expectation document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub chunks: Vec<Chunk>,
    pub tags: TagHeader,
}

impl Content {
    /// Iterates over the expectations of every chunk, in document order.
    pub fn expectations(&self) -> impl Iterator<Item = &Expectation> {
        self.chunks.iter().flat_map(|c| c.expectations.iter())
    }

    /// Canonicalizes the layout without changing what is expected.
    ///
    /// Each chunk's expectations are sorted and repeated lines dropped.
    /// Runs of blank chunks collapse to one.
    pub fn format(&mut self) {
        for chunk in &mut self.chunks {
            let mut seen = HashSet::new();
            chunk
                .expectations
                .retain(|e| seen.insert(e.as_expectation_file_string()));
            chunk.expectations.sort();
        }
        collapse_blank_chunks(&mut self.chunks);
    }
}

/// Drops every blank chunk that directly follows another blank chunk.
pub(crate) fn collapse_blank_chunks(chunks: &mut Vec<Chunk>) {
    let mut previous_blank = false;
    chunks.retain(|chunk| {
        let blank = chunk.is_blank();
        let keep = !(blank && previous_blank);
        previous_blank = blank;
        keep
    });
}

/// Appends `chunk`, separated from the previous chunk by a blank line.
pub(crate) fn push_separated(chunks: &mut Vec<Chunk>, chunk: Chunk) {
    if chunks.last().is_some_and(|last| !last.is_blank()) {
        chunks.push(Chunk::blank());
    }
    chunks.push(chunk);
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.chunks {
            write!(f, "{chunk}")?;
        }
        Ok(())
    }
}

//! Appending raw failure expectations without rewriting the document.
//!
//! Unlike [`Content::update`], no existing expectation is regenerated. Each
//! failing result becomes one exact expectation in the chunk marked with
//! [`ROLLER_AUTOGENERATED_FAILURES`].

use std::collections::HashSet;

use tracing::debug;

use cts_core::{List, Query, Status};

use crate::content::{
    AUTOGENERATED_FAILURES_COMMENT, Chunk, Content, Expectation, Expectations,
    ROLLER_AUTOGENERATED_FAILURES, collapse_blank_chunks, push_separated,
};
use crate::{Error, Result};

/// Bug used for the appended expectations.
pub const FAILURE_BUG: &str = "crbug.com/0000";

impl Content {
    /// Adds a `Failure` expectation for every result that did not pass.
    ///
    /// Expectations for tests missing from `test_list` are removed first.
    pub fn add_expectations_for_failing_results(
        &mut self,
        results: &List,
        test_list: &[Query],
    ) -> Result<()> {
        self.remove_expectations_for_unknown_tests(test_list);

        let tags = &self.tags;
        let failing = results
            .filter(|r| r.status != Status::Pass)
            .transform_tags(|t| tags.remove_lower_priority_tags(t))
            .merge();

        let index = self.mutable_chunk()?;
        let chunk = &mut self.chunks[index];
        for r in failing {
            chunk.expectations.push(Expectation {
                line: 0,
                bug: FAILURE_BUG.to_string(),
                tags: r.tags,
                query: r.query.expectation_file_string(),
                status: vec![Status::Failure.to_string()],
                comment: String::new(),
            });
        }

        let mut seen = HashSet::new();
        chunk
            .expectations
            .retain(|e| seen.insert(e.as_expectation_file_string()));
        chunk.expectations.sort_prioritize_query();
        debug!(expectations = chunk.expectations.len(), "autogenerated failures");
        Ok(())
    }

    /// Drops expectations whose query matches none of `test_list`.
    ///
    /// A query ending in `*` matches every test it is a prefix of.
    fn remove_expectations_for_unknown_tests(&mut self, test_list: &[Query]) {
        let known: Vec<String> = test_list.iter().map(Query::expectation_file_string).collect();
        let exact: HashSet<&str> = known.iter().map(String::as_str).collect();
        let is_known = |query: &str| match query.strip_suffix('*') {
            Some(prefix) => known.iter().any(|k| k.starts_with(prefix)),
            None => exact.contains(query),
        };

        let mut removed = 0;
        self.chunks.retain_mut(|chunk| {
            if chunk.expectations.is_empty() {
                return true;
            }
            let before = chunk.expectations.len();
            chunk.expectations.retain(|e| is_known(&e.query));
            removed += before - chunk.expectations.len();
            !chunk.expectations.is_empty()
        });
        collapse_blank_chunks(&mut self.chunks);
        debug!(removed, "removed expectations for unknown tests");
    }

    /// Index of the chunk receiving autogenerated failures, created if absent.
    fn mutable_chunk(&mut self) -> Result<usize> {
        let found: Vec<usize> = (0..self.chunks.len())
            .filter(|&i| self.chunks[i].has_comment(ROLLER_AUTOGENERATED_FAILURES))
            .collect();
        match found.as_slice() {
            [index] => Ok(*index),
            [] => {
                push_separated(
                    &mut self.chunks,
                    Chunk::with_banner(
                        AUTOGENERATED_FAILURES_COMMENT,
                        ROLLER_AUTOGENERATED_FAILURES,
                        Expectations::default(),
                    ),
                );
                Ok(self.chunks.len() - 1)
            }
            _ => Err(Error::MutableChunkCount(found.len())),
        }
    }
}

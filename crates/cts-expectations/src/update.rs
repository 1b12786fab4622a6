//! Incremental update of an expectation document from fresh results.
//!
//! [`Content::update`] re-resolves every existing expectation against the
//! results, then appends chunks for failures and flakes that no expectation
//! covers. Each result is claimed (marked [`Status::Consumed`]) by the first
//! expectation that accounts for it, so no result produces two expectations.
//!
//! Existing chunks are handled in two passes: chunks with a `KEEP` comment
//! first, then the rest. Chunks stay in document order in the output.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use cts_core::{List, Query, Status, Tags, TestResult, Tree};

use crate::content::{
    Chunk, Content, Expectation, Expectations, KEEP, NEW_FAILURES_COMMENT, NEW_FLAKES_COMMENT,
    ROLLER_DISCARD_AND_REWRITE, collapse_blank_chunks, push_separated,
};
use crate::diagnostics::{Diagnostics, Severity};
use crate::tags::TagHeader;
use crate::Result;

/// Bug used for generated expectations.
pub const NEW_EXPECTATION_BUG: &str = "crbug.com/dawn/0000";

/// A node merges when more than this percentage of its children share a
/// non-pass status.
const MERGE_PERCENT: usize = 75;
/// A node merges when more than this many children share a non-pass status.
const MERGE_COUNT: usize = 20;

impl Content {
    /// Updates the expectations to match `results`.
    ///
    /// `test_list` holds every known test. It is used to find the tests that
    /// a `Skip` expectation covers but that produced no result.
    ///
    /// Lines are dropped when nothing matches them any more or, outside of
    /// `KEEP` chunks, when the tests now pass. Other lines are regenerated
    /// from the results, and new chunks are appended for uncovered flakes
    /// and failures.
    pub fn update(&mut self, results: &List, test_list: &[Query]) -> Result<Diagnostics> {
        let mut results = results.clone();
        simplify_statuses(&mut results);

        let tag_sets = self.tags.reversed_sets();
        let variants = results.variants();
        debug!(
            results = results.len(),
            variants = variants.len(),
            "updating expectations"
        );

        append_consumed_results_for_skipped_tests(&self.chunks, &mut results, test_list, &variants);

        let mut updater = Updater {
            tags: &self.tags,
            results: ResultQueryTree::new(results),
            variants,
            tag_sets,
            diags: Diagnostics::new(),
        };
        updater.preserve_retry_on_failures(&self.chunks)?;
        let (chunks, diags) = updater.build(&self.chunks)?;

        self.chunks = chunks;
        Ok(diags)
    }
}

/// Reduces every status to one the test runner understands.
///
/// `Pass`, `RetryOnFailure` and `Slow` are kept, `Skip` becomes `Pass`, and
/// anything else becomes `Failure`.
fn simplify_statuses(results: &mut List) {
    for r in results.iter_mut() {
        r.status = match r.status {
            Status::Pass | Status::RetryOnFailure | Status::Slow => r.status,
            Status::Skip => Status::Pass,
            _ => Status::Failure,
        };
    }
}

/// Adds `Consumed` results for skipped tests that produced no result.
///
/// Without these, a test that never ran would look like a gap that lets its
/// siblings' failures be merged over it.
fn append_consumed_results_for_skipped_tests(
    chunks: &[Chunk],
    results: &mut List,
    test_list: &[Query],
    variants: &[Tags],
) {
    let mut tests: Tree<()> = Tree::new();
    for q in test_list {
        let _ = tests.add(q.clone(), ());
    }

    for variant in variants {
        let mut seen: HashSet<Query> = results
            .filter_by_variant(variant)
            .iter()
            .map(|r| r.query.clone())
            .collect();

        let skips = chunks
            .iter()
            .flat_map(|c| c.expectations.iter())
            .filter(|ex| variant.contains_all(&ex.tags) && ex.has_status("Skip"));
        for ex in skips {
            let Ok(glob) = tests.glob(&Query::parse(&ex.query)) else {
                continue;
            };
            for qd in glob {
                if seen.insert(qd.query.clone()) {
                    results.push(TestResult::new(qd.query, variant.clone(), Status::Consumed));
                }
            }
        }
    }
}

/// Every result, indexed by query.
struct ResultQueryTree {
    results: List,
    /// Line of the expectation that consumed each result. 0 while unconsumed
    /// and for results consumed by generated expectations.
    consumed_at: Vec<usize>,
    tree: Tree<Vec<usize>>,
}

impl ResultQueryTree {
    fn new(results: List) -> Self {
        let mut tree = Tree::new();
        for (i, r) in results.iter().enumerate() {
            tree.get_or_create(r.query.clone(), Vec::new).push(i);
        }
        let consumed_at = vec![0; results.len()];
        Self {
            results,
            consumed_at,
            tree,
        }
    }

    fn indices(&self, q: &Query) -> cts_core::Result<Vec<usize>> {
        Ok(self
            .tree
            .glob(q)?
            .into_iter()
            .flat_map(|qd| qd.data.iter().copied())
            .collect())
    }

    /// All results at or under `q`, consumed ones included.
    fn glob(&self, q: &Query) -> cts_core::Result<List> {
        Ok(self
            .indices(q)?
            .into_iter()
            .map(|i| self.results[i].clone())
            .collect())
    }

    /// Like [`ResultQueryTree::glob`], keeping results that carry all of `tags`.
    fn glob_tags(&self, q: &Query, tags: &Tags) -> cts_core::Result<List> {
        Ok(self
            .indices(q)?
            .into_iter()
            .map(|i| &self.results[i])
            .filter(|r| r.tags.contains_all(tags))
            .cloned()
            .collect())
    }

    fn mark_as_consumed(&mut self, q: &Query, tags: &Tags, line: usize) {
        let Ok(indices) = self.indices(q) else {
            return;
        };
        for i in indices {
            let r = &mut self.results[i];
            if r.tags.contains_all(tags) {
                r.status = Status::Consumed;
                self.consumed_at[i] = line;
            }
        }
    }

    /// Number of results consumed by the expectation at `line`.
    fn consumed_by(&self, line: usize) -> usize {
        self.consumed_at.iter().filter(|&&l| l == line).count()
    }
}

struct Updater<'a> {
    tags: &'a TagHeader,
    results: ResultQueryTree,
    variants: Vec<Tags>,
    /// Declared tag sets, most recently declared first.
    tag_sets: Vec<Tags>,
    diags: Diagnostics,
}

impl Updater<'_> {
    /// Turns the results matched by a `RetryOnFailure` expectation into flakes.
    fn preserve_retry_on_failures(&mut self, chunks: &[Chunk]) -> Result<()> {
        let flaky = chunks
            .iter()
            .flat_map(|c| c.expectations.iter())
            .filter(|ex| ex.has_status("RetryOnFailure"));
        for ex in flaky {
            let indices = match self.results.indices(&Query::parse(&ex.query)) {
                Ok(indices) => indices,
                // The flaky tests may have been removed from the suite.
                Err(cts_core::Error::NoDataForQuery { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            for i in indices {
                let r = &mut self.results.results[i];
                if r.tags.contains_all(&ex.tags) {
                    r.status = Status::RetryOnFailure;
                }
            }
        }
        Ok(())
    }

    fn build(mut self, chunks: &[Chunk]) -> Result<(Vec<Chunk>, Diagnostics)> {
        let (immutable, mutable): (Vec<usize>, Vec<usize>) =
            (0..chunks.len()).partition(|&i| chunks[i].has_comment(KEEP));

        let mut out: Vec<Option<Chunk>> = vec![None; chunks.len()];
        for (indices, is_immutable) in [(immutable, true), (mutable, false)] {
            for i in indices {
                let chunk = &chunks[i];
                let updated = self.chunk(chunk, is_immutable);
                if !chunk.expectations.is_empty() && updated.expectations.is_empty() {
                    debug!(chunk = i, "dropping chunk with no remaining expectations");
                    continue;
                }
                out[i] = Some(updated);
            }
        }

        let mut chunks: Vec<Chunk> = out.into_iter().flatten().collect();
        collapse_blank_chunks(&mut chunks);
        debug!(
            consumed = self.results.results.len() - self.results.consumed_by(0),
            "existing expectations updated"
        );

        self.add_new_expectations(&mut chunks)?;
        Ok((chunks, self.diags))
    }

    fn chunk(&mut self, chunk: &Chunk, is_immutable: bool) -> Chunk {
        if chunk.expectations.is_empty() {
            return chunk.clone();
        }
        if is_regenerated(chunk) {
            return Chunk::default();
        }

        let mut out = BTreeMap::new();
        for ex in chunk.expectations.iter() {
            self.add_expectations(&mut out, ex, is_immutable);
        }

        let mut expectations: Expectations = out.into_values().collect();
        expectations.sort();
        Chunk {
            comments: chunk.comments.clone(),
            expectations,
        }
    }

    /// Adds to `out` the expectations that replace `ex`.
    fn add_expectations(
        &mut self,
        out: &mut BTreeMap<(String, String, Vec<String>), Expectation>,
        ex: &Expectation,
        is_immutable: bool,
    ) {
        let q = Query::parse(&ex.query);

        let results = match self.results.glob_tags(&q, &ex.tags) {
            Ok(results) if !results.is_empty() => results,
            Ok(_) | Err(cts_core::Error::NoDataForQuery { .. }) => {
                if is_immutable {
                    self.no_results(ex, Severity::Note);
                    out.insert(ex.key(), ex.clone());
                } else {
                    self.no_results(ex, Severity::Warning);
                }
                return;
            }
            Err(err) => {
                self.diags
                    .report(Severity::Error, ex.line)
                    .message(err.to_string())
                    .emit();
                return;
            }
        };

        if is_immutable || ex.has_status("Skip") {
            let statuses = results.statuses();
            if statuses.len() == 1 && statuses.contains(&Status::Pass) {
                self.diag_all_pass(ex.line, results.len());
            }
            if ex.has_status("Slow") {
                self.diag_longest(ex.line, &results);
            }
            out.insert(ex.key(), ex.clone());
        } else {
            let (expectations, some_pass, some_consumed) =
                self.expectations_for_root(&q, ex.line, &ex.bug, &ex.comment);
            let regenerated = !expectations.is_empty();
            for e in expectations {
                out.insert(e.key(), e);
            }

            if !regenerated && !out.contains_key(&ex.key()) {
                match (some_pass, some_consumed) {
                    (true, true) => self.note(
                        ex.line,
                        "expectation is partly covered by previous expectations and the remaining tests all pass",
                    ),
                    (false, true) => {
                        self.note(ex.line, "expectation is fully covered by previous expectations")
                    }
                    (true, false) => self.diag_all_pass(ex.line, results.len()),
                    (false, false) => {}
                }
            }
        }

        // Consuming has to wait until the replacements are generated, as the
        // consumed status changes how the results reduce.
        self.results.mark_as_consumed(&q, &ex.tags, ex.line);
        debug!(
            line = ex.line,
            consumed = self.results.consumed_by(ex.line),
            "expectation updated"
        );
    }

    fn no_results(&mut self, ex: &Expectation, severity: Severity) {
        let message = if ex.tags.is_empty() {
            format!("no results found for query '{}'", ex.query)
        } else {
            let tags: Vec<&str> = ex.tags.iter().map(String::as_str).collect();
            format!(
                "no results found for query '{}' with tags [{}]",
                ex.query,
                tags.join(" ")
            )
        };
        self.diags.report(severity, ex.line).message(message).emit();
    }

    fn note(&mut self, line: usize, message: &str) {
        self.diags.report(Severity::Note, line).message(message).emit();
    }

    fn diag_all_pass(&mut self, line: usize, count: usize) {
        if count > 1 {
            self.note(line, &format!("all {count} tests now pass"));
        } else {
            self.note(line, "test now passes");
        }
    }

    fn diag_longest(&mut self, line: usize, results: &List) {
        let Some(longest) = results.iter().map(|r| r.duration).max() else {
            return;
        };
        if !longest.is_zero() {
            self.note(line, &format!("longest test took {longest:?}"));
        }
    }

    /// Appends chunks for the flakes and failures that are still unclaimed.
    fn add_new_expectations(&mut self, chunks: &mut Vec<Chunk>) -> Result<()> {
        let mut roots: Tree<()> = Tree::new();
        for variant in &self.variants {
            let mut tree = self.results.results.filter_by_variant(variant).status_tree()?;
            tree.reduce(tree_reducer);
            for qd in tree.list() {
                if *qd.data != Status::Pass {
                    // Roots of different variants may overlap. Both are kept.
                    let _ = roots.add(qd.query, ());
                }
            }
        }

        let roots: Vec<Query> = roots.list().into_iter().map(|qd| qd.query).collect();
        debug!(roots = roots.len(), "building new expectations");

        let mut expectations = Vec::new();
        for root in &roots {
            let (generated, _, _) = self.expectations_for_root(root, 0, NEW_EXPECTATION_BUG, "");
            expectations.extend(generated);
        }

        let (flakes, failures): (Vec<Expectation>, Vec<Expectation>) = expectations
            .into_iter()
            .partition(|e| e.has_status(Status::RetryOnFailure.as_str()));
        debug!(
            flakes = flakes.len(),
            failures = failures.len(),
            "new expectations"
        );

        for (group, banner) in [(flakes, NEW_FLAKES_COMMENT), (failures, NEW_FAILURES_COMMENT)] {
            if group.is_empty() {
                continue;
            }
            let mut group = Expectations::from(group);
            group.sort();
            push_separated(
                chunks,
                Chunk::with_banner(banner, ROLLER_DISCARD_AND_REWRITE, group),
            );
        }
        Ok(())
    }

    /// Builds the expectations covering the unclaimed failures under `root`.
    ///
    /// Also returns whether some of the results under `root` pass, and
    /// whether some were already consumed.
    fn expectations_for_root(
        &mut self,
        root: &Query,
        line: usize,
        bug: &str,
        comment: &str,
    ) -> (Vec<Expectation>, bool, bool) {
        let results = match self.results.glob(root) {
            Ok(results) => results,
            Err(err) => {
                self.diags
                    .report(Severity::Error, line)
                    .message(format!("while gathering results for query '{root}': {err}"))
                    .emit();
                return (Vec::new(), false, false);
            }
        };

        let tags = self.tags;
        let results = results.transform_tags(|t| tags.remove_lower_priority_tags(t));
        let variants = results.minimal_variant_tags(&self.tag_sets);

        let mut reduced = List::new();
        for variant in &variants {
            let mut tree = Tree::new();
            for r in results.filter_by_tags(variant).iter() {
                // Variants may overlap, but then the statuses agree.
                let _ = tree.add(r.query.clone(), r.status);
            }
            match tree.reduce_under(root, tree_reducer) {
                // A wildcard cases root has no node of its own. Its cases stay unmerged.
                Ok(()) | Err(cts_core::Error::NoDataForQuery { .. }) => {}
                Err(err) => {
                    self.diags
                        .report(Severity::Error, line)
                        .message(format!("while reducing results for query '{root}': {err}"))
                        .emit();
                    continue;
                }
            }
            for qd in tree.list() {
                reduced.push(TestResult::new(qd.query, variant.clone(), *qd.data));
            }
        }

        let mut some_pass = false;
        let mut some_consumed = false;
        let mut failing = List::new();
        for r in reduced {
            match r.status {
                Status::Pass => some_pass = true,
                Status::Consumed => some_consumed = true,
                _ => failing.push(r),
            }
        }

        for r in failing.iter() {
            self.results.mark_as_consumed(&r.query, &r.tags, 0);
        }

        (self.results_to_expectations(failing, bug, comment), some_pass, some_consumed)
    }

    fn results_to_expectations(&self, mut results: List, bug: &str, comment: &str) -> Vec<Expectation> {
        results.sort();

        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(results.len());
        for r in results.iter() {
            let e = Expectation {
                line: 0,
                bug: bug.to_string(),
                tags: self.tags.remove_lower_priority_tags(&r.tags),
                query: r.query.expectation_file_string(),
                status: vec![r.status.to_string()],
                comment: comment.to_string(),
            };
            // Distinct results can render the same once lower priority tags
            // are gone.
            if seen.insert(e.as_expectation_file_string()) {
                out.push(e);
            }
        }
        out
    }
}

/// True for chunks generated by a previous update, which are rebuilt from scratch.
fn is_regenerated(chunk: &Chunk) -> bool {
    chunk.comments.iter().any(|c| {
        c.starts_with(ROLLER_DISCARD_AND_REWRITE)
            || c == NEW_FLAKES_COMMENT
            || c == NEW_FAILURES_COMMENT
    })
}

/// Merges sibling statuses for [`Tree::reduce`].
///
/// Siblings merge if they all share a status. Otherwise, provided none is
/// consumed, they merge to a non-pass status held by more than
/// [`MERGE_PERCENT`] percent of them, or to the most common non-pass status
/// when more than [`MERGE_COUNT`] siblings hold it.
pub(crate) fn tree_reducer(statuses: &[Status]) -> Option<Status> {
    let mut counts: BTreeMap<Status, usize> = BTreeMap::new();
    for s in statuses {
        *counts.entry(*s).or_default() += 1;
    }
    if counts.len() == 1 {
        return statuses.first().copied();
    }
    if counts.contains_key(&Status::Consumed) {
        return None;
    }

    let mut highest = (0, Status::Failure);
    for (&status, &n) in &counts {
        if status == Status::Pass {
            continue;
        }
        if 100 * n / statuses.len() > MERGE_PERCENT {
            return Some(status);
        }
        if n > highest.0 {
            highest = (n, status);
        }
    }
    (highest.0 > MERGE_COUNT).then_some(highest.1)
}

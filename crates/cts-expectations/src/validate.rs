//! Consistency checks for an expectation document.

use std::collections::BTreeSet;

use tracing::debug;

use cts_core::{Query, Tree};

use crate::content::{Content, Expectation};
use crate::diagnostics::{Diagnostics, Severity};

impl Content {
    /// Reports expectations that are not valid in an expectation document.
    ///
    /// Two expectations collide when one's query covers the other's and
    /// their tags may describe the same configuration. A collision is
    /// reported once, at the later line.
    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let mut tree: Tree<Vec<&Expectation>> = Tree::new();
        for ex in self.expectations() {
            if ex.has_status("Slow") {
                diags
                    .report(Severity::Error, ex.line)
                    .message(r#""Slow" expectation is not valid here. Use slow_tests.txt instead."#)
                    .emit();
            }
            tree.get_or_create(Query::parse(&ex.query), Vec::new).push(ex);
        }

        let mut collisions = BTreeSet::new();
        for ex in self.expectations() {
            let Ok(glob) = tree.glob(&Query::parse(&ex.query)) else {
                continue;
            };
            for other in glob.iter().flat_map(|qd| qd.data.iter()) {
                if std::ptr::eq(*other, ex) || self.tags.are_disjoint(&ex.tags, &other.tags) {
                    continue;
                }
                let (earlier, later) = if other.line < ex.line {
                    (other.line, ex.line)
                } else {
                    (ex.line, other.line)
                };
                collisions.insert((later, earlier));
            }
        }
        debug!(collisions = collisions.len(), "validated expectations");

        for (later, earlier) in collisions {
            diags
                .report(Severity::Error, later)
                .message(format!("expectation collides with expectation on line {earlier}"))
                .emit();
        }

        diags.sort_by_line();
        diags
    }
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for conformance test expectations.
//!
//! - `query` - hierarchical test identifiers (`suite:files:tests:cases`)
//! - `tree` - a generic tree keyed by the query hierarchy
//! - `result` - observed results, tags, statuses and variant minimization

pub mod query;
pub mod result;
pub mod tree;

#[cfg(test)]
mod query_tests;

pub use query::{Query, Target};
pub use result::{List, Result as TestResult, Status, Tags, string_to_tags, tags_to_string};
pub use tree::{QueryData, Tree, TreeNode, TreeNodeChildKey};

/// Errors raised by query trees and result parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A second value was inserted at a query that already holds data.
    #[error("duplicate data for query '{query}'")]
    DuplicateData { query: Query },

    /// A lookup descended into a query path that does not exist in the tree.
    #[error("no data for query '{query}'")]
    NoDataForQuery { query: Query },

    #[error("unable to parse result '{line}'")]
    ParseResult { line: String },

    #[error("unknown status '{0}'")]
    UnknownStatus(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Expectation documents and the engine that keeps them in sync with results.
//!
//! # Example
//!
//! ```
//! use cts_expectations::parse;
//!
//! let source = "crbug.com/123 [ os-a ] suite:file:* [ Failure ]\n";
//! let content = parse(source).expect("valid document");
//! assert_eq!(content.to_string(), source);
//! ```

pub mod add_failures;
pub mod content;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;
pub mod tags;
pub mod update;
pub mod validate;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod test_utils;

use rowan::TextRange;

pub use content::{Chunk, Content, Expectation, Expectations};
pub use diagnostics::{Diagnostic, DiagnosticBuilder, Diagnostics, DiagnosticsPrinter, Severity};
pub use parser::parse;
pub use tags::{TagHeader, TagPriority, TagSet};

/// Errors that can occur while reading or rewriting an expectation document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The document is not well formed.
    #[error("line {line}: {message}")]
    Syntax {
        line: usize,
        span: TextRange,
        message: String,
    },

    #[error(transparent)]
    Tree(#[from] cts_core::Error),

    /// The document has more than one chunk that failures may be appended to.
    #[error("Expected 1 mutable chunk, found {0}")]
    MutableChunkCount(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
